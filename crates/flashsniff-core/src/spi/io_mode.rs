//! SPI I/O modes

/// I/O mode of an SPI flash command
///
/// Describes how many data lines carry each phase of the command. The
/// opcode is always sent on a single line; QPI (4-4-4) traffic cannot be
/// recognised from the opcode and is not modelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IoMode {
    /// Standard SPI: 1-1-1 (cmd, addr, data all on single line)
    #[default]
    Single,
    /// Dual Output: 1-1-2 (data phase on 2 lines)
    DualOut,
    /// Dual I/O: 1-2-2 (addr and data on 2 lines)
    DualIo,
    /// Quad Output: 1-1-4 (data phase on 4 lines)
    QuadOut,
    /// Quad I/O: 1-4-4 (addr and data on 4 lines)
    QuadIo,
}

impl IoMode {
    /// Returns the number of data lines used for the address and mode phase
    pub const fn addr_lines(&self) -> u8 {
        match self {
            Self::Single | Self::DualOut | Self::QuadOut => 1,
            Self::DualIo => 2,
            Self::QuadIo => 4,
        }
    }

    /// Returns the number of data lines used for the dummy and data phase
    pub const fn data_lines(&self) -> u8 {
        match self {
            Self::Single => 1,
            Self::DualOut | Self::DualIo => 2,
            Self::QuadOut | Self::QuadIo => 4,
        }
    }

    /// Returns true if this mode uses multiple data lines
    pub const fn is_multi_io(&self) -> bool {
        !matches!(self, Self::Single)
    }

    /// Short notation such as `1-4-4`
    pub const fn notation(&self) -> &'static str {
        match self {
            Self::Single => "1-1-1",
            Self::DualOut => "1-1-2",
            Self::DualIo => "1-2-2",
            Self::QuadOut => "1-1-4",
            Self::QuadIo => "1-4-4",
        }
    }
}
