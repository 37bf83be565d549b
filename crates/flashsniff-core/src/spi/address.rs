//! Address width types

/// Width of the address field of an SPI flash command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// 1-byte (8-bit) address
    OneByte,
    /// 2-byte (16-bit) address, small EEPROM-style parts
    TwoByte,
    /// 3-byte (24-bit) address - supports up to 16 MiB
    #[default]
    ThreeByte,
    /// 4-byte (32-bit) address - supports up to 4 GiB
    FourByte,
}

impl AddressWidth {
    /// Returns the number of address bytes
    pub const fn bytes(&self) -> u8 {
        match self {
            Self::OneByte => 1,
            Self::TwoByte => 2,
            Self::ThreeByte => 3,
            Self::FourByte => 4,
        }
    }

    /// Build a width from a byte count, `None` outside 1..=4
    pub const fn from_bytes(bytes: u8) -> Option<Self> {
        match bytes {
            1 => Some(Self::OneByte),
            2 => Some(Self::TwoByte),
            3 => Some(Self::ThreeByte),
            4 => Some(Self::FourByte),
            _ => None,
        }
    }

    /// Number of hex digits used when printing an address of this width
    pub const fn hex_digits(&self) -> usize {
        self.bytes() as usize * 2
    }

    /// Decode a big-endian address from the start of `buf`
    ///
    /// Returns `None` if `buf` is shorter than the address field.
    pub fn decode(&self, buf: &[u8]) -> Option<u32> {
        let bytes = buf.get(..self.bytes() as usize)?;
        Some(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
    }
}
