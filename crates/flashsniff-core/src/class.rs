//! Command classes
//!
//! Every opcode belongs to exactly one class. Classes drive output styling
//! and the class allow-list of the output filter.

use core::fmt;

use bitflags::bitflags;

use crate::error::{Error, Result};

/// Coarse category of a flash command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandClass {
    /// Status/configuration register access and write enable latch
    Status,
    /// Array reads
    Read,
    /// Page program / write
    Program,
    /// Sector, block and chip erase
    Erase,
    /// Identification, SFDP and security registers
    Id,
    /// Software reset
    Reset,
    /// Everything else, including unknown opcodes
    Other,
}

impl CommandClass {
    /// All classes in display order
    pub const ALL: [CommandClass; 7] = [
        Self::Status,
        Self::Read,
        Self::Program,
        Self::Erase,
        Self::Id,
        Self::Reset,
        Self::Other,
    ];

    /// Lowercase name used as the styling tag and in configuration
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Read => "read",
            Self::Program => "program",
            Self::Erase => "erase",
            Self::Id => "id",
            Self::Reset => "reset",
            Self::Other => "other",
        }
    }

    /// The allow-set flag for this class
    pub const fn flag(&self) -> CommandClasses {
        match self {
            Self::Status => CommandClasses::STATUS,
            Self::Read => CommandClasses::READ,
            Self::Program => CommandClasses::PROGRAM,
            Self::Erase => CommandClasses::ERASE,
            Self::Id => CommandClasses::ID,
            Self::Reset => CommandClasses::RESET,
            Self::Other => CommandClasses::OTHER,
        }
    }

    /// Parse a class name (case-insensitive)
    ///
    /// `write` and `security` are accepted as aliases of `program` and `id`.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        let alias = if name.eq_ignore_ascii_case("write") {
            "program"
        } else if name.eq_ignore_ascii_case("security") {
            "id"
        } else {
            name
        };
        Self::ALL
            .into_iter()
            .find(|class| class.name().eq_ignore_ascii_case(alias))
            .ok_or(Error::UnknownCommandClass)
    }
}

impl fmt::Display for CommandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of command classes allowed through the output filter
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommandClasses: u8 {
        /// Status/configuration registers
        const STATUS  = 1 << 0;
        /// Array reads
        const READ    = 1 << 1;
        /// Program/write
        const PROGRAM = 1 << 2;
        /// Erase
        const ERASE   = 1 << 3;
        /// ID/security
        const ID      = 1 << 4;
        /// Reset
        const RESET   = 1 << 5;
        /// Other/unknown
        const OTHER   = 1 << 6;

        /// Commands that touch the memory array
        const DATA = Self::READ.bits() | Self::PROGRAM.bits() | Self::ERASE.bits();
        /// Commands that only manage the device
        const CONTROL = Self::STATUS.bits()
            | Self::ID.bits()
            | Self::RESET.bits()
            | Self::OTHER.bits();
    }
}

impl Default for CommandClasses {
    fn default() -> Self {
        CommandClasses::all()
    }
}

impl CommandClasses {
    /// Returns true if `class` passes the allow-set
    pub fn allows(&self, class: CommandClass) -> bool {
        self.contains(class.flag())
    }

    /// Build a set from class names, see [`CommandClass::from_name`]
    ///
    /// The group names `data` and `control` are accepted as well.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        names
            .into_iter()
            .try_fold(CommandClasses::empty(), |set, name| {
                let name = name.trim();
                let flags = if name.eq_ignore_ascii_case("data") {
                    CommandClasses::DATA
                } else if name.eq_ignore_ascii_case("control") {
                    CommandClasses::CONTROL
                } else {
                    CommandClass::from_name(name)?.flag()
                };
                Ok(set | flags)
            })
    }
}
