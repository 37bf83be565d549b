//! Error types for flashsniff-core
//!
//! Decoding itself never fails: malformed captures degrade into truncated
//! or unknown commands. The only errors are configuration errors, which are
//! reported before the first event is ingested.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Address width must be between 1 and 4 bytes
    InvalidAddressWidth(u8),
    /// Maximum address is below the minimum address
    InvalidAddressRange {
        /// Configured minimum address (inclusive)
        min: u32,
        /// Configured maximum address (inclusive)
        max: u32,
    },
    /// A parallel line role points outside the 16 sampled lines
    InvalidLineRole(u8),
    /// Decode level name not recognized
    UnknownDecodeLevel,
    /// Command class name not recognized
    UnknownCommandClass,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddressWidth(width) => {
                write!(f, "invalid address width {} (expected 1 to 4 bytes)", width)
            }
            Self::InvalidAddressRange { min, max } => write!(
                f,
                "maximum address 0x{:08X} is below minimum address 0x{:08X}",
                max, min
            ),
            Self::InvalidLineRole(line) => {
                write!(f, "line D{} does not exist (expected D0 to D15)", line)
            }
            Self::UnknownDecodeLevel => write!(f, "unknown decode level"),
            Self::UnknownCommandClass => write!(f, "unknown command class"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
