//! Analyzer configuration
//!
//! A [`FilterConfig`] is fixed for the lifetime of an analyzer. It selects
//! the default address width, the optional address window, how much of each
//! command is shown and which command classes are shown at all.
//!
//! With the `std` feature, configurations can also be loaded from TOML:
//!
//! ```toml
//! address_width = 3
//! min_address = "0x1000"
//! max_address = "0x1FFF"
//! decode_level = "full"    # opcode, address, full or errors
//! classes = ["read", "program"]
//! ```

#[cfg(feature = "std")]
mod toml;

#[cfg(feature = "std")]
pub use self::toml::ConfigError;

use core::fmt;

use crate::class::CommandClasses;
use crate::error::{Error, Result};
use crate::spi::AddressWidth;

/// How much of each command ends up in the emitted frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DecodeLevel {
    /// Command name only
    Opcode,
    /// Command name and address
    Address,
    /// Command name, address and payload
    #[default]
    Full,
    /// Like `Full`, but only malformed commands are shown
    Errors,
}

impl DecodeLevel {
    /// Name used in configuration files
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Opcode => "opcode",
            Self::Address => "address",
            Self::Full => "full",
            Self::Errors => "errors",
        }
    }

    /// Parse a level name (case-insensitive)
    ///
    /// `opcode+address` and `only-errors` are accepted as aliases.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        let is = |candidate: &str| name.eq_ignore_ascii_case(candidate);
        if is("opcode") {
            Ok(Self::Opcode)
        } else if is("address") || is("opcode+address") {
            Ok(Self::Address)
        } else if is("full") {
            Ok(Self::Full)
        } else if is("errors") || is("only-errors") {
            Ok(Self::Errors)
        } else {
            Err(Error::UnknownDecodeLevel)
        }
    }

    /// Returns true if addresses are shown (and address filtering applies)
    pub const fn shows_address(&self) -> bool {
        !matches!(self, Self::Opcode)
    }

    /// Returns true if payload bytes are shown
    pub const fn shows_payload(&self) -> bool {
        matches!(self, Self::Full | Self::Errors)
    }

    /// Returns true if only malformed commands are shown
    pub const fn errors_only(&self) -> bool {
        matches!(self, Self::Errors)
    }
}

impl fmt::Display for DecodeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Filter and decode settings of one analyzer instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterConfig {
    /// Address width of commands without a fixed width
    pub address_width: AddressWidth,
    /// Lowest address of interest (inclusive)
    pub min_address: Option<u32>,
    /// Highest address of interest (inclusive)
    pub max_address: Option<u32>,
    /// Verbosity of emitted frames
    pub decode_level: DecodeLevel,
    /// Classes that are emitted
    pub classes: CommandClasses,
    /// Follow EN4B/EX4B to switch between 3- and 4-byte addressing
    pub track_address_mode: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            address_width: AddressWidth::ThreeByte,
            min_address: None,
            max_address: None,
            decode_level: DecodeLevel::Full,
            classes: CommandClasses::all(),
            track_address_mode: false,
        }
    }
}

impl FilterConfig {
    /// Default configuration: 3-byte addresses, everything shown
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the address width
    pub fn with_address_width(mut self, width: AddressWidth) -> Self {
        self.address_width = width;
        self
    }

    /// Set the address width from a byte count (1 to 4)
    pub fn with_address_bytes(self, bytes: u8) -> Result<Self> {
        let width = AddressWidth::from_bytes(bytes).ok_or(Error::InvalidAddressWidth(bytes))?;
        Ok(self.with_address_width(width))
    }

    /// Set the lowest address of interest
    pub fn with_min_address(mut self, address: u32) -> Self {
        self.min_address = Some(address);
        self
    }

    /// Set the highest address of interest
    pub fn with_max_address(mut self, address: u32) -> Self {
        self.max_address = Some(address);
        self
    }

    /// Set the decode level
    pub fn with_decode_level(mut self, level: DecodeLevel) -> Self {
        self.decode_level = level;
        self
    }

    /// Set the class allow-set
    pub fn with_classes(mut self, classes: CommandClasses) -> Self {
        self.classes = classes;
        self
    }

    /// Enable or disable EN4B/EX4B tracking
    pub fn with_address_mode_tracking(mut self, enabled: bool) -> Self {
        self.track_address_mode = enabled;
        self
    }

    /// Reject inconsistent settings
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_address, self.max_address) {
            if max < min {
                return Err(Error::InvalidAddressRange { min, max });
            }
        }
        Ok(())
    }

    /// Inclusive address window, if any bound is configured
    pub fn address_range(&self) -> Option<(u32, u32)> {
        if self.min_address.is_none() && self.max_address.is_none() {
            return None;
        }
        Some((
            self.min_address.unwrap_or(0),
            self.max_address.unwrap_or(u32::MAX),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::new();
        assert_eq!(config.address_width, AddressWidth::ThreeByte);
        assert_eq!(config.decode_level, DecodeLevel::Full);
        assert_eq!(config.address_range(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_address_range() {
        let config = FilterConfig::new().with_min_address(0x1000);
        assert_eq!(config.address_range(), Some((0x1000, u32::MAX)));
        let config = FilterConfig::new().with_max_address(0x1FFF);
        assert_eq!(config.address_range(), Some((0, 0x1FFF)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = FilterConfig::new()
            .with_min_address(0x2000)
            .with_max_address(0x1000);
        assert_eq!(
            config.validate(),
            Err(Error::InvalidAddressRange {
                min: 0x2000,
                max: 0x1000
            })
        );
        // A single-address window is fine
        let config = FilterConfig::new()
            .with_min_address(0x1000)
            .with_max_address(0x1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_address_bytes() {
        assert_eq!(
            FilterConfig::new().with_address_bytes(4).unwrap().address_width,
            AddressWidth::FourByte
        );
        assert_eq!(
            FilterConfig::new().with_address_bytes(0),
            Err(Error::InvalidAddressWidth(0))
        );
        assert_eq!(
            FilterConfig::new().with_address_bytes(5),
            Err(Error::InvalidAddressWidth(5))
        );
    }

    #[test]
    fn test_decode_level_names() {
        assert_eq!(DecodeLevel::from_name("Opcode"), Ok(DecodeLevel::Opcode));
        assert_eq!(
            DecodeLevel::from_name("opcode+address"),
            Ok(DecodeLevel::Address)
        );
        assert_eq!(DecodeLevel::from_name("full"), Ok(DecodeLevel::Full));
        assert_eq!(
            DecodeLevel::from_name("everything"),
            Err(Error::UnknownDecodeLevel)
        );
        assert!(DecodeLevel::Address.shows_address());
        assert!(!DecodeLevel::Address.shows_payload());
    }

    #[test]
    fn test_errors_level() {
        assert_eq!(DecodeLevel::from_name("errors"), Ok(DecodeLevel::Errors));
        assert_eq!(DecodeLevel::from_name("Only-Errors"), Ok(DecodeLevel::Errors));
        assert_eq!(DecodeLevel::Errors.name(), "errors");
        assert!(DecodeLevel::Errors.errors_only());
        assert!(DecodeLevel::Errors.shows_address());
        assert!(DecodeLevel::Errors.shows_payload());
        assert!(!DecodeLevel::Full.errors_only());
    }
}
