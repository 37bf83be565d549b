//! TOML configuration file parsing
//!
//! Every key is optional, missing keys keep their default:
//!
//! ```toml
//! address_width = 4
//! min_address = 0x001000
//! max_address = "0x1FFFFF"
//! decode_level = "address"      # opcode, address, full or errors
//! classes = ["read", "program", "erase"]
//! track_address_mode = true
//! ```

use std::format;
use std::fs;
use std::path::Path;
use std::string::{String, ToString};
use std::vec::Vec;

use thiserror::Error;

use super::{DecodeLevel, FilterConfig};
use crate::class::CommandClasses;

/// Errors from loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML or has unexpected keys
    #[error("Invalid configuration: {0}")]
    Parse(#[from] ::toml::de::Error),

    /// A value was understood but is not acceptable
    #[error("Invalid value for {key}: {message}")]
    Value {
        /// Offending key
        key: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// The settings contradict each other
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] crate::Error),
}

/// Configuration file structure
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    address_width: Option<u8>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    min_address: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    max_address: Option<u32>,
    decode_level: Option<String>,
    classes: Option<Vec<String>>,
    track_address_mode: Option<bool>,
}

/// Deserialize an optional u32 that can be hex (0x...) or decimal
fn deserialize_opt_hex_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(u32),
        Str(String),
    }

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(Some(n)),
        HexOrInt::Str(s) => parse_number(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parse a number that can be hex (0x...) or decimal, `_` separators allowed
fn parse_number(s: &str) -> Result<u32, String> {
    let cleaned: String = s.trim().chars().filter(|&c| c != '_').collect();
    if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        cleaned.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

impl FilterConfig {
    /// Load a configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from a TOML string
    ///
    /// The result is validated, an inverted address window is an error.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TomlConfig = ::toml::from_str(content)?;
        let mut config = FilterConfig::new();

        if let Some(bytes) = file.address_width {
            config = config.with_address_bytes(bytes)?;
        }
        config.min_address = file.min_address;
        config.max_address = file.max_address;
        if let Some(level) = file.decode_level {
            config.decode_level =
                DecodeLevel::from_name(&level).map_err(|_| ConfigError::Value {
                    key: "decode_level",
                    message: format!(
                        "unknown level '{}' (expected opcode, address, full or errors)",
                        level
                    ),
                })?;
        }
        if let Some(classes) = file.classes {
            config.classes = CommandClasses::from_names(classes.iter().map(String::as_str))
                .map_err(|_| ConfigError::Value {
                    key: "classes",
                    message: format!("unknown class in {:?}", classes),
                })?;
        }
        if let Some(track) = file.track_address_mode {
            config.track_address_mode = track;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::CommandClass;
    use crate::spi::AddressWidth;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("4096").unwrap(), 4096);
        assert_eq!(parse_number("0x1000").unwrap(), 4096);
        assert_eq!(parse_number("0X1F_FF").unwrap(), 0x1FFF);
        assert!(parse_number("0xZZ").is_err());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
address_width = 4
min_address = 0x1000
max_address = "0x1FFF"
decode_level = "address"
classes = ["read", "write"]
track_address_mode = true
"#;
        let config = FilterConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.address_width, AddressWidth::FourByte);
        assert_eq!(config.min_address, Some(0x1000));
        assert_eq!(config.max_address, Some(0x1FFF));
        assert_eq!(config.decode_level, DecodeLevel::Address);
        assert!(config.classes.allows(CommandClass::Read));
        assert!(config.classes.allows(CommandClass::Program));
        assert!(!config.classes.allows(CommandClass::Status));
        assert!(config.track_address_mode);
    }

    #[test]
    fn test_errors_level() {
        let config = FilterConfig::from_toml_str("decode_level = \"errors\"").unwrap();
        assert_eq!(config.decode_level, DecodeLevel::Errors);
        let config = FilterConfig::from_toml_str("decode_level = \"only-errors\"").unwrap();
        assert!(config.decode_level.errors_only());
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(FilterConfig::from_toml_str("").unwrap(), FilterConfig::new());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            FilterConfig::from_toml_str("address_width = 5"),
            Err(ConfigError::Invalid(crate::Error::InvalidAddressWidth(5)))
        ));
        assert!(matches!(
            FilterConfig::from_toml_str("min_address = 0x2000\nmax_address = 0x1000"),
            Err(ConfigError::Invalid(crate::Error::InvalidAddressRange { .. }))
        ));
        assert!(matches!(
            FilterConfig::from_toml_str("decode_level = \"verbose\""),
            Err(ConfigError::Value { key: "decode_level", .. })
        ));
        assert!(matches!(
            FilterConfig::from_toml_str("classes = [\"flash\"]"),
            Err(ConfigError::Value { key: "classes", .. })
        ));
        assert!(matches!(
            FilterConfig::from_toml_str("colour = \"red\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
