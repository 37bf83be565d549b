//! flashsniff-core - SPI flash bus command decoder
//!
//! This crate turns raw SPI bus activity into labeled SPI NOR flash
//! commands (read, program, erase, status, ID, ...). It sits downstream of
//! a capture producer: either an SPI byte decoder that already reports
//! chip-select edges, or a generic parallel sampler used for Quad SPI where
//! chip-select has to be inferred from clock timing.
//!
//! The pipeline is strictly forward:
//!
//! ```text
//! BusEvent -> Assembler -> Transaction -> decode -> DecodedCommand -> filter -> Frame
//! ```
//!
//! # Features
//!
//! - `std` - TOML configuration files, capture file reader and
//!   `std::error::Error` implementations
//!
//! # Example
//!
//! ```ignore
//! use flashsniff_core::{Analyzer, BusEvent, FilterConfig};
//!
//! let mut analyzer = Analyzer::spi(FilterConfig::new())?;
//! for event in events {
//!     for frame in analyzer.ingest(&event) {
//!         println!("{}", frame);
//!     }
//! }
//! for frame in analyzer.flush() {
//!     println!("{}", frame);
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod analyzer;
pub mod assembler;
#[cfg(feature = "std")]
pub mod capture;
pub mod class;
pub mod config;
pub mod decoder;
pub mod error;
pub mod event;
pub mod filter;
pub mod spi;
pub mod table;

pub use analyzer::{Analyzer, AnalyzerStats};
pub use assembler::{Assembler, ParallelAssembler, SpiAssembler, Transaction};
#[cfg(feature = "std")]
pub use capture::{parse_capture, read_capture_file, CaptureError};
pub use class::{CommandClass, CommandClasses};
pub use config::{DecodeLevel, FilterConfig};
#[cfg(feature = "std")]
pub use config::ConfigError;
pub use decoder::{decode, decode_with_width, DecodedCommand};
pub use error::{Error, Result};
pub use event::{BusEvent, LineRoles, Timestamp};
pub use filter::{filter, Frame};
pub use spi::{AddressWidth, IoMode};
pub use table::{lookup, AddressField, CommandDescriptor, Direction, OPCODE_TABLE};
