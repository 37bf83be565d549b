//! SPI bus vocabulary
//!
//! Address widths, I/O line layouts and the standard JEDEC opcodes that
//! the opcode table is built from.

mod address;
mod io_mode;
pub mod opcodes;

pub use address::AddressWidth;
pub use io_mode::IoMode;
pub use opcodes::*;
