//! CLI command implementations

pub mod decode;
mod list;

pub use list::list_opcodes;
