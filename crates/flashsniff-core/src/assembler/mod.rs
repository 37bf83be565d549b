//! Transaction assembly
//!
//! Assemblers group upstream [`BusEvent`]s into [`Transaction`]s, one per
//! chip-select assertion. Two strategies exist:
//!
//! - [`SpiAssembler`] - chip-select edges are reported by the upstream
//!   decoder, boundaries are explicit
//! - [`ParallelAssembler`] - raw parallel samples, chip-select is inferred
//!   from gaps in the clock
//!
//! Neither assembler ever fails. Unexpected input is folded into the open
//! transaction or ignored.

mod parallel;
mod spi;

pub use parallel::ParallelAssembler;
pub use spi::SpiAssembler;

use alloc::vec::Vec;

use crate::event::{BusEvent, Timestamp};
use crate::spi::AddressWidth;
use crate::table::Direction;

/// Bytes exchanged during one chip-select assertion
///
/// `mosi` and `miso` always have the same length: position `i` holds the
/// bytes that were clocked at the same time on both lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Time the transaction started
    pub start: Timestamp,
    /// Time of the last byte (or of the closing CS edge)
    pub end: Timestamp,
    /// Bytes driven by the host
    pub mosi: Vec<u8>,
    /// Bytes driven by the flash
    pub miso: Vec<u8>,
    /// Bytes after the opcode were packed lane-aware (2 or 4 bits per clock)
    pub multi_io: bool,
}

impl Transaction {
    /// Create an empty transaction starting at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            start,
            end: start,
            mosi: Vec::new(),
            miso: Vec::new(),
            multi_io: false,
        }
    }

    /// Build a transaction from host bytes only (flash side reads as 0x00)
    pub fn from_mosi(start: Timestamp, end: Timestamp, bytes: &[u8]) -> Self {
        Self {
            start,
            end,
            mosi: bytes.to_vec(),
            miso: alloc::vec![0; bytes.len()],
            multi_io: false,
        }
    }

    /// Build a transaction from both lines
    ///
    /// The shorter line is padded with zeros.
    pub fn from_lines(start: Timestamp, end: Timestamp, mosi: &[u8], miso: &[u8]) -> Self {
        let len = mosi.len().max(miso.len());
        let mut tx = Self {
            start,
            end,
            mosi: mosi.to_vec(),
            miso: miso.to_vec(),
            multi_io: false,
        };
        tx.mosi.resize(len, 0);
        tx.miso.resize(len, 0);
        tx
    }

    /// Append one byte pair clocked at `time`
    pub fn push(&mut self, mosi: u8, miso: u8, time: Timestamp) {
        self.mosi.push(mosi);
        self.miso.push(miso);
        self.end = self.end.max(time);
    }

    /// Number of bytes clocked
    pub fn len(&self) -> usize {
        self.mosi.len()
    }

    /// Returns true if no byte was clocked
    pub fn is_empty(&self) -> bool {
        self.mosi.is_empty()
    }

    /// The opcode (first host byte)
    pub fn opcode(&self) -> Option<u8> {
        self.mosi.first().copied()
    }

    /// The line carrying data in `direction`
    pub fn line(&self, direction: Direction) -> &[u8] {
        match direction {
            Direction::DeviceToHost => &self.miso,
            Direction::HostToDevice => &self.mosi,
        }
    }
}

/// Groups bus events into transactions
pub trait Assembler {
    /// Feed one event
    ///
    /// Returns a transaction when this event closed one. Empty transactions
    /// are dropped and never returned.
    fn ingest(&mut self, event: &BusEvent) -> Option<Transaction>;

    /// Close the open transaction at end of capture (best effort)
    fn flush(&mut self) -> Option<Transaction>;

    /// Update the address width used for commands without a fixed width
    ///
    /// Only assemblers that need the command layout to reassemble bytes
    /// care about this.
    fn set_address_width(&mut self, _width: AddressWidth) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_tracks_end() {
        let mut tx = Transaction::new(100);
        assert!(tx.is_empty());
        assert_eq!(tx.opcode(), None);
        tx.push(0x9F, 0x00, 150);
        tx.push(0x00, 0xEF, 200);
        assert_eq!(tx.len(), 2);
        assert_eq!(tx.opcode(), Some(0x9F));
        assert_eq!(tx.end, 200);
        assert_eq!(tx.line(Direction::DeviceToHost), &[0x00, 0xEF]);
        assert_eq!(tx.line(Direction::HostToDevice), &[0x9F, 0x00]);
    }

    #[test]
    fn test_from_lines_pads() {
        let tx = Transaction::from_lines(0, 10, &[0x05], &[0x00, 0x03]);
        assert_eq!(tx.mosi, [0x05, 0x00]);
        assert_eq!(tx.miso, [0x00, 0x03]);
    }
}
