//! Command decoding
//!
//! Turns one closed [`Transaction`] into a [`DecodedCommand`]: opcode,
//! address, mode byte and the location of the payload. Decoding is a pure
//! function of the transaction bytes, the opcode table and the address
//! width; nothing is carried over between calls.
//!
//! Short transactions never fail. If the bytes run out before the address
//! (or the mode/dummy bytes) are complete, the command is marked as
//! truncated and the missing fields are reported as absent.

use core::ops::Range;

use crate::assembler::Transaction;
use crate::class::CommandClass;
use crate::config::FilterConfig;
use crate::event::Timestamp;
use crate::spi::{is_continuous_mode, AddressWidth};
use crate::table::{self, CommandDescriptor, Direction};

/// One command recovered from a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCommand {
    /// Opcode byte (0x00 for an empty transaction)
    pub opcode: u8,
    /// Table entry, `None` for unknown opcodes
    pub descriptor: Option<&'static CommandDescriptor>,
    /// Command class (`Other` for unknown opcodes)
    pub class: CommandClass,
    /// Resolved width of the address field, if the command has one
    pub address_width: Option<AddressWidth>,
    /// Big-endian address, absent if the transaction is too short
    pub address: Option<u32>,
    /// Continuous-read mode byte
    pub mode: Option<u8>,
    /// Payload location as byte offsets into the transaction
    pub payload: Range<usize>,
    /// Payload direction, `None` if the command has no data phase
    pub direction: Option<Direction>,
    /// Start of the transaction
    pub start: Timestamp,
    /// End of the transaction
    pub end: Timestamp,
    /// The transaction ended inside the address, mode or dummy phase
    pub truncated: bool,
}

impl DecodedCommand {
    fn unknown(opcode: u8, tx: &Transaction) -> Self {
        let len = tx.len();
        Self {
            opcode,
            descriptor: None,
            class: CommandClass::Other,
            address_width: None,
            address: None,
            mode: None,
            payload: len..len,
            direction: None,
            start: tx.start,
            end: tx.end,
            truncated: tx.is_empty(),
        }
    }

    /// Command name, `None` for unknown opcodes
    pub fn name(&self) -> Option<&'static str> {
        self.descriptor.map(|desc| desc.name)
    }

    /// Returns true if the opcode is in the table
    pub fn is_known(&self) -> bool {
        self.descriptor.is_some()
    }

    /// Returns true if the command declares an address field
    pub fn has_address_field(&self) -> bool {
        self.address_width.is_some()
    }

    /// Returns true if the mode byte keeps the flash in continuous read
    pub fn enters_continuous_mode(&self) -> bool {
        self.mode.is_some_and(is_continuous_mode)
    }

    /// Payload bytes, taken from the line the payload travels on
    pub fn payload_bytes<'t>(&self, tx: &'t Transaction) -> &'t [u8] {
        match self.direction {
            Some(direction) => tx.line(direction).get(self.payload.clone()).unwrap_or(&[]),
            None => &[],
        }
    }
}

/// Decode a transaction with the configured address width
pub fn decode(tx: &Transaction, config: &FilterConfig) -> DecodedCommand {
    decode_with_width(tx, config.address_width)
}

/// Decode a transaction, resolving configurable address fields to `width`
pub fn decode_with_width(tx: &Transaction, width: AddressWidth) -> DecodedCommand {
    let Some(opcode) = tx.opcode() else {
        return DecodedCommand::unknown(0, tx);
    };
    let Some(desc) = table::lookup(opcode) else {
        return DecodedCommand::unknown(opcode, tx);
    };

    let len = tx.len();
    let mut cmd = DecodedCommand {
        opcode,
        descriptor: Some(desc),
        class: desc.class,
        address_width: desc.address_width(width),
        address: None,
        mode: None,
        payload: len..len,
        direction: desc.payload,
        start: tx.start,
        end: tx.end,
        truncated: false,
    };

    // Skip the opcode
    let mut pos = 1;

    if let Some(width) = cmd.address_width {
        match width.decode(&tx.mosi[pos..]) {
            Some(address) => {
                cmd.address = Some(address);
                pos += width.bytes() as usize;
            }
            None => {
                cmd.truncated = true;
                return cmd;
            }
        }
    }

    if desc.mode_byte {
        match tx.mosi.get(pos) {
            Some(&mode) => {
                cmd.mode = Some(mode);
                pos += 1;
            }
            None => {
                cmd.truncated = true;
                return cmd;
            }
        }
    }

    let dummy = desc.dummy_bytes(tx.multi_io);
    if pos + dummy > len {
        cmd.truncated = true;
        return cmd;
    }
    pos += dummy;

    if desc.has_payload() {
        cmd.payload = pos..len;
    }
    cmd
}
