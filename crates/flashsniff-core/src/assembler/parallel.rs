//! Parallel-bus assembly (Quad SPI over a generic sampler)
//!
//! The sampler reports one 16-bit sample per clock edge and knows nothing
//! about SPI. Chip-select is inferred from timing: the assembler keeps the
//! smallest gap seen between two clock edges and treats any gap larger than
//! [`BOUNDARY_FACTOR`] times that minimum as a CS-high interval.
//!
//! This heuristic is approximate and kept as is. Known limitations:
//!
//! - Until two edges were seen there is no minimum, so leading edges with
//!   irregular timing are never split.
//! - A glitch (two edges very close together) drags the minimum down for the
//!   rest of the capture and every later gap starts looking like a boundary.
//! - A capture with fewer than two edges is a single transaction.
//!
//! Bits are reassembled MSB first. The opcode is always clocked on one line
//! (MOSI on IO0, MISO on IO1). Once the opcode is known its descriptor
//! decides how many lines carry the address, mode byte, dummy and data
//! phases.

use super::{Assembler, Transaction};
use crate::event::{BusEvent, LineRoles, Timestamp};
use crate::spi::{is_continuous_mode, AddressWidth};
use crate::table::{self, CommandDescriptor, Direction};

/// A clock gap larger than this many times the minimum gap ends a transaction
pub const BOUNDARY_FACTOR: u64 = 4;

/// How the bits of the current byte are clocked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lanes {
    /// One bit per clock on each of MOSI and MISO
    Single,
    /// `lines` bits per clock, all belonging to one direction
    Multi { lines: u8, target: Direction },
}

#[derive(Debug, Default)]
struct Shifter {
    mosi: u8,
    miso: u8,
    bits: u8,
}

/// Assembler for raw parallel samples with inferred chip-select
#[derive(Debug)]
pub struct ParallelAssembler {
    roles: LineRoles,
    address_width: AddressWidth,
    min_gap: Option<u64>,
    last_edge: Option<Timestamp>,
    open: Option<Transaction>,
    shifter: Shifter,
    /// Layout of the command being clocked, once its opcode is known
    layout: Option<&'static CommandDescriptor>,
    /// Command the flash keeps executing without an opcode (XIP)
    continuous: Option<&'static CommandDescriptor>,
}

impl ParallelAssembler {
    /// Create an assembler for the given line roles and address width
    pub fn new(roles: LineRoles, address_width: AddressWidth) -> Self {
        Self {
            roles,
            address_width,
            min_gap: None,
            last_edge: None,
            open: None,
            shifter: Shifter::default(),
            layout: None,
            continuous: None,
        }
    }

    /// Smallest clock gap seen so far
    pub fn min_gap(&self) -> Option<u64> {
        self.min_gap
    }

    /// Returns true if the next transaction starts without an opcode
    pub fn in_continuous_mode(&self) -> bool {
        self.continuous.is_some()
    }

    fn begin(&mut self, time: Timestamp) {
        let mut tx = Transaction::new(time);
        tx.multi_io = true;
        self.shifter = Shifter::default();
        self.layout = None;
        if let Some(desc) = self.continuous {
            log::debug!(
                "Continuous read at {} ns, implied opcode 0x{:02X}",
                time,
                desc.opcode
            );
            tx.push(desc.opcode, 0, time);
            self.layout = Some(desc);
        }
        self.open = Some(tx);
    }

    fn close(&mut self) -> Option<Transaction> {
        let tx = self.open.take()?;
        if self.shifter.bits > 0 {
            log::debug!(
                "Dropping {} trailing bits at end of transaction",
                self.shifter.bits
            );
        }
        self.shifter = Shifter::default();
        if tx.is_empty() {
            log::trace!("Dropping empty transaction at {} ns", tx.start);
            return None;
        }
        Some(tx)
    }

    fn address_bytes(&self, desc: &CommandDescriptor) -> usize {
        desc.address_width(self.address_width)
            .map_or(0, |width| width.bytes() as usize)
    }

    /// Lane layout of the byte at `index` within the open transaction
    fn lanes(&self, index: usize) -> Lanes {
        let desc = match self.layout {
            Some(desc) if index > 0 && desc.io_mode.is_multi_io() => desc,
            _ => return Lanes::Single,
        };
        let header = 1 + self.address_bytes(desc) + desc.mode_byte as usize;
        if index < header {
            match desc.io_mode.addr_lines() {
                1 => Lanes::Single,
                lines => Lanes::Multi {
                    lines,
                    target: Direction::HostToDevice,
                },
            }
        } else {
            Lanes::Multi {
                lines: desc.io_mode.data_lines(),
                target: desc.payload.unwrap_or(Direction::DeviceToHost),
            }
        }
    }

    fn clock(&mut self, time: Timestamp, value: u16) {
        let index = match self.open.as_mut() {
            Some(tx) => {
                tx.end = time;
                tx.len()
            }
            None => return,
        };

        match self.lanes(index) {
            Lanes::Single => {
                self.shifter.mosi = self.shifter.mosi << 1 | self.roles.mosi(value);
                self.shifter.miso = self.shifter.miso << 1 | self.roles.miso(value);
                self.shifter.bits += 1;
            }
            Lanes::Multi { lines, target } => {
                let bits = self.roles.io_bits(value, lines);
                let reg = match target {
                    Direction::HostToDevice => &mut self.shifter.mosi,
                    Direction::DeviceToHost => &mut self.shifter.miso,
                };
                *reg = *reg << lines | bits;
                self.shifter.bits += lines;
            }
        }

        if self.shifter.bits < 8 {
            return;
        }
        let Shifter { mosi, miso, .. } = core::mem::take(&mut self.shifter);
        if let Some(tx) = self.open.as_mut() {
            tx.push(mosi, miso, time);
        }
        self.byte_complete(index, mosi);
    }

    fn byte_complete(&mut self, index: usize, mosi: u8) {
        if index == 0 {
            self.layout = table::lookup(mosi);
            if self.layout.is_none() {
                log::debug!("Unknown opcode 0x{:02X}, clocking single line", mosi);
            }
            return;
        }

        let Some(desc) = self.layout else {
            return;
        };
        if desc.mode_byte && index == 1 + self.address_bytes(desc) {
            let continuous = is_continuous_mode(mosi);
            if continuous != self.continuous.is_some() {
                log::debug!(
                    "Mode byte 0x{:02X}: continuous read {}",
                    mosi,
                    if continuous { "entered" } else { "left" }
                );
            }
            self.continuous = continuous.then_some(desc);
        }
    }
}

impl Assembler for ParallelAssembler {
    fn ingest(&mut self, event: &BusEvent) -> Option<Transaction> {
        let BusEvent::Sample { time, value } = *event else {
            log::trace!("Ignoring {:?} in parallel mode", event);
            return None;
        };

        let mut closed = None;
        if let Some(last) = self.last_edge {
            let gap = time.saturating_sub(last);
            if let Some(min_gap) = self.min_gap {
                if gap > min_gap.saturating_mul(BOUNDARY_FACTOR) {
                    log::debug!(
                        "Clock gap of {} ns at {} ns (minimum {} ns), chip-select inferred",
                        gap,
                        time,
                        min_gap
                    );
                    closed = self.close();
                }
            }
            self.min_gap = Some(self.min_gap.map_or(gap, |min_gap| min_gap.min(gap)));
        }
        self.last_edge = Some(time);

        if self.roles.cs_high(value) {
            return closed;
        }
        if self.open.is_none() {
            self.begin(time);
        }
        self.clock(time, value);
        closed
    }

    fn flush(&mut self) -> Option<Transaction> {
        self.close()
    }

    fn set_address_width(&mut self, width: AddressWidth) {
        self.address_width = width;
    }
}
