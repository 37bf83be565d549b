//! Analyzer lifecycle
//!
//! An [`Analyzer`] ties one assembler to the decoder and the output filter
//! for the duration of one capture. The configuration is validated once,
//! when the analyzer is built, and cannot change afterwards. To analyze
//! another capture with other settings, build a new analyzer.
//!
//! ```ignore
//! let mut analyzer = Analyzer::parallel(FilterConfig::new(), LineRoles::default())?;
//! let frames = analyzer.run(&events);
//! ```

use alloc::vec::Vec;

use crate::assembler::{Assembler, ParallelAssembler, SpiAssembler, Transaction};
use crate::config::FilterConfig;
use crate::decoder::decode_with_width;
use crate::error::Result;
use crate::event::{BusEvent, LineRoles};
use crate::filter::{filter, Frame};
use crate::spi::opcodes::{EN4B, EX4B};
use crate::spi::AddressWidth;

/// Counters collected while analyzing a capture
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnalyzerStats {
    /// Transactions handed to the decoder
    pub transactions: usize,
    /// Frames emitted
    pub emitted: usize,
    /// Transactions filtered out by class or address
    pub suppressed: usize,
    /// Transactions with an opcode missing from the table
    pub unknown: usize,
    /// Transactions that ended before the command was complete
    pub truncated: usize,
}

/// One analyzer instance: assembler, decoder and filter
#[derive(Debug)]
pub struct Analyzer<A> {
    config: FilterConfig,
    assembler: A,
    /// Width for `Configured` address fields, changes with EN4B/EX4B tracking
    address_width: AddressWidth,
    stats: AnalyzerStats,
}

impl Analyzer<SpiAssembler> {
    /// Analyzer for byte events with explicit chip-select edges
    pub fn spi(config: FilterConfig) -> Result<Self> {
        Self::new(config, SpiAssembler::new())
    }
}

impl Analyzer<ParallelAssembler> {
    /// Analyzer for raw parallel samples with inferred chip-select
    pub fn parallel(config: FilterConfig, roles: LineRoles) -> Result<Self> {
        roles.validate()?;
        Self::new(config, ParallelAssembler::new(roles, config.address_width))
    }
}

impl<A: Assembler> Analyzer<A> {
    /// Build an analyzer, rejecting an invalid configuration
    pub fn new(config: FilterConfig, mut assembler: A) -> Result<Self> {
        config.validate()?;
        assembler.set_address_width(config.address_width);
        log::debug!(
            "Analyzer configured: {}-byte addresses, level {}, range {:?}",
            config.address_width.bytes(),
            config.decode_level,
            config.address_range()
        );
        Ok(Self {
            config,
            assembler,
            address_width: config.address_width,
            stats: AnalyzerStats::default(),
        })
    }

    /// The configuration this analyzer was built with
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Counters collected so far
    pub fn stats(&self) -> AnalyzerStats {
        self.stats
    }

    /// Address width currently applied to `Configured` address fields
    pub fn address_width(&self) -> AddressWidth {
        self.address_width
    }

    /// Feed one event, returning the frames it completed
    pub fn ingest(&mut self, event: &BusEvent) -> Vec<Frame> {
        log::trace!("Event {:?}", event);
        match self.assembler.ingest(event) {
            Some(tx) => self.process(&tx),
            None => Vec::new(),
        }
    }

    /// End of capture, decode whatever is still open
    pub fn flush(&mut self) -> Vec<Frame> {
        match self.assembler.flush() {
            Some(tx) => self.process(&tx),
            None => Vec::new(),
        }
    }

    /// Analyze a whole capture
    pub fn run<'a>(&mut self, events: impl IntoIterator<Item = &'a BusEvent>) -> Vec<Frame> {
        let mut frames = Vec::new();
        for event in events {
            frames.extend(self.ingest(event));
        }
        frames.extend(self.flush());
        frames
    }

    fn process(&mut self, tx: &Transaction) -> Vec<Frame> {
        log::debug!(
            "Transaction {}..{} ns, {} bytes",
            tx.start,
            tx.end,
            tx.len()
        );
        let cmd = decode_with_width(tx, self.address_width);

        self.stats.transactions += 1;
        if !cmd.is_known() {
            log::debug!("Unknown opcode 0x{:02X} at {} ns", cmd.opcode, cmd.start);
            self.stats.unknown += 1;
        }
        if cmd.truncated {
            log::warn!(
                "Transaction at {} ns ended inside command 0x{:02X}",
                cmd.start,
                cmd.opcode
            );
            self.stats.truncated += 1;
        }

        let frames = filter(&cmd, tx, &self.config);
        if frames.is_empty() {
            self.stats.suppressed += 1;
        }
        self.stats.emitted += frames.len();

        if self.config.track_address_mode {
            self.track_address_mode(cmd.opcode);
        }
        frames
    }

    fn track_address_mode(&mut self, opcode: u8) {
        let width = match opcode {
            EN4B => AddressWidth::FourByte,
            EX4B => self.config.address_width,
            _ => return,
        };
        if width != self.address_width {
            log::debug!("Switching to {}-byte addresses", width.bytes());
            self.address_width = width;
            self.assembler.set_address_width(width);
        }
    }
}
