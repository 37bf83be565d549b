//! Upstream bus events
//!
//! Two kinds of producers feed the analyzer: an SPI byte decoder that
//! reports chip-select edges and complete bytes, and a 16-line parallel
//! sampler that reports one sample per clock edge.

use crate::error::{Error, Result};

/// Capture timestamp in nanoseconds
pub type Timestamp = u64;

/// One unit of upstream input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusEvent {
    /// Chip-select asserted
    Enable {
        /// Time of the falling CS edge
        time: Timestamp,
    },
    /// One byte clocked on both data lines
    Byte {
        /// First clock edge of the byte
        start: Timestamp,
        /// Last clock edge of the byte
        end: Timestamp,
        /// Byte driven by the host
        mosi: u8,
        /// Byte driven by the flash
        miso: u8,
    },
    /// Chip-select de-asserted
    Disable {
        /// Time of the rising CS edge
        time: Timestamp,
    },
    /// One clock edge of the parallel sampler
    Sample {
        /// Time of the clock edge
        time: Timestamp,
        /// State of lines D0..D15
        value: u16,
    },
}

impl BusEvent {
    /// Time the event starts at
    pub fn time(&self) -> Timestamp {
        match *self {
            Self::Enable { time } | Self::Disable { time } | Self::Sample { time, .. } => time,
            Self::Byte { start, .. } => start,
        }
    }
}

/// Assignment of SPI signals to parallel sampler lines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineRoles {
    /// MOSI / IO0
    pub io0: u8,
    /// MISO / IO1
    pub io1: u8,
    /// WP# / IO2
    pub io2: u8,
    /// HOLD# / IO3
    pub io3: u8,
    /// Chip-select line, if it was sampled at all
    pub cs: Option<u8>,
}

impl Default for LineRoles {
    fn default() -> Self {
        Self {
            io0: 0,
            io1: 1,
            io2: 2,
            io3: 3,
            cs: Some(15),
        }
    }
}

impl LineRoles {
    /// Number of lines the parallel sampler provides
    pub const LINES: u8 = 16;

    /// Check that every role points at an existing line
    pub fn validate(&self) -> Result<()> {
        let lines = [self.io0, self.io1, self.io2, self.io3];
        match lines
            .into_iter()
            .chain(self.cs)
            .find(|&line| line >= Self::LINES)
        {
            Some(line) => Err(Error::InvalidLineRole(line)),
            None => Ok(()),
        }
    }

    fn line(value: u16, line: u8) -> u8 {
        (value.checked_shr(line as u32).unwrap_or(0) & 1) as u8
    }

    /// MOSI bit of a sample
    pub fn mosi(&self, value: u16) -> u8 {
        Self::line(value, self.io0)
    }

    /// MISO bit of a sample
    pub fn miso(&self, value: u16) -> u8 {
        Self::line(value, self.io1)
    }

    /// Returns true if chip-select is sampled and high (inactive)
    pub fn cs_high(&self, value: u16) -> bool {
        self.cs.is_some_and(|cs| Self::line(value, cs) == 1)
    }

    /// Bits carried by the first `lines` IO lines, IO0 as the lowest bit
    pub fn io_bits(&self, value: u16, lines: u8) -> u8 {
        [self.io0, self.io1, self.io2, self.io3]
            .into_iter()
            .take(lines as usize)
            .enumerate()
            .fold(0, |acc, (bit, line)| acc | Self::line(value, line) << bit)
    }
}
