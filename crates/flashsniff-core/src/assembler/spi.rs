//! Direct SPI assembly
//!
//! The upstream SPI decoder reports chip-select edges, so boundaries are
//! explicit: `Enable` opens a transaction and `Disable` closes it.

use super::{Assembler, Transaction};
use crate::event::BusEvent;

/// Assembler for byte events with explicit chip-select edges
#[derive(Debug, Default)]
pub struct SpiAssembler {
    open: Option<Transaction>,
}

impl SpiAssembler {
    /// Create an assembler with no open transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a transaction is being collected
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn close(&mut self) -> Option<Transaction> {
        let tx = self.open.take()?;
        if tx.is_empty() {
            log::trace!("Dropping empty transaction at {} ns", tx.start);
            return None;
        }
        Some(tx)
    }
}

impl Assembler for SpiAssembler {
    fn ingest(&mut self, event: &BusEvent) -> Option<Transaction> {
        match *event {
            BusEvent::Enable { time } => {
                // A missing Disable must not merge two transactions
                let closed = self.close();
                self.open = Some(Transaction::new(time));
                closed
            }
            BusEvent::Byte {
                start,
                end,
                mosi,
                miso,
            } => {
                let tx = self.open.get_or_insert_with(|| {
                    log::warn!(
                        "Byte at {} ns outside of chip-select, starting a transaction",
                        start
                    );
                    Transaction::new(start)
                });
                tx.push(mosi, miso, end);
                None
            }
            BusEvent::Disable { time } => {
                if let Some(tx) = self.open.as_mut() {
                    tx.end = tx.end.max(time);
                }
                self.close()
            }
            BusEvent::Sample { time, .. } => {
                log::trace!("Ignoring parallel sample at {} ns in SPI mode", time);
                None
            }
        }
    }

    fn flush(&mut self) -> Option<Transaction> {
        self.close()
    }
}
