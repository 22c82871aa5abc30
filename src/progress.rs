use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

/// Process-wide attempt counter shared by every worker.
///
/// Each `fetch_add` hands out a distinct total, so exactly one caller observes
/// any given multiple of `print_every` and reports it.
#[derive(Debug)]
pub struct ProgressCounter {
    total: AtomicU64,
    print_every: u64,
}

impl ProgressCounter {
    pub fn new(print_every: u64) -> Result<Self> {
        if print_every == 0 {
            return Err(Error::invalid("print_every", "must be positive"));
        }
        Ok(Self {
            total: AtomicU64::new(0),
            print_every,
        })
    }

    #[inline]
    pub fn increment(&self) -> u64 {
        self.total.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Counts one attempt. `report` is set for exactly one caller per
    /// multiple of `print_every`.
    #[inline]
    pub fn tick(&self) -> Tick {
        let total = self.increment();
        Tick {
            total,
            report: total % self.print_every == 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

/// Outcome of one counted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub total: u64,
    pub report: bool,
}
