//! Shared atomic counters consumed by Stage E's rolling-window report
//! (`original_source/main.py::process_e`). Every stage increments whichever
//! cells describe its own outcomes; nothing here is behind a lock since each
//! cell is written from at most a handful of tasks and read once per sample.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Counters {
    pub certs_received: AtomicU64,
    pub dropped_malformed: AtomicU64,
    pub dropped_validity: AtomicU64,
    pub dropped_ab_full: AtomicU64,
    pub domains_filtered: AtomicU64,
    pub domains_enriched: AtomicU64,
    pub domains_sunk: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and resets a cell in one step, for the per-second sampling in
    /// Stage E (§4.5): each second's count, not the running total.
    pub fn take(cell: &AtomicU64) -> u64 {
        cell.swap(0, Ordering::Relaxed)
    }

    pub fn inc(cell: &AtomicU64) {
        cell.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(cell: &AtomicU64, n: u64) {
        cell.fetch_add(n, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_resets_to_zero() {
        let c = Counters::new();
        Counters::add(&c.certs_received, 5);
        assert_eq!(Counters::take(&c.certs_received), 5);
        assert_eq!(Counters::take(&c.certs_received), 0);
    }
}
