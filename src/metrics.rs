//! Per-worker throughput cells.
//!
//! Every worker owns one slot of the [`TpsBoard`] and stores its last
//! full-second event count there once per second. The management console
//! reads all cells directly, so a counter query never touches the hot
//! production path; readings lag by at most one second.

use std::sync::atomic::{AtomicU64, Ordering};

/// One atomic "events per second" cell per worker.
#[derive(Debug)]
pub struct TpsBoard {
    cells: Vec<AtomicU64>,
}

impl TpsBoard {
    pub fn new(workers: usize) -> Self {
        Self {
            cells: (0..workers).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Number of worker slots.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Publish a worker's last-second count. Out-of-range ids are ignored.
    pub fn set(&self, worker: usize, value: u64) {
        if let Some(cell) = self.cells.get(worker) {
            cell.store(value, Ordering::Relaxed);
        }
    }

    /// Read every worker cell.
    pub fn snapshot(&self) -> Vec<u64> {
        self.cells
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// Sum of all worker cells.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }
}
