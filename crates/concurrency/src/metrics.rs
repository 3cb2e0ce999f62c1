//! Commit/abort/retry counters for one engine
//!
//! The counters use Relaxed ordering: they are observational, do not
//! synchronize any other memory, and `fetch_add`/`fetch_max` never tear.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;
use ordmap_core::MetricsSnapshot;

/// Monotonic engine counters, reset only by an explicit [`StmMetrics::reset`]
#[derive(Debug, Default)]
pub struct StmMetrics {
    commits: CachePadded<AtomicU64>,
    aborts: CachePadded<AtomicU64>,
    max_retries: CachePadded<AtomicU64>,
}

impl StmMetrics {
    /// Zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful commit preceded by `retries` failed attempts
    pub fn record_commit(&self, retries: u64) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        self.max_retries.fetch_max(retries, Ordering::Relaxed);
    }

    /// Record one aborted attempt
    pub fn record_abort(&self) {
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot::new(
            self.commits.load(Ordering::Relaxed),
            self.aborts.load(Ordering::Relaxed),
            self.max_retries.load(Ordering::Relaxed),
        )
    }

    /// Zero every counter
    pub fn reset(&self) {
        self.commits.store(0, Ordering::Relaxed);
        self.aborts.store(0, Ordering::Relaxed);
        self.max_retries.store(0, Ordering::Relaxed);
    }
}
