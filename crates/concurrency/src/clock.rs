//! Global version clock
//!
//! One monotonically increasing counter per engine. It advances exactly once
//! per committing write transaction; read-only transactions never touch it.
//! Every cell version is at most the current clock value.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// Shared commit-version counter
#[derive(Debug, Default)]
pub struct GlobalClock {
    version: CachePadded<AtomicU64>,
}

impl GlobalClock {
    /// Create a clock starting at `initial_version`
    pub fn new(initial_version: u64) -> Self {
        Self {
            version: CachePadded::new(AtomicU64::new(initial_version)),
        }
    }

    /// Current clock value (used as a transaction's start version)
    #[inline]
    pub fn now(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Allocate the next commit version
    #[inline]
    pub(crate) fn advance(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }
}
