//! STM engine: the retry loop around transactions
//!
//! `StmEngine::execute` runs a caller-supplied body as one atomic,
//! serializable unit:
//!
//! ```text
//! loop {
//!     txn = Transaction::new(clock.now())
//!     match body(&mut txn).and then txn.commit() {
//!         Ok  => record commit (with failed-attempt count), return
//!         Err => record abort, back off, retry with a fresh txn
//!     }
//! }
//! ```
//!
//! There is no bound on attempts. Up to `yield_threshold` consecutive aborts
//! the engine spins with a bounded exponential backoff; past it, every retry
//! yields the thread first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_utils::Backoff;
use ordmap_core::MetricsSnapshot;
use tracing::{debug, trace};

use crate::cell::VersionedCell;
use crate::clock::GlobalClock;
use crate::metrics::StmMetrics;
use crate::transaction::{Abort, Transaction};

/// Default number of consecutive aborts before retries start yielding
pub const DEFAULT_YIELD_THRESHOLD: u64 = 32;

/// Contention behaviour of the retry loop
///
/// # Example
/// ```
/// use ordmap_concurrency::{RetryPolicy, StmEngine};
///
/// let engine = StmEngine::with_policy(RetryPolicy::new().with_yield_threshold(8));
/// assert_eq!(engine.policy().yield_threshold, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive aborts tolerated with spinning only
    pub yield_threshold: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            yield_threshold: DEFAULT_YIELD_THRESHOLD,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the yield threshold
    pub fn with_yield_threshold(mut self, yield_threshold: u64) -> Self {
        self.yield_threshold = yield_threshold;
        self
    }
}

/// Optimistic transaction engine
///
/// Owns the global clock, the metrics counters, and the cell identity
/// allocator. Cells created by one engine must only be used in transactions
/// of that same engine.
#[derive(Debug)]
pub struct StmEngine {
    clock: GlobalClock,
    metrics: StmMetrics,
    next_cell_id: AtomicU64,
    policy: RetryPolicy,
}

impl Default for StmEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StmEngine {
    /// Create an engine with the default retry policy
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    /// Create an engine with an explicit retry policy
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            clock: GlobalClock::new(0),
            metrics: StmMetrics::new(),
            next_cell_id: AtomicU64::new(1),
            policy,
        }
    }

    /// Retry policy in effect
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Allocate a new empty cell with a fresh identity
    pub fn new_cell<V>(&self) -> VersionedCell<V> {
        VersionedCell::new(self.next_cell_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Current global clock value
    pub fn current_version(&self) -> u64 {
        self.clock.now()
    }

    /// Run `body` atomically, retrying until it commits
    ///
    /// `body` may run many times and must have no side effects outside the
    /// transaction other than building its return value. Returning `Err`
    /// from `body` (normally by propagating a read's `Abort` with `?`)
    /// discards the attempt and retries.
    pub fn execute<V, T, F>(&self, mut body: F) -> T
    where
        V: Clone,
        F: FnMut(&mut Transaction<V>) -> Result<T, Abort>,
    {
        let backoff = Backoff::new();
        let mut failed: u64 = 0;
        loop {
            let mut txn = Transaction::new(self.clock.now());
            let outcome = body(&mut txn).and_then(|value| {
                txn.commit(&self.clock)?;
                Ok(value)
            });

            match outcome {
                Ok(value) => {
                    self.metrics.record_commit(failed);
                    return value;
                }
                Err(abort) => {
                    self.metrics.record_abort();
                    failed += 1;
                    trace!(target: "ordmap::stm", attempt = failed, reason = %abort, "Transaction attempt aborted");
                    self.pause(failed, &backoff);
                }
            }
        }
    }

    fn pause(&self, failed: u64, backoff: &Backoff) {
        if failed <= self.policy.yield_threshold {
            backoff.spin();
            return;
        }
        if failed == self.policy.yield_threshold + 1 {
            debug!(target: "ordmap::stm", attempts = failed, "Contention threshold reached, yielding between retries");
        }
        thread::yield_now();
    }

    /// Current commit/abort/retry counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Zero the counters
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }
}
