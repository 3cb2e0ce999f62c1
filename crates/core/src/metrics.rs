//! Metrics snapshot exposed through the map contract

use serde::{Deserialize, Serialize};

/// Immutable snapshot of the transactional counters of a map
///
/// Lock-based variants have no transactions and report [`MetricsSnapshot::empty`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Successful commits
    pub commits: u64,
    /// Aborted attempts
    pub aborts: u64,
    /// Largest number of failed attempts preceding one successful operation
    pub max_retries: u64,
}

impl MetricsSnapshot {
    /// Create a snapshot from raw counters
    pub const fn new(commits: u64, aborts: u64, max_retries: u64) -> Self {
        Self {
            commits,
            aborts,
            max_retries,
        }
    }

    /// All-zero snapshot
    pub const fn empty() -> Self {
        Self::new(0, 0, 0)
    }

    /// Difference against an earlier snapshot
    ///
    /// Commits and aborts are subtracted pairwise; `max_retries` is the
    /// maximum of both since it is a high-water mark, not a counter.
    /// Subtraction saturates: a `clear()` between the two snapshots resets
    /// the counters and must not underflow.
    pub fn diff(&self, baseline: &MetricsSnapshot) -> MetricsSnapshot {
        MetricsSnapshot {
            commits: self.commits.saturating_sub(baseline.commits),
            aborts: self.aborts.saturating_sub(baseline.aborts),
            max_retries: self.max_retries.max(baseline.max_retries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_subtracts_counters_and_keeps_max() {
        let baseline = MetricsSnapshot::new(10, 4, 7);
        let later = MetricsSnapshot::new(25, 9, 3);
        let diff = later.diff(&baseline);
        assert_eq!(diff, MetricsSnapshot::new(15, 5, 7));
    }

    #[test]
    fn test_diff_against_empty_is_identity() {
        let m = MetricsSnapshot::new(3, 2, 1);
        assert_eq!(m.diff(&MetricsSnapshot::empty()), m);
    }

    #[test]
    fn test_diff_saturates_after_reset() {
        let baseline = MetricsSnapshot::new(100, 50, 2);
        let after_clear = MetricsSnapshot::new(1, 0, 0);
        let diff = after_clear.diff(&baseline);
        assert_eq!(diff.commits, 0);
        assert_eq!(diff.aborts, 0);
        assert_eq!(diff.max_retries, 2);
    }
}
