//! The map contract shared by every concurrency strategy
//!
//! This trait lets the harness and the test suite drive the STM-backed map,
//! the lock-based baselines, and the external-structure wrappers identically.

use std::collections::BTreeMap;

use crate::metrics::MetricsSnapshot;
use crate::range::KeyRange;

/// Thread-safe ordered map with range query support
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). No operation fails because of
/// contention; conflicts are resolved inside the implementation.
///
/// Lifecycle: a map owns all of its state and releases it on drop, so a map
/// instance is scoped by ownership (typically `Box<dyn OrderedMap<_, _>>`
/// created for one run and dropped at its end).
pub trait OrderedMap<K, V>: Send + Sync {
    /// Current value for `key`, or None if absent
    fn get(&self, key: &K) -> Option<V>;

    /// Store `value` under `key`, returning the previous value
    fn put(&self, key: K, value: V) -> Option<V>;

    /// Remove `key`, returning the previous value
    ///
    /// Removing an absent key is a no-op that returns None.
    fn remove(&self, key: &K) -> Option<V>;

    /// Detached, ordered copy of every present key inside `range`
    ///
    /// The result is owned by the caller and never observes later writes.
    fn range_query(&self, range: KeyRange<'_, K>) -> BTreeMap<K, V>;

    /// Number of present keys
    fn size(&self) -> usize;

    /// Remove every observable value
    fn clear(&self);

    /// Transactional counters, empty for non-transactional variants
    fn snapshot_metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::empty()
    }
}
