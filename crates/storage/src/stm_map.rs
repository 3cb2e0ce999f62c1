//! Ordered map on top of the custom STM engine
//!
//! # Design
//!
//! - Sorted index: `crossbeam-skiplist` map from key to `Arc<VersionedCell>`,
//!   readable concurrently and traversable by range
//! - Every map operation is one engine transaction over the cells
//! - Cells are created lazily by an atomic insert-if-absent on the index and
//!   are never removed while the map lives; removal writes the absence marker
//!
//! Creating a cell is not transactional. That is sound: before creation no
//! committed value exists for the key, and a fresh cell reads as absent at
//! version 0.
//!
//! # clear()
//!
//! `clear` wipes every value in one transaction, then (outside any
//! transaction) drops all index entries and resets the engine counters.
//! The second step is not linearizable with concurrent operations: a
//! concurrent `put` that already holds a dropped cell may commit into it
//! and be lost.

use std::collections::BTreeMap;
use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use ordmap_concurrency::{Abort, RetryPolicy, StmEngine, Transaction, VersionedCell};
use ordmap_core::{KeyRange, MetricsSnapshot, OrderedMap};
use tracing::debug;

/// Ordered map whose operations are STM transactions
pub struct StmOrderedMap<K, V> {
    engine: StmEngine,
    index: SkipMap<K, Arc<VersionedCell<V>>>,
}

impl<K, V> Default for StmOrderedMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> StmOrderedMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty map with the default retry policy
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    /// Create an empty map with an explicit retry policy
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            engine: StmEngine::with_policy(policy),
            index: SkipMap::new(),
        }
    }

    /// The engine driving this map
    pub fn engine(&self) -> &StmEngine {
        &self.engine
    }

    /// Run a multi-key body as one atomic transaction
    ///
    /// The body may run several times; it sees a consistent snapshot and its
    /// writes become visible all at once.
    ///
    /// # Example
    ///
    /// ```
    /// use ordmap_storage::StmOrderedMap;
    /// use ordmap_core::OrderedMap;
    ///
    /// let map: StmOrderedMap<&'static str, i64> = StmOrderedMap::new();
    /// map.put("alice", 100);
    /// map.atomically(|tx| {
    ///     let balance = tx.get(&"alice")?.unwrap_or(0);
    ///     tx.put("alice", balance - 30)?;
    ///     tx.put("bob", 30)?;
    ///     Ok(())
    /// });
    /// assert_eq!(map.get(&"bob"), Some(30));
    /// ```
    pub fn atomically<T, F>(&self, mut body: F) -> T
    where
        F: FnMut(&mut MapTransaction<'_, K, V>) -> Result<T, Abort>,
    {
        self.engine.execute(|txn| {
            let mut tx = MapTransaction { map: self, txn };
            body(&mut tx)
        })
    }

    /// Number of cells in the index, including cells holding the absence marker
    pub fn cell_count(&self) -> usize {
        self.index.len()
    }

    fn cell(&self, key: &K) -> Option<Arc<VersionedCell<V>>> {
        self.index.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn cell_or_create(&self, key: &K) -> Arc<VersionedCell<V>> {
        if let Some(cell) = self.cell(key) {
            return cell;
        }
        let entry = self
            .index
            .get_or_insert_with(key.clone(), || Arc::new(self.engine.new_cell()));
        Arc::clone(entry.value())
    }
}

/// Key-level view of one engine transaction over a [`StmOrderedMap`]
pub struct MapTransaction<'a, K, V> {
    map: &'a StmOrderedMap<K, V>,
    txn: &'a mut Transaction<V>,
}

impl<K, V> MapTransaction<'_, K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Read `key` as of this transaction
    pub fn get(&mut self, key: &K) -> Result<Option<V>, Abort> {
        match self.map.cell(key) {
            Some(cell) => self.txn.read(&cell),
            None => Ok(None),
        }
    }

    /// Buffer `key -> value`, returning the previous value
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, Abort> {
        let cell = self.map.cell_or_create(&key);
        let previous = self.txn.read(&cell)?;
        self.txn.write(&cell, Some(value));
        Ok(previous)
    }

    /// Buffer the absence marker for `key`, returning the previous value
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, Abort> {
        let Some(cell) = self.map.cell(key) else {
            return Ok(None);
        };
        let previous = self.txn.read(&cell)?;
        if previous.is_some() {
            self.txn.write(&cell, None);
        }
        Ok(previous)
    }

    /// Start version of the underlying transaction
    pub fn start_version(&self) -> u64 {
        self.txn.start_version()
    }
}

impl<K, V> OrderedMap<K, V> for StmOrderedMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        self.atomically(|tx| tx.get(key))
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        self.atomically(|tx| tx.put(key.clone(), value.clone()))
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.atomically(|tx| tx.remove(key))
    }

    fn range_query(&self, range: KeyRange<'_, K>) -> BTreeMap<K, V> {
        if range.is_empty() {
            return BTreeMap::new();
        }
        self.engine.execute(|txn| {
            let mut snapshot = BTreeMap::new();
            for entry in self.index.range::<K, _>(range.bounds()) {
                if let Some(value) = txn.read(entry.value())? {
                    snapshot.insert(entry.key().clone(), value);
                }
            }
            Ok(snapshot)
        })
    }

    fn size(&self) -> usize {
        self.engine.execute(|txn| {
            let mut count = 0;
            for entry in self.index.iter() {
                if txn.read(entry.value())?.is_some() {
                    count += 1;
                }
            }
            Ok(count)
        })
    }

    fn clear(&self) {
        self.engine.execute(|txn| {
            for entry in self.index.iter() {
                txn.write(entry.value(), None);
            }
            Ok(())
        });
        let dropped = self.index.len();
        self.index.clear();
        self.engine.reset_metrics();
        debug!(target: "ordmap::stm", cells = dropped, "Cleared map, index dropped and metrics reset");
    }

    fn snapshot_metrics(&self) -> MetricsSnapshot {
        self.engine.metrics()
    }
}
