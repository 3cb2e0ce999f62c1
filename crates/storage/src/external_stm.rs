//! Ordered map on a third-party STM runtime (`stm` crate)
//!
//! Mirrors [`crate::StmOrderedMap`]: a skip-list index from key to a
//! transactional variable holding `Option<V>`, with every operation run
//! under `stm::atomically`. The runtime exposes no commit/abort counters,
//! so this map reports empty metrics.

use std::collections::BTreeMap;

use crossbeam_skiplist::SkipMap;
use ordmap_core::{KeyRange, OrderedMap};
use stm::{atomically, TVar};

/// Ordered map whose cells are `stm::TVar`s
pub struct ExternalStmOrderedMap<K, V> {
    index: SkipMap<K, TVar<Option<V>>>,
}

impl<K, V> Default for ExternalStmOrderedMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ExternalStmOrderedMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            index: SkipMap::new(),
        }
    }

    fn var(&self, key: &K) -> Option<TVar<Option<V>>> {
        self.index.get(key).map(|entry| entry.value().clone())
    }

    fn var_or_create(&self, key: &K) -> TVar<Option<V>> {
        if let Some(var) = self.var(key) {
            return var;
        }
        self.index
            .get_or_insert_with(key.clone(), || TVar::new(None))
            .value()
            .clone()
    }
}

impl<K, V> OrderedMap<K, V> for ExternalStmOrderedMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        let var = self.var(key)?;
        atomically(|tx| var.read(tx))
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        let var = self.var_or_create(&key);
        atomically(|tx| {
            let previous = var.read(tx)?;
            var.write(tx, Some(value.clone()))?;
            Ok(previous)
        })
    }

    fn remove(&self, key: &K) -> Option<V> {
        let var = self.var(key)?;
        atomically(|tx| {
            let previous = var.read(tx)?;
            if previous.is_some() {
                var.write(tx, None)?;
            }
            Ok(previous)
        })
    }

    fn range_query(&self, range: KeyRange<'_, K>) -> BTreeMap<K, V> {
        if range.is_empty() {
            return BTreeMap::new();
        }
        let vars: Vec<(K, TVar<Option<V>>)> = self
            .index
            .range::<K, _>(range.bounds())
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        atomically(|tx| {
            let mut snapshot = BTreeMap::new();
            for (key, var) in &vars {
                if let Some(value) = var.read(tx)? {
                    snapshot.insert(key.clone(), value);
                }
            }
            Ok(snapshot)
        })
    }

    fn size(&self) -> usize {
        let vars: Vec<TVar<Option<V>>> = self.index.iter().map(|entry| entry.value().clone()).collect();
        atomically(|tx| {
            let mut count = 0;
            for var in &vars {
                if var.read(tx)?.is_some() {
                    count += 1;
                }
            }
            Ok(count)
        })
    }

    fn clear(&self) {
        let vars: Vec<TVar<Option<V>>> = self.index.iter().map(|entry| entry.value().clone()).collect();
        atomically(|tx| {
            for var in &vars {
                var.write(tx, None)?;
            }
            Ok(())
        });
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_remove() {
        let map = ExternalStmOrderedMap::new();
        assert_eq!(map.put(1u64, 10u64), None);
        assert_eq!(map.put(1, 11), Some(10));
        assert_eq!(map.get(&1), Some(11));
        assert_eq!(map.remove(&1), Some(11));
        assert_eq!(map.remove(&1), None);
        assert_eq!(map.get(&1), None);
        assert_eq!(map.size(), 0);
    }

    #[test]
    fn test_range_and_clear() {
        let map = ExternalStmOrderedMap::new();
        for k in 0..10u64 {
            map.put(k, k * 10);
        }
        let range = map.range_query(KeyRange::inclusive(&3, &6));
        assert_eq!(range.into_iter().collect::<Vec<_>>(), vec![(3, 30), (4, 40), (5, 50), (6, 60)]);
        map.clear();
        assert_eq!(map.size(), 0);
        assert!(map.snapshot_metrics().commits == 0);
    }
}
