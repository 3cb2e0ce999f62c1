//! Coarse-lock baseline: one BTreeMap behind one reader-writer lock
//!
//! Every operation takes the single lock; readers share it, writers hold it
//! exclusively. Operations are trivially linearizable.

use std::collections::BTreeMap;

use ordmap_core::{KeyRange, OrderedMap};
use parking_lot::RwLock;

/// Ordered map guarded by a single `parking_lot::RwLock`
#[derive(Debug)]
pub struct GlobalLockOrderedMap<K, V> {
    data: RwLock<BTreeMap<K, V>>,
}

impl<K: Ord, V> Default for GlobalLockOrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> GlobalLockOrderedMap<K, V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<K, V> OrderedMap<K, V> for GlobalLockOrderedMap<K, V>
where
    K: Ord + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        self.data.write().insert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.data.write().remove(key)
    }

    fn range_query(&self, range: KeyRange<'_, K>) -> BTreeMap<K, V> {
        if range.is_empty() {
            return BTreeMap::new();
        }
        let data = self.data.read();
        data.range::<K, _>(range.bounds())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn size(&self) -> usize {
        self.data.read().len()
    }

    fn clear(&self) {
        self.data.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let map = GlobalLockOrderedMap::new();
        assert_eq!(map.put(2u32, "b"), None);
        assert_eq!(map.put(1, "a"), None);
        assert_eq!(map.put(2, "bb"), Some("b"));
        assert_eq!(map.get(&2), Some("bb"));
        assert_eq!(map.size(), 2);
        assert_eq!(map.remove(&1), Some("a"));
        assert_eq!(map.remove(&1), None);
        assert_eq!(map.size(), 1);
    }

    #[test]
    fn test_range_exclusive_bounds() {
        let map = GlobalLockOrderedMap::new();
        for k in 0..10u32 {
            map.put(k, k);
        }
        let range = map.range_query(KeyRange::new(Some(&2), false, Some(&5), false));
        assert_eq!(range.keys().copied().collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_degenerate_range_does_not_panic() {
        let map = GlobalLockOrderedMap::new();
        map.put(4u32, 4u32);
        assert!(map.range_query(KeyRange::new(Some(&4), false, Some(&4), false)).is_empty());
        assert!(map.range_query(KeyRange::inclusive(&9, &1)).is_empty());
        assert_eq!(map.range_query(KeyRange::inclusive(&4, &4)).len(), 1);
    }

    #[test]
    fn test_clear() {
        let map = GlobalLockOrderedMap::new();
        map.put(1u8, 1u8);
        map.clear();
        assert_eq!(map.size(), 0);
        assert_eq!(map.snapshot_metrics().commits, 0);
    }
}
