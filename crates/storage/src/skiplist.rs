//! Baseline over `crossbeam_skiplist::SkipMap`
//!
//! The skip list itself is lock-free. Each entry holds a
//! `parking_lot::Mutex<Option<V>>` slot, so the read-and-replace in `put`
//! and the take in `remove` are atomic per key. Entries are created on the
//! first `put` and stay in the list; removal empties the slot. Ranges and
//! `size` are weakly consistent: they see each key at some point during the
//! traversal, not one instant.

use std::collections::BTreeMap;
use std::mem;

use crossbeam_skiplist::SkipMap;
use ordmap_core::{KeyRange, OrderedMap};
use parking_lot::Mutex;

/// Ordered map backed by a concurrent skip list
pub struct SkipListOrderedMap<K, V> {
    map: SkipMap<K, Mutex<Option<V>>>,
}

impl<K, V> Default for SkipListOrderedMap<K, V>
where
    K: Ord + Send + 'static,
    V: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SkipListOrderedMap<K, V>
where
    K: Ord + Send + 'static,
    V: Send + 'static,
{
    /// Create an empty map
    pub fn new() -> Self {
        Self { map: SkipMap::new() }
    }

    /// Number of entries in the list, including emptied slots
    pub fn slot_count(&self) -> usize {
        self.map.len()
    }
}

impl<K, V> OrderedMap<K, V> for SkipListOrderedMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).and_then(|entry| entry.value().lock().clone())
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        let entry = self.map.get_or_insert_with(key, || Mutex::new(None));
        let mut slot = entry.value().lock();
        mem::replace(&mut *slot, Some(value))
    }

    fn remove(&self, key: &K) -> Option<V> {
        let entry = self.map.get(key)?;
        let mut slot = entry.value().lock();
        slot.take()
    }

    fn range_query(&self, range: KeyRange<'_, K>) -> BTreeMap<K, V> {
        if range.is_empty() {
            return BTreeMap::new();
        }
        self.map
            .range::<K, _>(range.bounds())
            .filter_map(|entry| {
                let value = entry.value().lock().clone()?;
                Some((entry.key().clone(), value))
            })
            .collect()
    }

    fn size(&self) -> usize {
        self.map
            .iter()
            .filter(|entry| entry.value().lock().is_some())
            .count()
    }

    fn clear(&self) {
        for entry in self.map.iter() {
            entry.value().lock().take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_put_get_remove() {
        let map = SkipListOrderedMap::new();
        assert_eq!(map.put(3u64, 30u64), None);
        assert_eq!(map.put(3, 31), Some(30));
        assert_eq!(map.get(&3), Some(31));
        assert_eq!(map.remove(&3), Some(31));
        assert_eq!(map.remove(&3), None);
        assert_eq!(map.get(&3), None);
        assert_eq!(map.size(), 0);
        assert_eq!(map.slot_count(), 1, "removal empties the slot only");
    }

    #[test]
    fn test_range_skips_empty_slots() {
        let map = SkipListOrderedMap::new();
        for k in [9u64, 1, 5, 3, 7] {
            map.put(k, k);
        }
        map.remove(&5);
        let keys: Vec<_> = map.range_query(KeyRange::starting_at(&3, true)).into_keys().collect();
        assert_eq!(keys, vec![3, 7, 9]);
        assert_eq!(map.size(), 4);
    }

    #[test]
    fn test_clear_empties_every_slot() {
        let map = SkipListOrderedMap::new();
        for k in 0..5u64 {
            map.put(k, k);
        }
        map.clear();
        assert_eq!(map.size(), 0);
        assert_eq!(map.put(2, 20), None);
        assert_eq!(map.get(&2), Some(20));
    }

    #[test]
    fn test_racing_puts_each_see_a_distinct_previous_value() {
        let map = Arc::new(SkipListOrderedMap::<u64, u64>::new());
        let handles: Vec<_> = (0..4u64)
            .map(|worker| {
                let map = Arc::clone(&map);
                thread::spawn(move || {
                    (0..5_000u64)
                        .filter_map(|i| map.put(0, worker * 1_000_000 + i))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        seen.extend(map.get(&0));
        assert_eq!(seen.len(), 20_000);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 20_000, "a previous value was reported twice");
    }
}
