//! Hash-sharded baseline
//!
//! Keys are spread over a power-of-two number of shards, each a BTreeMap
//! behind its own `parking_lot::RwLock`. Single-key operations lock one
//! shard. Whole-map operations (range, size, clear) lock every shard in
//! ascending index order and release in reverse, so they see one consistent
//! state of the map and cannot deadlock with each other.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use ordmap_core::{Error, KeyRange, OrderedMap, Result};
use parking_lot::RwLock;
use rustc_hash::FxHasher;

/// Default number of shards
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// Ordered map split across independently locked shards
#[derive(Debug)]
pub struct ShardedOrderedMap<K, V> {
    shards: Box<[RwLock<BTreeMap<K, V>>]>,
    mask: usize,
}

impl<K: Ord + Hash, V> ShardedOrderedMap<K, V> {
    /// Create a map with `shard_count` shards
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShardCount`] unless `shard_count` is a
    /// non-zero power of two.
    pub fn new(shard_count: usize) -> Result<Self> {
        if !shard_count.is_power_of_two() {
            return Err(Error::InvalidShardCount(shard_count));
        }
        Ok(Self::build(shard_count))
    }

    /// Create a map with [`DEFAULT_SHARD_COUNT`] shards
    pub fn with_default_shards() -> Self {
        Self::build(DEFAULT_SHARD_COUNT)
    }

    /// `shard_count` must already be a power of two
    fn build(shard_count: usize) -> Self {
        let shards = (0..shard_count)
            .map(|_| RwLock::new(BTreeMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            mask: shard_count - 1,
        }
    }

    /// Number of shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Shard index owning `key`
    pub fn shard_index(&self, key: &K) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        (smear(hasher.finish()) as usize) & self.mask
    }

    fn shard(&self, key: &K) -> &RwLock<BTreeMap<K, V>> {
        &self.shards[self.shard_index(key)]
    }
}

impl<K: Ord + Hash, V> Default for ShardedOrderedMap<K, V> {
    fn default() -> Self {
        Self::with_default_shards()
    }
}

/// Spread high bits into the low bits used by the shard mask
fn smear(hash: u64) -> u64 {
    let h = hash ^ (hash >> 20) ^ (hash >> 12);
    h ^ (h >> 7) ^ (h >> 4)
}

impl<K, V> OrderedMap<K, V> for ShardedOrderedMap<K, V>
where
    K: Ord + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        self.shard(key).read().get(key).cloned()
    }

    fn put(&self, key: K, value: V) -> Option<V> {
        self.shard(&key).write().insert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.shard(key).write().remove(key)
    }

    fn range_query(&self, range: KeyRange<'_, K>) -> BTreeMap<K, V> {
        if range.is_empty() {
            return BTreeMap::new();
        }
        let mut guards: Vec<_> = self.shards.iter().map(|shard| shard.read()).collect();
        let mut merged = BTreeMap::new();
        for guard in &guards {
            merged.extend(
                guard
                    .range::<K, _>(range.bounds())
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        while let Some(guard) = guards.pop() {
            drop(guard);
        }
        merged
    }

    fn size(&self) -> usize {
        let mut guards: Vec<_> = self.shards.iter().map(|shard| shard.read()).collect();
        let total = guards.iter().map(|guard| guard.len()).sum();
        while let Some(guard) = guards.pop() {
            drop(guard);
        }
        total
    }

    fn clear(&self) {
        let mut guards: Vec<_> = self.shards.iter().map(|shard| shard.write()).collect();
        for guard in guards.iter_mut() {
            guard.clear();
        }
        while let Some(guard) = guards.pop() {
            drop(guard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(matches!(
            ShardedOrderedMap::<u64, u64>::new(12),
            Err(Error::InvalidShardCount(12))
        ));
        assert!(matches!(
            ShardedOrderedMap::<u64, u64>::new(0),
            Err(Error::InvalidShardCount(0))
        ));
        assert_eq!(ShardedOrderedMap::<u64, u64>::new(1).unwrap().shard_count(), 1);
        assert_eq!(ShardedOrderedMap::<u64, u64>::default().shard_count(), DEFAULT_SHARD_COUNT);
    }

    #[test]
    fn test_shard_index_is_stable_and_in_bounds() {
        let map = ShardedOrderedMap::<u64, u64>::new(8).unwrap();
        for k in 0..1000u64 {
            let idx = map.shard_index(&k);
            assert!(idx < 8);
            assert_eq!(idx, map.shard_index(&k));
        }
    }

    #[test]
    fn test_sequential_keys_use_many_shards() {
        let map = ShardedOrderedMap::<u64, u64>::new(16).unwrap();
        let used: std::collections::HashSet<usize> = (0..256u64).map(|k| map.shard_index(&k)).collect();
        assert!(used.len() > 8, "only {} shards used", used.len());
    }

    #[test]
    fn test_range_merges_across_shards() {
        let map = ShardedOrderedMap::new(4).unwrap();
        for k in 0..100u64 {
            map.put(k, k * 10);
        }
        let range = map.range_query(KeyRange::inclusive(&10, &19));
        assert_eq!(range.len(), 10);
        assert_eq!(range.keys().copied().collect::<Vec<_>>(), (10..20).collect::<Vec<_>>());
        assert_eq!(range[&15], 150);
        assert_eq!(map.size(), 100);
        map.clear();
        assert_eq!(map.size(), 0);
    }
}
