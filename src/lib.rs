//! ordmap - Concurrent ordered maps with software transactional memory
//!
//! ordmap provides one ordered key-value contract ([`OrderedMap`]) and
//! several implementations of it, so a custom optimistic STM engine can be
//! compared against conventional synchronization:
//!
//! - [`StmOrderedMap`]: every operation is a transaction over versioned cells
//! - [`GlobalLockOrderedMap`]: one reader-writer lock
//! - [`ShardedOrderedMap`]: hash-sharded locks
//! - [`SkipListOrderedMap`]: lock-free skip list
//! - [`ExternalStmOrderedMap`]: third-party STM runtime
//!
//! # Quick Start
//!
//! ```
//! use ordmap::{KeyRange, OrderedMap, StmOrderedMap};
//!
//! let map = StmOrderedMap::new();
//! for k in 0..10u64 {
//!     map.put(k, k * 10);
//! }
//! let hits = map.range_query(KeyRange::inclusive(&3, &6));
//! assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![(3, 30), (4, 40), (5, 50), (6, 60)]);
//! ```
//!
//! # Architecture
//!
//! - `ordmap-core`: contract, range bounds, metrics snapshot, errors
//! - `ordmap-concurrency`: the STM engine
//! - `ordmap-storage`: the map variants and the [`MapType`] registry
//! - `ordmap-harness`: workload runner and reports

pub use ordmap_core::{Error, KeyRange, MetricsSnapshot, OrderedMap, Result};
pub use ordmap_storage::{
    ExternalStmOrderedMap, GlobalLockOrderedMap, MapTransaction, MapType, ShardedOrderedMap,
    SkipListOrderedMap, StmOrderedMap,
};

/// The STM engine used by [`StmOrderedMap`]
pub mod stm {
    pub use ordmap_concurrency::*;
}

/// Benchmark harness
pub mod harness {
    pub use ordmap_harness::*;
}
