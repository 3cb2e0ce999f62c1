//! Ordered map variants for ordmap
//!
//! This crate implements every variant of the [`OrderedMap`] contract:
//! - StmOrderedMap: skip-list index of versioned cells, operations as STM transactions
//! - GlobalLockOrderedMap: one BTreeMap behind one RwLock
//! - ShardedOrderedMap: hash-sharded BTreeMaps, one RwLock each
//! - SkipListOrderedMap: lock-free `crossbeam-skiplist` map
//! - ExternalStmOrderedMap: `stm` crate TVars behind a skip-list index
//!
//! `MapType` names the variants and builds fresh instances.
//!
//! [`OrderedMap`]: ordmap_core::OrderedMap

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod external_stm;
pub mod global;
pub mod registry;
pub mod sharded;
pub mod skiplist;
pub mod stm_map;

pub use external_stm::ExternalStmOrderedMap;
pub use global::GlobalLockOrderedMap;
pub use registry::MapType;
pub use sharded::{ShardedOrderedMap, DEFAULT_SHARD_COUNT};
pub use skiplist::SkipListOrderedMap;
pub use stm_map::{MapTransaction, StmOrderedMap};
