//! Map variant registry
//!
//! Resolves the identifiers used on the command line and in reports to a
//! concrete map variant, and constructs fresh instances for benchmark runs.
//!
//! ```
//! use ordmap_storage::MapType;
//!
//! let types = MapType::parse_list("stm, Global").unwrap();
//! assert_eq!(types, vec![MapType::Stm, MapType::Global]);
//! let map = types[0].create();
//! map.put(1, 10);
//! assert_eq!(map.get(&1), Some(10));
//! ```

use std::fmt;
use std::str::FromStr;

use ordmap_core::{Error, OrderedMap, Result};
use serde::{Deserialize, Serialize};

use crate::{
    ExternalStmOrderedMap, GlobalLockOrderedMap, ShardedOrderedMap, SkipListOrderedMap,
    StmOrderedMap,
};

/// Benchmarked map variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapType {
    /// Single reader-writer lock over a BTreeMap
    #[serde(rename = "global")]
    Global,
    /// Hash-sharded BTreeMaps, one lock per shard
    #[serde(rename = "sharded")]
    Sharded,
    /// Lock-free skip list
    #[serde(rename = "skiplist")]
    SkipList,
    /// Custom STM engine
    #[serde(rename = "stm")]
    Stm,
    /// Third-party STM runtime
    #[serde(rename = "ext-stm")]
    ExternalStm,
}

impl MapType {
    /// Every variant, in report order
    pub fn all() -> Vec<MapType> {
        vec![
            MapType::Global,
            MapType::Sharded,
            MapType::SkipList,
            MapType::Stm,
            MapType::ExternalStm,
        ]
    }

    /// Stable identifier
    pub fn id(&self) -> &'static str {
        match self {
            MapType::Global => "global",
            MapType::Sharded => "sharded",
            MapType::SkipList => "skiplist",
            MapType::Stm => "stm",
            MapType::ExternalStm => "ext-stm",
        }
    }

    /// Parse an identifier, ignoring case and surrounding whitespace
    pub fn from_id(id: &str) -> Result<MapType> {
        let wanted = id.trim();
        MapType::all()
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownMapType(wanted.to_string()))
    }

    /// Parse a comma-separated list; empty segments are skipped
    pub fn parse_list(list: &str) -> Result<Vec<MapType>> {
        list.split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(MapType::from_id)
            .collect()
    }

    /// Construct a fresh, empty instance of this variant
    pub fn create(&self) -> Box<dyn OrderedMap<u64, u64>> {
        match self {
            MapType::Global => Box::new(GlobalLockOrderedMap::new()),
            MapType::Sharded => Box::new(ShardedOrderedMap::with_default_shards()),
            MapType::SkipList => Box::new(SkipListOrderedMap::new()),
            MapType::Stm => Box::new(StmOrderedMap::new()),
            MapType::ExternalStm => Box::new(ExternalStmOrderedMap::new()),
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MapType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MapType::from_id(s)
    }
}
