//! Software transactional memory for ordmap
//!
//! This crate implements the optimistic concurrency engine behind the
//! STM-backed ordered map:
//! - VersionedCell: value + version stamp + transient commit lock
//! - GlobalClock: commit-version counter advanced once per write commit
//! - Transaction: per-attempt read/write sets, read-your-writes, commit
//! - Validation: read-set re-check before effects become visible
//! - StmEngine: unbounded retry loop with backoff and metrics
//!
//! Commit takes cell locks in ascending cell-identity order, independent of
//! key order, which rules out deadlock between overlapping write-sets.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod clock;
pub mod manager;
pub mod metrics;
pub mod transaction;
pub mod validation;

pub use cell::{CellId, VersionedCell};
pub use clock::GlobalClock;
pub use manager::{RetryPolicy, StmEngine, DEFAULT_YIELD_THRESHOLD};
pub use metrics::StmMetrics;
pub use transaction::{Abort, Transaction};
pub use validation::ConflictType;
