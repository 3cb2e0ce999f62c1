//! Core types and traits for ordmap
//!
//! This crate defines the foundational types shared by every map variant
//! and by the workload harness:
//! - OrderedMap: the uniform map contract implemented by each concurrency strategy
//! - MetricsSnapshot: commit/abort/retry counters exposed by a map
//! - KeyRange: bound handling for range queries
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod metrics;
pub mod range;
pub mod traits;

pub use error::{Error, Result};
pub use metrics::MetricsSnapshot;
pub use range::KeyRange;
pub use traits::OrderedMap;
