//! Benchmark harness for ordmap
//!
//! Drives every map variant through timed multi-threaded workloads:
//! - BenchmarkConfig: defaults, JSON config file, validation
//! - WorkloadProfile: operation mixes (read-heavy, write-heavy, mixed, range-heavy)
//! - BenchmarkRunner: seeding, warm-up, measurement, metrics diff
//! - LatencyStats: mean and interpolated percentiles
//! - BenchmarkResult: summary table, CSV and JSON reports

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod latency;
pub mod report;
pub mod runner;
pub mod workload;

pub use config::{parse_duration, parse_thread_counts, BenchmarkConfig, BenchmarkConfigBuilder, ConfigFile};
pub use latency::LatencyStats;
pub use report::{BenchmarkResult, RunResult, CSV_HEADER};
pub use runner::BenchmarkRunner;
pub use workload::{OperationType, WorkloadProfile};
