//! Benchmark configuration
//!
//! Values are layered in order: builder defaults, an optional JSON config
//! file, then explicit overrides (normally command-line flags). `build()`
//! validates the final combination once.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use ordmap_harness::{BenchmarkConfig, WorkloadProfile};
//! use ordmap_storage::MapType;
//!
//! let config = BenchmarkConfig::builder()
//!     .with_map_types(vec![MapType::Stm])
//!     .with_workloads(vec![WorkloadProfile::Mixed])
//!     .with_thread_counts(vec![2])
//!     .with_run_duration(Duration::from_millis(100))
//!     .build()
//!     .unwrap();
//! assert_eq!(config.key_space, 65_536);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ordmap_core::{Error, Result};
use ordmap_storage::MapType;
use serde::{Deserialize, Serialize, Serializer};

use crate::workload::WorkloadProfile;

/// Default thread counts
pub const DEFAULT_THREADS: [usize; 3] = [1, 4, 8];
/// Default number of seeded keys
pub const DEFAULT_INITIAL_SIZE: u64 = 10_000;
/// Default key space
pub const DEFAULT_KEY_SPACE: u64 = 65_536;
/// Default range query width
pub const DEFAULT_RANGE_WIDTH: u64 = 128;
/// Default seed
pub const DEFAULT_SEED: u64 = 1337;

/// Validated benchmark session configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkConfig {
    /// Map variants to run
    pub map_types: Vec<MapType>,
    /// Workload profiles to run
    pub workloads: Vec<WorkloadProfile>,
    /// Worker thread counts to run
    pub thread_counts: Vec<usize>,
    /// Keys `0..initial_size` are seeded before each run
    pub initial_size: u64,
    /// Keys are drawn uniformly from `0..key_space`
    pub key_space: u64,
    /// Width of range queries
    pub range_width: u64,
    /// Warm-up phase length; zero skips warm-up
    #[serde(rename = "warmupMs", serialize_with = "serialize_millis")]
    pub warmup: Duration,
    /// Measurement phase length
    #[serde(rename = "durationMs", serialize_with = "serialize_millis")]
    pub run_duration: Duration,
    /// Repetitions of each (map, workload, threads) combination
    pub repeats: u32,
    /// Base seed; worker `i` uses `seed + i`
    pub seed: u64,
    /// Optional CSV report path
    pub csv_output: Option<PathBuf>,
    /// Optional JSON report path
    pub json_output: Option<PathBuf>,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl BenchmarkConfig {
    /// Start from the defaults
    pub fn builder() -> BenchmarkConfigBuilder {
        BenchmarkConfigBuilder::default()
    }
}

/// Consuming builder for [`BenchmarkConfig`]
#[derive(Debug, Clone)]
pub struct BenchmarkConfigBuilder {
    map_types: Vec<MapType>,
    workloads: Vec<WorkloadProfile>,
    thread_counts: Vec<usize>,
    initial_size: u64,
    key_space: u64,
    range_width: u64,
    warmup: Duration,
    run_duration: Duration,
    repeats: u32,
    seed: u64,
    csv_output: Option<PathBuf>,
    json_output: Option<PathBuf>,
}

impl Default for BenchmarkConfigBuilder {
    fn default() -> Self {
        Self {
            map_types: MapType::all(),
            workloads: WorkloadProfile::all(),
            thread_counts: DEFAULT_THREADS.to_vec(),
            initial_size: DEFAULT_INITIAL_SIZE,
            key_space: DEFAULT_KEY_SPACE,
            range_width: DEFAULT_RANGE_WIDTH,
            warmup: Duration::from_secs(2),
            run_duration: Duration::from_secs(5),
            repeats: 1,
            seed: DEFAULT_SEED,
            csv_output: None,
            json_output: None,
        }
    }
}

impl BenchmarkConfigBuilder {
    /// Set map variants
    pub fn with_map_types(mut self, map_types: Vec<MapType>) -> Self {
        self.map_types = map_types;
        self
    }

    /// Set workload profiles
    pub fn with_workloads(mut self, workloads: Vec<WorkloadProfile>) -> Self {
        self.workloads = workloads;
        self
    }

    /// Set worker thread counts
    pub fn with_thread_counts(mut self, thread_counts: Vec<usize>) -> Self {
        self.thread_counts = thread_counts;
        self
    }

    /// Set the number of seeded keys
    pub fn with_initial_size(mut self, initial_size: u64) -> Self {
        self.initial_size = initial_size;
        self
    }

    /// Set the key space
    pub fn with_key_space(mut self, key_space: u64) -> Self {
        self.key_space = key_space;
        self
    }

    /// Set the range query width
    pub fn with_range_width(mut self, range_width: u64) -> Self {
        self.range_width = range_width;
        self
    }

    /// Set the warm-up length
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the measurement length
    pub fn with_run_duration(mut self, run_duration: Duration) -> Self {
        self.run_duration = run_duration;
        self
    }

    /// Set the repetition count
    pub fn with_repeats(mut self, repeats: u32) -> Self {
        self.repeats = repeats;
        self
    }

    /// Set the base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Write a CSV report to `path`
    pub fn with_csv_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_output = Some(path.into());
        self
    }

    /// Write a JSON report to `path`
    pub fn with_json_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_output = Some(path.into());
        self
    }

    /// Layer the fields present in a JSON config file
    pub fn apply_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let file = ConfigFile::load(path)?;
        self.apply_file(file)
    }

    /// Layer the fields present in `file`
    pub fn apply_file(mut self, file: ConfigFile) -> Result<Self> {
        if let Some(maps) = file.maps {
            self.map_types = maps.iter().map(|id| MapType::from_id(id)).collect::<Result<_>>()?;
        }
        if let Some(workloads) = file.workloads {
            self.workloads = workloads
                .iter()
                .map(|id| WorkloadProfile::from_id(id))
                .collect::<Result<_>>()?;
        }
        if let Some(threads) = file.threads {
            self.thread_counts = threads;
        }
        if let Some(duration) = file.duration {
            self.run_duration = parse_duration(&duration)?;
        }
        if let Some(warmup) = file.warmup {
            self.warmup = parse_duration(&warmup)?;
        }
        if let Some(initial_size) = file.initial_size {
            self.initial_size = initial_size;
        }
        if let Some(key_space) = file.key_space {
            self.key_space = key_space;
        }
        if let Some(range_width) = file.range_width {
            self.range_width = range_width;
        }
        if let Some(seed) = file.seed {
            self.seed = seed;
        }
        if let Some(csv) = file.csv {
            self.csv_output = Some(csv);
        }
        if let Some(json) = file.json {
            self.json_output = Some(json);
        }
        if let Some(repeats) = file.repeats {
            self.repeats = repeats;
        }
        Ok(self)
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<BenchmarkConfig> {
        if self.map_types.is_empty() {
            return Err(Error::invalid_config("maps", "must name at least one map type"));
        }
        if self.workloads.is_empty() {
            return Err(Error::invalid_config("workloads", "must name at least one workload"));
        }
        if self.thread_counts.is_empty() {
            return Err(Error::invalid_config("threads", "must name at least one thread count"));
        }
        if self.thread_counts.contains(&0) {
            return Err(Error::invalid_config("threads", "thread counts must be positive"));
        }
        if self.key_space == 0 {
            return Err(Error::invalid_config("keySpace", "must be positive"));
        }
        if self.initial_size > self.key_space {
            return Err(Error::invalid_config(
                "initialSize",
                format!("{} exceeds key space {}", self.initial_size, self.key_space),
            ));
        }
        if self.range_width == 0 {
            return Err(Error::invalid_config("rangeWidth", "must be positive"));
        }
        if self.run_duration.is_zero() {
            return Err(Error::invalid_config("duration", "must be positive"));
        }
        if self.repeats == 0 {
            return Err(Error::invalid_config("repeats", "must be positive"));
        }
        Ok(BenchmarkConfig {
            map_types: self.map_types,
            workloads: self.workloads,
            thread_counts: self.thread_counts,
            initial_size: self.initial_size,
            key_space: self.key_space,
            range_width: self.range_width,
            warmup: self.warmup,
            run_duration: self.run_duration,
            repeats: self.repeats,
            seed: self.seed,
            csv_output: self.csv_output,
            json_output: self.json_output,
        })
    }
}

/// JSON config file; every field is optional and unknown fields are ignored
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Map type identifiers
    pub maps: Option<Vec<String>>,
    /// Workload identifiers
    pub workloads: Option<Vec<String>>,
    /// Thread counts
    pub threads: Option<Vec<usize>>,
    /// Measurement length, e.g. `"5s"`
    pub duration: Option<String>,
    /// Warm-up length, e.g. `"500ms"`
    pub warmup: Option<String>,
    /// Seeded keys
    pub initial_size: Option<u64>,
    /// Key space
    pub key_space: Option<u64>,
    /// Range width
    pub range_width: Option<u64>,
    /// Base seed
    pub seed: Option<u64>,
    /// CSV report path
    pub csv: Option<PathBuf>,
    /// JSON report path
    pub json: Option<PathBuf>,
    /// Repetitions
    pub repeats: Option<u32>,
}

impl ConfigFile {
    /// Read and parse a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Parse `<n>ms`, `<n>s` or `<n>m` (case-insensitive)
pub fn parse_duration(value: &str) -> Result<Duration> {
    let normalized = value.trim().to_ascii_lowercase();
    let invalid = || Error::InvalidDuration(value.to_string());
    let (amount, millis_per_unit) = if let Some(n) = normalized.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = normalized.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = normalized.strip_suffix('m') {
        (n, 60_000)
    } else {
        return Err(invalid());
    };
    let amount: u64 = amount.trim().parse().map_err(|_| invalid())?;
    Ok(Duration::from_millis(amount.saturating_mul(millis_per_unit)))
}

/// Parse a comma-separated list of thread counts; empty segments are skipped
pub fn parse_thread_counts(list: &str) -> Result<Vec<usize>> {
    list.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .parse::<usize>()
                .map_err(|_| Error::invalid_config("threads", format!("not a thread count: {}", segment)))
        })
        .collect()
}
