//! Latency aggregates over microsecond samples

use serde::Serialize;

/// Mean and percentiles of per-operation latency, in microseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyStats {
    /// Arithmetic mean
    pub mean_micros: f64,
    /// Median
    pub p50_micros: u64,
    /// 95th percentile
    pub p95_micros: u64,
    /// 99th percentile
    pub p99_micros: u64,
}

impl LatencyStats {
    /// Aggregate `samples`; all fields are zero when there are none
    pub fn from_micros(samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let sum: u128 = sorted.iter().map(|&s| s as u128).sum();
        Self {
            mean_micros: sum as f64 / sorted.len() as f64,
            p50_micros: percentile(&sorted, 0.50),
            p95_micros: percentile(&sorted, 0.95),
            p99_micros: percentile(&sorted, 0.99),
        }
    }
}

/// Linear interpolation between the closest ranks, rounded
fn percentile(sorted: &[u64], quantile: f64) -> u64 {
    let index = quantile * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = index - lower as f64;
    let low = sorted[lower] as f64;
    let high = sorted[upper] as f64;
    (low + fraction * (high - low)).round() as u64
}
