//! Run results and report writers
//!
//! A session produces one [`RunResult`] per (map, workload, threads, repeat)
//! combination. [`BenchmarkResult`] renders them as an aligned summary
//! table, as CSV, or as pretty JSON alongside the configuration.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use ordmap_core::{MetricsSnapshot, Result};
use ordmap_storage::MapType;
use serde::Serialize;

use crate::config::BenchmarkConfig;
use crate::latency::LatencyStats;
use crate::workload::WorkloadProfile;

/// CSV header line, without the trailing newline
pub const CSV_HEADER: &str = "map,workload,threads,operations,ops_per_sec,duration_ms,avg_us,p50_us,p95_us,p99_us,stm_commits,stm_aborts,stm_max_retries";

/// Outcome of one measured run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Map variant
    pub map_type: MapType,
    /// Workload profile
    pub workload: WorkloadProfile,
    /// Worker threads
    pub threads: usize,
    /// Repetition index, starting at 1
    pub repeat: u32,
    /// Operations completed during measurement
    pub total_operations: u64,
    /// Throughput over the measured wall time
    pub ops_per_second: f64,
    /// Measured wall time
    pub duration_ms: u64,
    /// Per-operation latency
    pub latency: LatencyStats,
    /// Transactional counters accumulated during measurement
    pub metrics: MetricsSnapshot,
}

/// Every run of a session plus the configuration that produced them
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    /// Session configuration
    pub config: BenchmarkConfig,
    /// Runs in execution order
    pub runs: Vec<RunResult>,
}

impl BenchmarkResult {
    /// Bundle runs with their configuration
    pub fn new(config: BenchmarkConfig, runs: Vec<RunResult>) -> Self {
        Self { config, runs }
    }

    /// Aligned, human-readable summary table
    pub fn summary_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<10} {:<12} {:<7} {:<12} {:<12} {:<12} {:<9} {:<9} {:<9} {:<12} {:<12} {:<10} {:<11}\n",
            "Map",
            "Workload",
            "Threads",
            "Operations",
            "Ops/sec",
            "Duration(ms)",
            "Avg(us)",
            "P50(us)",
            "P95(us)",
            "P99(us)",
            "STM commits",
            "STM aborts",
            "Max retries"
        ));
        for run in &self.runs {
            out.push_str(&format!(
                "{:<10} {:<12} {:<7} {:<12} {:<12.2} {:<12} {:<9.2} {:<9} {:<9} {:<12} {:<12} {:<10} {:<11}\n",
                run.map_type.id(),
                run.workload.id(),
                run.threads,
                run.total_operations,
                run.ops_per_second,
                run.duration_ms,
                run.latency.mean_micros,
                run.latency.p50_micros,
                run.latency.p95_micros,
                run.latency.p99_micros,
                run.metrics.commits,
                run.metrics.aborts,
                run.metrics.max_retries
            ));
        }
        out
    }

    /// Write the summary table to `out`
    pub fn print_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        out.write_all(self.summary_table().as_bytes())
    }

    /// CSV rendering: header plus one line per run
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(CSV_HEADER.len() + 1 + self.runs.len() * 96);
        out.push_str(CSV_HEADER);
        out.push('\n');
        for run in &self.runs {
            out.push_str(&format!(
                "{},{},{},{},{:.4},{},{:.4},{},{},{},{},{},{}\n",
                run.map_type.id(),
                run.workload.id(),
                run.threads,
                run.total_operations,
                run.ops_per_second,
                run.duration_ms,
                run.latency.mean_micros,
                run.latency.p50_micros,
                run.latency.p95_micros,
                run.latency.p99_micros,
                run.metrics.commits,
                run.metrics.aborts,
                run.metrics.max_retries
            ));
        }
        out
    }

    /// Write [`Self::to_csv`] to `path`, creating parent directories
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        create_parent(path)?;
        fs::write(path, self.to_csv())?;
        Ok(())
    }

    /// Write pretty JSON of the config and runs to `path`, creating parent directories
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        create_parent(path)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
