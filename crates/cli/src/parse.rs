//! ArgMatches → BenchmarkConfig conversion.
//!
//! Layering order: builder defaults, then `--config`, then individual flags.

use anyhow::{Context, Result};
use clap::ArgMatches;
use ordmap_harness::{parse_duration, parse_thread_counts, BenchmarkConfig, WorkloadProfile};
use ordmap_storage::MapType;

/// Resolve the final configuration from parsed arguments.
pub fn matches_to_config(matches: &ArgMatches) -> Result<BenchmarkConfig> {
    let mut builder = BenchmarkConfig::builder();

    if let Some(path) = matches.get_one::<String>("config") {
        builder = builder
            .apply_config_file(path)
            .with_context(|| format!("failed to load config file {}", path))?;
    }
    if let Some(list) = matches.get_one::<String>("maps") {
        builder = builder.with_map_types(MapType::parse_list(list).context("--maps")?);
    }
    if let Some(list) = matches.get_one::<String>("workloads") {
        builder = builder.with_workloads(WorkloadProfile::parse_list(list).context("--workloads")?);
    }
    if let Some(list) = matches.get_one::<String>("threads") {
        builder = builder.with_thread_counts(parse_thread_counts(list).context("--threads")?);
    }
    if let Some(value) = matches.get_one::<String>("duration") {
        builder = builder.with_run_duration(parse_duration(value).context("--duration")?);
    }
    if let Some(value) = matches.get_one::<String>("warmup") {
        builder = builder.with_warmup(parse_duration(value).context("--warmup")?);
    }
    if let Some(&n) = matches.get_one::<u64>("initial-size") {
        builder = builder.with_initial_size(n);
    }
    if let Some(&n) = matches.get_one::<u64>("key-space") {
        builder = builder.with_key_space(n);
    }
    if let Some(&n) = matches.get_one::<u64>("range-width") {
        builder = builder.with_range_width(n);
    }
    if let Some(&n) = matches.get_one::<u64>("seed") {
        builder = builder.with_seed(n);
    }
    if let Some(&n) = matches.get_one::<u32>("repeats") {
        builder = builder.with_repeats(n);
    }
    if let Some(path) = matches.get_one::<String>("csv") {
        builder = builder.with_csv_output(path);
    }
    if let Some(path) = matches.get_one::<String>("json") {
        builder = builder.with_json_output(path);
    }

    Ok(builder.build()?)
}
