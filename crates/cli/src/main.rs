//! ordmap-bench: run the ordered-map benchmark matrix.
//!
//! Resolves the configuration (defaults, `--config` file, flags), runs every
//! combination, prints the summary table and writes the optional CSV/JSON
//! reports. Logging goes through `tracing`; set `RUST_LOG` to adjust.

mod commands;
mod parse;

use anyhow::{Context, Result};
use ordmap_harness::BenchmarkRunner;
use tracing::info;

use commands::build_cli;
use parse::matches_to_config;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ordmap=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    let config = matches_to_config(&matches)?;

    if matches.get_flag("dry-run") {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(
        target: "ordmap::harness",
        maps = config.map_types.len(),
        workloads = config.workloads.len(),
        thread_counts = config.thread_counts.len(),
        repeats = config.repeats,
        "Starting benchmark session"
    );

    let runner = BenchmarkRunner::new(config);
    let result = runner.run_all().context("benchmark run failed")?;

    let stdout = std::io::stdout();
    result
        .print_summary(&mut stdout.lock())
        .context("failed to print summary")?;

    if let Some(path) = &result.config.csv_output {
        result
            .write_csv(path)
            .with_context(|| format!("failed to write CSV report {}", path.display()))?;
        info!(target: "ordmap::harness", path = %path.display(), "Wrote CSV report");
    }
    if let Some(path) = &result.config.json_output {
        result
            .write_json(path)
            .with_context(|| format!("failed to write JSON report {}", path.display()))?;
        info!(target: "ordmap::harness", path = %path.display(), "Wrote JSON report");
    }

    Ok(())
}

