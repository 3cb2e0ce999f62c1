//! Clap command definition.
//!
//! Every option is optional: anything not given falls back to the config
//! file (when `--config` is set) and then to the built-in defaults.

use clap::{Arg, ArgAction, Command};

/// Build the `ordmap-bench` command.
pub fn build_cli() -> Command {
    Command::new("ordmap-bench")
        .about("Benchmark concurrent ordered maps: custom STM against lock-based and lock-free baselines")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Load configuration from a JSON file"),
        )
        .arg(
            Arg::new("maps")
                .long("maps")
                .value_name("LIST")
                .help("Comma-separated map types (global, sharded, skiplist, stm, ext-stm)"),
        )
        .arg(
            Arg::new("workloads")
                .long("workloads")
                .value_name("LIST")
                .help("Comma-separated workloads (read-heavy, write-heavy, mixed, range-heavy)"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .value_name("LIST")
                .help("Comma-separated thread counts (e.g. 1,4,8)"),
        )
        .arg(
            Arg::new("duration")
                .long("duration")
                .value_name("DURATION")
                .help("Measurement duration (e.g. 500ms, 5s, 2m)"),
        )
        .arg(
            Arg::new("warmup")
                .long("warmup")
                .value_name("DURATION")
                .help("Warm-up duration; 0s skips warm-up"),
        )
        .arg(
            Arg::new("initial-size")
                .long("initial-size")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Entries preloaded into each map"),
        )
        .arg(
            Arg::new("key-space")
                .long("key-space")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Keys are drawn uniformly from 0..N"),
        )
        .arg(
            Arg::new("range-width")
                .long("range-width")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Width of generated range queries"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Random seed for reproducible workloads"),
        )
        .arg(
            Arg::new("repeats")
                .long("repeats")
                .value_name("N")
                .value_parser(clap::value_parser!(u32))
                .help("Times to repeat each configuration (default 1)"),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .value_name("PATH")
                .help("Write a CSV report"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .value_name("PATH")
                .help("Write a JSON report"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the resolved configuration as JSON and exit")
                .action(ArgAction::SetTrue),
        )
}
