//! Benchmark runner
//!
//! For every (map, workload, threads, repeat) combination the runner:
//! 1. Creates a fresh map (dropped when the run ends)
//! 2. Seeds keys `0..initial_size` with `put(i, i)`
//! 3. Runs an optional warm-up phase without sampling
//! 4. Snapshots metrics, runs the measurement phase, diffs metrics
//!
//! A phase spawns scoped worker threads that start together on a barrier
//! and run until their deadline.

use std::any::Any;
use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

use ordmap_core::{Error, KeyRange, OrderedMap, Result};
use ordmap_storage::MapType;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::BenchmarkConfig;
use crate::latency::LatencyStats;
use crate::report::{BenchmarkResult, RunResult};
use crate::workload::{OperationType, WorkloadProfile};

/// Operation count and latency samples gathered by one phase
#[derive(Debug, Default)]
struct PhaseOutcome {
    operations: u64,
    elapsed: Duration,
    latencies: Vec<u64>,
}

#[derive(Debug, Default)]
struct WorkerOutcome {
    operations: u64,
    latencies: Vec<u64>,
}

/// Executes the runs described by a [`BenchmarkConfig`]
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    /// Create a runner for `config`
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// The configuration driving this runner
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run every combination, in map, workload, threads, repeat order
    pub fn run_all(&self) -> Result<BenchmarkResult> {
        let mut runs = Vec::new();
        for &map_type in &self.config.map_types {
            for &workload in &self.config.workloads {
                for &threads in &self.config.thread_counts {
                    for repeat in 1..=self.config.repeats {
                        runs.push(self.run_single(map_type, workload, threads, repeat)?);
                    }
                }
            }
        }
        Ok(BenchmarkResult::new(self.config.clone(), runs))
    }

    /// Run one combination on a fresh instance of `map_type`
    pub fn run_single(
        &self,
        map_type: MapType,
        workload: WorkloadProfile,
        threads: usize,
        repeat: u32,
    ) -> Result<RunResult> {
        info!(
            target: "ordmap::harness",
            map = %map_type,
            workload = %workload,
            threads,
            repeat,
            "Starting run"
        );
        let map = map_type.create();
        let result = self.run_on(map.as_ref(), map_type, workload, threads, repeat)?;
        info!(
            target: "ordmap::harness",
            map = %map_type,
            workload = %workload,
            threads,
            ops_per_sec = result.ops_per_second,
            aborts = result.metrics.aborts,
            "Finished run"
        );
        Ok(result)
    }

    /// Run one combination on a caller-supplied map
    pub fn run_on(
        &self,
        map: &dyn OrderedMap<u64, u64>,
        map_type: MapType,
        workload: WorkloadProfile,
        threads: usize,
        repeat: u32,
    ) -> Result<RunResult> {
        seed(map, self.config.initial_size);

        if !self.config.warmup.is_zero() {
            info!(target: "ordmap::harness", warmup_ms = self.config.warmup.as_millis() as u64, "Warm-up phase");
            self.execute_phase(map, workload, threads, self.config.warmup, false)?;
        }

        let baseline = map.snapshot_metrics();
        let measured = self.execute_phase(map, workload, threads, self.config.run_duration, true)?;
        let metrics = map.snapshot_metrics().diff(&baseline);

        let seconds = measured.elapsed.as_secs_f64();
        let ops_per_second = if seconds > 0.0 {
            measured.operations as f64 / seconds
        } else {
            0.0
        };
        Ok(RunResult {
            map_type,
            workload,
            threads,
            repeat,
            total_operations: measured.operations,
            ops_per_second,
            duration_ms: measured.elapsed.as_millis() as u64,
            latency: LatencyStats::from_micros(&measured.latencies),
            metrics,
        })
    }

    fn execute_phase(
        &self,
        map: &dyn OrderedMap<u64, u64>,
        workload: WorkloadProfile,
        threads: usize,
        duration: Duration,
        sample: bool,
    ) -> Result<PhaseOutcome> {
        let barrier = Barrier::new(threads + 1);
        let config = &self.config;

        thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|worker| {
                    let barrier = &barrier;
                    scope.spawn(move || {
                        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(worker as u64));
                        barrier.wait();
                        run_worker(map, workload, config, &mut rng, duration, sample)
                    })
                })
                .collect();

            barrier.wait();
            let started = Instant::now();

            let mut outcome = PhaseOutcome::default();
            let mut failure = None;
            for (worker, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(done) => {
                        outcome.operations += done.operations;
                        outcome.latencies.extend(done.latencies);
                    }
                    Err(payload) => {
                        failure.get_or_insert(Error::WorkerFailed {
                            worker,
                            reason: panic_message(payload.as_ref()),
                        });
                    }
                }
            }
            outcome.elapsed = started.elapsed();

            match failure {
                Some(err) => Err(err),
                None => Ok(outcome),
            }
        })
    }
}

fn seed(map: &dyn OrderedMap<u64, u64>, initial_size: u64) {
    for key in 0..initial_size {
        map.put(key, key);
    }
}

fn run_worker(
    map: &dyn OrderedMap<u64, u64>,
    workload: WorkloadProfile,
    config: &BenchmarkConfig,
    rng: &mut StdRng,
    duration: Duration,
    sample: bool,
) -> WorkerOutcome {
    let mut outcome = WorkerOutcome::default();
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        let op_start = sample.then(Instant::now);
        perform_operation(map, workload, config, rng);
        if let Some(op_start) = op_start {
            outcome.latencies.push(op_start.elapsed().as_micros() as u64);
        }
        outcome.operations += 1;
    }
    outcome
}

/// Inclusive upper bound of a range query starting at `key`
pub(crate) fn range_upper(key: u64, width: u64, key_space: u64) -> u64 {
    key.saturating_add(width.max(1)).min(key_space - 1).max(key)
}

fn perform_operation(
    map: &dyn OrderedMap<u64, u64>,
    workload: WorkloadProfile,
    config: &BenchmarkConfig,
    rng: &mut StdRng,
) {
    let key = rng.gen_range(0..config.key_space);
    match workload.choose_operation(rng) {
        OperationType::Get => {
            map.get(&key);
        }
        OperationType::Put => {
            map.put(key, rng.gen());
        }
        OperationType::Remove => {
            map.remove(&key);
        }
        OperationType::Range => {
            let upper = range_upper(key, config.range_width, config.key_space);
            let hits = map.range_query(KeyRange::inclusive(&key, &upper));
            std::hint::black_box(hits.len());
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn quick_config() -> BenchmarkConfig {
        BenchmarkConfig::builder()
            .with_map_types(vec![MapType::Stm, MapType::Global])
            .with_workloads(vec![WorkloadProfile::Mixed])
            .with_thread_counts(vec![2])
            .with_initial_size(64)
            .with_key_space(128)
            .with_range_width(8)
            .with_warmup(Duration::ZERO)
            .with_run_duration(Duration::from_millis(50))
            .build()
            .unwrap()
    }

    #[test]
    fn test_range_upper_clamps_to_key_space() {
        assert_eq!(range_upper(10, 128, 65_536), 138);
        assert_eq!(range_upper(65_500, 128, 65_536), 65_535);
        assert_eq!(range_upper(0, 0, 10), 1);
        assert_eq!(range_upper(0, 5, 1), 0);
    }

    #[test]
    fn test_run_all_covers_every_combination() {
        let config = BenchmarkConfig::builder()
            .with_map_types(vec![MapType::Global, MapType::SkipList])
            .with_workloads(vec![WorkloadProfile::ReadHeavy, WorkloadProfile::RangeHeavy])
            .with_thread_counts(vec![1, 2])
            .with_initial_size(16)
            .with_key_space(32)
            .with_warmup(Duration::ZERO)
            .with_run_duration(Duration::from_millis(10))
            .with_repeats(2)
            .build()
            .unwrap();
        let result = BenchmarkRunner::new(config).run_all().unwrap();
        assert_eq!(result.runs.len(), 2 * 2 * 2 * 2);
        assert_eq!(result.runs[0].map_type, MapType::Global);
        assert_eq!(result.runs[0].repeat, 1);
        assert_eq!(result.runs[1].repeat, 2);
        assert_eq!(result.runs[15].map_type, MapType::SkipList);
    }

    #[test]
    fn test_single_run_measures_operations() {
        let runner = BenchmarkRunner::new(quick_config());
        let run = runner
            .run_single(MapType::Stm, WorkloadProfile::Mixed, 2, 1)
            .unwrap();
        assert!(run.total_operations > 0);
        assert!(run.ops_per_second > 0.0);
        assert!(run.duration_ms >= 40);
        assert!(run.metrics.commits > 0, "STM runs report commits");
        assert!(run.latency.p99_micros >= run.latency.p50_micros);
    }

    #[test]
    fn test_lock_variant_reports_no_metrics() {
        let runner = BenchmarkRunner::new(quick_config());
        let run = runner
            .run_single(MapType::Global, WorkloadProfile::Mixed, 2, 1)
            .unwrap();
        assert_eq!(run.metrics.commits, 0);
        assert_eq!(run.metrics.aborts, 0);
    }

    #[test]
    fn test_seeding_fills_initial_keys() {
        let config = BenchmarkConfig::builder()
            .with_initial_size(100)
            .with_key_space(100)
            .build()
            .unwrap();
        let map = MapType::Sharded.create();
        seed(map.as_ref(), config.initial_size);
        assert_eq!(map.size(), 100);
        assert_eq!(map.get(&42), Some(42));
    }

    struct PanickingMap;

    impl OrderedMap<u64, u64> for PanickingMap {
        fn get(&self, _key: &u64) -> Option<u64> {
            panic!("boom")
        }
        fn put(&self, _key: u64, _value: u64) -> Option<u64> {
            None
        }
        fn remove(&self, _key: &u64) -> Option<u64> {
            panic!("boom")
        }
        fn range_query(&self, _range: KeyRange<'_, u64>) -> BTreeMap<u64, u64> {
            panic!("boom")
        }
        fn size(&self) -> usize {
            0
        }
        fn clear(&self) {}
    }

    #[test]
    fn test_worker_panic_becomes_error() {
        let runner = BenchmarkRunner::new(quick_config());
        let err = runner
            .run_on(&PanickingMap, MapType::Global, WorkloadProfile::ReadHeavy, 2, 1)
            .unwrap_err();
        match err {
            Error::WorkerFailed { reason, .. } => assert_eq!(reason, "boom"),
            other => panic!("expected WorkerFailed, got {:?}", other),
        }
    }
}
