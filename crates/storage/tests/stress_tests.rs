//! Stress tests for the map variants
//!
//! These tests run every variant under sustained mixed load and check that
//! the map stays consistent afterwards.
//!
//! Note: These tests are marked with #[ignore] as they take longer to run.
//! Run with: cargo test --release -- --ignored

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

use ordmap_core::{KeyRange, OrderedMap};
use ordmap_storage::{MapType, StmOrderedMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Mixed get/put/remove/range load on a small key space
#[test]
#[ignore] // Run with: cargo test --release -- --ignored test_mixed_load_all_variants
fn test_mixed_load_all_variants() {
    for map_type in MapType::all() {
        let map: Arc<dyn OrderedMap<u64, u64>> = Arc::from(map_type.create());
        for k in 0..1024 {
            map.put(k, k);
        }

        let start = Instant::now();
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let map = Arc::clone(&map);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(worker);
                    barrier.wait();
                    for _ in 0..50_000 {
                        let key = rng.gen_range(0..1024u64);
                        match rng.gen_range(0..10) {
                            0..=5 => {
                                map.get(&key);
                            }
                            6 | 7 => {
                                map.put(key, key);
                            }
                            8 => {
                                map.remove(&key);
                            }
                            _ => {
                                let hi = (key + 64).min(1023);
                                for (k, v) in map.range_query(KeyRange::inclusive(&key, &hi)) {
                                    assert_eq!(k, v);
                                    assert!(k >= key && k <= hi);
                                }
                            }
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        println!("{} finished mixed load in {:?}", map_type, start.elapsed());
        let snapshot = map.range_query(KeyRange::full());
        assert_eq!(snapshot.len(), map.size(), "{}", map_type);
        assert!(snapshot.len() <= 1024);
    }
}

/// Hot-spot counter: every increment must land exactly once
#[test]
#[ignore]
fn test_hot_counter_no_lost_updates() {
    let map = Arc::new(StmOrderedMap::<u64, u64>::new());
    map.put(0, 0);
    let start = Instant::now();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    map.atomically(|tx| {
                        let v = tx.get(&0)?.unwrap_or(0);
                        tx.put(0, v + 1)?;
                        Ok(())
                    });
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let metrics = map.snapshot_metrics();
    println!(
        "160,000 increments in {:?}: {} commits, {} aborts, max retries {}",
        start.elapsed(),
        metrics.commits,
        metrics.aborts,
        metrics.max_retries
    );
    assert_eq!(map.get(&0), Some(160_000));
}

/// Large sequential insert into the STM map
#[test]
#[ignore]
fn test_insert_hundred_thousand_keys() {
    let map = StmOrderedMap::<u64, u64>::new();
    let start = Instant::now();
    for i in 0..100_000 {
        map.put(i, i * 2);
    }
    println!("Inserted 100,000 keys in {:?}", start.elapsed());

    assert_eq!(map.size(), 100_000);
    assert_eq!(map.engine().current_version(), 100_000);
    let range = map.range_query(KeyRange::inclusive(&50_000, &50_099));
    assert_eq!(range.len(), 100);
    assert_eq!(range[&50_050], 100_100);
}
