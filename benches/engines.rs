//! Benchmarks for the LRU and LFU engines.
//!
//! Run with: `cargo bench --bench engines`

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use evictkit::builder::{EngineKind, new_engine};
use evictkit::traits::CacheEngine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const KINDS: [EngineKind; 2] = [EngineKind::Lru, EngineKind::Lfu];

/// Capacity holding `entries` u64/u64 pairs for either engine.
fn capacity_for(kind: EngineKind, entries: usize) -> usize {
    match kind {
        EngineKind::Lru => entries * 16,
        EngineKind::Lfu => entries,
    }
}

/// Keys skewed toward the low end of `0..universe`.
fn skewed_keys(len: usize, universe: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    (0..len)
        .map(|_| {
            let x: f64 = rng.r#gen();
            (x * x * universe as f64) as u64
        })
        .collect()
}

fn bench_insert_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_insert_access");
    group.throughput(Throughput::Elements(2048));
    for kind in KINDS {
        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            b.iter_batched(
                || {
                    let mut engine = new_engine::<u64, u64>(capacity_for(kind, 1024), kind);
                    for i in 0..1024u64 {
                        engine.insert(i, i);
                    }
                    engine
                },
                |mut engine| {
                    for i in 0..1024u64 {
                        engine.insert(std::hint::black_box(i + 10_000), i);
                        let _ = std::hint::black_box(engine.access(&std::hint::black_box(i)));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_hot_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_hot_access");
    group.throughput(Throughput::Elements(4096));
    for kind in KINDS {
        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            b.iter_batched(
                || {
                    let mut engine = new_engine::<u64, u64>(capacity_for(kind, 4096), kind);
                    for i in 0..4096u64 {
                        engine.insert(i, i);
                    }
                    engine
                },
                |mut engine| {
                    for i in 0..4096u64 {
                        let _ = std::hint::black_box(engine.access(&std::hint::black_box(i)));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_eviction_churn_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_eviction_churn");
    for kind in KINDS {
        for &entries in &[256usize, 1024, 4096] {
            let inserts = entries * 4;
            group.throughput(Throughput::Elements(inserts as u64));
            group.bench_with_input(
                BenchmarkId::new(kind.as_str(), entries),
                &entries,
                |b, &entries| {
                    b.iter_batched(
                        || new_engine::<u64, u64>(capacity_for(kind, entries), kind),
                        |mut engine| {
                            for i in 0..inserts as u64 {
                                engine.insert(std::hint::black_box(i), i);
                            }
                        },
                        BatchSize::SmallInput,
                    )
                },
            );
        }
    }
    group.finish();
}

fn bench_skewed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_skewed_workload");
    let keys = skewed_keys(8192, 16_384);
    group.throughput(Throughput::Elements(keys.len() as u64));
    for kind in KINDS {
        group.bench_function(BenchmarkId::from_parameter(kind), |b| {
            b.iter_batched(
                || new_engine::<u64, u64>(capacity_for(kind, 1024), kind),
                |mut engine| {
                    for &key in &keys {
                        if engine.access(&key).is_none() {
                            engine.insert(key, key);
                        }
                    }
                    std::hint::black_box(engine.len())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    engines,
    bench_insert_access,
    bench_hot_access,
    bench_eviction_churn_sizes,
    bench_skewed_workload
);
criterion_main!(engines);
