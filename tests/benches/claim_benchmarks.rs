//! # Lucky-Pool Benchmarks
//!
//! | Path | Cost driver |
//! |------|-------------|
//! | claim (memory log) | checks, draw, bookkeeping |
//! | claim (file log) | append + `sync_data` |
//! | replay | full log parse and reconcile on reload |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lp_pool_engine::domain::format::{encode_record, LOG_HEADER};
use lp_pool_engine::{
    AllocationApi, AllocationEngine, DenominationSpec, FileLogStore, InMemoryLogStore, PoolConfig,
};
use lp_tests::fixtures::{claimant, record};
use std::time::Duration;

fn big_pool(units: u32) -> PoolConfig {
    PoolConfig::new(vec![
        DenominationSpec::new(20_000, units / 2),
        DenominationSpec::new(10_000, units - units / 2),
    ])
    .unwrap()
}

fn bench_claim_in_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("claim-in-memory");
    group.throughput(Throughput::Elements(1_000));

    group.bench_function("1000_claims", |b| {
        b.iter(|| {
            let engine = AllocationEngine::builder(big_pool(1_000), InMemoryLogStore::new())
                .seed(1)
                .hydrate()
                .unwrap();
            for n in 0..1_000 {
                black_box(engine.claim(claimant(n)).unwrap());
            }
        })
    });
    group.finish();
}

fn bench_claim_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("claim-file");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    group.bench_function("100_claims_synced", |b| {
        b.iter(|| {
            let dir = tempfile::TempDir::new().unwrap();
            let log = FileLogStore::open(dir.path().join("lixi.log")).unwrap();
            let engine = AllocationEngine::builder(big_pool(100), log)
                .seed(1)
                .hydrate()
                .unwrap();
            for n in 0..100 {
                black_box(engine.claim(claimant(n)).unwrap());
            }
        })
    });
    group.finish();
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    for size in [100usize, 1_000, 10_000] {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lixi.log");
        let mut content = LOG_HEADER.to_string();
        for n in 0..size {
            let amount = if n % 2 == 0 { 20_000 } else { 10_000 };
            content.push_str(&encode_record(&record(&format!("R{n}"), amount, &format!("ip-{n}"))));
        }
        std::fs::write(&path, content).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let log = FileLogStore::open(&path).unwrap();
                let engine = AllocationEngine::builder(big_pool(size as u32), log)
                    .hydrate()
                    .unwrap();
                black_box(engine.view().total_remaining())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_claim_in_memory, bench_claim_file, bench_replay);
criterion_main!(benches);
