//! # PI-02 Block Store Benchmarks
//!
//! - Reserve + write cycle without fsync
//! - Checksum-verified reads
//! - Migration copy cost

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use pi_02_block_store::{BlockStore, StoreConfig};

const BLOCK: [u8; 16] = [2, 4, 3, 15, 6, 10, 8, 8, 8, 5, 10, 3, 0, 8, 13, 3];

fn fresh_store(dir: &tempfile::TempDir, blocks: u64) -> BlockStore {
    let path = dir.path().join("bench.db");
    let _ = std::fs::remove_file(&path);
    BlockStore::create_with(path, blocks * 16, StoreConfig::for_testing()).unwrap()
}

pub fn bench_reserve_and_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-02-write");
    let dir = tempfile::tempdir().unwrap();
    let blocks = 1_000u64;
    group.throughput(Throughput::Elements(blocks));

    group.bench_function("reserve_write_1000", |b| {
        b.iter_batched(
            || fresh_store(&dir, blocks),
            |store| {
                while let Ok(position) = store.read_uncomputed() {
                    store.write_computed(position, &BLOCK).unwrap();
                }
                store
            },
            criterion::BatchSize::PerIteration,
        )
    });

    group.finish();
}

pub fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-02-read");
    let dir = tempfile::tempdir().unwrap();
    let store = fresh_store(&dir, 1_000);
    for position in 0..1_000 {
        store.write_computed(position, &BLOCK).unwrap();
    }

    let mut position = 0u64;
    group.bench_function("read_verified", |b| {
        b.iter(|| {
            position = (position + 7) % 1_000;
            black_box(store.read(position).unwrap())
        })
    });

    group.finish();
}

pub fn bench_migrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-02-migrate");
    group.sample_size(10);
    let dir = tempfile::tempdir().unwrap();

    for blocks in [1_000u64, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &blocks, |b, &blocks| {
            let store = fresh_store(&dir, blocks);
            let mut grow = true;
            b.iter(|| {
                let target = if grow { blocks * 2 } else { blocks };
                grow = !grow;
                store.migrate(target * 16).unwrap()
            })
        });
    }

    group.finish();
}
