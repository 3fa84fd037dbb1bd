//! # PI-01 Digit Engine Benchmarks
//!
//! Cost of one block grows roughly linearly with its offset, since the
//! left-hand series has one modular exponentiation per term below the offset.
//!
//! - Block latency at increasing offsets, both formulas
//! - `Fixed128` against `Double`
//! - Batch throughput across the rayon pool

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use pi_01_digit_engine::{tasks::BlockBatchTask, DigitEngine, EngineConfig, Formula, Precision};
use std::time::Duration;

fn engine(formula: Formula, precision: Precision) -> DigitEngine {
    DigitEngine::new(EngineConfig {
        formula,
        precision,
        ..EngineConfig::default()
    })
    .unwrap()
}

pub fn bench_block_by_offset(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-01-block-by-offset");
    group.measurement_time(Duration::from_secs(10));

    for formula in [Formula::Bbp, Formula::Bellard] {
        let engine = engine(formula, Precision::Fixed128);
        for position in [0u64, 1_000, 10_000, 100_000] {
            group.bench_with_input(
                BenchmarkId::new(formula.to_string(), position * 16),
                &position,
                |b, &position| b.iter(|| engine.compute_block(black_box(position)).unwrap()),
            );
        }
    }

    group.finish();
}

pub fn bench_precision(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-01-precision");
    group.throughput(Throughput::Elements(16));

    for precision in [Precision::Fixed128, Precision::Double] {
        let engine = engine(Formula::Bbp, precision);
        group.bench_function(precision.to_string(), |b| {
            b.iter(|| engine.compute_block(black_box(10_000)).unwrap())
        });
    }

    group.finish();
}

pub fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-01-batch");
    group.sample_size(20);
    let engine = engine(Formula::Bbp, Precision::Fixed128);

    for count in [16u64, 128] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| BlockBatchTask::range(1_000, count).execute(&engine).unwrap())
        });
    }

    group.finish();
}
