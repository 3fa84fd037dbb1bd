//! # PI-03 Converter Benchmarks
//!
//! Big-integer conversion cost by input length.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};

pub fn bench_to_decimal(c: &mut Criterion) {
    let mut group = c.benchmark_group("pi-03-to-decimal");

    for len in [64usize, 4096, 65_536] {
        let nibbles: Vec<u8> = (0..len).map(|i| ((i * 7 + 3) % 16) as u8).collect();
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &nibbles, |b, nibbles| {
            b.iter(|| pi_03_converter::to_decimal(black_box(nibbles)).unwrap())
        });
    }

    group.finish();
}
