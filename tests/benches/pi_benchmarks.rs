//! # Pi-Blocks Benchmarks
//!
//! | Subsystem | Measured |
//! |-----------|----------|
//! | pi-01 Digit Engine | block latency by offset, precision, batch throughput |
//! | pi-02 Block Store | reserve/write cycle, verified read, migration |
//! | pi-03 Converter | hex → decimal by input length |

use criterion::{criterion_group, criterion_main};
use pi_tests::benchmarks::{pi_01_digit_engine, pi_02_block_store, pi_03_converter};

criterion_group!(
    engine,
    pi_01_digit_engine::bench_block_by_offset,
    pi_01_digit_engine::bench_precision,
    pi_01_digit_engine::bench_batch,
);

criterion_group!(
    store,
    pi_02_block_store::bench_reserve_and_write,
    pi_02_block_store::bench_read,
    pi_02_block_store::bench_migrate,
);

criterion_group!(converter, pi_03_converter::bench_to_decimal);

criterion_main!(engine, store, converter);
