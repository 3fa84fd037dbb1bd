//! # Pi-Blocks Benchmarks
//!
//! Per-subsystem criterion groups, collected by `benches/pi_benchmarks.rs`.

pub mod pi_01_digit_engine;
pub mod pi_02_block_store;
pub mod pi_03_converter;
