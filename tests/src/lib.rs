//! # Pi-Blocks Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion benchmarks per subsystem
//! │   ├── pi_01_digit_engine.rs
//! │   ├── pi_02_block_store.rs
//! │   └── pi_03_converter.rs
//! │
//! └── integration/      # Engine + store + runtime flows
//!     ├── pipeline.rs
//!     └── recovery.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pi-tests
//!
//! # Benchmarks
//! cargo bench -p pi-tests
//! ```

pub mod benchmarks;
pub mod integration;
