//! # Pi-Blocks Runtime
//!
//! Distributed hexadecimal digit extraction of π, driven block by block over
//! a durable progress store.
//!
//! ## Flow
//!
//! ```text
//!            ┌──────────── WorkerPool (rayon) ────────────┐
//!            │                                            │
//! BlockStore ──read_uncomputed──→ DigitEngine ──write_computed──→ BlockStore
//! BlockStore ──read_unchecked───→ verifier    ──write_checked───→ BlockStore
//! ```
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig`, defaults and environment overrides
//! - `pool` - worker pool with static or dynamic scheduling
//! - `orchestrator` - compute and verify passes, digit readback
//! - `errors` - `RuntimeError` and exit-status mapping

pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod pool;

pub use config::{RuntimeConfig, Schedule};
pub use errors::RuntimeError;
pub use orchestrator::{read_digits, Orchestrator};
pub use pool::{Outcome, PassKind, PassReport, WorkerPool};
