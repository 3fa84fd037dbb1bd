//! # Block Store (pi-02)
//!
//! Durable, resumable record of which blocks of π's hexadecimal expansion
//! have been computed and checked, together with their digits.
//!
//! ## Block Lifecycle
//!
//! ```text
//! Uncomputed ──write_computed──→ Computed ──write_checked──→ Checked
//! ```
//!
//! Every position starts Uncomputed. No operation moves a block backwards.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Forward Only | A state marker, once set, is never cleared (except by shrinking) |
//! | 2 | Durable Transitions | A reported success has reached the device |
//! | 3 | Data Integrity | Header and every slot carry a crc32, verified on read |
//! | 4 | Atomic Migration | A failed resize leaves the prior store intact |
//! | 5 | Exclusive Claims | A reserved position is handed to one worker at a time |
//! | 6 | Single Process | One handle per store file, enforced by a sidecar lock |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Layout, slot codec, state index, claims, errors. No I/O.
//! - `adapters/` - Backing file access and process locking
//! - `service/` - `BlockStore`, the handle every caller uses
//!
//! ## Usage
//!
//! ```ignore
//! use pi_02_block_store::BlockStore;
//!
//! let store = BlockStore::create("pi.db", 1_000_000)?;
//! let position = store.read_uncomputed()?;
//! store.write_computed(position, &digits)?;
//! store.close()?;
//! ```

pub mod adapters;
pub mod domain;
pub mod service;

// Re-export key types for convenience
pub use domain::config::{StoreConfig, StoreStats};
pub use domain::errors::{ErrorKind, StoreError};
pub use domain::layout::{FORMAT_VERSION, HEADER_LEN, MAGIC};
pub use service::BlockStore;
pub use shared_types::{BlockPosition, BlockState};
