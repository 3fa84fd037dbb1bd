//! # Shared Types Crate
//!
//! Domain types exchanged between the digit engine (pi-01), the block store
//! (pi-02), the converter (pi-03) and the runtime.
//!
//! ## Design Principles
//!
//! - **Plain payloads**: a block's digits cross crate boundaries as `Vec<Nibble>`,
//!   one hexadecimal digit per element. Bit packing is private to the store codec.
//! - **Forward-only lifecycle**: `BlockState` only ever moves
//!   Uncomputed → Computed → Checked.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
