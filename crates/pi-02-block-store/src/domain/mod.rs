//! # Domain Layer
//!
//! Pure logic for the block store: on-disk layout, slot codec, state index
//! and work reservations. Nothing here performs I/O.

pub mod claims;
pub mod codec;
pub mod config;
pub mod errors;
pub mod layout;
pub mod state_index;
