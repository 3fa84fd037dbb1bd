//! # Domain Errors
//!
//! Error types for the Block Store.
//!
//! ## Taxonomy
//!
//! | Class | Variants |
//! |-------|----------|
//! | I/O | `OpenFailed`, `Io`, `Locked` |
//! | Format | `WrongFormat`, `DataCorruption` |
//! | Capacity | `ReadOutOfBounds`, `WriteOutOfBounds`, `MigrateFailed` |
//! | State | `ReadNotReady`, `AlreadyComputed`, `CheckNotComputed`, `AlreadyChecked`, `InvalidPayload` |
//! | Exhaustion | `NoUncomputed`, `NoUnchecked` |
//!
//! Exhaustion is the normal end of a work loop, not a failure. No variant is
//! fatal to the store: the handle stays usable after any error.

use shared_types::{BlockPosition, NibbleError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be created or opened.
    #[error("Failed to open store {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a store, or its header is inconsistent.
    #[error("Wrong store format: {reason}")]
    WrongFormat { reason: String },

    /// Resizing failed; the store is unchanged.
    #[error("Migration to {requested_blocks} blocks failed: {reason}")]
    MigrateFailed { requested_blocks: u64, reason: String },

    /// Every position is computed or claimed.
    #[error("No uncomputed block remains")]
    NoUncomputed,

    /// Every computed position is checked or claimed.
    #[error("No unchecked block remains")]
    NoUnchecked,

    #[error("Read at position {position} is out of bounds (capacity {capacity})")]
    ReadOutOfBounds { position: BlockPosition, capacity: u64 },

    /// The block has no payload yet.
    #[error("Block {position} has not been computed")]
    ReadNotReady { position: BlockPosition },

    #[error("Block {position} is already computed")]
    AlreadyComputed { position: BlockPosition },

    #[error("Block {position} cannot be checked before it is computed")]
    CheckNotComputed { position: BlockPosition },

    #[error("Block {position} is already checked")]
    AlreadyChecked { position: BlockPosition },

    #[error("Write at position {position} is out of bounds (capacity {capacity})")]
    WriteOutOfBounds { position: BlockPosition, capacity: u64 },

    /// The payload is not one block of nibbles.
    #[error("Invalid payload for block {position}: {source}")]
    InvalidPayload {
        position: BlockPosition,
        #[source]
        source: NibbleError,
    },

    /// A stored slot no longer matches its checksum.
    #[error("Data corruption in block {position}: expected checksum {expected:#010x}, got {actual:#010x}")]
    DataCorruption {
        position: BlockPosition,
        expected: u32,
        actual: u32,
    },

    /// Another process holds the store.
    #[error("Store {} is locked by {}", path.display(), pid.map(|p| format!("process {}", p)).unwrap_or_else(|| "another process".to_string()))]
    Locked { path: PathBuf, pid: Option<u32> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fieldless error classification, one per `StoreError` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OpenFailed,
    WrongFormat,
    MigrateFailed,
    NoUncomputed,
    NoUnchecked,
    ReadOutOfBounds,
    ReadNotReady,
    AlreadyComputed,
    CheckNotComputed,
    AlreadyChecked,
    WriteOutOfBounds,
    InvalidPayload,
    DataCorruption,
    Locked,
    Io,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 15] = [
        ErrorKind::OpenFailed,
        ErrorKind::WrongFormat,
        ErrorKind::MigrateFailed,
        ErrorKind::NoUncomputed,
        ErrorKind::NoUnchecked,
        ErrorKind::ReadOutOfBounds,
        ErrorKind::ReadNotReady,
        ErrorKind::AlreadyComputed,
        ErrorKind::CheckNotComputed,
        ErrorKind::AlreadyChecked,
        ErrorKind::WriteOutOfBounds,
        ErrorKind::InvalidPayload,
        ErrorKind::DataCorruption,
        ErrorKind::Locked,
        ErrorKind::Io,
    ];

    /// Process exit status for this kind. Distinct per kind, never 0 or 1.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::OpenFailed => 10,
            ErrorKind::WrongFormat => 11,
            ErrorKind::MigrateFailed => 12,
            ErrorKind::Locked => 13,
            ErrorKind::Io => 14,
            ErrorKind::NoUncomputed => 20,
            ErrorKind::NoUnchecked => 21,
            ErrorKind::ReadOutOfBounds => 30,
            ErrorKind::WriteOutOfBounds => 31,
            ErrorKind::ReadNotReady => 32,
            ErrorKind::AlreadyComputed => 40,
            ErrorKind::CheckNotComputed => 41,
            ErrorKind::AlreadyChecked => 42,
            ErrorKind::InvalidPayload => 43,
            ErrorKind::DataCorruption => 50,
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::OpenFailed { .. } => ErrorKind::OpenFailed,
            StoreError::WrongFormat { .. } => ErrorKind::WrongFormat,
            StoreError::MigrateFailed { .. } => ErrorKind::MigrateFailed,
            StoreError::NoUncomputed => ErrorKind::NoUncomputed,
            StoreError::NoUnchecked => ErrorKind::NoUnchecked,
            StoreError::ReadOutOfBounds { .. } => ErrorKind::ReadOutOfBounds,
            StoreError::ReadNotReady { .. } => ErrorKind::ReadNotReady,
            StoreError::AlreadyComputed { .. } => ErrorKind::AlreadyComputed,
            StoreError::CheckNotComputed { .. } => ErrorKind::CheckNotComputed,
            StoreError::AlreadyChecked { .. } => ErrorKind::AlreadyChecked,
            StoreError::WriteOutOfBounds { .. } => ErrorKind::WriteOutOfBounds,
            StoreError::InvalidPayload { .. } => ErrorKind::InvalidPayload,
            StoreError::DataCorruption { .. } => ErrorKind::DataCorruption,
            StoreError::Locked { .. } => ErrorKind::Locked,
            StoreError::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this is the expected end of a work-allocation loop.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, StoreError::NoUncomputed | StoreError::NoUnchecked)
    }

    pub(crate) fn wrong_format(reason: impl Into<String>) -> Self {
        StoreError::WrongFormat {
            reason: reason.into(),
        }
    }
}
