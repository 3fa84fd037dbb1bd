//! Store configuration and reporting types.

use serde::{Deserialize, Serialize};
use shared_types::DEFAULT_BLOCK_DIGITS;

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Digits per block. Only used by `create`; `open` reads it from the header.
    pub block_digits: u32,
    /// fsync after every payload and index write.
    pub sync_writes: bool,
    /// Hold an exclusive process lock on `<path>.lock`.
    pub lock: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            block_digits: DEFAULT_BLOCK_DIGITS,
            sync_writes: true,
            lock: true,
        }
    }
}

impl StoreConfig {
    /// Configuration for tests and scratch stores: no fsync, no lock.
    pub fn for_testing() -> Self {
        Self {
            sync_writes: false,
            lock: false,
            ..Self::default()
        }
    }
}

/// Snapshot of store progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total block positions.
    pub capacity: u64,
    pub block_digits: u32,
    /// Computed but not yet checked.
    pub computed: u64,
    pub checked: u64,
    /// Positions currently reserved by a worker.
    pub claimed: u64,
}

impl StoreStats {
    pub fn uncomputed(&self) -> u64 {
        self.capacity - self.computed - self.checked
    }

    /// Hex digits whose block has a payload.
    pub fn digits_computed(&self) -> u64 {
        (self.computed + self.checked) * self.block_digits as u64
    }

    pub fn is_complete(&self) -> bool {
        self.checked == self.capacity
    }
}
