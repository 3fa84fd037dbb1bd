//! # Integration Flows
//!
//! - `pipeline` - compute, verify and read back through the orchestrator
//! - `recovery` - interruption, reopen and migration of a live store

pub mod pipeline;
pub mod recovery;

use pi_02_block_store::{BlockStore, StoreConfig};
use pi_runtime::{Orchestrator, RuntimeConfig, Schedule};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// First 144 fractional hex digits of π.
pub const PI_HEX: &str = "243F6A8885A308D313198A2E03707344A4093822299F31D0\
                          082EFA98EC4E6C89452821E638D01377BE5466CF34E90C6C\
                          C0AC29B7C97C50DD3F84D5B5B54709179216D5D98979FB1B";

/// Fractional decimal digits of π matching the first 48 hex digits.
pub const PI_DEC_48: &str = "141592653589793238462643383279502884197169399375";

pub fn store_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("pi.db")
}

pub fn runtime_config(workers: usize, schedule: Schedule) -> RuntimeConfig {
    RuntimeConfig {
        workers,
        schedule,
        sync_writes: false,
        ..RuntimeConfig::default()
    }
}

pub fn create_store(path: &Path, digits: u64) -> BlockStore {
    BlockStore::create_with(path, digits, StoreConfig::for_testing()).unwrap()
}

pub fn open_store(path: &Path) -> BlockStore {
    BlockStore::open_with(path, StoreConfig::for_testing()).unwrap()
}

pub fn orchestrator(store: BlockStore, workers: usize, schedule: Schedule) -> Orchestrator {
    Orchestrator::new(Arc::new(store), &runtime_config(workers, schedule)).unwrap()
}
