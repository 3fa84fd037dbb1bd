//! # Adapters
//!
//! Filesystem access and process locking.

pub mod file;
#[cfg(feature = "locking")]
pub mod lock;

pub use file::StoreFile;
#[cfg(feature = "locking")]
pub use lock::{LockError, StoreLock};
