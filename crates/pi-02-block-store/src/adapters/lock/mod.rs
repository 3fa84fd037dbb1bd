//! # Process Locking
//!
//! A store file may be opened by one process at a time. The lock is an
//! advisory `flock` on a sidecar `<store>.lock` file.

mod flock;

pub use flock::{LockError, StoreLock};
