//! # File Lock Implementation
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors from store locking
#[derive(Debug)]
pub enum LockError {
    /// Lock file could not be created
    CreateFailed(io::Error),
    /// Store is already locked by another handle
    AlreadyLocked { pid: Option<u32>, path: PathBuf },
    /// Failed to write PID to lock file
    WriteFailed(io::Error),
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockError::CreateFailed(e) => write!(f, "Failed to create lock file: {}", e),
            LockError::AlreadyLocked { pid, path } => match pid {
                Some(p) => write!(f, "Store already in use by process {} ({})", p, path.display()),
                None => write!(f, "Store already in use ({})", path.display()),
            },
            LockError::WriteFailed(e) => write!(f, "Failed to write PID to lock file: {}", e),
        }
    }
}

impl std::error::Error for LockError {}

// =============================================================================
// STORE LOCK
// =============================================================================

/// Exclusive lock on a store file.
///
/// Acquired by `create`/`open`, released on drop (RAII). The sidecar file
/// outlives the lock; only its PID is cleared.
pub struct StoreLock {
    /// The lock file handle (kept open to maintain lock)
    file: File,
    /// Path to the lock file
    path: PathBuf,
    /// PID of this process
    pid: u32,
}

impl StoreLock {
    /// Sidecar path for a store: `<store>.lock`.
    pub fn lock_path(store_path: &Path) -> PathBuf {
        let mut name = store_path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Acquire the lock without waiting.
    ///
    /// # Errors
    ///
    /// Returns `LockError::AlreadyLocked` if any handle, in this process or
    /// another, holds the lock.
    pub fn acquire(store_path: &Path) -> Result<Self, LockError> {
        let lock_path = Self::lock_path(store_path);

        // Truncated only once locked; the holder's PID stays readable.
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(LockError::CreateFailed)?;

        if file.try_lock_exclusive().is_err() {
            return Err(LockError::AlreadyLocked {
                pid: Self::read_existing_pid(&lock_path),
                path: lock_path,
            });
        }

        let pid = std::process::id();
        let mut locked_file = file;
        locked_file.set_len(0).map_err(LockError::WriteFailed)?;
        writeln!(locked_file, "{}", pid).map_err(LockError::WriteFailed)?;
        locked_file.sync_all().map_err(LockError::WriteFailed)?;

        Ok(Self {
            file: locked_file,
            path: lock_path,
            pid,
        })
    }

    /// Get the PID of the process holding the lock
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Get the path to the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read PID from existing lock file (for error messages)
    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // Never unlinked: every opener must lock the same inode.
        let _ = self.file.set_len(0);
        #[allow(clippy::incompatible_msrv)]
        let _ = FileExt::unlock(&self.file);
    }
}
