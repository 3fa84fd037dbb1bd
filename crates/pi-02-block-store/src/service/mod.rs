//! # Block Store Service
//!
//! `BlockStore` is the handle over one store file. It is `Send + Sync` and is
//! meant to be shared through an `Arc` by a pool of workers.
//!
//! ## Locking
//!
//! - `inner` (`RwLock`): layout, state index and file. State changes and
//!   migration take it exclusively; queries and payload reads share it.
//! - `claims` (`Mutex`): work reservations. Always taken after `inner`.
//!
//! ## Durability
//!
//! A transition is reported only after its payload and then its state byte
//! have reached the device (with `sync_writes`). A crash between the two
//! leaves the position Uncomputed with an orphan payload that is overwritten
//! on the next compute.

mod migrate;


use parking_lot::{Mutex, RwLock};
use shared_types::{blocks_for_digits, validate_block, BlockPosition, BlockState, Nibble};
use std::io;
use std::path::{Path, PathBuf};

use crate::adapters::StoreFile;
#[cfg(feature = "locking")]
use crate::adapters::{LockError, StoreLock};
use crate::domain::claims::{ClaimKind, Claims};
use crate::domain::codec::{decode_slot, encode_slot};
use crate::domain::config::{StoreConfig, StoreStats};
use crate::domain::errors::StoreError;
use crate::domain::layout::{Layout, StoreHeader, HEADER_LEN};
use crate::domain::state_index::{index_buffer, IndexAllocError, Marker, StateIndex};

pub(crate) struct Inner {
    pub(crate) file: StoreFile,
    pub(crate) layout: Layout,
    pub(crate) index: StateIndex,
}

/// Handle over an open store file.
pub struct BlockStore {
    path: PathBuf,
    config: StoreConfig,
    inner: RwLock<Inner>,
    claims: Mutex<Claims>,
    #[cfg(feature = "locking")]
    _lock: Option<StoreLock>,
}

impl std::fmt::Debug for BlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockStore")
            .field("path", &self.path)
            .field("capacity", &self.capacity())
            .field("block_digits", &self.block_digits())
            .finish()
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

impl BlockStore {
    /// Create a store for `capacity_digits` hex digits with the default configuration.
    pub fn create(path: impl AsRef<Path>, capacity_digits: u64) -> Result<Self, StoreError> {
        Self::create_with(path, capacity_digits, StoreConfig::default())
    }

    /// Create a store holding `⌈capacity_digits / B⌉` blocks, all Uncomputed.
    ///
    /// Fails with `OpenFailed` if `path` already exists.
    pub fn create_with(
        path: impl AsRef<Path>,
        capacity_digits: u64,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if config.block_digits == 0 {
            return Err(StoreError::wrong_format("block size must be positive"));
        }

        let header = StoreHeader {
            block_digits: config.block_digits,
            capacity: blocks_for_digits(capacity_digits, config.block_digits),
        };
        let layout = Layout::new(header).ok_or_else(|| StoreError::OpenFailed {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "store size overflows u64"),
        })?;
        let index = StateIndex::new(layout.capacity()).map_err(|e| out_of_memory(&path, e))?;

        #[cfg(feature = "locking")]
        let lock = acquire_lock(&path, &config)?;

        let file = StoreFile::create_new(&path).map_err(|source| StoreError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        if let Err(source) = initialise(&file, &layout) {
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(StoreError::OpenFailed { path, source });
        }

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            "[pi-02] Created store {} ({} blocks of {} digits, {} bytes)",
            path.display(),
            layout.capacity(),
            layout.block_digits(),
            layout.file_len
        );

        Ok(Self {
            path,
            config,
            inner: RwLock::new(Inner {
                file,
                layout,
                index,
            }),
            claims: Mutex::new(Claims::new()),
            #[cfg(feature = "locking")]
            _lock: lock,
        })
    }

    /// Open an existing store with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(path, StoreConfig::default())
    }

    /// Open an existing store. The block size comes from the header.
    pub fn open_with(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        #[cfg(feature = "locking")]
        let lock = acquire_lock(&path, &config)?;

        let file = StoreFile::open(&path).map_err(|source| StoreError::OpenFailed {
            path: path.clone(),
            source,
        })?;

        let file_len = file.len()?;
        if file_len < HEADER_LEN as u64 {
            return Err(StoreError::wrong_format(format!(
                "file is {} bytes, shorter than the header",
                file_len
            )));
        }
        let mut header_bytes = [0u8; HEADER_LEN];
        file.read_exact_at(0, &mut header_bytes)?;
        let header = StoreHeader::decode(&header_bytes)?;
        let layout = Layout::new(header)
            .ok_or_else(|| StoreError::wrong_format("declared capacity overflows u64"))?;
        if file_len < layout.file_len {
            return Err(StoreError::wrong_format(format!(
                "file is {} bytes, layout needs {}",
                file_len, layout.file_len
            )));
        }

        let mut index_bytes =
            index_buffer(layout.capacity()).map_err(|e| out_of_memory(&path, e))?;
        file.read_exact_at(layout.index_offset, &mut index_bytes)?;
        let index = StateIndex::from_bytes(index_bytes, layout.capacity())
            .map_err(|e| out_of_memory(&path, e))?;

        #[cfg(feature = "tracing-log")]
        {
            let (computed, checked) = index.counts();
            tracing::info!(
                "[pi-02] Opened store {} ({} blocks, {} computed, {} checked)",
                path.display(),
                layout.capacity(),
                computed,
                checked
            );
        }

        Ok(Self {
            path,
            config,
            inner: RwLock::new(Inner {
                file,
                layout,
                index,
            }),
            claims: Mutex::new(Claims::new()),
            #[cfg(feature = "locking")]
            _lock: lock,
        })
    }

    /// Flush, sync and release the handle and its process lock.
    pub fn close(self) -> Result<(), StoreError> {
        self.inner.read().file.sync()?;
        #[cfg(feature = "tracing-log")]
        tracing::info!("[pi-02] Closed store {}", self.path.display());
        Ok(())
    }
}

impl Drop for BlockStore {
    fn drop(&mut self) {
        let _ = self.inner.get_mut().file.sync();
    }
}

fn out_of_memory(path: &Path, err: IndexAllocError) -> StoreError {
    StoreError::OpenFailed {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::OutOfMemory, err),
    }
}

fn initialise(file: &StoreFile, layout: &Layout) -> io::Result<()> {
    file.write_all_at(0, &layout.header.encode())?;
    file.set_len(layout.file_len)?;
    file.sync()
}

#[cfg(feature = "locking")]
fn acquire_lock(path: &Path, config: &StoreConfig) -> Result<Option<StoreLock>, StoreError> {
    if !config.lock {
        return Ok(None);
    }
    match StoreLock::acquire(path) {
        Ok(lock) => Ok(Some(lock)),
        Err(LockError::AlreadyLocked { pid, .. }) => Err(StoreError::Locked {
            path: path.to_path_buf(),
            pid,
        }),
        Err(LockError::CreateFailed(source)) | Err(LockError::WriteFailed(source)) => {
            Err(StoreError::OpenFailed {
                path: StoreLock::lock_path(path),
                source,
            })
        }
    }
}

// =============================================================================
// QUERIES
// =============================================================================

impl BlockStore {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of block positions.
    pub fn capacity(&self) -> u64 {
        self.inner.read().layout.capacity()
    }

    pub fn block_digits(&self) -> u32 {
        self.inner.read().layout.block_digits()
    }

    pub fn state(&self, position: BlockPosition) -> Result<BlockState, StoreError> {
        let inner = self.inner.read();
        read_bounds(&inner, position)?;
        Ok(inner.index.state(position))
    }

    pub fn is_computed(&self, position: BlockPosition) -> Result<bool, StoreError> {
        Ok(self.state(position)?.is_computed())
    }

    pub fn is_checked(&self, position: BlockPosition) -> Result<bool, StoreError> {
        Ok(self.state(position)?.is_checked())
    }

    /// Payload of a computed (or checked) block, checksum-verified.
    pub fn read(&self, position: BlockPosition) -> Result<Vec<Nibble>, StoreError> {
        let inner = self.inner.read();
        read_bounds(&inner, position)?;
        if !inner.index.state(position).is_computed() {
            return Err(StoreError::ReadNotReady { position });
        }

        let mut slot = vec![0u8; inner.layout.slot_len as usize];
        inner
            .file
            .read_exact_at(inner.layout.slot_offset(position), &mut slot)?;
        decode_slot(&slot, inner.layout.block_digits(), position)
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read();
        let (computed, checked) = inner.index.counts();
        let claimed = self.claims.lock().len() as u64;
        StoreStats {
            capacity: inner.layout.capacity(),
            block_digits: inner.layout.block_digits(),
            computed,
            checked,
            claimed,
        }
    }
}

fn read_bounds(inner: &Inner, position: BlockPosition) -> Result<(), StoreError> {
    let capacity = inner.layout.capacity();
    if position >= capacity {
        return Err(StoreError::ReadOutOfBounds { position, capacity });
    }
    Ok(())
}

fn write_bounds(inner: &Inner, position: BlockPosition) -> Result<(), StoreError> {
    let capacity = inner.layout.capacity();
    if position >= capacity {
        return Err(StoreError::WriteOutOfBounds { position, capacity });
    }
    Ok(())
}

// =============================================================================
// WORK ALLOCATION
// =============================================================================

impl BlockStore {
    /// Reserve some Uncomputed position that no other caller holds.
    ///
    /// The claim lasts until `write_computed` or `release` for that position.
    /// Fails with `NoUncomputed` when every position is computed or claimed.
    pub fn read_uncomputed(&self) -> Result<BlockPosition, StoreError> {
        self.reserve(ClaimKind::Compute).ok_or(StoreError::NoUncomputed)
    }

    /// Reserve some Computed-not-Checked position that no other caller holds.
    ///
    /// The claim lasts until `write_checked` or `release` for that position.
    pub fn read_unchecked(&self) -> Result<BlockPosition, StoreError> {
        self.reserve(ClaimKind::Check).ok_or(StoreError::NoUnchecked)
    }

    /// Drop any reservation on `position`. Returns whether one was held.
    pub fn release(&self, position: BlockPosition) -> bool {
        self.claims.lock().release(position)
    }

    fn reserve(&self, kind: ClaimKind) -> Option<BlockPosition> {
        let inner = self.inner.read();
        let mut claims = self.claims.lock();
        let wanted = match kind {
            ClaimKind::Compute => BlockState::Uncomputed,
            ClaimKind::Check => BlockState::Computed,
        };

        let start = claims.cursor(kind);
        let found = inner
            .index
            .find_from(start, wanted, |p| !claims.is_claimed(kind, p));
        match found {
            Some(position) => {
                claims.claim(kind, position);
                Some(position)
            }
            None => {
                claims.exhausted(kind, inner.layout.capacity());
                None
            }
        }
    }
}

// =============================================================================
// TRANSITIONS
// =============================================================================

impl BlockStore {
    /// Store the payload of an Uncomputed block and mark it Computed.
    ///
    /// `digits` must be exactly one block of nibbles. The digits themselves
    /// are not verified.
    pub fn write_computed(
        &self,
        position: BlockPosition,
        digits: &[Nibble],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        write_bounds(&inner, position)?;
        validate_block(digits, inner.layout.block_digits() as usize)
            .map_err(|source| StoreError::InvalidPayload { position, source })?;
        if inner.index.state(position) != BlockState::Uncomputed {
            #[cfg(feature = "tracing-log")]
            tracing::warn!("[pi-02] Duplicate compute of block {}", position);
            return Err(StoreError::AlreadyComputed { position });
        }

        let slot = encode_slot(digits);
        inner
            .file
            .write_all_at(inner.layout.slot_offset(position), &slot)?;
        if self.config.sync_writes {
            inner.file.sync()?;
        }
        self.commit_marker(&mut inner, position, Marker::Computed)?;
        self.claims.lock().completed_compute(position);

        #[cfg(feature = "tracing-log")]
        tracing::debug!("[pi-02] Block {} computed", position);
        Ok(())
    }

    /// Mark a Computed block Checked.
    pub fn write_checked(&self, position: BlockPosition) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        write_bounds(&inner, position)?;
        match inner.index.state(position) {
            BlockState::Uncomputed => return Err(StoreError::CheckNotComputed { position }),
            BlockState::Checked => {
                #[cfg(feature = "tracing-log")]
                tracing::warn!("[pi-02] Duplicate check of block {}", position);
                return Err(StoreError::AlreadyChecked { position });
            }
            BlockState::Computed => {}
        }

        self.commit_marker(&mut inner, position, Marker::Checked)?;
        self.claims.lock().completed_check(position);

        #[cfg(feature = "tracing-log")]
        tracing::debug!("[pi-02] Block {} checked", position);
        Ok(())
    }

    /// Persist one state-index byte, then publish it in memory.
    fn commit_marker(
        &self,
        inner: &mut Inner,
        position: BlockPosition,
        marker: Marker,
    ) -> Result<(), StoreError> {
        let (at, byte) = inner.index.staged(position, marker);
        inner
            .file
            .write_all_at(inner.layout.index_offset + at as u64, &[byte])?;
        if self.config.sync_writes {
            inner.file.sync()?;
        }
        inner.index.apply(at, byte);
        Ok(())
    }
}
