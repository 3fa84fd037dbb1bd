//! # Capacity Migration
//!
//! The resized store is written in full to `<store>.migrate`, synced, and
//! renamed over the original. Until the rename the original file and the
//! open handle are untouched, so a failure at any earlier step leaves the
//! store exactly as it was.
//!
//! Growing appends Uncomputed positions. Shrinking drops every position at
//! or above the new capacity, together with its payload and any claim on it.

use shared_types::blocks_for_digits;
use std::io;
use std::path::{Path, PathBuf};

use super::{BlockStore, Inner};
use crate::adapters::file::{sync_dir, StoreFile};
use crate::domain::errors::StoreError;
use crate::domain::layout::{Layout, StoreHeader};
use crate::domain::state_index::StateIndex;

/// Payload bytes copied per read/write pair.
const COPY_CHUNK: u64 = 1 << 20;

impl BlockStore {
    /// Sidecar path used while migrating: `<store>.migrate`.
    pub fn migrate_path(store_path: &Path) -> PathBuf {
        let mut name = store_path.as_os_str().to_os_string();
        name.push(".migrate");
        PathBuf::from(name)
    }

    /// Resize the store to hold `new_capacity_digits` hex digits.
    ///
    /// Serialized against every other operation on this handle.
    pub fn migrate(&self, new_capacity_digits: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let block_digits = inner.layout.block_digits();
        let new_capacity = blocks_for_digits(new_capacity_digits, block_digits);
        let old_capacity = inner.layout.capacity();
        let failed = |reason: String| StoreError::MigrateFailed {
            requested_blocks: new_capacity,
            reason,
        };

        if new_capacity == old_capacity {
            return Ok(());
        }

        let layout = Layout::new(StoreHeader {
            block_digits,
            capacity: new_capacity,
        })
        .ok_or_else(|| failed("store size overflows u64".to_string()))?;

        let temp_path = Self::migrate_path(&self.path);
        let file = StoreFile::create_truncate(&temp_path)
            .map_err(|e| failed(format!("cannot create {}: {}", temp_path.display(), e)))?;

        // Storage first, then memory, then the copy.
        let swapped = file
            .set_len(layout.file_len)
            .map_err(|e| format!("cannot size {}: {}", temp_path.display(), e))
            .and_then(|()| inner.index.resized(new_capacity).map_err(|e| e.to_string()))
            .and_then(|index| {
                write_resized(&inner, &file, &layout, &index)
                    .and_then(|()| std::fs::rename(&temp_path, &self.path))
                    .map(|()| index)
                    .map_err(|e| e.to_string())
            });
        let index = match swapped {
            Ok(index) => index,
            Err(reason) => {
                drop(file);
                let _ = std::fs::remove_file(&temp_path);
                #[cfg(feature = "tracing-log")]
                tracing::error!(
                    "[pi-02] Migration of {} failed: {}",
                    self.path.display(),
                    reason
                );
                return Err(failed(reason));
            }
        };

        // The rename is done; the new file is complete either way.
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if let Err(_e) = sync_dir(parent) {
            #[cfg(feature = "tracing-log")]
            tracing::warn!("[pi-02] Directory sync after migration failed: {}", _e);
        }

        *inner = Inner {
            file,
            layout,
            index,
        };
        self.claims.lock().truncate(new_capacity);

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            "[pi-02] Migrated {} from {} to {} blocks",
            self.path.display(),
            old_capacity,
            new_capacity
        );
        Ok(())
    }
}

fn write_resized(
    old: &Inner,
    file: &StoreFile,
    layout: &Layout,
    index: &StateIndex,
) -> io::Result<()> {
    file.write_all_at(0, &layout.header.encode())?;
    file.write_all_at(layout.index_offset, index.as_bytes())?;

    let retained = old.layout.capacity().min(layout.capacity());
    let total = retained * layout.slot_len;
    let mut buf = vec![0u8; COPY_CHUNK.min(total) as usize];
    let mut copied = 0u64;
    while copied < total {
        let len = COPY_CHUNK.min(total - copied) as usize;
        old.file
            .read_exact_at(old.layout.payload_offset + copied, &mut buf[..len])?;
        file.write_all_at(layout.payload_offset + copied, &buf[..len])?;
        copied += len as u64;
    }

    file.sync()
}
