//! # State Index
//!
//! Two independent markers per position, four positions per byte. For
//! position `p` the computed marker is bit `2·(p % 4)` of byte `p / 4` and the
//! checked marker is the bit above it.
//!
//! The in-memory copy mirrors the on-disk region byte for byte. Updates are
//! staged with [`StateIndex::staged`] so the caller can persist the byte
//! before applying it.

use shared_types::{BlockPosition, BlockState};
use thiserror::Error;

/// Index bytes needed for `capacity` positions.
pub fn index_len(capacity: u64) -> u64 {
    capacity.div_ceil(4)
}

/// The in-memory index for a capacity could not be allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("state index for {capacity} blocks needs {bytes} bytes, which cannot be allocated")]
pub struct IndexAllocError {
    pub capacity: u64,
    pub bytes: u64,
}

/// Zeroed buffer the size of the index for `capacity` positions.
pub fn index_buffer(capacity: u64) -> Result<Vec<u8>, IndexAllocError> {
    let mut bytes = Vec::new();
    let len = reserve_to(&mut bytes, capacity)?;
    bytes.resize(len, 0);
    Ok(bytes)
}

/// Make room for the full index of `capacity` positions without aborting.
fn reserve_to(bytes: &mut Vec<u8>, capacity: u64) -> Result<usize, IndexAllocError> {
    let err = IndexAllocError {
        capacity,
        bytes: index_len(capacity),
    };
    let len = usize::try_from(index_len(capacity)).map_err(|_| err)?;
    if len > bytes.len() {
        bytes
            .try_reserve_exact(len - bytes.len())
            .map_err(|_| err)?;
    }
    Ok(len)
}

/// Marker kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Computed,
    Checked,
}

impl Marker {
    fn bit(self, position: BlockPosition) -> u8 {
        let shift = 2 * (position % 4) as u8;
        match self {
            Marker::Computed => 1 << shift,
            Marker::Checked => 1 << (shift + 1),
        }
    }
}

/// All four positions of a byte computed.
const ALL_COMPUTED: u8 = 0b0101_0101;
/// All four positions of a byte checked.
const ALL_CHECKED: u8 = 0b1010_1010;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateIndex {
    bytes: Vec<u8>,
    capacity: u64,
}

impl StateIndex {
    /// Fresh index, every position Uncomputed.
    pub fn new(capacity: u64) -> Result<Self, IndexAllocError> {
        Self::from_bytes(Vec::new(), capacity)
    }

    /// Index loaded from disk. Marker bits past `capacity` are cleared.
    pub fn from_bytes(mut bytes: Vec<u8>, capacity: u64) -> Result<Self, IndexAllocError> {
        let len = reserve_to(&mut bytes, capacity)?;
        bytes.resize(len, 0);
        let mut index = Self { bytes, capacity };
        index.clear_tail();
        Ok(index)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn state(&self, position: BlockPosition) -> BlockState {
        let byte = self.bytes[(position / 4) as usize];
        BlockState::from_markers(
            byte & Marker::Computed.bit(position) != 0,
            byte & Marker::Checked.bit(position) != 0,
        )
    }

    /// The byte index and value that setting `marker` on `position` produces.
    pub fn staged(&self, position: BlockPosition, marker: Marker) -> (usize, u8) {
        let at = (position / 4) as usize;
        (at, self.bytes[at] | marker.bit(position))
    }

    /// Apply a byte previously produced by [`StateIndex::staged`].
    pub fn apply(&mut self, at: usize, byte: u8) {
        self.bytes[at] = byte;
    }

    /// First position `>= start` that satisfies `wanted`, skipping bytes that
    /// cannot contain one.
    pub fn find_from(
        &self,
        start: BlockPosition,
        wanted: BlockState,
        mut accept: impl FnMut(BlockPosition) -> bool,
    ) -> Option<BlockPosition> {
        let mut position = start;
        while position < self.capacity {
            let byte = self.bytes[(position / 4) as usize];
            let skip = match wanted {
                BlockState::Uncomputed => byte & ALL_COMPUTED == ALL_COMPUTED,
                BlockState::Computed => {
                    byte & ALL_COMPUTED == 0 || byte & ALL_CHECKED == ALL_CHECKED
                }
                BlockState::Checked => byte & ALL_CHECKED == 0,
            };
            if skip && position % 4 == 0 {
                position += 4;
                continue;
            }
            if self.state(position) == wanted && accept(position) {
                return Some(position);
            }
            position += 1;
        }
        None
    }

    /// Positions in each state: `(computed_not_checked, checked)`.
    pub fn counts(&self) -> (u64, u64) {
        let mut computed = 0u64;
        let mut checked = 0u64;
        for position in 0..self.capacity {
            match self.state(position) {
                BlockState::Uncomputed => {}
                BlockState::Computed => computed += 1,
                BlockState::Checked => checked += 1,
            }
        }
        (computed, checked)
    }

    /// Copy of this index resized to `capacity`. Retained positions keep
    /// their markers; new positions are Uncomputed.
    pub fn resized(&self, capacity: u64) -> Result<Self, IndexAllocError> {
        let mut bytes = Vec::new();
        let len = reserve_to(&mut bytes, capacity)?;
        bytes.extend_from_slice(&self.bytes[..len.min(self.bytes.len())]);
        Self::from_bytes(bytes, capacity)
    }

    fn clear_tail(&mut self) {
        let used = (self.capacity % 4) as u32;
        if used != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << (2 * used)) - 1;
            }
        }
    }
}
