//! # On-Disk Layout
//!
//! ```text
//! offset  size  field
//! 0       4     magic "PIDB"
//! 4       4     format version (1)
//! 8       4     digits per block
//! 12      4     reserved, zero
//! 16      8     capacity in blocks
//! 24      4     crc32 of bytes [0, 24)
//! 28      36    zero padding
//! 64      ..    state index, 2 bits per position
//! align 8 ..    payload region, one fixed-size slot per position
//! ```
//!
//! All integers are little-endian.

use crate::domain::codec::slot_len;
use crate::domain::errors::StoreError;
use crate::domain::state_index::index_len;

pub const MAGIC: [u8; 4] = *b"PIDB";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 64;

/// Bytes covered by the header checksum.
const HEADER_CHECKED_LEN: usize = 24;

/// Decoded store header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHeader {
    pub block_digits: u32,
    pub capacity: u64,
}

impl StoreHeader {
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.block_digits.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.capacity.to_le_bytes());
        let crc = crc32fast::hash(&bytes[..HEADER_CHECKED_LEN]);
        bytes[24..28].copy_from_slice(&crc.to_le_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() < HEADER_LEN {
            return Err(StoreError::wrong_format(format!(
                "file is {} bytes, shorter than the {}-byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }
        if bytes[0..4] != MAGIC {
            return Err(StoreError::wrong_format("bad magic"));
        }

        let stored_crc = read_u32(bytes, 24);
        let actual_crc = crc32fast::hash(&bytes[..HEADER_CHECKED_LEN]);
        if stored_crc != actual_crc {
            return Err(StoreError::wrong_format(format!(
                "header checksum mismatch: stored {:#010x}, computed {:#010x}",
                stored_crc, actual_crc
            )));
        }

        let version = read_u32(bytes, 4);
        if version != FORMAT_VERSION {
            return Err(StoreError::wrong_format(format!(
                "unsupported format version {}",
                version
            )));
        }

        let block_digits = read_u32(bytes, 8);
        if block_digits == 0 {
            return Err(StoreError::wrong_format("block size is zero"));
        }

        Ok(Self {
            block_digits,
            capacity: read_u64(bytes, 16),
        })
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// Byte offsets derived from a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub header: StoreHeader,
    pub index_offset: u64,
    pub index_len: u64,
    pub payload_offset: u64,
    pub slot_len: u64,
    pub file_len: u64,
}

impl Layout {
    /// Compute the layout, or `None` if the file size would overflow `u64`.
    pub fn new(header: StoreHeader) -> Option<Self> {
        let index_offset = HEADER_LEN as u64;
        let index_len = index_len(header.capacity);
        let payload_offset = index_offset.checked_add(index_len)?.checked_next_multiple_of(8)?;
        let slot_len = slot_len(header.block_digits) as u64;
        let file_len = header
            .capacity
            .checked_mul(slot_len)?
            .checked_add(payload_offset)?;
        Some(Self {
            header,
            index_offset,
            index_len,
            payload_offset,
            slot_len,
            file_len,
        })
    }

    pub fn capacity(&self) -> u64 {
        self.header.capacity
    }

    pub fn block_digits(&self) -> u32 {
        self.header.block_digits
    }

    /// File offset of the slot for `position`. Caller checks bounds.
    pub fn slot_offset(&self, position: u64) -> u64 {
        self.payload_offset + position * self.slot_len
    }

    /// File offset of the state-index byte holding `position`.
    pub fn index_byte_offset(&self, position: u64) -> u64 {
        self.index_offset + position / 4
    }
}
