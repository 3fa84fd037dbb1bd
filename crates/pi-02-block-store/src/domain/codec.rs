//! # Slot Codec
//!
//! The only place that knows how digits are laid out on disk. A slot holds
//! `⌈B/2⌉` bytes of packed nibbles (high nibble first) followed by the crc32 of
//! those bytes.

use crate::domain::errors::StoreError;
use shared_types::{BlockPosition, Nibble};

const CHECKSUM_LEN: usize = 4;

/// Packed payload bytes for a block of `block_digits` nibbles.
pub fn packed_len(block_digits: u32) -> usize {
    (block_digits as usize).div_ceil(2)
}

/// Slot size including the checksum.
pub fn slot_len(block_digits: u32) -> usize {
    packed_len(block_digits) + CHECKSUM_LEN
}

/// Pack nibbles two per byte. An odd trailing nibble leaves the low half zero.
pub fn pack_nibbles(digits: &[Nibble]) -> Vec<u8> {
    digits
        .chunks(2)
        .map(|pair| {
            let high = pair[0] & 0x0F;
            let low = pair.get(1).copied().unwrap_or(0) & 0x0F;
            (high << 4) | low
        })
        .collect()
}

/// Unpack the first `count` nibbles of `packed`.
pub fn unpack_nibbles(packed: &[u8], count: usize) -> Vec<Nibble> {
    packed
        .iter()
        .flat_map(|&byte| [byte >> 4, byte & 0x0F])
        .take(count)
        .collect()
}

/// Encode a validated block into its slot bytes.
pub fn encode_slot(digits: &[Nibble]) -> Vec<u8> {
    let mut slot = pack_nibbles(digits);
    let crc = crc32fast::hash(&slot);
    slot.extend_from_slice(&crc.to_le_bytes());
    slot
}

/// Decode a slot, verifying its checksum.
pub fn decode_slot(
    slot: &[u8],
    block_digits: u32,
    position: BlockPosition,
) -> Result<Vec<Nibble>, StoreError> {
    let packed = packed_len(block_digits);
    if slot.len() != packed + CHECKSUM_LEN {
        return Err(StoreError::wrong_format(format!(
            "slot {} is {} bytes, expected {}",
            position,
            slot.len(),
            packed + CHECKSUM_LEN
        )));
    }

    let (payload, tail) = slot.split_at(packed);
    let mut crc = [0u8; CHECKSUM_LEN];
    crc.copy_from_slice(tail);
    let expected = u32::from_le_bytes(crc);
    let actual = crc32fast::hash(payload);
    if expected != actual {
        return Err(StoreError::DataCorruption {
            position,
            expected,
            actual,
        });
    }

    Ok(unpack_nibbles(payload, block_digits as usize))
}
