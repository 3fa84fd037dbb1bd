//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Digits**: `Nibble`, hexadecimal rendering and validation
//! - **Blocks**: `BlockPosition`, `BlockState`, `DigitBlock`

use serde::{Deserialize, Serialize};

use crate::errors::NibbleError;

// =============================================================================
// CLUSTER A: DIGITS
// =============================================================================

/// A single hexadecimal digit, always in `0..16`.
pub type Nibble = u8;

/// Upper-case hexadecimal alphabet, indexed by nibble value.
pub const HEX_ALPHABET: &[u8; 16] = b"0123456789ABCDEF";

/// Render one nibble as its hexadecimal character.
///
/// Returns `None` if the value is not a nibble.
pub fn nibble_to_char(nibble: Nibble) -> Option<char> {
    HEX_ALPHABET.get(nibble as usize).map(|&c| c as char)
}

/// Parse a hexadecimal character into a nibble (either case).
pub fn char_to_nibble(c: char) -> Option<Nibble> {
    c.to_digit(16).map(|d| d as Nibble)
}

/// Render a digit sequence as an upper-case hexadecimal string.
///
/// Values outside `0..16` are rendered as `?`.
pub fn to_hex_string(digits: &[Nibble]) -> String {
    digits
        .iter()
        .map(|&d| nibble_to_char(d).unwrap_or('?'))
        .collect()
}

/// Parse a hexadecimal string into nibbles. Returns `None` on any non-hex character.
pub fn parse_hex(s: &str) -> Option<Vec<Nibble>> {
    s.chars().map(char_to_nibble).collect()
}

/// Check that every element of `digits` is a nibble.
pub fn validate_nibbles(digits: &[Nibble]) -> Result<(), NibbleError> {
    match digits.iter().position(|&d| d > 0xF) {
        Some(index) => Err(NibbleError::InvalidNibble {
            index,
            value: digits[index],
        }),
        None => Ok(()),
    }
}

/// Check that `digits` is exactly one block of nibbles.
pub fn validate_block(digits: &[Nibble], block_digits: usize) -> Result<(), NibbleError> {
    if digits.len() != block_digits {
        return Err(NibbleError::LengthMismatch {
            expected: block_digits,
            actual: digits.len(),
        });
    }
    validate_nibbles(digits)
}

// =============================================================================
// CLUSTER B: BLOCKS
// =============================================================================

/// Index of a block. Block `p` covers hex offsets `[p·B, p·B + B)`.
pub type BlockPosition = u64;

/// Default digits per block: one 64-bit word of nibbles.
pub const DEFAULT_BLOCK_DIGITS: u32 = 16;

/// Number of blocks needed to hold `digits` hexadecimal digits.
pub fn blocks_for_digits(digits: u64, block_digits: u32) -> u64 {
    if block_digits == 0 {
        return 0;
    }
    digits.div_ceil(block_digits as u64)
}

/// Lifecycle state of a block.
///
/// Transitions are monotonic: `Uncomputed → Computed → Checked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BlockState {
    /// No payload recorded yet.
    Uncomputed,
    /// Payload recorded, not yet verified.
    Computed,
    /// Payload recorded and independently verified. Terminal.
    Checked,
}

impl BlockState {
    /// Decode the two independent presence markers of the state index.
    ///
    /// A checked marker without a computed marker is not a reachable state;
    /// it is reported as `Checked` so that the forward-only rule still holds.
    pub fn from_markers(computed: bool, checked: bool) -> Self {
        match (computed, checked) {
            (_, true) => BlockState::Checked,
            (true, false) => BlockState::Computed,
            (false, false) => BlockState::Uncomputed,
        }
    }

    /// Whether a payload has been recorded.
    pub fn is_computed(self) -> bool {
        self >= BlockState::Computed
    }

    /// Whether the block has been verified.
    pub fn is_checked(self) -> bool {
        self == BlockState::Checked
    }

    /// Whether `next` is the single legal successor of `self`.
    pub fn can_advance_to(self, next: BlockState) -> bool {
        matches!(
            (self, next),
            (BlockState::Uncomputed, BlockState::Computed)
                | (BlockState::Computed, BlockState::Checked)
        )
    }
}

impl std::fmt::Display for BlockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockState::Uncomputed => write!(f, "uncomputed"),
            BlockState::Computed => write!(f, "computed"),
            BlockState::Checked => write!(f, "checked"),
        }
    }
}

/// A block's position together with its digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitBlock {
    /// Block index.
    pub position: BlockPosition,
    /// One nibble per digit.
    pub digits: Vec<Nibble>,
}

impl DigitBlock {
    pub fn new(position: BlockPosition, digits: Vec<Nibble>) -> Self {
        Self { position, digits }
    }

    /// Hex offset of the first digit in this block.
    pub fn first_offset(&self) -> u64 {
        self.position * self.digits.len() as u64
    }

    /// The digits as an upper-case hexadecimal string.
    pub fn to_hex(&self) -> String {
        to_hex_string(&self.digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rendering() {
        assert_eq!(to_hex_string(&[2, 4, 3, 0xF, 6, 0xA]), "243F6A");
        assert_eq!(to_hex_string(&[16]), "?");
        assert_eq!(parse_hex("243f6A"), Some(vec![2, 4, 3, 0xF, 6, 0xA]));
        assert_eq!(parse_hex("24G"), None);
    }

    #[test]
    fn test_validate_block() {
        assert!(validate_block(&[0; 16], 16).is_ok());
        assert_eq!(
            validate_block(&[0; 15], 16),
            Err(NibbleError::LengthMismatch {
                expected: 16,
                actual: 15
            })
        );
        let mut digits = vec![0u8; 16];
        digits[7] = 0x10;
        assert_eq!(
            validate_block(&digits, 16),
            Err(NibbleError::InvalidNibble {
                index: 7,
                value: 0x10
            })
        );
    }

    #[test]
    fn test_blocks_for_digits_rounds_up() {
        assert_eq!(blocks_for_digits(0, 16), 0);
        assert_eq!(blocks_for_digits(1, 16), 1);
        assert_eq!(blocks_for_digits(16, 16), 1);
        assert_eq!(blocks_for_digits(17, 16), 2);
        assert_eq!(blocks_for_digits(1000, 16), 63);
    }

    #[test]
    fn test_block_state_is_forward_only() {
        use BlockState::*;
        assert!(Uncomputed.can_advance_to(Computed));
        assert!(Computed.can_advance_to(Checked));
        assert!(!Uncomputed.can_advance_to(Checked));
        assert!(!Checked.can_advance_to(Computed));
        assert!(!Computed.can_advance_to(Uncomputed));
        assert!(!Checked.can_advance_to(Checked));
    }

    #[test]
    fn test_block_state_from_markers() {
        assert_eq!(BlockState::from_markers(false, false), BlockState::Uncomputed);
        assert_eq!(BlockState::from_markers(true, false), BlockState::Computed);
        assert_eq!(BlockState::from_markers(true, true), BlockState::Checked);
        assert!(BlockState::Checked.is_computed());
        assert!(!BlockState::Computed.is_checked());
    }

    #[test]
    fn test_digit_block_offsets() {
        let block = DigitBlock::new(3, vec![0; 16]);
        assert_eq!(block.first_offset(), 48);
        let json = serde_json::to_string(&BlockState::Computed).unwrap();
        assert_eq!(json, "\"Computed\"");
    }
}
