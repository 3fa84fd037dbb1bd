//! # Error Types
//!
//! Errors raised when a digit sequence does not satisfy the payload contract.

use thiserror::Error;

/// A digit payload failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NibbleError {
    /// A digit is not a hexadecimal nibble.
    #[error("Invalid nibble at index {index}: {value} is not in 0..16")]
    InvalidNibble { index: usize, value: u8 },

    /// The payload does not hold exactly one block of digits.
    #[error("Payload length mismatch: expected {expected} digits, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}
