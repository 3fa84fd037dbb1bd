//! # PI-03: Converter
//!
//! Turns a run of fractional hexadecimal digits into the equivalent run of
//! fractional decimal digits.
//!
//! ## Method
//!
//! The nibbles `d₀ d₁ … d₍ₙ₋₁₎` are the exact value `F = Σ d_k · 16^-(k+1)`,
//! i.e. the integer `N = d₀d₁…d₍ₙ₋₁₎` (base 16) over `16^n`. The first `n`
//! decimal digits are `⌊N · 10^n / 16^n⌋`, computed with `num-bigint` and
//! left-padded with zeros to `n` places. The result is the truncation of `F`,
//! never rounded.
//!
//! Because `n` hex digits carry more information than `n` decimal digits,
//! every decimal digit produced is exact for the given input. Trailing digits
//! only become digits *of π* when the hex input is itself long enough; the
//! shortfall is a few decimal places for any `n`.

use num_bigint::BigUint;
use shared_types::{nibble_to_char, validate_nibbles, Nibble, NibbleError};
use thiserror::Error;

/// Integral part of π, implicit in every stored digit run.
pub const INTEGRAL_PART: char = '3';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("Invalid nibble at index {index}: {value} is not in 0..16")]
    InvalidNibble { index: usize, value: u8 },

    #[error("Digit run length mismatch: expected {expected} digits, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Digit run of {len} nibbles is too long to convert")]
    TooLong { len: usize },
}

impl From<NibbleError> for ConvertError {
    fn from(err: NibbleError) -> Self {
        match err {
            NibbleError::InvalidNibble { index, value } => {
                ConvertError::InvalidNibble { index, value }
            }
            NibbleError::LengthMismatch { expected, actual } => {
                ConvertError::LengthMismatch { expected, actual }
            }
        }
    }
}

/// Character for a single hexadecimal digit, `'0'..='F'`.
pub fn convert_digit(nibble: Nibble) -> Result<char, ConvertError> {
    nibble_to_char(nibble).ok_or(ConvertError::InvalidNibble {
        index: 0,
        value: nibble,
    })
}

/// Decimal digits of the fraction `0.d₀d₁…` (base 16), one per input nibble.
pub fn to_decimal(nibbles: &[Nibble]) -> Result<Vec<u8>, ConvertError> {
    validate_nibbles(nibbles)?;
    if nibbles.is_empty() {
        return Ok(Vec::new());
    }
    let len = nibbles.len();
    let exponent = u32::try_from(len).map_err(|_| ConvertError::TooLong { len })?;

    let numerator = BigUint::from_bytes_be(&pack(nibbles));
    let scaled = (numerator * BigUint::from(10u32).pow(exponent)) >> (4 * len);

    let digits = scaled.to_str_radix(10);
    let mut decimal = vec![0u8; len - digits.len()];
    decimal.extend(digits.bytes().map(|b| b - b'0'));
    Ok(decimal)
}

/// Big-endian bytes of the nibble run, with a leading zero nibble when odd.
fn pack(nibbles: &[Nibble]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(nibbles.len().div_ceil(2));
    let (head, rest) = nibbles.split_at(nibbles.len() % 2);
    bytes.extend(head.iter().copied());
    bytes.extend(rest.chunks_exact(2).map(|pair| (pair[0] << 4) | pair[1]));
    bytes
}

/// `"3."` followed by the hexadecimal digits.
pub fn render_hex(nibbles: &[Nibble]) -> Result<String, ConvertError> {
    validate_nibbles(nibbles)?;
    let mut out = String::with_capacity(nibbles.len() + 2);
    out.push(INTEGRAL_PART);
    out.push('.');
    out.extend(nibbles.iter().filter_map(|&d| nibble_to_char(d)));
    Ok(out)
}

/// `"3."` followed by the decimal expansion of the hexadecimal digits.
pub fn render_decimal(nibbles: &[Nibble]) -> Result<String, ConvertError> {
    let decimal = to_decimal(nibbles)?;
    let mut out = String::with_capacity(decimal.len() + 2);
    out.push(INTEGRAL_PART);
    out.push('.');
    out.extend(decimal.iter().map(|&d| (b'0' + d) as char));
    Ok(out)
}
