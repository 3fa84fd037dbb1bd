//! 128-bit fixed-point backend.
//!
//! Every summand is reduced to its fractional part and held as an unsigned
//! 0.128 binary fraction; the accumulator wraps modulo 1. Head summands use
//! exact modular residues, tail summands are `2^(128+e) / d` and the tail ends
//! at the first summand that truncates to zero.
//!
//! Each summand is truncated by less than 2⁻¹²⁸, so after `T` summands the
//! accumulated error is below `T · 2⁻¹²⁸`. At the supported limit of 2⁴⁴
//! offsets both formulas stay under 2⁴⁷ summands (error < 2⁻⁸¹), leaving more
//! than 40 guard bits below the 32 bits that are extracted per evaluation.

use crate::arith::{fixed_fraction, pow_mod};
use crate::formula::Formula;
use crate::{BackendInfo, Precision, SeriesBackend};

/// Largest supported hex offset.
pub const MAX_OFFSET_FIXED128: u64 = 1 << 44;

/// Nibbles extracted per series evaluation.
pub const NIBBLES_PER_EVALUATION: usize = 8;

/// Fixed-point backend (default).
pub struct Fixed128Backend {
    info: BackendInfo,
}

impl Fixed128Backend {
    pub fn new() -> Self {
        Self {
            info: BackendInfo {
                name: "fixed-point 0.128".to_string(),
                precision: Precision::Fixed128,
                epsilon: 2f64.powi(-128),
                max_offset: MAX_OFFSET_FIXED128,
                nibbles_per_evaluation: NIBBLES_PER_EVALUATION,
            },
        }
    }
}

impl Default for Fixed128Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesBackend for Fixed128Backend {
    fn precision(&self) -> Precision {
        Precision::Fixed128
    }

    fn info(&self) -> &BackendInfo {
        &self.info
    }

    fn fraction_at(&self, formula: Formula, offset: u64) -> u128 {
        let series = formula.series();
        let mut sum: u128 = 0;

        for term in series.terms {
            for k in 0u64.. {
                let exponent = series.exponent(term, offset, k);
                let denominator = term.a * k + term.b;

                let value = if exponent >= 0 {
                    // Head: only the residue contributes to the fraction.
                    let residue = pow_mod(2, exponent as u64, denominator);
                    fixed_fraction(residue, denominator)
                } else {
                    // Tail: 2^exponent / d scaled by 2^128.
                    let scale = 128 + exponent;
                    if scale <= 0 {
                        break;
                    }
                    let value = (1u128 << scale) / denominator as u128;
                    if value == 0 {
                        break;
                    }
                    value
                };

                sum = if series.is_negative(term, k) {
                    sum.wrapping_sub(value)
                } else {
                    sum.wrapping_add(value)
                };
            }
        }

        sum
    }
}
