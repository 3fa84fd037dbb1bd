//! IEEE-754 double-precision backend.
//!
//! The classic formulation: head summands as `r / d` in `f64`, reduced modulo
//! 1 after every addition; tail summands with a running `2^-s` multiplier,
//! stopping once a summand drops below `EPSILON`. Cheap, but the 53-bit
//! mantissa only yields one trustworthy nibble per evaluation and loses about
//! one bit per doubling of the offset.

use crate::arith::pow_mod;
use crate::formula::Formula;
use crate::{BackendInfo, Precision, SeriesBackend};

/// Largest supported hex offset.
pub const MAX_OFFSET_DOUBLE: u64 = 10_000_000;

/// Tail cut-off.
const EPSILON: f64 = 1e-17;

/// `2^64` as a float, to move the fraction into fixed point.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

pub struct DoubleBackend {
    info: BackendInfo,
}

impl DoubleBackend {
    pub fn new() -> Self {
        Self {
            info: BackendInfo {
                name: "f64".to_string(),
                precision: Precision::Double,
                epsilon: EPSILON,
                max_offset: MAX_OFFSET_DOUBLE,
                nibbles_per_evaluation: 1,
            },
        }
    }

    fn fraction_f64(&self, formula: Formula, offset: u64) -> f64 {
        let series = formula.series();
        let step = 2f64.powi(-(series.shift as i32));
        let mut sum = 0.0f64;

        for term in series.terms {
            let mut k = 0u64;

            // Head
            loop {
                let exponent = series.exponent(term, offset, k);
                if exponent < 0 {
                    break;
                }
                let denominator = term.a * k + term.b;
                let value = pow_mod(2, exponent as u64, denominator) as f64 / denominator as f64;
                sum += if series.is_negative(term, k) { -value } else { value };
                sum -= sum.floor();
                k += 1;
            }

            // Tail
            let mut power = 2f64.powi(series.exponent(term, offset, k) as i32);
            loop {
                let value = power / (term.a * k + term.b) as f64;
                if value < EPSILON {
                    break;
                }
                sum += if series.is_negative(term, k) { -value } else { value };
                power *= step;
                k += 1;
            }
            sum -= sum.floor();
        }

        sum
    }
}

impl Default for DoubleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesBackend for DoubleBackend {
    fn precision(&self) -> Precision {
        Precision::Double
    }

    fn info(&self) -> &BackendInfo {
        &self.info
    }

    fn fraction_at(&self, formula: Formula, offset: u64) -> u128 {
        let fraction = self.fraction_f64(formula, offset);
        ((fraction * TWO_POW_64) as u64 as u128) << 64
    }
}
