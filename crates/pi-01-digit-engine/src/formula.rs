//! # Digit-Extraction Formulas
//!
//! Each formula is written as a table of series terms
//!
//! ```text
//! frac(16^n · π) = frac( Σ_term Σ_{k≥0} sign(term, k) · 2^(4n + e − s·k) / (a·k + b) )
//! ```
//!
//! where every constant weight has been folded into the power-of-two exponent
//! `e`. Terms with a non-negative exponent form the head and are reduced
//! modulo the denominator; the rest form the tail.
//!
//! | Formula | s | Alternating | Terms |
//! |---------|---|-------------|-------|
//! | BBP (1995) | 4 | no | `4/(8k+1) − 2/(8k+4) − 1/(8k+5) − 1/(8k+6)` |
//! | Bellard (1997) | 10 | yes | `2⁻⁶(−2⁵/(4k+1) − 1/(4k+3) + 2⁸/(10k+1) − 2⁶/(10k+3) − 2²/(10k+5) − 2²/(10k+7) + 1/(10k+9))` |

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One `Σ_k 2^(e − s·k) / (a·k + b)` series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesTerm {
    /// Subtract instead of add.
    pub negative: bool,
    /// Power-of-two weight, including any global scale.
    pub exponent: i64,
    /// Denominator slope.
    pub a: u64,
    /// Denominator intercept.
    pub b: u64,
}

/// A complete digit-extraction formula.
#[derive(Debug)]
pub struct Series {
    /// Power-of-two step per `k` (4 for base 16, 10 for base 1024).
    pub shift: u64,
    /// Whether odd `k` flips the sign.
    pub alternating: bool,
    pub terms: &'static [SeriesTerm],
}

impl Series {
    /// Sign of the `k`-th summand of `term`.
    pub fn is_negative(&self, term: &SeriesTerm, k: u64) -> bool {
        term.negative ^ (self.alternating && k & 1 == 1)
    }

    /// Exponent of the `k`-th summand of `term` at hex offset `offset`.
    pub fn exponent(&self, term: &SeriesTerm, offset: u64, k: u64) -> i64 {
        4 * offset as i64 + term.exponent - (self.shift * k) as i64
    }
}

const fn term(negative: bool, exponent: i64, a: u64, b: u64) -> SeriesTerm {
    SeriesTerm {
        negative,
        exponent,
        a,
        b,
    }
}

static BBP: Series = Series {
    shift: 4,
    alternating: false,
    terms: &[
        term(false, 2, 8, 1),
        term(true, 1, 8, 4),
        term(true, 0, 8, 5),
        term(true, 0, 8, 6),
    ],
};

static BELLARD: Series = Series {
    shift: 10,
    alternating: true,
    terms: &[
        term(true, 5 - 6, 4, 1),
        term(true, -6, 4, 3),
        term(false, 8 - 6, 10, 1),
        term(true, 6 - 6, 10, 3),
        term(true, 2 - 6, 10, 5),
        term(true, 2 - 6, 10, 7),
        term(false, -6, 10, 9),
    ],
};

/// Selectable digit-extraction formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formula {
    /// Bailey–Borwein–Plouffe.
    #[default]
    Bbp,
    /// Bellard's faster base-1024 variant.
    Bellard,
}

impl Formula {
    pub fn series(self) -> &'static Series {
        match self {
            Formula::Bbp => &BBP,
            Formula::Bellard => &BELLARD,
        }
    }

    /// The independent formula used to cross-check this one.
    pub fn other(self) -> Formula {
        match self {
            Formula::Bbp => Formula::Bellard,
            Formula::Bellard => Formula::Bbp,
        }
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Bbp => write!(f, "bbp"),
            Formula::Bellard => write!(f, "bellard"),
        }
    }
}

impl FromStr for Formula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bbp" => Ok(Formula::Bbp),
            "bellard" => Ok(Formula::Bellard),
            other => Err(format!("unknown formula '{}' (expected bbp or bellard)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bellard_sign_alternates() {
        let series = Formula::Bellard.series();
        let first = &series.terms[2];
        assert!(!series.is_negative(first, 0));
        assert!(series.is_negative(first, 1));
        assert!(!series.is_negative(first, 2));
    }

    #[test]
    fn test_bbp_exponent_steps_by_four() {
        let series = Formula::Bbp.series();
        let t = &series.terms[0];
        assert_eq!(series.exponent(t, 10, 0), 42);
        assert_eq!(series.exponent(t, 10, 10), 2);
        assert_eq!(series.exponent(t, 10, 11), -2);
    }

    #[test]
    fn test_formula_parse_round_trip() {
        for formula in [Formula::Bbp, Formula::Bellard] {
            assert_eq!(formula.to_string().parse::<Formula>(), Ok(formula));
        }
        assert_eq!("BELLARD".parse::<Formula>(), Ok(Formula::Bellard));
        assert!("plouffe".parse::<Formula>().is_err());
        assert_eq!(Formula::Bbp.other(), Formula::Bellard);
    }
}
