//! # PI-01: Digit Engine
//!
//! Stateless extraction of hexadecimal digits of π at arbitrary offsets,
//! without computing any preceding digit.
//!
//! ## Algorithm
//!
//! For hex offset `n` the engine evaluates `frac(16^n · π)` from a BBP-family
//! series (see [`formula`]): the head `Σ_{k: e≥0} (2^e mod d) / d` uses fast
//! modular exponentiation, the tail `Σ 2^e / d` (e < 0) ends once a summand
//! falls below the backend's epsilon. The fraction's leading nibbles are the
//! digits at `n, n+1, ...`.
//!
//! ## Precision Strategies
//!
//! | Precision | Epsilon | Nibbles / evaluation | Max offset |
//! |-----------|---------|----------------------|------------|
//! | `Fixed128` (default) | 2⁻¹²⁸ | 8 | 2⁴⁴ |
//! | `Double` | 1e-17 | 1 | 10⁷ |
//!
//! Offsets past the documented maximum are rejected with
//! [`EngineError::OffsetOutOfRange`]; the block store's capacity should be
//! sized so that callers never reach them.
//!
//! ## Concurrency
//!
//! `DigitEngine` is `Send + Sync` and holds no mutable state. Any number of
//! threads may call it concurrently on any offsets.
//!
//! ## Usage
//!
//! ```rust
//! use pi_01_digit_engine::{DigitEngine, EngineConfig};
//!
//! let engine = DigitEngine::new(EngineConfig::default()).unwrap();
//! let block = engine.compute_block(0).unwrap();
//! assert_eq!(block[..4], [0x2, 0x4, 0x3, 0xF]);
//! ```

pub mod arith;
pub mod backends;
pub mod formula;
#[cfg(feature = "parallel")]
pub mod tasks;

pub use formula::Formula;

use serde::{Deserialize, Serialize};
use shared_types::{BlockPosition, Nibble, DEFAULT_BLOCK_DIGITS};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Largest block size the engine accepts.
pub const MAX_BLOCK_DIGITS: u32 = 4096;

/// Arithmetic used to accumulate the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// 0.128 binary fixed point with exact 128-bit integer kernels
    #[default]
    Fixed128,
    /// IEEE-754 binary64
    Double,
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precision::Fixed128 => write!(f, "fixed128"),
            Precision::Double => write!(f, "double"),
        }
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed128" | "fixed" => Ok(Precision::Fixed128),
            "double" | "f64" => Ok(Precision::Double),
            other => Err(format!(
                "unknown precision '{}' (expected fixed128 or double)",
                other
            )),
        }
    }
}

/// Digit engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Offset {offset} exceeds the supported maximum {max} for this precision")]
    OffsetOutOfRange { offset: u64, max: u64 },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Backend description
#[derive(Debug, Clone)]
pub struct BackendInfo {
    pub name: String,
    pub precision: Precision,
    /// Smallest summand magnitude that still contributes.
    pub epsilon: f64,
    /// Largest hex offset with a correctness guarantee.
    pub max_offset: u64,
    /// Leading nibbles of one evaluation that are guaranteed correct.
    pub nibbles_per_evaluation: usize,
}

/// Series backend trait - implemented by every precision strategy
pub trait SeriesBackend: Send + Sync {
    fn precision(&self) -> Precision;

    fn info(&self) -> &BackendInfo;

    /// `frac(16^offset · π)` as a 0.128 fixed-point fraction.
    ///
    /// Only the leading `info().nibbles_per_evaluation` nibbles are
    /// meaningful.
    fn fraction_at(&self, formula: Formula, offset: u64) -> u128;
}

/// Create the backend for a precision strategy
pub fn create_backend(precision: Precision) -> Arc<dyn SeriesBackend> {
    match precision {
        Precision::Fixed128 => Arc::new(backends::fixed::Fixed128Backend::new()),
        Precision::Double => Arc::new(backends::double::DoubleBackend::new()),
    }
}

/// Engine configuration, fixed for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub formula: Formula,
    pub precision: Precision,
    /// Digits per block.
    pub block_digits: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            formula: Formula::Bbp,
            precision: Precision::Fixed128,
            block_digits: DEFAULT_BLOCK_DIGITS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.block_digits == 0 || self.block_digits > MAX_BLOCK_DIGITS {
            return Err(EngineError::InvalidConfig(format!(
                "block_digits must be in 1..={}, got {}",
                MAX_BLOCK_DIGITS, self.block_digits
            )));
        }
        Ok(())
    }

    /// The same configuration with the cross-checking formula.
    pub fn verifier(&self) -> Self {
        Self {
            formula: self.formula.other(),
            ..*self
        }
    }
}

/// Block-oriented digit extraction engine.
#[derive(Clone)]
pub struct DigitEngine {
    backend: Arc<dyn SeriesBackend>,
    config: EngineConfig,
}

impl std::fmt::Debug for DigitEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitEngine")
            .field("backend", &self.backend.info().name)
            .field("config", &self.config)
            .finish()
    }
}

impl DigitEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let backend = create_backend(config.precision);
        tracing::debug!(
            formula = %config.formula,
            backend = %backend.info().name,
            max_offset = backend.info().max_offset,
            "[pi-01] Digit engine ready"
        );
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn formula(&self) -> Formula {
        self.config.formula
    }

    pub fn precision(&self) -> Precision {
        self.config.precision
    }

    pub fn block_digits(&self) -> u32 {
        self.config.block_digits
    }

    pub fn backend_info(&self) -> &BackendInfo {
        self.backend.info()
    }

    /// Largest hex offset this engine will compute.
    pub fn max_offset(&self) -> u64 {
        self.backend.info().max_offset
    }

    /// Number of whole blocks that lie inside the supported offset range.
    pub fn max_blocks(&self) -> u64 {
        (self.max_offset() + 1) / self.config.block_digits as u64
    }

    /// Digits at hex offsets `[offset, offset + count)`.
    pub fn compute_digits(&self, offset: u64, count: usize) -> Result<Vec<Nibble>, EngineError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let max = self.max_offset();
        let last = offset.saturating_add(count as u64 - 1);
        if last > max {
            return Err(EngineError::OffsetOutOfRange { offset: last, max });
        }

        let stride = self.backend.info().nibbles_per_evaluation;
        let mut digits = Vec::with_capacity(count);
        let mut cursor = offset;
        while digits.len() < count {
            let fraction = self.backend.fraction_at(self.config.formula, cursor);
            let take = stride.min(count - digits.len());
            digits.extend((0..take).map(|i| arith::nibble_at(fraction, i)));
            cursor += take as u64;
        }
        Ok(digits)
    }

    /// The single digit at `offset`.
    pub fn compute_digit(&self, offset: u64) -> Result<Nibble, EngineError> {
        let fraction = self.fraction_checked(offset)?;
        Ok(arith::nibble_at(fraction, 0))
    }

    /// Digits of block `position`: hex offsets `[p·B, p·B + B)`.
    pub fn compute_block(&self, position: BlockPosition) -> Result<Vec<Nibble>, EngineError> {
        let block_digits = self.config.block_digits as u64;
        let offset = position
            .checked_mul(block_digits)
            .ok_or(EngineError::OffsetOutOfRange {
                offset: u64::MAX,
                max: self.max_offset(),
            })?;
        self.compute_digits(offset, block_digits as usize)
    }

    fn fraction_checked(&self, offset: u64) -> Result<u128, EngineError> {
        let max = self.max_offset();
        if offset > max {
            return Err(EngineError::OffsetOutOfRange { offset, max });
        }
        Ok(self.backend.fraction_at(self.config.formula, offset))
    }
}
