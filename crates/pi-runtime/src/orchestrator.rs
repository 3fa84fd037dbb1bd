//! # Orchestrator
//!
//! Wires the digit engine, the block store and the worker pool together.
//!
//! - **Compute pass**: reserve an Uncomputed block, compute it, record it.
//! - **Verify pass**: reserve a Computed block, recompute it with the
//!   verifier engine (the other formula by default) and mark it Checked if
//!   the digits agree. A disagreement is logged and counted; the block stays
//!   Computed.

use pi_01_digit_engine::{DigitEngine, EngineConfig};
use pi_02_block_store::{BlockStore, StoreError};
use shared_types::{BlockPosition, Nibble};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::RuntimeConfig;
use crate::errors::RuntimeError;
use crate::pool::{Outcome, PassKind, PassReport, WorkerPool};

pub struct Orchestrator {
    store: Arc<BlockStore>,
    engine: DigitEngine,
    verifier: DigitEngine,
    pool: WorkerPool,
}

impl Orchestrator {
    pub fn new(store: Arc<BlockStore>, config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let engine_config = EngineConfig {
            formula: config.formula,
            precision: config.precision,
            block_digits: store.block_digits(),
        };
        let engine = DigitEngine::new(engine_config)?;
        let verifier = DigitEngine::new(engine_config.verifier())?;
        let pool = WorkerPool::new(config.workers, config.schedule)?;

        if store.capacity() > engine.max_blocks() {
            warn!(
                capacity = store.capacity(),
                max_blocks = engine.max_blocks(),
                precision = %config.precision,
                "[pi-runtime] Store extends past the engine's supported range; trailing blocks will fail"
            );
        }

        Ok(Self {
            store,
            engine,
            verifier,
            pool,
        })
    }

    pub fn store(&self) -> &Arc<BlockStore> {
        &self.store
    }

    pub fn engine(&self) -> &DigitEngine {
        &self.engine
    }

    pub fn verifier(&self) -> &DigitEngine {
        &self.verifier
    }

    /// Compute up to `limit` Uncomputed blocks (all of them when `None`).
    pub fn compute_pass(&self, limit: Option<u64>) -> PassReport {
        info!(
            workers = self.pool.workers(),
            schedule = %self.pool.schedule(),
            formula = %self.engine.formula(),
            "[pi-runtime] Compute pass started"
        );
        let report = self
            .pool
            .run(&self.store, PassKind::Compute, limit, |position| {
                self.compute_one(position)
            });
        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            duplicates = report.duplicates,
            failed = report.failed,
            "[pi-runtime] Compute pass finished"
        );
        report
    }

    /// Verify up to `limit` Computed blocks (all of them when `None`).
    pub fn verify_pass(&self, limit: Option<u64>) -> PassReport {
        info!(
            workers = self.pool.workers(),
            schedule = %self.pool.schedule(),
            formula = %self.verifier.formula(),
            "[pi-runtime] Verify pass started"
        );
        let report = self
            .pool
            .run(&self.store, PassKind::Verify, limit, |position| {
                self.verify_one(position)
            });
        info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            mismatches = report.mismatches,
            failed = report.failed,
            "[pi-runtime] Verify pass finished"
        );
        report
    }

    fn compute_one(&self, position: BlockPosition) -> Outcome {
        let digits = match self.engine.compute_block(position) {
            Ok(digits) => digits,
            Err(e) => {
                error!(position, error = %e, "[pi-runtime] Block computation failed");
                return Outcome::Failed;
            }
        };

        match self.store.write_computed(position, &digits) {
            Ok(()) => {
                debug!(position, "[pi-runtime] Block computed");
                Outcome::Succeeded
            }
            Err(StoreError::AlreadyComputed { .. }) => {
                warn!(position, "[pi-runtime] Block was already computed");
                Outcome::Duplicate
            }
            Err(e) => {
                error!(position, error = %e, "[pi-runtime] Failed to record block");
                Outcome::Failed
            }
        }
    }

    fn verify_one(&self, position: BlockPosition) -> Outcome {
        let stored = match self.store.read(position) {
            Ok(digits) => digits,
            Err(e) => {
                error!(position, error = %e, "[pi-runtime] Failed to read block");
                return Outcome::Failed;
            }
        };
        let expected = match self.verifier.compute_block(position) {
            Ok(digits) => digits,
            Err(e) => {
                error!(position, error = %e, "[pi-runtime] Verification computation failed");
                return Outcome::Failed;
            }
        };

        if stored != expected {
            error!(
                position,
                stored = %shared_types::to_hex_string(&stored),
                expected = %shared_types::to_hex_string(&expected),
                "[pi-runtime] Verification mismatch"
            );
            return Outcome::Mismatch;
        }

        match self.store.write_checked(position) {
            Ok(()) => {
                debug!(position, "[pi-runtime] Block checked");
                Outcome::Succeeded
            }
            Err(StoreError::AlreadyChecked { .. }) => {
                warn!(position, "[pi-runtime] Block was already checked");
                Outcome::Duplicate
            }
            Err(e) => {
                error!(position, error = %e, "[pi-runtime] Failed to record check");
                Outcome::Failed
            }
        }
    }
}

/// Stored digits at hex offsets `[offset, offset + count)`.
///
/// Every block touched must be computed.
pub fn read_digits(
    store: &BlockStore,
    offset: u64,
    count: u64,
) -> Result<Vec<Nibble>, RuntimeError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let block_digits = store.block_digits() as u64;
    let capacity = store.capacity();
    let end = match offset.checked_add(count) {
        Some(end) if end <= capacity.saturating_mul(block_digits) => end,
        _ => {
            return Err(StoreError::ReadOutOfBounds {
                position: offset.saturating_add(count - 1) / block_digits,
                capacity,
            }
            .into())
        }
    };
    let first = offset / block_digits;
    let last = (end - 1) / block_digits;

    let mut digits = Vec::with_capacity(count as usize);
    for position in first..=last {
        let block = store.read(position)?;
        let block_start = position * block_digits;
        let from = offset.saturating_sub(block_start) as usize;
        let to = (end - block_start).min(block_digits) as usize;
        digits.extend_from_slice(&block[from..to]);
    }
    Ok(digits)
}
