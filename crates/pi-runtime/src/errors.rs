//! Runtime errors.

use pi_01_digit_engine::EngineError;
use pi_02_block_store::StoreError;
use pi_03_converter::ConvertError;
use thiserror::Error;

/// Exit status for failures that are not store errors.
pub const GENERIC_EXIT_CODE: i32 = 1;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to build worker pool: {0}")]
    Pool(String),
}

impl RuntimeError {
    /// Process exit status: the store's per-kind code, or 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::Store(e) => e.kind().exit_code(),
            _ => GENERIC_EXIT_CODE,
        }
    }
}
