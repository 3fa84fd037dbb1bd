//! Parallel block batch computation

use crate::{DigitEngine, EngineError};
use rayon::prelude::*;
use shared_types::{BlockPosition, DigitBlock};

/// Compute a set of blocks across the rayon global pool
pub struct BlockBatchTask {
    pub positions: Vec<BlockPosition>,
}

impl BlockBatchTask {
    /// Contiguous run of `count` blocks starting at `first`.
    pub fn range(first: BlockPosition, count: u64) -> Self {
        Self {
            positions: (first..first.saturating_add(count)).collect(),
        }
    }

    /// Execute the batch. Results keep the order of `positions`; the first
    /// failing position aborts the batch.
    pub fn execute(self, engine: &DigitEngine) -> Result<Vec<DigitBlock>, EngineError> {
        if self.positions.is_empty() {
            return Ok(Vec::new());
        }

        self.positions
            .par_iter()
            .map(|&position| {
                engine
                    .compute_block(position)
                    .map(|digits| DigitBlock::new(position, digits))
            })
            .collect()
    }
}
