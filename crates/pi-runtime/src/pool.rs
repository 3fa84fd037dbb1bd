//! # Worker Pool
//!
//! A dedicated rayon pool that drives one job over store positions.
//!
//! - `Static`: `[0, capacity)` is cut into one contiguous range per worker;
//!   each worker walks its range and skips positions not in the wanted state.
//! - `Dynamic`: each worker reserves positions from the store until the store
//!   reports exhaustion.
//!
//! An optional limit caps the number of positions attempted across all
//! workers.

use pi_02_block_store::{BlockStore, StoreError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shared_types::{BlockPosition, BlockState};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Schedule;
use crate::errors::RuntimeError;

/// Which transition a pass drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Uncomputed → Computed
    Compute,
    /// Computed → Checked
    Verify,
}

impl PassKind {
    fn wanted(self) -> BlockState {
        match self {
            PassKind::Compute => BlockState::Uncomputed,
            PassKind::Verify => BlockState::Computed,
        }
    }

    fn reserve(self, store: &BlockStore) -> Result<BlockPosition, StoreError> {
        match self {
            PassKind::Compute => store.read_uncomputed(),
            PassKind::Verify => store.read_unchecked(),
        }
    }
}

/// Result of one job on one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// Another writer got there first.
    Duplicate,
    /// Recomputed digits disagree with the stored ones.
    Mismatch,
    Failed,
}

/// Totals for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub attempted: u64,
    pub succeeded: u64,
    pub duplicates: u64,
    pub mismatches: u64,
    pub failed: u64,
}

impl PassReport {
    fn record(&mut self, outcome: Outcome) {
        self.attempted += 1;
        match outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Duplicate => self.duplicates += 1,
            Outcome::Mismatch => self.mismatches += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    fn merge(mut self, other: PassReport) -> PassReport {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.duplicates += other.duplicates;
        self.mismatches += other.mismatches;
        self.failed += other.failed;
        self
    }

    /// No position failed or mismatched.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.mismatches == 0
    }
}

/// Shared countdown of positions a pass may still attempt.
struct Budget(Option<AtomicU64>);

impl Budget {
    fn new(limit: Option<u64>) -> Self {
        Self(limit.map(AtomicU64::new))
    }

    fn take(&self) -> bool {
        match &self.0 {
            None => true,
            Some(left) => left
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok(),
        }
    }

    fn refund(&self) {
        if let Some(left) = &self.0 {
            left.fetch_add(1, Ordering::AcqRel);
        }
    }
}

pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
    schedule: Schedule,
}

impl WorkerPool {
    pub fn new(workers: usize, schedule: Schedule) -> Result<Self, RuntimeError> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pi-worker-{}", i))
            .build()
            .map_err(|e| RuntimeError::Pool(e.to_string()))?;
        Ok(Self {
            pool,
            workers,
            schedule,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Run `job` over positions in the state `kind` starts from.
    ///
    /// In dynamic mode the job receives a reserved position. The pool
    /// releases every reservation the job did not turn into a transition.
    pub fn run<F>(&self, store: &BlockStore, kind: PassKind, limit: Option<u64>, job: F) -> PassReport
    where
        F: Fn(BlockPosition) -> Outcome + Sync,
    {
        let budget = Budget::new(limit);
        let workers = self.workers as u64;

        self.pool.install(|| match self.schedule {
            Schedule::Static => {
                let capacity = store.capacity();
                let chunk = capacity.div_ceil(workers).max(1);
                (0..workers)
                    .into_par_iter()
                    .map(|worker| {
                        let start = (worker * chunk).min(capacity);
                        let end = (start + chunk).min(capacity);
                        static_worker(store, kind, start..end, &budget, &job)
                    })
                    .reduce(PassReport::default, PassReport::merge)
            }
            Schedule::Dynamic => {
                let (report, unfinished) = (0..workers)
                    .into_par_iter()
                    .map(|_| dynamic_worker(store, kind, &budget, &job))
                    .reduce(
                        || (PassReport::default(), Vec::new()),
                        |(a, mut held), (b, more)| {
                            held.extend(more);
                            (a.merge(b), held)
                        },
                    );
                // Held until every worker stops, so no position is retried
                // within the pass.
                for position in unfinished {
                    store.release(position);
                }
                report
            }
        })
    }
}

fn static_worker<F>(
    store: &BlockStore,
    kind: PassKind,
    range: std::ops::Range<BlockPosition>,
    budget: &Budget,
    job: &F,
) -> PassReport
where
    F: Fn(BlockPosition) -> Outcome,
{
    let mut report = PassReport::default();
    for position in range {
        match store.state(position) {
            Ok(state) if state == kind.wanted() => {}
            _ => continue,
        }
        if !budget.take() {
            break;
        }
        report.record(job(position));
    }
    report
}

/// Returns the report and the positions still reserved by this worker.
fn dynamic_worker<F>(
    store: &BlockStore,
    kind: PassKind,
    budget: &Budget,
    job: &F,
) -> (PassReport, Vec<BlockPosition>)
where
    F: Fn(BlockPosition) -> Outcome,
{
    let mut report = PassReport::default();
    let mut unfinished = Vec::new();
    while budget.take() {
        match kind.reserve(store) {
            Ok(position) => {
                let outcome = job(position);
                if outcome != Outcome::Succeeded {
                    unfinished.push(position);
                }
                report.record(outcome);
            }
            Err(e) => {
                budget.refund();
                if !e.is_exhausted() {
                    tracing::error!(error = %e, "[pi-runtime] Work allocation failed");
                }
                break;
            }
        }
    }
    (report, unfinished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pi_02_block_store::StoreConfig;

    fn store(blocks: u64) -> (tempfile::TempDir, BlockStore) {
        let dir = tempfile::tempdir().unwrap();
        let store =
            BlockStore::create_with(dir.path().join("pi.db"), blocks * 16, StoreConfig::for_testing())
                .unwrap();
        (dir, store)
    }

    fn write_zero(store: &BlockStore) -> impl Fn(BlockPosition) -> Outcome + Sync + '_ {
        move |position| match store.write_computed(position, &[0; 16]) {
            Ok(()) => Outcome::Succeeded,
            Err(StoreError::AlreadyComputed { .. }) => Outcome::Duplicate,
            Err(_) => Outcome::Failed,
        }
    }

    #[test]
    fn test_both_schedules_cover_every_position() {
        for schedule in [Schedule::Static, Schedule::Dynamic] {
            let (_dir, store) = store(37);
            store.write_computed(5, &[1; 16]).unwrap();
            let pool = WorkerPool::new(4, schedule).unwrap();

            let report = pool.run(&store, PassKind::Compute, None, write_zero(&store));
            assert_eq!(report.attempted, 36, "{}", schedule);
            assert_eq!(report.succeeded, 36, "{}", schedule);
            assert_eq!(store.stats().computed, 37);
            assert_eq!(store.stats().claimed, 0);
        }
    }

    #[test]
    fn test_limit_caps_attempts() {
        for schedule in [Schedule::Static, Schedule::Dynamic] {
            let (_dir, store) = store(50);
            let pool = WorkerPool::new(3, schedule).unwrap();
            let report = pool.run(&store, PassKind::Compute, Some(7), write_zero(&store));
            assert_eq!(report.attempted, 7, "{}", schedule);
            assert_eq!(store.stats().computed, 7);
        }
    }

    #[test]
    fn test_more_workers_than_blocks() {
        let (_dir, store) = store(2);
        let pool = WorkerPool::new(8, Schedule::Static).unwrap();
        let report = pool.run(&store, PassKind::Compute, None, write_zero(&store));
        assert_eq!(report.succeeded, 2);
    }

    #[test]
    fn test_failing_positions_are_not_retried() {
        let (_dir, store) = store(6);
        let pool = WorkerPool::new(2, Schedule::Dynamic).unwrap();
        let report = pool.run(&store, PassKind::Compute, None, |_| Outcome::Failed);
        assert_eq!(report.attempted, 6);
        assert_eq!(report.failed, 6);
        assert_eq!(store.stats().claimed, 0);
        assert_eq!(store.stats().computed, 0);
    }

    #[test]
    fn test_report_merge() {
        let mut a = PassReport::default();
        a.record(Outcome::Succeeded);
        a.record(Outcome::Mismatch);
        let mut b = PassReport::default();
        b.record(Outcome::Duplicate);
        let merged = a.merge(b);
        assert_eq!(merged.attempted, 3);
        assert!(!merged.is_clean());
    }
}
