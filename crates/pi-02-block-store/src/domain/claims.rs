//! # Work Reservations
//!
//! `read_uncomputed` and `read_unchecked` hand out a position and claim it
//! in memory, so concurrent workers never receive the same position. Claims
//! are released by the matching write or by an explicit release, and are
//! never persisted: after a restart every unfinished position is available
//! again.
//!
//! Each kind keeps a cursor. Every position below the compute cursor is
//! computed or claimed for computing; every position below the check cursor
//! is checked, claimed for checking, or was uncomputed when it was passed.
//! The last case is why a successful compute pulls the check cursor back.

use shared_types::BlockPosition;
use std::collections::HashSet;

/// What a claim reserves a position for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimKind {
    Compute,
    Check,
}

#[derive(Debug, Default)]
pub struct Claims {
    computing: HashSet<BlockPosition>,
    checking: HashSet<BlockPosition>,
    compute_cursor: BlockPosition,
    check_cursor: BlockPosition,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, kind: ClaimKind) -> &HashSet<BlockPosition> {
        match kind {
            ClaimKind::Compute => &self.computing,
            ClaimKind::Check => &self.checking,
        }
    }

    pub fn cursor(&self, kind: ClaimKind) -> BlockPosition {
        match kind {
            ClaimKind::Compute => self.compute_cursor,
            ClaimKind::Check => self.check_cursor,
        }
    }

    pub fn is_claimed(&self, kind: ClaimKind, position: BlockPosition) -> bool {
        self.set(kind).contains(&position)
    }

    /// Record a claim found by a scan that started at the cursor.
    pub fn claim(&mut self, kind: ClaimKind, position: BlockPosition) {
        match kind {
            ClaimKind::Compute => {
                self.computing.insert(position);
                self.compute_cursor = self.compute_cursor.max(position + 1);
            }
            ClaimKind::Check => {
                self.checking.insert(position);
                self.check_cursor = self.check_cursor.max(position + 1);
            }
        }
    }

    /// A scan from the cursor found nothing: nothing below `end` is free.
    pub fn exhausted(&mut self, kind: ClaimKind, end: BlockPosition) {
        match kind {
            ClaimKind::Compute => self.compute_cursor = end,
            ClaimKind::Check => self.check_cursor = end,
        }
    }

    /// The position was computed.
    pub fn completed_compute(&mut self, position: BlockPosition) {
        self.computing.remove(&position);
        self.check_cursor = self.check_cursor.min(position);
    }

    /// The position was checked.
    pub fn completed_check(&mut self, position: BlockPosition) {
        self.checking.remove(&position);
    }

    /// Drop any claim on `position`. Returns whether one existed.
    pub fn release(&mut self, position: BlockPosition) -> bool {
        let computing = self.computing.remove(&position);
        let checking = self.checking.remove(&position);
        if computing {
            self.compute_cursor = self.compute_cursor.min(position);
        }
        if checking {
            self.check_cursor = self.check_cursor.min(position);
        }
        computing || checking
    }

    /// Forget claims at or above `capacity` and rescan from the start.
    pub fn truncate(&mut self, capacity: u64) {
        self.computing.retain(|&p| p < capacity);
        self.checking.retain(|&p| p < capacity);
        self.compute_cursor = 0;
        self.check_cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.computing.len() + self.checking.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_advances_cursor() {
        let mut claims = Claims::new();
        claims.claim(ClaimKind::Compute, 3);
        assert_eq!(claims.cursor(ClaimKind::Compute), 4);
        assert!(claims.is_claimed(ClaimKind::Compute, 3));
        assert!(!claims.is_claimed(ClaimKind::Check, 3));
    }

    #[test]
    fn test_release_rewinds_cursor() {
        let mut claims = Claims::new();
        claims.claim(ClaimKind::Compute, 0);
        claims.claim(ClaimKind::Compute, 1);
        assert!(claims.release(0));
        assert!(!claims.release(0));
        assert_eq!(claims.cursor(ClaimKind::Compute), 0);
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn test_compute_rewinds_check_cursor() {
        let mut claims = Claims::new();
        claims.exhausted(ClaimKind::Check, 10);
        claims.completed_compute(4);
        assert_eq!(claims.cursor(ClaimKind::Check), 4);
    }

    #[test]
    fn test_truncate_drops_high_claims() {
        let mut claims = Claims::new();
        claims.claim(ClaimKind::Compute, 2);
        claims.claim(ClaimKind::Check, 8);
        claims.truncate(5);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims.cursor(ClaimKind::Compute), 0);
    }
}
