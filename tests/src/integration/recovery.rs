//! # Interruption and Migration
//!
//! A store must resume exactly where a previous process stopped, keep every
//! recorded block across a resize, and never hand out work twice.

#[cfg(test)]
mod tests {
    use super::super::*;
    use pi_02_block_store::ErrorKind;
    use pi_runtime::read_digits;
    use shared_types::{to_hex_string, BlockState};

    #[test]
    fn test_resume_after_interruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let first = orchestrator(create_store(&path, 20 * 16), 2, Schedule::Dynamic);
        assert_eq!(first.compute_pass(Some(8)).succeeded, 8);
        drop(first);

        let second = orchestrator(open_store(&path), 4, Schedule::Static);
        assert_eq!(second.store().stats().computed, 8);
        let report = second.compute_pass(None);
        assert_eq!(report.attempted, 12);
        assert_eq!(report.duplicates, 0);

        let digits = read_digits(second.store(), 0, 144).unwrap();
        assert_eq!(to_hex_string(&digits), PI_HEX);
    }

    #[test]
    fn test_verification_progress_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let first = orchestrator(create_store(&path, 10 * 16), 2, Schedule::Dynamic);
        first.compute_pass(None);
        assert_eq!(first.verify_pass(Some(4)).succeeded, 4);
        drop(first);

        let store = open_store(&path);
        let stats = store.stats();
        assert_eq!((stats.computed, stats.checked), (6, 4));
        let second = orchestrator(store, 2, Schedule::Dynamic);
        assert_eq!(second.verify_pass(None).succeeded, 6);
        assert!(second.store().stats().is_complete());
    }

    #[test]
    fn test_grow_then_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let store = create_store(&path, 4 * 16);
        let orchestrator = orchestrator(store, 2, Schedule::Dynamic);
        orchestrator.compute_pass(None);
        orchestrator.verify_pass(None);

        orchestrator.store().migrate(9 * 16).unwrap();
        assert_eq!(orchestrator.store().capacity(), 9);
        assert_eq!(orchestrator.store().state(3).unwrap(), BlockState::Checked);
        assert_eq!(orchestrator.store().state(4).unwrap(), BlockState::Uncomputed);

        assert_eq!(orchestrator.compute_pass(None).succeeded, 5);
        assert_eq!(orchestrator.verify_pass(None).succeeded, 5);
        let digits = read_digits(orchestrator.store(), 0, 144).unwrap();
        assert_eq!(to_hex_string(&digits), PI_HEX);
    }

    #[test]
    fn test_shrink_drops_tail_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let orchestrator = orchestrator(create_store(&path, 9 * 16), 2, Schedule::Static);
        orchestrator.compute_pass(None);
        orchestrator.store().migrate(5 * 16).unwrap();

        assert_eq!(orchestrator.store().capacity(), 5);
        let digits = read_digits(orchestrator.store(), 0, 80).unwrap();
        assert_eq!(to_hex_string(&digits), &PI_HEX[..80]);
        assert_eq!(
            read_digits(orchestrator.store(), 80, 1).unwrap_err().exit_code(),
            ErrorKind::ReadOutOfBounds.exit_code()
        );
    }

    #[test]
    fn test_reservations_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let store = create_store(&path, 3 * 16);
        let claimed = store.read_uncomputed().unwrap();
        assert_eq!(store.stats().claimed, 1);
        drop(store);

        let store = open_store(&path);
        assert_eq!(store.stats().claimed, 0);
        assert_eq!(store.read_uncomputed().unwrap(), claimed);
    }
}
