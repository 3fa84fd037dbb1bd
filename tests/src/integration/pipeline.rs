//! # Compute → Verify → Read Back
//!
//! Runs both passes over a fresh store and checks the stored digits against
//! published values of π, in hex and after decimal conversion.

#[cfg(test)]
mod tests {
    use super::super::*;
    use pi_01_digit_engine::{DigitEngine, EngineConfig, Formula, Precision};
    use pi_runtime::read_digits;
    use shared_types::{to_hex_string, BlockState};
    use std::sync::Arc;

    #[test]
    fn test_full_pipeline_reproduces_pi() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_store(&store_path(&dir), 144);
        assert_eq!(store.capacity(), 9);

        let orchestrator = orchestrator(store, 4, Schedule::Dynamic);
        let computed = orchestrator.compute_pass(None);
        assert_eq!(computed.succeeded, 9);
        assert!(computed.is_clean());

        let verified = orchestrator.verify_pass(None);
        assert_eq!(verified.succeeded, 9);
        assert_eq!(verified.mismatches, 0);

        let digits = read_digits(orchestrator.store(), 0, 144).unwrap();
        assert_eq!(to_hex_string(&digits), PI_HEX);

        let decimal = pi_03_converter::render_decimal(&digits[..48]).unwrap();
        assert_eq!(decimal, format!("3.{}", PI_DEC_48));
    }

    #[test]
    fn test_schedules_produce_identical_stores() {
        let mut outputs = Vec::new();
        for schedule in [Schedule::Static, Schedule::Dynamic] {
            let dir = tempfile::tempdir().unwrap();
            let orchestrator = orchestrator(create_store(&store_path(&dir), 40 * 16), 3, schedule);
            orchestrator.compute_pass(None);
            outputs.push(read_digits(orchestrator.store(), 0, 40 * 16).unwrap());
        }
        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn test_bellard_primary_verified_by_bbp() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_store(&store_path(&dir), 64);
        let mut config = runtime_config(2, Schedule::Dynamic);
        config.formula = Formula::Bellard;
        let orchestrator = pi_runtime::Orchestrator::new(Arc::new(store), &config).unwrap();
        assert_eq!(orchestrator.verifier().formula(), Formula::Bbp);

        orchestrator.compute_pass(None);
        let report = orchestrator.verify_pass(None);
        assert_eq!(report.succeeded, 4);
        assert!(orchestrator.store().stats().is_complete());
    }

    #[test]
    fn test_double_precision_engine_agrees_on_leading_blocks() {
        let double = DigitEngine::new(EngineConfig {
            precision: Precision::Double,
            ..EngineConfig::default()
        })
        .unwrap();
        let fixed = DigitEngine::new(EngineConfig::default()).unwrap();
        for position in 0..2 {
            assert_eq!(
                double.compute_block(position).unwrap(),
                fixed.compute_block(position).unwrap()
            );
        }
    }

    #[test]
    fn test_deep_block_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_store(&store_path(&dir), 101 * 16);
        let engine = DigitEngine::new(EngineConfig::default()).unwrap();

        store.write_computed(100, &engine.compute_block(100).unwrap()).unwrap();
        assert_eq!(store.state(100).unwrap(), BlockState::Computed);
        assert_eq!(to_hex_string(&store.read(100).unwrap()), "EAAD8E716B93D5A0");
    }

    #[test]
    fn test_concurrent_passes_share_one_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(create_store(&store_path(&dir), 60 * 16));
        let config = runtime_config(3, Schedule::Dynamic);

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let store = Arc::clone(&store);
                let config = config.clone();
                std::thread::spawn(move || {
                    pi_runtime::Orchestrator::new(store, &config)
                        .unwrap()
                        .compute_pass(None)
                })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            let report = handle.join().unwrap();
            assert!(report.is_clean());
            succeeded += report.succeeded;
        }
        assert_eq!(succeeded, 60);
        assert_eq!(store.stats().computed, 60);
    }
}
