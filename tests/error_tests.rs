//! Tests for the error types of the scoring suite.
//!
//! Covers the error variants raised by network construction, execution and
//! the suite-level IO paths.

use nn_scoring::errors::{ExecutionError, ModelError, ScoringError};
use nn_scoring::models::{ModelEntry, ModelFamily, Precision};
use nn_scoring::network::LayerParameters;
use nn_scoring::{ModelRegistry, ReferenceNetwork};
use std::error::Error;
use std::io;

#[cfg(test)]
mod network_error_tests {
    use super::*;

    #[test]
    fn test_computation_buffer_size_exceeds_limit() {
        // A single 1x1_000_001 layer pushes the unified buffer past its limit
        let units = 1_000_001;
        let layers = vec![LayerParameters {
            weights: vec![vec![0.0]; units],
            bias: vec![0.0; units],
            activation: None,
        }];

        let result = ReferenceNetwork::from_parameters("huge", 1, layers, Precision::Float32);
        assert!(matches!(
            result,
            Err(ModelError::InvalidModelSpec { ref name, .. }) if name == "huge"
        ));
    }

    fn mobilenet_entry(width_multiplier: f32, resolution: usize) -> ModelEntry {
        ModelEntry {
            name: "mobilenet_custom".to_string(),
            family: ModelFamily::MobilenetV1,
            width_multiplier,
            resolution: Some(resolution),
            precision: Precision::Float32,
            seed: 1,
            dataset_size: 4,
        }
    }

    #[test]
    fn test_unbounded_width_is_rejected_at_registration() {
        for width in [1e30, f32::MAX, 100.0] {
            let result = ModelRegistry::from_entries(vec![mobilenet_entry(width, 224)]);
            assert!(
                matches!(result, Err(ModelError::InvalidModelSpec { ref name, .. }) if name == "mobilenet_custom"),
                "width {} was accepted",
                width
            );
        }
    }

    #[test]
    fn test_unbounded_resolution_is_rejected_at_registration() {
        for resolution in [usize::MAX, 1 << 20] {
            let result = ModelRegistry::from_entries(vec![mobilenet_entry(1.0, resolution)]);
            assert!(matches!(result, Err(ModelError::InvalidModelSpec { .. })));
        }
    }

    #[test]
    fn test_oversized_entry_fails_before_weights_are_generated() {
        let wide = mobilenet_entry(1e30, 224);
        assert!(matches!(
            ReferenceNetwork::build(&wide, Precision::Float32),
            Err(ModelError::InvalidModelSpec { .. })
        ));

        // 588 inputs into 51200 hidden units is far over the weight limit.
        let heavy = mobilenet_entry(100.0, 224);
        let err = ReferenceNetwork::build(&heavy, Precision::Quant8)
            .err()
            .unwrap();
        assert!(err.to_string().contains("Weight size"));
    }

    #[test]
    fn test_no_layers() {
        let result = ReferenceNetwork::from_parameters("empty", 4, Vec::new(), Precision::Quant8);
        let err = result.err().unwrap();
        assert_eq!(
            err.to_string(),
            "Invalid model definition for 'empty': No layers provided"
        );
    }

    #[test]
    fn test_bias_weights_mismatch() {
        let layers = vec![LayerParameters {
            weights: vec![vec![1.0, 2.0]],
            bias: vec![0.0, 0.0],
            activation: None,
        }];
        assert!(ReferenceNetwork::from_parameters("m", 2, layers, Precision::Float32).is_err());
    }

    #[test]
    fn test_zero_feature_size() {
        let layers = vec![LayerParameters {
            weights: vec![vec![]],
            bias: vec![0.0],
            activation: None,
        }];
        assert!(ReferenceNetwork::from_parameters("m", 0, layers, Precision::Float32).is_err());
    }
}

#[cfg(test)]
mod execution_error_tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ExecutionError::InputSizeMismatch {
                expected: 6,
                actual: 5
            }
            .to_string(),
            "Input size mismatch: expected 6 f32 values, got 5"
        );
        assert_eq!(
            ExecutionError::InvalidThreadCount { count: 0 }.to_string(),
            "Thread count must be at least 1, got 0"
        );
        assert_eq!(
            ExecutionError::EmptyDataset {
                model: "tts_float".to_string()
            }
            .to_string(),
            "Dataset for model 'tts_float' is empty"
        );
    }
}

#[cfg(test)]
mod scoring_error_tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_path_and_source() {
        let err = ScoringError::io(
            "/sdcard",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_permission_denied());
        assert_eq!(err.to_string(), "IO error on '/sdcard': denied");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_other_io_errors_are_not_permission_errors() {
        let err = ScoringError::io("/data", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(!err.is_permission_denied());
    }

    #[test]
    fn test_model_errors_convert_transparently() {
        let err: ScoringError = ModelError::UnknownModel {
            name: "x".to_string(),
        }
        .into();
        assert!(matches!(err, ScoringError::Model(_)));
        assert_eq!(err.to_string(), "Unknown model: 'x'");
    }

    #[test]
    fn test_execution_errors_convert_transparently() {
        let err: ScoringError = ExecutionError::WorkerPanicked.into();
        assert!(matches!(err, ScoringError::Execution(_)));
        assert_eq!(
            err.to_string(),
            "Worker thread panicked during accelerated execution"
        );
    }
}
