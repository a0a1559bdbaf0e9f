use thiserror::Error;

use super::{ExecutionError, ModelError};

/// Top-level error for the scoring suite, its configuration and result files.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write CSV results to '{path}': {source}")]
    Csv { path: String, source: csv::Error },

    #[error("Failed to parse configuration file '{path}': {source}")]
    ConfigParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Configuration validation error for field '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Benchmark '{test_name}' finished without producing a result")]
    MissingResult { test_name: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl ScoringError {
    /// Wraps an IO error together with the path it occurred on.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        ScoringError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Returns true when the error is an IO failure caused by missing write permission.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            ScoringError::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }
}

pub type ScoringResult<T> = std::result::Result<T, ScoringError>;
