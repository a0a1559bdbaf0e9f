//! Suite configuration loaded from JSON.

use crate::errors::{ScoringError, ScoringResult};
use crate::harness::{
    COMPLETE_SET_TIMEOUT_SECONDS, RUNTIME_REPEATABLE_SECONDS, WARMUP_REPEATABLE_SECONDS,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the result file, both locally and in the export directory.
pub const RESULT_FILENAME: &str = "mlts_benchmark.csv";

/// Configuration of a scoring run. Missing fields take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Directory holding the result file while the suite runs.
    pub local_results_dir: PathBuf,
    /// Directory the finished result file is copied to for retrieval.
    pub export_dir: PathBuf,
    pub result_filename: String,
    pub warmup_seconds: f64,
    pub complete_set_timeout_seconds: f64,
    pub run_seconds: f64,
    pub accelerator_threads: Option<usize>,
    /// Caps the number of samples per model.
    pub dataset_limit: Option<usize>,
    /// Replaces the default list of scored models.
    pub models: Option<Vec<String>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            local_results_dir: PathBuf::from("data"),
            export_dir: PathBuf::from("export"),
            result_filename: RESULT_FILENAME.to_string(),
            warmup_seconds: WARMUP_REPEATABLE_SECONDS,
            complete_set_timeout_seconds: COMPLETE_SET_TIMEOUT_SECONDS,
            run_seconds: RUNTIME_REPEATABLE_SECONDS,
            accelerator_threads: None,
            dataset_limit: None,
            models: None,
        }
    }
}

impl ScoringConfig {
    pub fn local_results_path(&self) -> PathBuf {
        self.local_results_dir.join(&self.result_filename)
    }

    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(&self.result_filename)
    }

    /// Validates the configuration
    pub fn validate(&self) -> ScoringResult<()> {
        let invalid = |field: &str, message: &str| ScoringError::ConfigValidation {
            field: field.to_string(),
            message: message.to_string(),
        };

        if self.result_filename.trim().is_empty() {
            return Err(invalid("result_filename", "File name must not be empty"));
        }
        if self.result_filename.contains(['/', '\\']) {
            return Err(invalid(
                "result_filename",
                "File name must not contain path separators",
            ));
        }
        if !self.warmup_seconds.is_finite() || self.warmup_seconds < 0.0 {
            return Err(invalid(
                "warmup_seconds",
                "Warm-up must be a non-negative number of seconds",
            ));
        }
        if !self.complete_set_timeout_seconds.is_finite() || self.complete_set_timeout_seconds <= 0.0
        {
            return Err(invalid(
                "complete_set_timeout_seconds",
                "Timeout must be greater than 0",
            ));
        }
        if !self.run_seconds.is_finite() || self.run_seconds <= 0.0 {
            return Err(invalid("run_seconds", "Run time must be greater than 0"));
        }
        if self.accelerator_threads == Some(0) {
            return Err(invalid(
                "accelerator_threads",
                "Thread count must be greater than 0",
            ));
        }
        if self.dataset_limit == Some(0) {
            return Err(invalid("dataset_limit", "Limit must be greater than 0"));
        }
        if self.models.as_ref().is_some_and(Vec::is_empty) {
            return Err(invalid("models", "Model list must not be empty"));
        }

        Ok(())
    }
}

/// Configuration loader that handles JSON files with fallbacks
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a configuration file, falling back to defaults when it does not exist.
    pub fn load_config(path: impl AsRef<Path>) -> ScoringResult<ScoringConfig> {
        let path = path.as_ref();
        let config = match fs::read_to_string(path) {
            Ok(content) => {
                info!("Loading configuration from '{}'", path.display());
                serde_json::from_str(&content).map_err(|source| ScoringError::ConfigParse {
                    path: path.display().to_string(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Config file '{}' not found, using default configuration",
                    path.display()
                );
                ScoringConfig::default()
            }
            Err(e) => return Err(ScoringError::io(path, e)),
        };
        config.validate()?;
        Ok(config)
    }
}
