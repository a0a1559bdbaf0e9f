//! Error types for the scoring suite.
//!
//! Each concern gets its own error enum instead of a generic wrapper like
//! `anyhow` or `Box<dyn Error>`: the model registry, backend execution, and
//! the suite itself (configuration, result files and storage).

mod execution_error;
mod model_error;
mod scoring_error;

pub use execution_error::{ExecutionError, ExecutionResult};
pub use model_error::{ModelError, ModelResult};
pub use scoring_error::{ScoringError, ScoringResult};
