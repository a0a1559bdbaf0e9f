use thiserror::Error;

/// Errors raised while executing a network on one of the backends.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Input size mismatch: expected {expected} f32 values, got {actual}")]
    InputSizeMismatch { expected: usize, actual: usize },

    #[error(
        "Batch size mismatch: {num_samples} samples need {expected} output values, got {actual}"
    )]
    OutputSizeMismatch {
        expected: usize,
        actual: usize,
        num_samples: usize,
    },

    #[error("Computation buffer too small: need {required} f32 values, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    #[error("Thread count must be at least 1, got {count}")]
    InvalidThreadCount { count: usize },

    #[error("Worker thread panicked during accelerated execution")]
    WorkerPanicked,

    #[error("Dataset for model '{model}' is empty")]
    EmptyDataset { model: String },
}

pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
