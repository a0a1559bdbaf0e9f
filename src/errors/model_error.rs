use thiserror::Error;

/// Errors raised while building or querying the model registry.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown model: '{name}'")]
    UnknownModel { name: String },

    #[error("Model '{name}' is registered more than once")]
    DuplicateModel { name: String },

    #[error("Invalid model definition for '{name}': {message}")]
    InvalidModelSpec { name: String, message: String },

    #[error("Failed to read model catalog '{path}': {source}")]
    CatalogRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse model catalog '{path}': {source}")]
    CatalogParse {
        path: String,
        source: serde_json::Error,
    },
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;
