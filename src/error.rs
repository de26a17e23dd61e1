//! Error types for the burnout predictor

use thiserror::Error;

/// Result type alias for burnout predictor operations
pub type Result<T> = std::result::Result<T, BurnoutError>;

/// Main error type for training and inference
#[derive(Error, Debug)]
pub enum BurnoutError {
    /// A record field is missing, mistyped or out of domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A categorical value was never seen while the encoder was fitted
    #[error("Invalid value for {column}: {value}. Valid values are: {valid_values:?}")]
    UnknownCategory {
        column: String,
        value: String,
        valid_values: Vec<String>,
    },

    /// Artifacts disagree with each other or with the fixed feature layout
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The training dataset does not have the expected shape
    #[error("Dataset schema error: {0}")]
    SchemaError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Artifact error ({path}): {reason}")]
    ArtifactError { path: String, reason: String },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl BurnoutError {
    /// Whether the error was caused by the caller's input rather than by the
    /// service or its artifacts.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            BurnoutError::InvalidInput(_) | BurnoutError::UnknownCategory { .. }
        )
    }
}

impl From<polars::error::PolarsError> for BurnoutError {
    fn from(err: polars::error::PolarsError) -> Self {
        BurnoutError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for BurnoutError {
    fn from(err: serde_json::Error) -> Self {
        BurnoutError::SerializationError(err.to_string())
    }
}
