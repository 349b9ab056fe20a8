//! Error types for urlsentry-core

use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors from loading a model artifact or running inference
#[derive(Error, Debug)]
pub enum ModelError {
    /// Artifact could not be read
    #[error("IO error: {0}")]
    Io(String),

    /// Artifact is not valid JSON for any supported model type
    #[error("Model parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Artifact parsed but is structurally unsound
    #[error("Invalid model: {0}")]
    Invalid(String),

    /// Input row width does not match the model
    #[error("Expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    /// Model produced a class with no label
    #[error("Unknown class: {0}")]
    UnknownClass(i64),
}
