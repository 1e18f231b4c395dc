//! Error types for generators.

use thiserror::Error;

/// Result type alias for generator operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors that can occur during artifact generation.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("manifest validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("generator '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("generator '{0}' not found")]
    NotFound(String),

    #[error("failed to render blueprint snippet for '{resource}': {message}")]
    Snippet { resource: String, message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GeneratorError {
    /// Build a validation error from a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        GeneratorError::Validation(vec![message.into()])
    }
}
