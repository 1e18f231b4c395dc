//! Error types for project manifest handling.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while reading, writing or validating a project
/// manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("no project manifest found searching upwards from {0}")]
    NotFound(PathBuf),

    #[error("manifest validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("service '{service}' already declares a resource named '{resource}'")]
    DuplicateResource { service: String, resource: String },

    #[error("project already declares a service named '{0}'")]
    DuplicateService(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
