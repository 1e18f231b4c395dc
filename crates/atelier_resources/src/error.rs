//! Error types for the blueprint registry.

use thiserror::Error;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur during blueprint registration and lookup.
///
/// Duplicate registration is fatal at startup; a lookup miss during
/// generation is surfaced by generators as a validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("resource blueprint '{0}' is already registered")]
    Duplicate(String),

    #[error("resource blueprint '{0}' not found")]
    NotFound(String),
}
