//! Error types for the template pipeline.

use thiserror::Error;

/// Errors raised while discovering templates from a content source.
///
/// Any of these is fatal to the catalog load: a broken template manifest
/// means the source itself needs fixing.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("template source directory not found: {0}")]
    SourceMissing(String),

    #[error("template '{template}' has no parseable manifest: {message}")]
    InvalidManifest { template: String, message: String },

    #[error("template '{template}' declares parameter '{parameter}' more than once")]
    DuplicateParameter { template: String, parameter: String },

    #[error("template '{template}': {message}")]
    Structural { template: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the condition mini-language.
///
/// A condition failure indicates a template authoring bug and aborts the
/// surrounding resolve or render operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("malformed condition '{0}': expected <identifier> <operator> <literal>")]
    Malformed(String),

    #[error("condition '{condition}' uses unsupported syntax: {detail}")]
    UnsupportedSyntax { condition: String, detail: String },

    #[error("condition references '{0}', which is not resolved at this point")]
    UnknownIdentifier(String),

    #[error("condition compares '{identifier}' against a boolean, but its value is not boolean")]
    TypeMismatch { identifier: String },
}

/// Errors raised during parameter resolution.
///
/// These are recoverable: a caller with an interactive source may re-prompt
/// and resolve again.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("parameter '{0}' is required")]
    Required(String),

    #[error("parameter '{parameter}': {message}")]
    Validation { parameter: String, message: String },

    #[error("parameter '{parameter}': '{value}' is not a valid option")]
    InvalidOption { parameter: String, value: String },

    #[error("parameter '{parameter}' expects a {expected} value")]
    WrongKind {
        parameter: String,
        expected: &'static str,
    },

    #[error("parameter '{parameter}' has an invalid validation regex: {source}")]
    BadRegex {
        parameter: String,
        source: regex::Error,
    },

    #[error(transparent)]
    Condition(#[from] ConditionError),
}

/// Errors raised while rendering template content or paths.
///
/// Rendering aborts on the first error; partial output is never returned.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unresolved placeholder '{name}' in {location}")]
    UnknownPlaceholder { name: String, location: String },

    #[error("unknown transform '{transform}' in {location}")]
    UnknownTransform { transform: String, location: String },

    #[error("unbalanced conditional block in {0}")]
    UnbalancedBlock(String),

    #[error(transparent)]
    Condition(#[from] ConditionError),
}
