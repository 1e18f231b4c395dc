//! # atelier_manifest
//!
//! The project manifest model for Atelier.
//!
//! A project is described declaratively in `atelier.yaml`: metadata,
//! deployment environments, shared components, and services with their
//! owned resources. The scaffolding workflow builds the manifest
//! incrementally; the artifact generators only read it.

pub mod error;
pub mod models;
pub mod reader;
pub mod validator;
pub mod writer;

pub use error::{ManifestError, ManifestResult};
pub use models::{
    Component, Environment, ProjectManifest, ProjectMetadata, ResourceInstance, Service,
    API_VERSION, KIND, MANIFEST_FILE_NAME,
};
pub use reader::ManifestReader;
pub use validator::{ManifestValidator, ValidationReport};
pub use writer::ManifestWriter;
