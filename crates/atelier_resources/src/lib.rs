//! # atelier_resources
//!
//! Reusable infrastructure resource blueprints for Atelier.
//!
//! A [`ResourceBlueprint`] bundles everything generators need to emit a
//! resource: a Docker Compose snippet, an infrastructure module reference
//! and a parameter schema. Blueprints live in a [`BlueprintRegistry`] that
//! is populated once at process start and read concurrently afterwards.

pub mod blueprint;
pub mod builtin;
pub mod error;
pub mod registry;

pub use blueprint::{BlueprintParameter, BlueprintParameterKind, ResourceBlueprint};
pub use builtin::builtin_blueprints;
pub use error::{RegistryError, RegistryResult};
pub use registry::BlueprintRegistry;
