//! Generator capability and output types.

use std::collections::BTreeMap;

use atelier_manifest::ProjectManifest;

use crate::error::GeneratorError;

/// Output of a generator: files to write plus advisory messages.
///
/// Generation is a pure function of the project manifest and the blueprint
/// registry; nothing is written to disk here. The caller persists `files`
/// verbatim, relative to the project root.
#[derive(Debug, Clone, Default)]
pub struct GeneratedArtifacts {
    pub files: BTreeMap<String, Vec<u8>>,
    pub messages: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl GeneratedArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

/// A deployment artifact generator (Docker Compose, Terraform, ...).
///
/// Callers must invoke `validate` before `generate`; a failing validation
/// prevents generation so no partial artifact set is ever produced.
pub trait Generator: Send + Sync {
    /// Unique identifier for this generator.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Check that the manifest is compatible with this generator.
    fn validate(&self, manifest: &ProjectManifest) -> Result<(), GeneratorError>;

    /// Produce the deployment artifacts for the manifest.
    fn generate(&self, manifest: &ProjectManifest) -> Result<GeneratedArtifacts, GeneratorError>;
}
