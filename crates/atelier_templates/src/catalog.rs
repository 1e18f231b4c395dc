//! Template discovery.
//!
//! The catalog scans a directory of templates, each holding a
//! `template.json` manifest plus the file tree to scaffold. Discovery is a
//! full scan on every call and returns templates sorted by name, so
//! successive calls against an unchanged source are identical.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::condition::Condition;
use crate::error::DiscoveryError;
use crate::manifest::{TemplateDefinition, TemplateFile, TemplateManifest};

/// Manifest file name expected inside each template directory.
pub const MANIFEST_FILE: &str = "template.json";

/// Discovers and loads templates from a directory source.
pub struct TemplateCatalog {
    root: PathBuf,
}

impl TemplateCatalog {
    /// Create a catalog over the given templates directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover all templates under the source directory.
    ///
    /// Every subdirectory must carry a valid manifest; a malformed template
    /// fails the whole load rather than being skipped silently.
    pub fn discover(&self) -> Result<Vec<TemplateDefinition>, DiscoveryError> {
        if !self.root.is_dir() {
            return Err(DiscoveryError::SourceMissing(
                self.root.display().to_string(),
            ));
        }

        let mut templates = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let name = entry.file_name().to_string_lossy().to_string();
                templates.push(self.load(&name)?);
            }
        }

        templates.sort_by(|a, b| a.name.cmp(&b.name));
        info!("Discovered {} templates", templates.len());
        Ok(templates)
    }

    /// Load a single template by directory name.
    pub fn load(&self, name: &str) -> Result<TemplateDefinition, DiscoveryError> {
        let dir = self.root.join(name);
        let manifest_path = dir.join(MANIFEST_FILE);
        debug!("Loading template manifest from {:?}", manifest_path);

        let raw = fs::read_to_string(&manifest_path).map_err(|e| DiscoveryError::InvalidManifest {
            template: name.to_string(),
            message: format!("cannot read {}: {}", MANIFEST_FILE, e),
        })?;
        let manifest: TemplateManifest =
            serde_json::from_str(&raw).map_err(|e| DiscoveryError::InvalidManifest {
                template: name.to_string(),
                message: e.to_string(),
            })?;

        validate_manifest(name, &manifest)?;

        let files = self.load_files(&dir, &manifest)?;
        Ok(TemplateDefinition {
            name: name.to_string(),
            display_name: manifest.name,
            description: manifest.description,
            parameters: manifest.parameters,
            post_scaffold: manifest.post_scaffold,
            files,
        })
    }

    /// Load the template's file tree, attaching sidecar conditions.
    fn load_files(
        &self,
        dir: &Path,
        manifest: &TemplateManifest,
    ) -> Result<Vec<TemplateFile>, DiscoveryError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path
                .strip_prefix(dir)
                .map_err(|e| DiscoveryError::Structural {
                    template: manifest.name.clone(),
                    message: e.to_string(),
                })?;
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if relative == MANIFEST_FILE {
                continue;
            }
            let condition = manifest
                .files
                .iter()
                .find(|f| f.path == relative)
                .map(|f| f.condition.clone());
            files.push(TemplateFile {
                path: relative,
                contents: fs::read(path)?,
                condition,
            });
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}

/// Structural validation of a parsed manifest.
fn validate_manifest(template: &str, manifest: &TemplateManifest) -> Result<(), DiscoveryError> {
    let structural = |message: String| DiscoveryError::Structural {
        template: template.to_string(),
        message,
    };

    if manifest.name.trim().is_empty() {
        return Err(structural("manifest is missing a name".to_string()));
    }
    if manifest.description.trim().is_empty() {
        return Err(structural("manifest is missing a description".to_string()));
    }
    if manifest.parameters.is_empty() {
        return Err(structural("manifest declares no parameters".to_string()));
    }

    let mut seen = Vec::with_capacity(manifest.parameters.len());
    for param in &manifest.parameters {
        if param.name.trim().is_empty() {
            return Err(structural("parameter with empty name".to_string()));
        }
        if seen.contains(&param.name.as_str()) {
            return Err(DiscoveryError::DuplicateParameter {
                template: template.to_string(),
                parameter: param.name.clone(),
            });
        }
        if param.kind.needs_options() && param.options.is_empty() {
            return Err(structural(format!(
                "parameter '{}' of kind {} must declare options",
                param.name,
                param.kind.as_str()
            )));
        }
        // Conditions may only reference parameters declared earlier.
        if let Some(condition) = &param.condition {
            let parsed = Condition::parse(condition).map_err(|e| {
                structural(format!("parameter '{}': {}", param.name, e))
            })?;
            if !seen.contains(&parsed.identifier.as_str()) {
                return Err(structural(format!(
                    "parameter '{}' condition references '{}', which is not declared earlier",
                    param.name, parsed.identifier
                )));
            }
        }
        seen.push(param.name.as_str());
    }

    // Sidecar and post-scaffold conditions may reference any parameter.
    for file in &manifest.files {
        check_condition(template, &file.condition, &seen, &format!("file '{}'", file.path))?;
    }
    if let Some(post) = &manifest.post_scaffold {
        for deletion in &post.files_to_delete {
            check_condition(
                template,
                &deletion.condition,
                &seen,
                &format!("deletion of '{}'", deletion.path),
            )?;
        }
        for command in &post.commands {
            if let Some(condition) = &command.condition {
                check_condition(
                    template,
                    condition,
                    &seen,
                    &format!("command '{}'", command.description),
                )?;
            }
        }
    }

    Ok(())
}

fn check_condition(
    template: &str,
    condition: &str,
    declared: &[&str],
    context: &str,
) -> Result<(), DiscoveryError> {
    let structural = |message: String| DiscoveryError::Structural {
        template: template.to_string(),
        message,
    };
    let parsed =
        Condition::parse(condition).map_err(|e| structural(format!("{}: {}", context, e)))?;
    if !declared.contains(&parsed.identifier.as_str()) {
        return Err(structural(format!(
            "{} condition references undeclared parameter '{}'",
            context, parsed.identifier
        )));
    }
    Ok(())
}
