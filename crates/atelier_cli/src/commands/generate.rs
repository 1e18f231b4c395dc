//! Generate command - derive deployment artifacts from the manifest.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use atelier_generators::{ComposeGenerator, GeneratorRegistry, TerraformGenerator};
use atelier_manifest::{ManifestReader, ManifestValidator};
use atelier_resources::BlueprintRegistry;
use atelier_templates::TemplateCatalog;

#[derive(Args)]
pub struct GenerateArgs {
    /// Generator to run (compose, terraform)
    generator: String,

    /// Directory containing templates, used to cross-check the manifest
    #[arg(long, default_value = "templates")]
    templates_dir: PathBuf,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (root, manifest) = ManifestReader::read_from(&cwd)?;
    info!("Generating '{}' artifacts for project '{}'", args.generator, manifest.metadata.name);

    // Registries are built once here and shared by reference; nothing is
    // registered after this point.
    let blueprints = Arc::new(BlueprintRegistry::builtin());
    let generators = GeneratorRegistry::new();
    generators.register(Arc::new(ComposeGenerator::new(Arc::clone(&blueprints))))?;
    generators.register(Arc::new(TerraformGenerator::new(Arc::clone(&blueprints))))?;

    // Cross-check manifest references when the templates source is present.
    let templates_dir = root.join(&args.templates_dir);
    if templates_dir.is_dir() {
        let templates = TemplateCatalog::new(&templates_dir)
            .discover()
            .context("failed to discover templates")?;
        let template_names: Vec<String> = templates.into_iter().map(|t| t.name).collect();
        let report =
            ManifestValidator::validate(&manifest, &template_names, &blueprints.names());
        for warning in &report.warnings {
            eprintln!("Warning: {}", warning);
        }
        if !report.valid {
            bail!("manifest validation failed: {}", report.errors.join("; "));
        }
    }

    let generator = generators.get(&args.generator).with_context(|| {
        format!(
            "unknown generator '{}'; available: {}",
            args.generator,
            generators.names().join(", ")
        )
    })?;

    // Validate before generate; a failing validation prevents generation.
    generator.validate(&manifest)?;
    let artifacts = generator.generate(&manifest)?;

    // Nothing is persisted unless the whole artifact set is clean.
    if !artifacts.errors.is_empty() {
        bail!("generator reported errors: {}", artifacts.errors.join("; "));
    }

    for (path, contents) in &artifacts.files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&full, contents)
            .with_context(|| format!("failed to write {}", full.display()))?;
        println!("Wrote {}", path);
    }
    for message in &artifacts.messages {
        println!("{}", message);
    }
    for warning in &artifacts.warnings {
        eprintln!("Warning: {}", warning);
    }

    Ok(())
}
