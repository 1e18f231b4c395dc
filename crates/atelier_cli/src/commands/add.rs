//! Add commands - extend an existing project with services and resources.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use tracing::info;

use atelier_manifest::{ManifestReader, ManifestWriter, ResourceInstance, Service};
use atelier_resources::BlueprintRegistry;
use atelier_templates::TemplateCatalog;

use crate::commands::parse_key_values;
use crate::scaffold::{self, ScaffoldOptions};

#[derive(Args)]
pub struct AddArgs {
    #[command(subcommand)]
    target: AddTarget,
}

#[derive(Subcommand)]
enum AddTarget {
    /// Scaffold a new service into the project
    Service(AddServiceArgs),

    /// Attach a resource (database, cache, queue, storage) to a service
    Resource(AddResourceArgs),
}

#[derive(Args)]
struct AddServiceArgs {
    /// Service name
    #[arg(short, long)]
    name: String,

    /// Template to scaffold from
    #[arg(short, long)]
    template: String,

    /// Template parameters as key=value pairs (repeatable)
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Directory containing templates
    #[arg(long, default_value = "templates")]
    templates_dir: PathBuf,

    /// Service port recorded in the manifest
    #[arg(long)]
    port: Option<u16>,

    /// Do not run post-scaffold commands
    #[arg(long)]
    skip_commands: bool,
}

#[derive(Args)]
struct AddResourceArgs {
    /// Service that owns the resource
    #[arg(short, long)]
    service: String,

    /// Resource blueprint type (e.g. postgres-db, redis-cache)
    #[arg(short = 't', long = "type")]
    resource_type: String,

    /// Resource name within the service
    #[arg(short, long)]
    name: String,

    /// Pinned version for the resource
    #[arg(long)]
    version: Option<String>,

    /// Blueprint config as key=value pairs (repeatable)
    #[arg(short, long = "config", value_name = "KEY=VALUE")]
    config: Vec<String>,
}

pub fn execute(args: AddArgs) -> Result<()> {
    match args.target {
        AddTarget::Service(args) => add_service(args),
        AddTarget::Resource(args) => add_resource(args),
    }
}

fn add_service(args: AddServiceArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (root, mut manifest) = ManifestReader::read_from(&cwd)?;
    info!("Adding service '{}' to project '{}'", args.name, manifest.metadata.name);

    let catalog = TemplateCatalog::new(&args.templates_dir);
    let template = catalog
        .load(&args.template)
        .with_context(|| format!("failed to load template '{}'", args.template))?;

    let params = parse_key_values(&args.params)?;
    let service_dir = root.join(&args.name);
    if service_dir.exists() {
        bail!("service directory already exists: {}", service_dir.display());
    }
    scaffold::scaffold(
        &template,
        &service_dir,
        &ScaffoldOptions {
            params: &params,
            project_name: &manifest.metadata.name,
            skip_commands: args.skip_commands,
        },
    )?;

    manifest.add_service(
        args.name.as_str(),
        Service {
            template: args.template.clone(),
            path: format!("./{}", args.name),
            port: args.port,
            resources: Default::default(),
            environment: Default::default(),
        },
    )?;
    ManifestWriter::write(&root, &manifest)?;

    println!("Added service '{}' using template '{}'.", args.name, args.template);
    Ok(())
}

fn add_resource(args: AddResourceArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (root, mut manifest) = ManifestReader::read_from(&cwd)?;

    let blueprints = BlueprintRegistry::builtin();
    let blueprint = blueprints.get(&args.resource_type).with_context(|| {
        format!(
            "unknown resource type '{}'; available: {}",
            args.resource_type,
            blueprints.names().join(", ")
        )
    })?;

    let config: BTreeMap<String, String> = parse_key_values(&args.config)?
        .into_iter()
        .collect();

    // Everything the blueprint requires must be supplied now or have a
    // default, so that later generation cannot fail on this resource.
    let missing: Vec<&str> = blueprint
        .mandatory_parameters()
        .into_iter()
        .filter(|p| !config.contains_key(&p.name))
        .filter(|p| !(p.name == "version" && args.version.is_some()))
        .map(|p| p.name.as_str())
        .collect();
    if !missing.is_empty() {
        bail!(
            "resource type '{}' requires config values: {}",
            args.resource_type,
            missing.join(", ")
        );
    }

    manifest.add_resource(
        &args.service,
        args.name.as_str(),
        ResourceInstance {
            resource_type: args.resource_type.clone(),
            version: args.version,
            config,
        },
    )?;
    ManifestWriter::write(&root, &manifest)?;

    println!(
        "Added {} resource '{}' to service '{}'.",
        blueprint.description, args.name, args.service
    );
    Ok(())
}
