//! Init command - create a new project with its first service.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use atelier_manifest::{ManifestWriter, ProjectManifest, Service};
use atelier_templates::TemplateCatalog;

use crate::commands::parse_key_values;
use crate::scaffold::{self, ScaffoldOptions};

#[derive(Args)]
pub struct InitArgs {
    /// Name of the project to create
    #[arg(short, long)]
    name: String,

    /// Template for the first service
    #[arg(short, long)]
    template: String,

    /// Name of the first service
    #[arg(short, long, default_value = "app")]
    service: String,

    /// Template parameters as key=value pairs (repeatable)
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Directory containing templates
    #[arg(long, default_value = "templates")]
    templates_dir: PathBuf,

    /// Output directory (defaults to ./<name>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not run post-scaffold commands
    #[arg(long)]
    skip_commands: bool,
}

pub fn execute(args: InitArgs) -> Result<()> {
    let project_root = args.output.unwrap_or_else(|| PathBuf::from(&args.name));
    if project_root.exists() {
        bail!("project directory already exists: {}", project_root.display());
    }

    let catalog = TemplateCatalog::new(&args.templates_dir);
    let template = catalog
        .load(&args.template)
        .with_context(|| format!("failed to load template '{}'", args.template))?;
    info!("Using template: {} ({})", template.display_name, template.name);

    let params = parse_key_values(&args.params)?;
    let service_dir = project_root.join(&args.service);
    scaffold::scaffold(
        &template,
        &service_dir,
        &ScaffoldOptions {
            params: &params,
            project_name: &args.name,
            skip_commands: args.skip_commands,
        },
    )?;

    let mut manifest = ProjectManifest::new(args.name.as_str());
    manifest.add_service(
        args.service.as_str(),
        Service {
            template: args.template.clone(),
            path: format!("./{}", args.service),
            port: None,
            resources: Default::default(),
            environment: Default::default(),
        },
    )?;
    ManifestWriter::write(&project_root, &manifest)?;

    println!("Success! Your new project '{}' is ready.", args.name);
    println!("  cd {}", project_root.display());
    println!("  atelier add service    # add more services");
    println!("  atelier generate compose  # derive docker-compose.yml");
    Ok(())
}
