//! List-templates command - show available templates and their parameters.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use atelier_templates::TemplateCatalog;

#[derive(Args)]
pub struct ListTemplatesArgs {
    /// Directory containing templates
    #[arg(long, default_value = "templates")]
    templates_dir: PathBuf,
}

pub fn execute(args: ListTemplatesArgs) -> Result<()> {
    let catalog = TemplateCatalog::new(&args.templates_dir);
    let templates = catalog.discover().context("failed to discover templates")?;

    if templates.is_empty() {
        println!("No templates found in {}", args.templates_dir.display());
        return Ok(());
    }

    println!("Available templates:\n");
    for template in templates {
        println!("  {} - {}", template.name, template.description);
        for param in &template.parameters {
            let mut notes = vec![param.kind.as_str().to_string()];
            if param.required {
                notes.push("required".to_string());
            }
            if !param.options.is_empty() {
                notes.push(format!("options: {}", param.options.join("|")));
            }
            if let Some(condition) = &param.condition {
                notes.push(format!("when {}", condition));
            }
            println!("      {} ({})", param.name, notes.join(", "));
        }
        println!();
    }
    Ok(())
}
