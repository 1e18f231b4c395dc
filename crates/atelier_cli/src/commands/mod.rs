//! CLI command definitions.
//!
//! Each subcommand maps to one workflow: project initialization, extending
//! the project manifest, or deriving deployment artifacts from it.

use std::collections::HashMap;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

pub mod add;
pub mod generate;
pub mod init;
pub mod list_templates;

/// Atelier - scaffold projects and derive deployment artifacts
#[derive(Parser)]
#[command(name = "atelier")]
#[command(version, about = "Atelier - template-driven project scaffolding")]
#[command(long_about = r#"
Atelier scaffolds new projects from parameterized templates and re-derives
deployment artifacts (Docker Compose, Terraform) from the project's
atelier.yaml manifest.

WORKFLOWS:
  init            → Create a project and scaffold its first service
  add service     → Scaffold another service into an existing project
  add resource    → Attach a resource (database, cache, ...) to a service
  list-templates  → Show available templates and their parameters
  generate        → Emit deployment artifacts from atelier.yaml

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Template error
  5 - Generator error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new project with its first service
    Init(init::InitArgs),

    /// Add a service or resource to an existing project
    Add(add::AddArgs),

    /// List available templates and their parameters
    #[command(name = "list-templates")]
    ListTemplates(list_templates::ListTemplatesArgs),

    /// Generate deployment artifacts from the project manifest
    Generate(generate::GenerateArgs),
}

/// Parse repeated `key=value` arguments into a map.
pub fn parse_key_values(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                map.insert(key.trim().to_string(), value.to_string());
            }
            _ => bail!("invalid key=value argument: '{}'", pair),
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_values() {
        let parsed = parse_key_values(&[
            "ProjectName=my-app".to_string(),
            "IncludeTests=true".to_string(),
        ])
        .unwrap();
        assert_eq!(parsed["ProjectName"], "my-app");
        assert_eq!(parsed["IncludeTests"], "true");
    }

    #[test]
    fn test_parse_key_values_rejects_garbage() {
        assert!(parse_key_values(&["nope".to_string()]).is_err());
        assert!(parse_key_values(&["=value".to_string()]).is_err());
    }

    #[test]
    fn test_parse_key_values_keeps_equals_in_value() {
        let parsed = parse_key_values(&["Secret=a=b".to_string()]).unwrap();
        assert_eq!(parsed["Secret"], "a=b");
    }
}
