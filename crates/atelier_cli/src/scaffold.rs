//! Shared scaffolding flow: resolve parameters, render a template and
//! persist the output, then execute the post-scaffold plan.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use atelier_templates::{
    post_scaffold, MapValueSource, ParamValue, ParameterResolver, TemplateDefinition,
    TemplateRenderer, ValueMap,
};

use crate::executor;

/// Options controlling a scaffold run.
pub struct ScaffoldOptions<'a> {
    /// Raw `key=value` parameter input from the command line.
    pub params: &'a HashMap<String, String>,
    /// Value for a `ProjectName` parameter when the template declares one
    /// and the caller did not supply it explicitly.
    pub project_name: &'a str,
    /// Skip post-scaffold command execution (deletions still apply).
    pub skip_commands: bool,
}

/// Scaffold a template into the target directory.
///
/// Rendering happens fully in memory first; files are only written once the
/// whole render has succeeded, so a failing template never leaves a
/// half-populated service directory behind.
pub fn scaffold(
    template: &TemplateDefinition,
    target: &Path,
    options: &ScaffoldOptions<'_>,
) -> Result<ValueMap> {
    let mut source = MapValueSource::new();
    for (key, value) in options.params {
        source.insert(key.clone(), ParamValue::Str(value.clone()));
    }
    if template.parameter("ProjectName").is_some() && !options.params.contains_key("ProjectName") {
        source.insert("ProjectName", options.project_name);
    }

    let values = ParameterResolver::resolve(template, &mut source)
        .with_context(|| format!("failed to resolve parameters for template '{}'", template.name))?;

    let renderer = TemplateRenderer::new();
    let files = renderer
        .render(template, &values)
        .with_context(|| format!("failed to render template '{}'", template.name))?;

    fs::create_dir_all(target)
        .with_context(|| format!("failed to create {}", target.display()))?;
    for file in &files {
        let path = target.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %file.path, "wrote file");
    }
    info!("Scaffolded {} files into {}", files.len(), target.display());

    let plan = post_scaffold::plan(template, &values)
        .context("failed to evaluate post-scaffold actions")?;
    executor::apply_plan(target, &plan, !options.skip_commands)?;

    Ok(values)
}
