//! Template rendering.
//!
//! Rendering is pure: it maps a template's file set plus a resolved value
//! map to an in-memory set of output files, and never touches storage. The
//! caller persists the result after the whole render succeeds.
//!
//! The content language is restricted: `{{ name }}` substitutes a value,
//! `{{ name | lower }}` applies transforms (lower, upper, title, trim,
//! chainable), and `{{#if <condition>}}...{{/if}}` keeps or drops a text
//! block. There are no loops and no arbitrary expressions.

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use crate::condition;
use crate::error::RenderError;
use crate::manifest::TemplateDefinition;
use crate::value::ValueMap;

/// A rendered output file: relative path plus byte content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub contents: Vec<u8>,
}

/// Expands placeholders and conditional blocks in file content and paths.
pub struct TemplateRenderer {
    placeholder: Regex,
    block: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            placeholder: Regex::new(
                r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)((?:\s*\|\s*[A-Za-z]+)*)\s*\}\}",
            )
            .expect("placeholder pattern is valid"),
            block: Regex::new(r"(?s)\{\{#if\s+(.+?)\}\}(.*?)\{\{/if\}\}")
                .expect("block pattern is valid"),
        }
    }

    /// Render a template's files against the resolved value map.
    ///
    /// Files are omitted when their sidecar condition is false, or when
    /// their rendered path collapses to the empty string (the conventional
    /// way to gate a file from within its own name). Conditions that
    /// reference a declared-but-skipped parameter cascade: the gated file or
    /// block is dropped rather than the render failing.
    pub fn render(
        &self,
        template: &TemplateDefinition,
        values: &ValueMap,
    ) -> Result<Vec<RenderedFile>, RenderError> {
        let declared: HashSet<String> =
            template.parameters.iter().map(|p| p.name.clone()).collect();
        let mut rendered = Vec::with_capacity(template.files.len());

        for file in &template.files {
            if !condition::holds_within(file.condition.as_deref(), values, &declared)? {
                debug!(path = %file.path, "inclusion condition not met, omitting");
                continue;
            }

            let path = self.render_internal(&file.path, values, Some(&declared), &file.path)?;
            let path = path.trim();
            if path.is_empty() {
                debug!(path = %file.path, "path rendered empty, omitting");
                continue;
            }

            let contents = match std::str::from_utf8(&file.contents) {
                Ok(text) => self
                    .render_internal(text, values, Some(&declared), &file.path)?
                    .into_bytes(),
                // Binary content passes through untouched.
                Err(_) => file.contents.clone(),
            };

            rendered.push(RenderedFile {
                path: path.to_string(),
                contents,
            });
        }

        Ok(rendered)
    }

    /// Render a single template string. Also used for resource blueprint
    /// snippets, which share the same substitution semantics. Unlike
    /// [`render`](Self::render), every identifier must be resolved.
    pub fn render_str(
        &self,
        input: &str,
        values: &ValueMap,
        location: &str,
    ) -> Result<String, RenderError> {
        self.render_internal(input, values, None, location)
    }

    fn render_internal(
        &self,
        input: &str,
        values: &ValueMap,
        declared: Option<&HashSet<String>>,
        location: &str,
    ) -> Result<String, RenderError> {
        let expanded = self.expand_blocks(input, values, declared, location)?;
        self.substitute(&expanded, values, location)
    }

    /// Resolve `{{#if}}` blocks, keeping or dropping their bodies.
    fn expand_blocks(
        &self,
        input: &str,
        values: &ValueMap,
        declared: Option<&HashSet<String>>,
        location: &str,
    ) -> Result<String, RenderError> {
        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in self.block.captures_iter(input) {
            let whole = caps.get(0).expect("capture 0 always present");
            out.push_str(&input[last..whole.start()]);
            let cond = caps[1].trim();
            let keep = match declared {
                Some(declared) => condition::holds_within(Some(cond), values, declared)?,
                None => condition::holds(Some(cond), values)?,
            };
            if keep {
                out.push_str(&caps[2]);
            }
            last = whole.end();
        }
        out.push_str(&input[last..]);

        // A leftover marker means an opener without a closer or vice versa.
        if out.contains("{{#if") || out.contains("{{/if}}") {
            return Err(RenderError::UnbalancedBlock(location.to_string()));
        }
        Ok(out)
    }

    /// Substitute `{{ name }}` placeholders, applying any transforms.
    fn substitute(
        &self,
        input: &str,
        values: &ValueMap,
        location: &str,
    ) -> Result<String, RenderError> {
        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in self.placeholder.captures_iter(input) {
            let whole = caps.get(0).expect("capture 0 always present");
            out.push_str(&input[last..whole.start()]);

            let name = &caps[1];
            let value = values
                .get(name)
                .ok_or_else(|| RenderError::UnknownPlaceholder {
                    name: name.to_string(),
                    location: location.to_string(),
                })?;

            let mut text = value.render();
            let transforms = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            for transform in transforms
                .split('|')
                .map(str::trim)
                .filter(|t| !t.is_empty())
            {
                text = apply_transform(transform, &text, location)?;
            }

            out.push_str(&text);
            last = whole.end();
        }
        out.push_str(&input[last..]);
        Ok(out)
    }
}

fn apply_transform(name: &str, input: &str, location: &str) -> Result<String, RenderError> {
    match name {
        "lower" => Ok(input.to_lowercase()),
        "upper" => Ok(input.to_uppercase()),
        "trim" => Ok(input.trim().to_string()),
        "title" => {
            let mut chars = input.chars();
            Ok(match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
            })
        }
        other => Err(RenderError::UnknownTransform {
            transform: other.to_string(),
            location: location.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::TemplateFile;
    use crate::value::ParamValue;

    fn values() -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("ProjectName".to_string(), ParamValue::from("my-app"));
        map.insert("IncludeTests".to_string(), ParamValue::Bool(true));
        map.insert("Framework".to_string(), ParamValue::from("React"));
        map
    }

    fn template(files: Vec<TemplateFile>) -> TemplateDefinition {
        TemplateDefinition {
            name: "test".to_string(),
            display_name: "Test".to_string(),
            description: "test template".to_string(),
            parameters: Vec::new(),
            post_scaffold: None,
            files,
        }
    }

    fn text_file(path: &str, contents: &str) -> TemplateFile {
        TemplateFile {
            path: path.to_string(),
            contents: contents.as_bytes().to_vec(),
            condition: None,
        }
    }

    #[test]
    fn test_substitution_and_transforms() {
        let renderer = TemplateRenderer::new();
        let out = renderer
            .render_str(
                "# {{ ProjectName | title }} ({{ ProjectName | upper }})",
                &values(),
                "README.md",
            )
            .unwrap();
        assert_eq!(out, "# My-app (MY-APP)");
    }

    #[test]
    fn test_conditional_blocks() {
        let renderer = TemplateRenderer::new();
        let out = renderer
            .render_str(
                "start{{#if IncludeTests == true}} tested{{/if}}{{#if Framework == 'Vue'}} vue{{/if}} end",
                &values(),
                "f",
            )
            .unwrap();
        assert_eq!(out, "start tested end");
    }

    #[test]
    fn test_placeholders_inside_dropped_block_do_not_error() {
        let renderer = TemplateRenderer::new();
        let out = renderer
            .render_str(
                "{{#if Framework == 'Vue'}}{{ NotAParameter }}{{/if}}ok",
                &values(),
                "f",
            )
            .unwrap();
        assert_eq!(out, "ok");
    }

    #[test]
    fn test_unknown_placeholder_fails() {
        let renderer = TemplateRenderer::new();
        let err = renderer
            .render_str("{{ Missing }}", &values(), "f")
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownPlaceholder { .. }));
    }

    #[test]
    fn test_unknown_transform_fails() {
        let renderer = TemplateRenderer::new();
        let err = renderer
            .render_str("{{ ProjectName | shout }}", &values(), "f")
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownTransform { .. }));
    }

    #[test]
    fn test_unbalanced_block_fails() {
        let renderer = TemplateRenderer::new();
        let err = renderer
            .render_str("{{#if IncludeTests == true}}no closer", &values(), "f")
            .unwrap_err();
        assert!(matches!(err, RenderError::UnbalancedBlock(_)));
    }

    #[test]
    fn test_render_paths_and_sidecar_conditions() {
        let renderer = TemplateRenderer::new();
        let mut gated = text_file("tests/test_main.py", "assert True");
        gated.condition = Some("IncludeTests == true".to_string());
        let mut dropped = text_file("vue.config.js", "module.exports = {}");
        dropped.condition = Some("Framework == 'Vue'".to_string());

        let template = template(vec![
            text_file("{{ ProjectName }}/README.md", "# {{ ProjectName }}"),
            gated,
            dropped,
        ]);

        let out = renderer.render(&template, &values()).unwrap();
        let paths: Vec<_> = out.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["my-app/README.md", "tests/test_main.py"]);
        assert_eq!(out[0].contents, b"# my-app");
    }

    #[test]
    fn test_empty_rendered_path_omits_file() {
        let renderer = TemplateRenderer::new();
        let template = template(vec![text_file(
            "{{#if Framework == 'Vue'}}vue.config.js{{/if}}",
            "module.exports = {}",
        )]);

        let out = renderer.render(&template, &values()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_binary_content_passes_through() {
        let renderer = TemplateRenderer::new();
        let bytes = vec![0xff, 0xfe, 0x00, 0x01];
        let template = template(vec![TemplateFile {
            path: "logo.bin".to_string(),
            contents: bytes.clone(),
            condition: None,
        }]);

        let out = renderer.render(&template, &values()).unwrap();
        assert_eq!(out[0].contents, bytes);
    }

    #[test]
    fn test_skipped_parameter_cascades_to_gated_files() {
        use crate::manifest::{Parameter, ParameterKind};

        let renderer = TemplateRenderer::new();
        let mut gated = text_file("tests/test_app.py", "# framework: A");
        gated.condition = Some("TestFramework == 'A'".to_string());

        let mut template = template(vec![
            gated,
            text_file("{{#if TestFramework == 'A'}}conftest.py{{/if}}", "import pytest"),
            text_file("README.md", "hi{{#if TestFramework == 'A'}} tested{{/if}}"),
        ]);
        // TestFramework is declared but absent from the value map, as after
        // being skipped by its own visibility condition.
        template.parameters.push(Parameter {
            name: "TestFramework".to_string(),
            prompt: "?".to_string(),
            help_text: None,
            group: None,
            kind: ParameterKind::Select,
            required: false,
            default: None,
            options: vec!["A".to_string()],
            condition: None,
            validation: None,
        });

        let out = renderer.render(&template, &values()).unwrap();
        let paths: Vec<_> = out.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md"]);
        assert_eq!(out[0].contents, b"hi");
    }

    #[test]
    fn test_render_is_idempotent() {
        let renderer = TemplateRenderer::new();
        let template = template(vec![text_file(
            "src/{{ ProjectName }}.py",
            "{{#if IncludeTests == true}}TESTED = True\n{{/if}}NAME = \"{{ ProjectName }}\"\n",
        )]);

        let first = renderer.render(&template, &values()).unwrap();
        let second = renderer.render(&template, &values()).unwrap();
        assert_eq!(first, second);
    }
}
