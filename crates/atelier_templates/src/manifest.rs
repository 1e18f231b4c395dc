//! Template manifest definitions.
//!
//! Every template directory carries a `template.json` manifest describing
//! its parameters, optional per-file inclusion conditions and post-scaffold
//! actions. The manifest is the authoring surface: parameter declaration
//! order is significant because later conditions may reference earlier
//! values.

use serde::{Deserialize, Serialize};

use crate::value::ParamValue;

/// Kind of a template parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Boolean,
    Select,
    Multiselect,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Select => "select",
            ParameterKind::Multiselect => "multiselect",
        }
    }

    /// Whether this kind requires an options list.
    pub fn needs_options(&self) -> bool {
        matches!(self, ParameterKind::Select | ParameterKind::Multiselect)
    }
}

/// Validation rule for string parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub regex: String,
    pub error_message: String,
}

/// A single parameter the user needs to provide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub prompt: String,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub validation: Option<Validation>,
}

impl Parameter {
    /// The declared default, converted to a parameter value.
    pub fn default_value(&self) -> Option<ParamValue> {
        self.default.as_ref().and_then(ParamValue::from_json)
    }
}

/// Per-file inclusion condition, declared in the manifest's `files` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCondition {
    pub path: String,
    pub condition: String,
}

/// A file or directory to delete after scaffolding, gated by a condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDeletion {
    pub path: String,
    pub condition: String,
}

/// A command to run after scaffolding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandAction {
    pub command: String,
    pub description: String,
    #[serde(default)]
    pub condition: Option<String>,
}

/// Actions to perform after the main scaffolding is complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostScaffold {
    #[serde(default)]
    pub files_to_delete: Vec<FileDeletion>,
    #[serde(default)]
    pub commands: Vec<CommandAction>,
}

/// The parsed `template.json` manifest of a single template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateManifest {
    pub name: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub files: Vec<FileCondition>,
    #[serde(default)]
    pub post_scaffold: Option<PostScaffold>,
}

/// A template file loaded into memory, with its optional inclusion
/// condition attached from the manifest's `files` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Path relative to the template root, `/`-separated.
    pub path: String,
    pub contents: Vec<u8>,
    pub condition: Option<String>,
}

/// A fully loaded template: identity, schema and file tree.
///
/// Identity is the directory name the template was discovered under;
/// `display_name` is the manifest's human-facing name. Immutable once
/// loaded.
#[derive(Debug, Clone)]
pub struct TemplateDefinition {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub post_scaffold: Option<PostScaffold>,
    pub files: Vec<TemplateFile>,
}

impl TemplateDefinition {
    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Required parameters, in declaration order.
    pub fn required_parameters(&self) -> Vec<&Parameter> {
        self.parameters.iter().filter(|p| p.required).collect()
    }
}
