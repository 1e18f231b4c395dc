//! Resource blueprint definitions.
//!
//! A blueprint is a reusable, parameterized definition of an infrastructure
//! resource (database, cache, queue, storage). Its compose snippet is a
//! small template in the renderer's `{{ param }}` syntax, rendered later by
//! a generator with the values from a resource instance's config map.

use serde::{Deserialize, Serialize};

/// Kind of a blueprint parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlueprintParameterKind {
    String,
    Number,
    Boolean,
    Select,
}

/// A parameter a blueprint expects from a resource instance's config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintParameter {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: BlueprintParameterKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl BlueprintParameter {
    /// The declared default rendered to its textual form, if any.
    pub fn default_text(&self) -> Option<String> {
        match self.default.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// A reusable infrastructure resource definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBlueprint {
    pub name: String,
    pub description: String,
    /// Category discriminator: database, cache, message-queue, storage.
    pub category: String,
    /// Compose service fragment in template syntax.
    pub docker_compose_snippet: String,
    /// Infrastructure module reference for IaC generators.
    pub terraform_module: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<BlueprintParameter>,
    /// Blueprint names this resource expects alongside it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ResourceBlueprint {
    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&BlueprintParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Required parameters without a default; these must come from the
    /// resource instance's config.
    pub fn mandatory_parameters(&self) -> Vec<&BlueprintParameter> {
        self.parameters
            .iter()
            .filter(|p| p.required && p.default.is_none())
            .collect()
    }
}
