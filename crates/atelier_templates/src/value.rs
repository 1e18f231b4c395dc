//! Resolved parameter values.

use std::collections::HashMap;
use std::fmt;

/// A concrete value collected for a template parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Bool(bool),
    List(Vec<String>),
}

/// The accumulation of resolved parameter values, keyed by parameter name.
///
/// Built strictly in declaration order during resolution; consulted by
/// condition evaluation and rendering afterwards.
pub type ValueMap = HashMap<String, ParamValue>;

impl ParamValue {
    /// Interpret the value as a boolean, if it has one.
    ///
    /// The strings `"true"` and `"false"` coerce; anything else does not.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Str(s) if s == "true" => Some(true),
            ParamValue::Str(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    /// The textual form used for substitution and string comparison.
    pub fn render(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::List(items) => items.join(","),
        }
    }

    /// Whether the value counts as empty for the `required` check.
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Str(s) => s.trim().is_empty(),
            ParamValue::Bool(_) => false,
            ParamValue::List(items) => items.is_empty(),
        }
    }

    /// Convert a JSON default from a template manifest into a value.
    pub fn from_json(value: &serde_json::Value) -> Option<ParamValue> {
        match value {
            serde_json::Value::String(s) => Some(ParamValue::Str(s.clone())),
            serde_json::Value::Bool(b) => Some(ParamValue::Bool(*b)),
            serde_json::Value::Number(n) => Some(ParamValue::Str(n.to_string())),
            serde_json::Value::Array(items) => {
                let strings: Option<Vec<String>> = items
                    .iter()
                    .map(|v| v.as_str().map(String::from))
                    .collect();
                strings.map(ParamValue::List)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        ParamValue::List(items)
    }
}
