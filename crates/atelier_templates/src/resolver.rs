//! Parameter resolution.
//!
//! Resolution walks a template's parameters strictly in declaration order,
//! because later conditions may reference earlier values. A parameter whose
//! condition evaluates false is skipped entirely: it is not collected, its
//! default is not applied, and none of its checks run.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use tracing::debug;

use crate::condition;
use crate::error::ResolveError;
use crate::manifest::{Parameter, ParameterKind, TemplateDefinition};
use crate::value::{ParamValue, ValueMap};

/// Supplies raw parameter values during resolution.
///
/// Implementations may back onto an interactive prompt or a pre-collected
/// map. The resolver calls `value_for` at most once per visible parameter,
/// in declaration order; returning `None` falls back to the parameter's
/// default.
pub trait ValueSource {
    fn value_for(&mut self, parameter: &Parameter) -> Option<ParamValue>;
}

/// A deterministic value source backed by pre-supplied values.
#[derive(Debug, Clone, Default)]
pub struct MapValueSource {
    values: HashMap<String, ParamValue>,
}

impl MapValueSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }
}

impl ValueSource for MapValueSource {
    fn value_for(&mut self, parameter: &Parameter) -> Option<ParamValue> {
        self.values.get(&parameter.name).cloned()
    }
}

/// Resolves a template's parameters against a value source.
pub struct ParameterResolver;

impl ParameterResolver {
    /// Produce the resolved value map for a template.
    pub fn resolve(
        template: &TemplateDefinition,
        source: &mut dyn ValueSource,
    ) -> Result<ValueMap, ResolveError> {
        let declared: HashSet<String> =
            template.parameters.iter().map(|p| p.name.clone()).collect();
        let mut values = ValueMap::new();

        for param in &template.parameters {
            if !condition::holds_within(param.condition.as_deref(), &values, &declared)? {
                debug!(parameter = %param.name, "condition not met, skipping");
                continue;
            }

            let raw = source
                .value_for(param)
                .or_else(|| param.default_value());

            let value = match raw {
                Some(v) => coerce(param, v)?,
                None => {
                    if param.required {
                        return Err(ResolveError::Required(param.name.clone()));
                    }
                    continue;
                }
            };

            if param.required && value.is_empty() {
                return Err(ResolveError::Required(param.name.clone()));
            }

            validate(param, &value)?;
            values.insert(param.name.clone(), value);
        }

        Ok(values)
    }
}

/// Coerce a raw value into the parameter's declared kind.
///
/// Booleans accept the strings "true"/"false" and multiselects accept a
/// comma-separated string, so that values arriving as flat CLI arguments
/// still resolve.
fn coerce(param: &Parameter, value: ParamValue) -> Result<ParamValue, ResolveError> {
    match (param.kind, value) {
        (ParameterKind::Boolean, ParamValue::Bool(b)) => Ok(ParamValue::Bool(b)),
        (ParameterKind::Boolean, v @ ParamValue::Str(_)) => {
            v.as_bool().map(ParamValue::Bool).ok_or(ResolveError::WrongKind {
                parameter: param.name.clone(),
                expected: "boolean",
            })
        }
        (ParameterKind::String, ParamValue::Str(s)) => Ok(ParamValue::Str(s)),
        (ParameterKind::Select, ParamValue::Str(s)) => Ok(ParamValue::Str(s)),
        (ParameterKind::Multiselect, ParamValue::List(items)) => Ok(ParamValue::List(items)),
        (ParameterKind::Multiselect, ParamValue::Str(s)) => {
            let items = s
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            Ok(ParamValue::List(items))
        }
        (kind, _) => Err(ResolveError::WrongKind {
            parameter: param.name.clone(),
            expected: match kind {
                ParameterKind::String | ParameterKind::Select => "string",
                ParameterKind::Boolean => "boolean",
                ParameterKind::Multiselect => "list of strings",
            },
        }),
    }
}

/// Apply the parameter's declared checks to a coerced value.
fn validate(param: &Parameter, value: &ParamValue) -> Result<(), ResolveError> {
    if let (Some(validation), ParamValue::Str(s)) = (&param.validation, value) {
        let re = Regex::new(&validation.regex).map_err(|e| ResolveError::BadRegex {
            parameter: param.name.clone(),
            source: e,
        })?;
        if !re.is_match(s) {
            return Err(ResolveError::Validation {
                parameter: param.name.clone(),
                message: validation.error_message.clone(),
            });
        }
    }

    match (param.kind, value) {
        (ParameterKind::Select, ParamValue::Str(s)) => {
            if !param.options.iter().any(|o| o == s) {
                return Err(ResolveError::InvalidOption {
                    parameter: param.name.clone(),
                    value: s.clone(),
                });
            }
        }
        (ParameterKind::Multiselect, ParamValue::List(items)) => {
            for item in items {
                if !param.options.iter().any(|o| o == item) {
                    return Err(ResolveError::InvalidOption {
                        parameter: param.name.clone(),
                        value: item.clone(),
                    });
                }
            }
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Validation;

    fn param(name: &str, kind: ParameterKind) -> Parameter {
        Parameter {
            name: name.to_string(),
            prompt: format!("{}?", name),
            help_text: None,
            group: None,
            kind,
            required: false,
            default: None,
            options: Vec::new(),
            condition: None,
            validation: None,
        }
    }

    fn template(parameters: Vec<Parameter>) -> TemplateDefinition {
        TemplateDefinition {
            name: "test".to_string(),
            display_name: "Test".to_string(),
            description: "test template".to_string(),
            parameters,
            post_scaffold: None,
            files: Vec::new(),
        }
    }

    #[test]
    fn test_resolve_in_declaration_order_with_defaults() {
        let mut include = param("IncludeTests", ParameterKind::Boolean);
        include.default = Some(serde_json::json!(true));
        let mut framework = param("TestFramework", ParameterKind::Select);
        framework.options = vec!["A".to_string(), "B".to_string()];
        framework.condition = Some("IncludeTests == true".to_string());
        framework.default = Some(serde_json::json!("A"));

        let template = template(vec![include, framework]);
        let mut source = MapValueSource::new();

        let values = ParameterResolver::resolve(&template, &mut source).unwrap();
        assert_eq!(values.get("IncludeTests"), Some(&ParamValue::Bool(true)));
        assert_eq!(values.get("TestFramework"), Some(&ParamValue::from("A")));
    }

    #[test]
    fn test_skipped_parameter_takes_no_default_and_no_checks() {
        let mut include = param("IncludeTests", ParameterKind::Boolean);
        include.default = Some(serde_json::json!(true));
        let mut framework = param("TestFramework", ParameterKind::Select);
        framework.options = vec!["A".to_string(), "B".to_string()];
        framework.condition = Some("IncludeTests == true".to_string());
        framework.default = Some(serde_json::json!("A"));
        framework.required = true;

        let template = template(vec![include, framework]);
        let mut source = MapValueSource::new().with("IncludeTests", false);

        let values = ParameterResolver::resolve(&template, &mut source).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("IncludeTests"), Some(&ParamValue::Bool(false)));
        assert!(!values.contains_key("TestFramework"));
    }

    #[test]
    fn test_required_missing() {
        let mut name = param("ProjectName", ParameterKind::String);
        name.required = true;

        let template = template(vec![name]);
        let err = ParameterResolver::resolve(&template, &mut MapValueSource::new()).unwrap_err();
        assert!(matches!(err, ResolveError::Required(p) if p == "ProjectName"));
    }

    #[test]
    fn test_regex_validation_uses_declared_message() {
        let mut name = param("ProjectName", ParameterKind::String);
        name.validation = Some(Validation {
            regex: "^[a-z][a-z0-9-]*$".to_string(),
            error_message: "must be lowercase kebab-case".to_string(),
        });

        let template = template(vec![name]);

        let mut good = MapValueSource::new().with("ProjectName", "my-app");
        let values = ParameterResolver::resolve(&template, &mut good).unwrap();
        assert_eq!(values.get("ProjectName"), Some(&ParamValue::from("my-app")));

        let mut bad = MapValueSource::new().with("ProjectName", "My App");
        let err = ParameterResolver::resolve(&template, &mut bad).unwrap_err();
        match err {
            ResolveError::Validation { message, .. } => {
                assert_eq!(message, "must be lowercase kebab-case");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_membership() {
        let mut choice = param("Database", ParameterKind::Select);
        choice.options = vec!["postgres".to_string(), "mysql".to_string()];

        let template = template(vec![choice]);
        let mut source = MapValueSource::new().with("Database", "sqlite");
        let err = ParameterResolver::resolve(&template, &mut source).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidOption { .. }));
    }

    #[test]
    fn test_multiselect_from_comma_separated_string() {
        let mut features = param("Features", ParameterKind::Multiselect);
        features.options = vec!["auth".to_string(), "metrics".to_string()];

        let template = template(vec![features]);
        let mut source = MapValueSource::new().with("Features", "auth, metrics");
        let values = ParameterResolver::resolve(&template, &mut source).unwrap();
        assert_eq!(
            values.get("Features"),
            Some(&ParamValue::List(vec!["auth".into(), "metrics".into()]))
        );
    }

    #[test]
    fn test_boolean_from_string() {
        let flag = param("Flag", ParameterKind::Boolean);
        let template = template(vec![flag]);

        let mut source = MapValueSource::new().with("Flag", "true");
        let values = ParameterResolver::resolve(&template, &mut source).unwrap();
        assert_eq!(values.get("Flag"), Some(&ParamValue::Bool(true)));

        let mut source = MapValueSource::new().with("Flag", "maybe");
        let err = ParameterResolver::resolve(&template, &mut source).unwrap_err();
        assert!(matches!(err, ResolveError::WrongKind { .. }));
    }
}
