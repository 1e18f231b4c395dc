//! The restricted condition expression language.
//!
//! Conditions gate parameter visibility, file inclusion, conditional text
//! blocks and post-scaffold actions. The grammar is deliberately tiny:
//! `<identifier> <operator> <literal>` with no boolean connectives and no
//! nesting. Operators are `==`, `!=` and `contains`.

use std::collections::HashSet;

use crate::error::ConditionError;
use crate::value::{ParamValue, ValueMap};

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Contains,
}

/// Right-hand side of a condition.
///
/// A bare `true`/`false` is a boolean literal; everything else is a string,
/// with optional single or double quotes stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Bool(bool),
    Str(String),
}

/// A parsed condition: identifier, operator, literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub identifier: String,
    pub operator: Operator,
    pub literal: Literal,
}

impl Condition {
    /// Parse a condition expression.
    pub fn parse(input: &str) -> Result<Condition, ConditionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ConditionError::Malformed(input.to_string()));
        }
        for connective in ["&&", "||"] {
            if trimmed.contains(connective) {
                return Err(ConditionError::UnsupportedSyntax {
                    condition: trimmed.to_string(),
                    detail: format!("boolean connective '{connective}' is not supported"),
                });
            }
        }

        let (lhs, operator, rhs) = if let Some(at) = trimmed.find("!=") {
            (&trimmed[..at], Operator::Ne, &trimmed[at + 2..])
        } else if let Some(at) = trimmed.find("==") {
            (&trimmed[..at], Operator::Eq, &trimmed[at + 2..])
        } else if let Some(at) = trimmed.find(" contains ") {
            (&trimmed[..at], Operator::Contains, &trimmed[at + 10..])
        } else {
            return Err(ConditionError::Malformed(trimmed.to_string()));
        };

        let identifier = lhs.trim();
        if !is_identifier(identifier) {
            return Err(ConditionError::Malformed(trimmed.to_string()));
        }

        let literal = parse_literal(rhs.trim())
            .ok_or_else(|| ConditionError::Malformed(trimmed.to_string()))?;

        Ok(Condition {
            identifier: identifier.to_string(),
            operator,
            literal,
        })
    }

    /// Evaluate the condition against already-resolved values.
    ///
    /// Referencing an identifier that is not in the map is an error, not a
    /// silent false: it means the template compares against a parameter that
    /// was never declared, or one declared later.
    pub fn evaluate(&self, values: &ValueMap) -> Result<bool, ConditionError> {
        let value = values
            .get(&self.identifier)
            .ok_or_else(|| ConditionError::UnknownIdentifier(self.identifier.clone()))?;

        match (&self.operator, &self.literal) {
            (Operator::Eq, Literal::Bool(expected)) | (Operator::Ne, Literal::Bool(expected)) => {
                let actual = value.as_bool().ok_or_else(|| ConditionError::TypeMismatch {
                    identifier: self.identifier.clone(),
                })?;
                let eq = actual == *expected;
                Ok(if self.operator == Operator::Ne { !eq } else { eq })
            }
            (Operator::Eq, Literal::Str(expected)) => Ok(value.render() == *expected),
            (Operator::Ne, Literal::Str(expected)) => Ok(value.render() != *expected),
            (Operator::Contains, Literal::Str(expected)) => match value {
                ParamValue::List(items) => Ok(items.iter().any(|item| item == expected)),
                ParamValue::Str(s) => Ok(s.contains(expected.as_str())),
                ParamValue::Bool(_) => Err(ConditionError::TypeMismatch {
                    identifier: self.identifier.clone(),
                }),
            },
            (Operator::Contains, Literal::Bool(_)) => Err(ConditionError::UnsupportedSyntax {
                condition: format!("{} contains <boolean>", self.identifier),
                detail: "'contains' takes a string literal".to_string(),
            }),
        }
    }
}

/// Evaluate an optional condition; absence means "always true".
pub fn holds(condition: Option<&str>, values: &ValueMap) -> Result<bool, ConditionError> {
    match condition {
        None => Ok(true),
        Some(raw) if raw.trim().is_empty() => Ok(true),
        Some(raw) => Condition::parse(raw)?.evaluate(values),
    }
}

/// Like [`holds`], but with skip semantics for declared parameters.
///
/// A parameter skipped by its own visibility condition is legitimately
/// absent from the value map, and anything gated on it cascades: `==` and
/// `contains` compare false, `!=` compares true. Identifiers that are not
/// declared by the template at all still fail, since those are authoring
/// bugs rather than skipped parameters.
pub fn holds_within(
    condition: Option<&str>,
    values: &ValueMap,
    declared: &HashSet<String>,
) -> Result<bool, ConditionError> {
    let raw = match condition {
        None => return Ok(true),
        Some(raw) if raw.trim().is_empty() => return Ok(true),
        Some(raw) => raw,
    };
    let parsed = Condition::parse(raw)?;
    if !values.contains_key(&parsed.identifier) && declared.contains(&parsed.identifier) {
        return Ok(parsed.operator == Operator::Ne);
    }
    parsed.evaluate(values)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_literal(s: &str) -> Option<Literal> {
    if s.is_empty() {
        return None;
    }
    match s {
        "true" => Some(Literal::Bool(true)),
        "false" => Some(Literal::Bool(false)),
        _ => {
            let unquoted = if (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
                || (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
            {
                &s[1..s.len() - 1]
            } else {
                s
            };
            Some(Literal::Str(unquoted.to_string()))
        }
    }
}
