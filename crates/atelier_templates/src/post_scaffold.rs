//! Post-scaffold planning.
//!
//! The planner turns a template's post-scaffold spec into intents: paths to
//! delete and commands to run, each gated by a condition. It never touches
//! the filesystem or spawns processes itself; the caller executes the plan,
//! which keeps dry runs and tests trivial.

use std::collections::HashSet;

use tracing::warn;

use crate::condition;
use crate::error::ConditionError;
use crate::manifest::TemplateDefinition;
use crate::value::ValueMap;

/// A command the caller should execute, with its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandIntent {
    pub command: String,
    pub description: String,
}

/// The evaluated post-scaffold actions, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostScaffoldPlan {
    /// Output paths to remove, relative to the scaffolded project root.
    pub deletions: Vec<String>,
    /// Commands to execute in the project root.
    pub commands: Vec<CommandIntent>,
}

impl PostScaffoldPlan {
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.commands.is_empty()
    }
}

/// Evaluate a template's post-scaffold spec against resolved values.
///
/// A template without a post-scaffold section yields an empty plan.
pub fn plan(
    template: &TemplateDefinition,
    values: &ValueMap,
) -> Result<PostScaffoldPlan, ConditionError> {
    let spec = match &template.post_scaffold {
        Some(spec) => spec,
        None => return Ok(PostScaffoldPlan::default()),
    };
    let declared: HashSet<String> = template.parameters.iter().map(|p| p.name.clone()).collect();

    let mut plan = PostScaffoldPlan::default();

    for deletion in &spec.files_to_delete {
        if condition::holds_within(Some(&deletion.condition), values, &declared)? {
            plan.deletions.push(deletion.path.clone());
        }
    }

    for action in &spec.commands {
        if action.command.trim().is_empty() {
            warn!(description = %action.description, "skipping empty post-scaffold command");
            continue;
        }
        if condition::holds_within(action.condition.as_deref(), values, &declared)? {
            plan.commands.push(CommandIntent {
                command: action.command.clone(),
                description: action.description.clone(),
            });
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{
        CommandAction, FileDeletion, Parameter, ParameterKind, PostScaffold,
    };
    use crate::value::ParamValue;

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

    fn template(post_scaffold: Option<PostScaffold>) -> TemplateDefinition {
        TemplateDefinition {
            name: "test".to_string(),
            display_name: "Test".to_string(),
            description: "test template".to_string(),
            parameters: vec![
                param("IncludeTests", ParameterKind::Boolean),
                param("IncludeDocs", ParameterKind::Boolean),
                param("Runtime", ParameterKind::String),
            ],
            post_scaffold,
            files: Vec::new(),
        }
    }

    fn spec() -> PostScaffold {
        PostScaffold {
            files_to_delete: vec![
                FileDeletion {
                    path: "tests".to_string(),
                    condition: "IncludeTests == false".to_string(),
                },
                FileDeletion {
                    path: "docs".to_string(),
                    condition: "IncludeDocs == false".to_string(),
                },
            ],
            commands: vec![
                CommandAction {
                    command: "git init".to_string(),
                    description: "Initialize git repository".to_string(),
                    condition: None,
                },
                CommandAction {
                    command: "npm install".to_string(),
                    description: "Install dependencies".to_string(),
                    condition: Some("Runtime == 'node'".to_string()),
                },
                CommandAction {
                    command: "   ".to_string(),
                    description: "Accidentally blank".to_string(),
                    condition: None,
                },
            ],
        }
    }

    fn values() -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("IncludeTests".to_string(), ParamValue::Bool(true));
        map.insert("IncludeDocs".to_string(), ParamValue::Bool(false));
        map.insert("Runtime".to_string(), ParamValue::from("python"));
        map
    }

    #[test]
    fn test_plan_filters_by_condition_in_order() {
        let template = template(Some(spec()));
        let plan = plan(&template, &values()).unwrap();

        assert_eq!(plan.deletions, vec!["docs".to_string()]);
        assert_eq!(plan.commands.len(), 1);
        assert_eq!(plan.commands[0].command, "git init");
    }

    #[test]
    fn test_plan_fails_on_undeclared_identifier() {
        let template = template(Some(PostScaffold {
            files_to_delete: vec![FileDeletion {
                path: "x".to_string(),
                condition: "Nope == true".to_string(),
            }],
            commands: Vec::new(),
        }));
        let err = plan(&template, &values()).unwrap_err();
        assert_eq!(err, ConditionError::UnknownIdentifier("Nope".to_string()));
    }

    #[test]
    fn test_plan_skipped_parameter_cascades() {
        let mut template = template(Some(PostScaffold {
            files_to_delete: Vec::new(),
            commands: vec![CommandAction {
                command: "pytest -q".to_string(),
                description: "Run the test suite".to_string(),
                condition: Some("TestFramework == 'pytest'".to_string()),
            }],
        }));
        template
            .parameters
            .push(param("TestFramework", ParameterKind::Select));

        // TestFramework is declared but skipped, so the command drops out.
        let plan = plan(&template, &values()).unwrap();
        assert!(plan.commands.is_empty());
    }

    #[test]
    fn test_no_post_scaffold_yields_empty_plan() {
        let template = template(None);
        let plan = plan(&template, &values()).unwrap();
        assert!(plan.is_empty());
    }
}
