//! Manifest validation utilities.

use crate::models::{ProjectManifest, API_VERSION, KIND};

/// Validation result with details.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Validator for project manifests.
///
/// Cross-checks against the template catalog and the blueprint registry are
/// passed in as plain name lists, so the crate stays a leaf: callers supply
/// whatever sources of truth they hold.
pub struct ManifestValidator;

impl ManifestValidator {
    /// Validate the manifest structure and its references.
    pub fn validate(
        manifest: &ProjectManifest,
        known_templates: &[String],
        known_resource_types: &[String],
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        if manifest.metadata.name.trim().is_empty() {
            report.add_error("project name cannot be empty");
        }
        if manifest.api_version != API_VERSION {
            report.add_warning(format!(
                "apiVersion '{}' differs from current '{}'",
                manifest.api_version, API_VERSION
            ));
        }
        if manifest.kind != KIND {
            report.add_error(format!(
                "kind must be '{}', found '{}'",
                KIND, manifest.kind
            ));
        }

        for (name, service) in &manifest.services {
            if service.path.trim().is_empty() {
                report.add_error(format!("service '{}' has an empty path", name));
            }
            if !known_templates.iter().any(|t| t == &service.template) {
                report.add_error(format!(
                    "service '{}' references unknown template '{}'",
                    name, service.template
                ));
            }
            for (resource_name, resource) in &service.resources {
                if !known_resource_types
                    .iter()
                    .any(|t| t == &resource.resource_type)
                {
                    report.add_error(format!(
                        "resource '{}' of service '{}' references unknown type '{}'",
                        resource_name, name, resource.resource_type
                    ));
                }
            }
        }

        for (name, component) in &manifest.components {
            if component.path.trim().is_empty() {
                report.add_error(format!("component '{}' has an empty path", name));
            }
            if !known_templates.iter().any(|t| t == &component.template) {
                report.add_error(format!(
                    "component '{}' references unknown template '{}'",
                    name, component.template
                ));
            }
        }

        for (name, environment) in &manifest.environments {
            if environment.provider.trim().is_empty() {
                report.add_error(format!("environment '{}' has an empty provider", name));
            }
        }

        if manifest.services.is_empty() {
            report.add_warning("project declares no services");
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceInstance, Service};
    use std::collections::BTreeMap;

    fn manifest() -> ProjectManifest {
        let mut manifest = ProjectManifest::new("shop");
        let mut resources = BTreeMap::new();
        resources.insert(
            "maindb".to_string(),
            ResourceInstance {
                resource_type: "postgres-db".to_string(),
                version: None,
                config: BTreeMap::new(),
            },
        );
        manifest
            .add_service(
                "backend",
                Service {
                    template: "fastapi-basic".to_string(),
                    path: "./backend".to_string(),
                    port: Some(8000),
                    resources,
                    environment: BTreeMap::new(),
                },
            )
            .unwrap();
        manifest
    }

    #[test]
    fn test_valid_manifest() {
        let report = ManifestValidator::validate(
            &manifest(),
            &["fastapi-basic".to_string()],
            &["postgres-db".to_string()],
        );
        assert!(report.valid, "errors: {:?}", report.errors);
    }

    #[test]
    fn test_unknown_template_reported() {
        let report = ManifestValidator::validate(&manifest(), &[], &["postgres-db".to_string()]);
        assert!(!report.valid);
        assert!(report.errors[0].contains("unknown template"));
    }

    #[test]
    fn test_unknown_resource_type_reported() {
        let report =
            ManifestValidator::validate(&manifest(), &["fastapi-basic".to_string()], &[]);
        assert!(!report.valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("unknown type 'postgres-db'")));
    }

    #[test]
    fn test_empty_name_reported() {
        let mut bad = manifest();
        bad.metadata.name = String::new();
        let report = ManifestValidator::validate(
            &bad,
            &["fastapi-basic".to_string()],
            &["postgres-db".to_string()],
        );
        assert!(!report.valid);
    }
}
