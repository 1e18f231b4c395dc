//! Docker Compose generator.
//!
//! Translates the project manifest into a `docker-compose.yml` plus `.env`
//! and `.env.example` files. Components and services become build-context
//! services on a shared bridge network; each service-owned resource becomes
//! its own compose service, assembled from the resource blueprint's snippet
//! rendered with the instance's config values.

use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use atelier_manifest::{Component, ProjectManifest, ResourceInstance, Service};
use atelier_resources::{BlueprintRegistry, ResourceBlueprint};
use atelier_templates::{ParamValue, TemplateRenderer, ValueMap};

use crate::error::GeneratorError;
use crate::generator::{GeneratedArtifacts, Generator};

/// Name of the bridge network joining all generated services.
const NETWORK_NAME: &str = "atelier_net";

const GENERATED_HEADER: &str = "\
# THIS FILE IS AUTO-GENERATED BY 'atelier generate compose'.
# For permanent changes, modify your atelier.yaml and re-run the command.

";

/// Build configuration of a compose service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildConfig {
    pub context: String,
}

/// A service entry in the generated docker-compose.yml.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComposeService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_file: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<serde_yaml::Value>,
}

/// The complete docker-compose.yml document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposeConfig {
    pub version: String,
    pub services: BTreeMap<String, ComposeService>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, Option<serde_yaml::Value>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, serde_yaml::Value>,
}

/// Generates Docker Compose configuration for local development.
pub struct ComposeGenerator {
    blueprints: Arc<BlueprintRegistry>,
    renderer: TemplateRenderer,
}

impl ComposeGenerator {
    pub fn new(blueprints: Arc<BlueprintRegistry>) -> Self {
        Self {
            blueprints,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Build the compose document, collecting companion warnings.
    fn build_config(
        &self,
        manifest: &ProjectManifest,
        warnings: &mut Vec<String>,
    ) -> Result<ComposeConfig, GeneratorError> {
        let mut config = ComposeConfig {
            version: "3.8".to_string(),
            services: BTreeMap::new(),
            volumes: BTreeMap::new(),
            networks: BTreeMap::from([(
                NETWORK_NAME.to_string(),
                serde_yaml::to_value(BTreeMap::from([("driver", "bridge")]))?,
            )]),
        };

        for (name, component) in &manifest.components {
            config
                .services
                .insert(name.clone(), component_service(component));
        }

        for (name, service) in &manifest.services {
            config.services.insert(name.clone(), app_service(service));

            for (resource_name, resource) in &service.resources {
                self.check_companions(manifest, name, resource_name, resource, warnings);
                let entry = self.resource_service(resource_name, resource)?;
                config
                    .services
                    .insert(format!("{}-{}", name, resource_name), entry);
            }
        }

        // Declare every named volume the service entries reference.
        for service in config.services.values() {
            for volume in &service.volumes {
                if let Some(name) = named_volume(volume) {
                    config.volumes.entry(name.to_string()).or_insert(None);
                }
            }
        }

        resolve_dependencies(&mut config);
        resolve_environment(manifest, &mut config);

        Ok(config)
    }

    /// Assemble a compose service for a resource from its blueprint.
    fn resource_service(
        &self,
        resource_name: &str,
        resource: &ResourceInstance,
    ) -> Result<ComposeService, GeneratorError> {
        let blueprint = self.blueprints.get(&resource.resource_type).map_err(|e| {
            GeneratorError::validation(format!("resource '{}': {}", resource_name, e))
        })?;

        let values = snippet_values(&blueprint, resource);
        let rendered = self
            .renderer
            .render_str(&blueprint.docker_compose_snippet, &values, &blueprint.name)
            .map_err(|e| GeneratorError::Snippet {
                resource: resource_name.to_string(),
                message: e.to_string(),
            })?;
        let snippet: ComposeService =
            serde_yaml::from_str(&rendered).map_err(|e| GeneratorError::Snippet {
                resource: resource_name.to_string(),
                message: e.to_string(),
            })?;
        debug!(resource = %resource_name, blueprint = %blueprint.name, "rendered blueprint snippet");

        let mut entry = ComposeService {
            env_file: vec!["./.env".to_string()],
            networks: vec![NETWORK_NAME.to_string()],
            ..ComposeService::default()
        };
        merge_snippet(&mut entry, snippet);
        Ok(entry)
    }

    /// Warn when a blueprint expects a companion resource the project does
    /// not declare.
    fn check_companions(
        &self,
        manifest: &ProjectManifest,
        service_name: &str,
        resource_name: &str,
        resource: &ResourceInstance,
        warnings: &mut Vec<String>,
    ) {
        let blueprint = match self.blueprints.get(&resource.resource_type) {
            Ok(blueprint) => blueprint,
            Err(_) => return,
        };
        for companion in &blueprint.depends_on {
            let declared = manifest
                .services
                .values()
                .flat_map(|s| s.resources.values())
                .any(|r| &r.resource_type == companion);
            if !declared {
                warnings.push(format!(
                    "resource '{}' of service '{}' expects a companion '{}' resource, which is not declared",
                    resource_name, service_name, companion
                ));
            }
        }
    }

    /// Default credentials for the generated .env file.
    fn env_defaults(&self, manifest: &ProjectManifest) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        for (service_name, service) in &manifest.services {
            for (resource_name, resource) in &service.resources {
                let prefix = format!("{}_{}", service_name, resource_name);
                match resource.resource_type.as_str() {
                    "postgres-db" | "mysql-db" | "mongodb" => {
                        env.insert(format!("{}_user", prefix), format!("{}_user", service_name));
                        env.insert(format!("{}_password", prefix), "password123".to_string());
                        env.insert(
                            format!("{}_name", prefix),
                            format!("{}_{}", service_name, resource_name),
                        );
                        env.insert(
                            format!("{}_dbname", prefix),
                            format!("{}_{}_db", service_name, resource_name),
                        );
                    }
                    "redis-cache" => {
                        env.insert(format!("{}_password", prefix), "password123".to_string());
                    }
                    _ => {}
                }
            }
        }
        env
    }
}

impl Generator for ComposeGenerator {
    fn name(&self) -> &str {
        "compose"
    }

    fn description(&self) -> &str {
        "Generate Docker Compose configuration for local development"
    }

    fn validate(&self, manifest: &ProjectManifest) -> Result<(), GeneratorError> {
        let mut issues = Vec::new();

        if manifest.metadata.name.trim().is_empty() {
            issues.push("project name is required".to_string());
        }
        if manifest.services.is_empty() {
            issues.push("at least one service is required".to_string());
        }

        for (service_name, service) in &manifest.services {
            for (resource_name, resource) in &service.resources {
                let blueprint = match self.blueprints.get(&resource.resource_type) {
                    Ok(blueprint) => blueprint,
                    Err(e) => {
                        issues.push(format!(
                            "service '{}' resource '{}': {}",
                            service_name, resource_name, e
                        ));
                        continue;
                    }
                };
                for parameter in blueprint.mandatory_parameters() {
                    let supplied = resource.config.contains_key(&parameter.name)
                        || (parameter.name == "version" && resource.version.is_some());
                    if !supplied {
                        issues.push(format!(
                            "service '{}' resource '{}' is missing required config '{}'",
                            service_name, resource_name, parameter.name
                        ));
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(GeneratorError::Validation(issues))
        }
    }

    fn generate(&self, manifest: &ProjectManifest) -> Result<GeneratedArtifacts, GeneratorError> {
        self.validate(manifest)?;

        let mut artifacts = GeneratedArtifacts::new();
        let mut warnings = Vec::new();
        let config = self.build_config(manifest, &mut warnings)?;
        artifacts.warnings = warnings;

        let yaml = serde_yaml::to_string(&config)?;
        artifacts.add_file(
            "docker-compose.yml",
            format!("{}{}", GENERATED_HEADER, yaml),
        );
        artifacts.add_message("generated docker-compose.yml");

        let env = self.env_defaults(manifest);
        if !env.is_empty() {
            let env_lines: String = env
                .iter()
                .map(|(k, v)| format!("{}={}\n", k, v))
                .collect();
            let example_lines: String = env.keys().map(|k| format!("{}=\n", k)).collect();
            artifacts.add_file(".env", env_lines);
            artifacts.add_file(".env.example", example_lines);
            artifacts.add_message("generated .env and .env.example with default credentials");
            artifacts.add_warning(
                "default credentials were written to .env; review and change them".to_string(),
            );
        }

        Ok(artifacts)
    }
}

fn component_service(component: &Component) -> ComposeService {
    ComposeService {
        build: Some(BuildConfig {
            context: component.path.clone(),
        }),
        ports: component.ports.clone(),
        networks: vec![NETWORK_NAME.to_string()],
        ..ComposeService::default()
    }
}

fn app_service(service: &Service) -> ComposeService {
    let mut entry = ComposeService {
        build: Some(BuildConfig {
            context: service.path.clone(),
        }),
        env_file: vec!["./.env".to_string()],
        networks: vec![NETWORK_NAME.to_string()],
        ..ComposeService::default()
    };
    if let Some(port) = service.port {
        entry.ports.push(format!("{}:{}", port, port));
    }
    for (key, value) in &service.environment {
        entry.environment.push(format!("{}={}", key, value));
    }
    entry
}

/// Build the snippet value map: blueprint defaults, overlaid with the
/// instance's version and config entries.
fn snippet_values(blueprint: &ResourceBlueprint, resource: &ResourceInstance) -> ValueMap {
    let mut values = ValueMap::new();
    for parameter in &blueprint.parameters {
        if let Some(default) = parameter.default_text() {
            values.insert(parameter.name.clone(), ParamValue::Str(default));
        }
    }
    if let Some(version) = &resource.version {
        values.insert("version".to_string(), ParamValue::Str(version.clone()));
    }
    for (key, value) in &resource.config {
        values.insert(key.clone(), ParamValue::Str(value.clone()));
    }
    values
}

/// Merge a rendered snippet into the base service entry, conservatively:
/// scalars are taken when set, lists are appended.
fn merge_snippet(entry: &mut ComposeService, snippet: ComposeService) {
    if snippet.image.is_some() {
        entry.image = snippet.image;
    }
    if snippet.command.is_some() {
        entry.command = snippet.command;
    }
    if snippet.healthcheck.is_some() {
        entry.healthcheck = snippet.healthcheck;
    }
    entry.ports.extend(snippet.ports);
    entry.environment.extend(snippet.environment);
    entry.volumes.extend(snippet.volumes);
}

/// The named volume a `name:/path` mount refers to, if any.
fn named_volume(mount: &str) -> Option<&str> {
    let name = mount.split(':').next()?;
    if name.is_empty() || name.starts_with('.') || name.starts_with('/') {
        None
    } else {
        Some(name)
    }
}

/// Derive `depends_on` entries from environment variable references such as
/// `${services.backend.name}` and `${components.gateway.port}`.
fn resolve_dependencies(config: &mut ComposeConfig) {
    let reference = Regex::new(r"\$\{([^}]+)\}").expect("reference pattern is valid");

    let mut dependencies: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, service) in &config.services {
        let mut deps = Vec::new();
        for env in &service.environment {
            for caps in reference.captures_iter(env) {
                let parts: Vec<&str> = caps[1].split('.').collect();
                if parts.len() >= 3 && parts[0] == "services" && parts[1] != name.as_str() {
                    deps.push(parts[1].to_string());
                }
                if parts.len() >= 3 && parts[0] == "components" {
                    deps.push(parts[1].to_string());
                }
            }
        }
        deps.sort();
        deps.dedup();
        if !deps.is_empty() {
            dependencies.insert(name.clone(), deps);
        }
    }

    for (name, deps) in dependencies {
        if let Some(service) = config.services.get_mut(&name) {
            service.depends_on = deps;
        }
    }
}

/// Substitute `${services...}` and `${components...}` references with their
/// concrete values.
fn resolve_environment(manifest: &ProjectManifest, config: &mut ComposeConfig) {
    let resource_ref = Regex::new(r"\$\{services\.([^.]+)\.resources\.([^.]+)\.([^}]+)\}")
        .expect("resource reference pattern is valid");
    let component_ref =
        Regex::new(r"\$\{components\.([^.]+)\.([^}]+)\}").expect("component pattern is valid");

    for service in config.services.values_mut() {
        for env in &mut service.environment {
            let resolved = resource_ref.replace_all(env, |caps: &regex::Captures| {
                let service = &caps[1];
                let resource = &caps[2];
                match &caps[3] {
                    "user" => format!("{}_{}_user", service, resource),
                    "password" => format!("{}_{}_password", service, resource),
                    "name" => format!("{}_{}", service, resource),
                    "dbname" => format!("{}_{}_db", service, resource),
                    _ => caps[0].to_string(),
                }
            });
            let resolved = component_ref.replace_all(&resolved, |caps: &regex::Captures| {
                let component = &caps[1];
                match &caps[2] {
                    "name" => component.to_string(),
                    "port" => manifest
                        .components
                        .get(component)
                        .and_then(|c| c.ports.first())
                        .and_then(|mapping| mapping.split(':').next())
                        .map(|port| port.to_string())
                        .unwrap_or_else(|| caps[0].to_string()),
                    _ => caps[0].to_string(),
                }
            });
            *env = resolved.into_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<BlueprintRegistry> {
        Arc::new(BlueprintRegistry::builtin())
    }

    fn manifest_with_redis() -> ProjectManifest {
        let mut manifest = ProjectManifest::new("shop");
        let mut resources = BTreeMap::new();
        resources.insert(
            "cache".to_string(),
            ResourceInstance {
                resource_type: "redis-cache".to_string(),
                version: None,
                config: BTreeMap::from([("password".to_string(), "x".to_string())]),
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
    fn test_validate_requires_services() {
        let generator = ComposeGenerator::new(registry());
        let err = generator.validate(&ProjectManifest::new("empty")).unwrap_err();
        assert!(err.to_string().contains("at least one service"));
    }

    #[test]
    fn test_validate_unknown_resource_type() {
        let generator = ComposeGenerator::new(registry());
        let mut manifest = manifest_with_redis();
        manifest
            .add_resource(
                "backend",
                "weird",
                ResourceInstance {
                    resource_type: "quantum-db".to_string(),
                    version: None,
                    config: BTreeMap::new(),
                },
            )
            .unwrap();

        let err = generator.validate(&manifest).unwrap_err();
        assert!(err.to_string().contains("quantum-db"));
    }

    #[test]
    fn test_validate_missing_required_config() {
        let generator = ComposeGenerator::new(registry());
        let mut manifest = manifest_with_redis();
        manifest
            .services
            .get_mut("backend")
            .unwrap()
            .resources
            .get_mut("cache")
            .unwrap()
            .config
            .clear();

        let err = generator.validate(&manifest).unwrap_err();
        assert!(err.to_string().contains("missing required config 'password'"));
    }

    #[test]
    fn test_generate_renders_blueprint_snippet() {
        let generator = ComposeGenerator::new(registry());
        let manifest = manifest_with_redis();
        generator.validate(&manifest).unwrap();

        let artifacts = generator.generate(&manifest).unwrap();
        let compose =
            String::from_utf8(artifacts.files["docker-compose.yml"].clone()).unwrap();

        assert!(compose.contains("backend-cache"));
        assert!(compose.contains("redis-server --requirepass x"));
        assert!(compose.contains("image: redis:7.2"));
        assert!(compose.contains("redis_data"));
        assert!(compose.starts_with("# THIS FILE IS AUTO-GENERATED"));
    }

    #[test]
    fn test_generate_env_files() {
        let generator = ComposeGenerator::new(registry());
        let artifacts = generator.generate(&manifest_with_redis()).unwrap();

        let env = String::from_utf8(artifacts.files[".env"].clone()).unwrap();
        assert!(env.contains("backend_cache_password=password123"));

        let example = String::from_utf8(artifacts.files[".env.example"].clone()).unwrap();
        assert!(example.contains("backend_cache_password=\n"));
    }

    #[test]
    fn test_environment_references_become_dependencies() {
        let generator = ComposeGenerator::new(registry());
        let mut manifest = manifest_with_redis();
        manifest
            .add_service(
                "frontend",
                Service {
                    template: "react-typescript".to_string(),
                    path: "./frontend".to_string(),
                    port: Some(3000),
                    resources: BTreeMap::new(),
                    environment: BTreeMap::from([(
                        "API_URL".to_string(),
                        "http://${services.backend.name}:8000".to_string(),
                    )]),
                },
            )
            .unwrap();

        let mut warnings = Vec::new();
        let config = generator.build_config(&manifest, &mut warnings).unwrap();
        assert_eq!(config.services["frontend"].depends_on, vec!["backend"]);
    }

    #[test]
    fn test_resource_env_references_are_resolved() {
        let generator = ComposeGenerator::new(registry());
        let mut manifest = manifest_with_redis();
        manifest
            .services
            .get_mut("backend")
            .unwrap()
            .environment
            .insert(
                "CACHE_PASSWORD".to_string(),
                "${services.backend.resources.cache.password}".to_string(),
            );

        let mut warnings = Vec::new();
        let config = generator.build_config(&manifest, &mut warnings).unwrap();
        assert!(config.services["backend"]
            .environment
            .contains(&"CACHE_PASSWORD=backend_cache_password".to_string()));
    }

    #[test]
    fn test_companion_warning_for_kafka_without_zookeeper() {
        let generator = ComposeGenerator::new(registry());
        let mut manifest = manifest_with_redis();
        manifest
            .add_resource(
                "backend",
                "events",
                ResourceInstance {
                    resource_type: "kafka".to_string(),
                    version: None,
                    config: BTreeMap::new(),
                },
            )
            .unwrap();

        let artifacts = generator.generate(&manifest).unwrap();
        assert!(artifacts
            .warnings
            .iter()
            .any(|w| w.contains("companion 'zookeeper'")));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let generator = ComposeGenerator::new(registry());
        let manifest = manifest_with_redis();
        let first = generator.generate(&manifest).unwrap();
        let second = generator.generate(&manifest).unwrap();
        assert_eq!(first.files, second.files);
    }
}
