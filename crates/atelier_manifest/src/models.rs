//! Project manifest data model.
//!
//! The manifest (`atelier.yaml`) is the declarative description of a
//! multi-service project: metadata, deployment environments, shared
//! components, and services with their owned resources. It is built
//! incrementally by the scaffolding workflow and read by the artifact
//! generators.
//!
//! Maps are ordered (`BTreeMap`) so that a saved manifest and everything
//! generated from it serialize identically run over run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// File name of the persisted project manifest.
pub const MANIFEST_FILE_NAME: &str = "atelier.yaml";

/// API version written into new manifests.
pub const API_VERSION: &str = "atelier.dev/v1";

/// Kind written into new manifests.
pub const KIND: &str = "Project";

/// The root manifest document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: ProjectMetadata,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, Environment>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, Component>,
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
}

/// Project-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMetadata {
    pub name: String,
}

/// A deployment environment (aws, gcp, azure, local, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Environment {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

/// A shared project component, such as a gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Component {
    pub template: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
}

/// A service with its configuration and owned resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub template: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, ResourceInstance>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// A service-owned infrastructure resource, referencing a blueprint by
/// type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceInstance {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

impl ProjectManifest {
    /// Create an empty manifest for a new project.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ProjectMetadata { name: name.into() },
            environments: BTreeMap::new(),
            components: BTreeMap::new(),
            services: BTreeMap::new(),
        }
    }

    /// Add a service; the name must be unused.
    pub fn add_service(
        &mut self,
        name: impl Into<String>,
        service: Service,
    ) -> Result<(), ManifestError> {
        let name = name.into();
        if self.services.contains_key(&name) {
            return Err(ManifestError::DuplicateService(name));
        }
        self.services.insert(name, service);
        Ok(())
    }

    /// Attach a resource to a service; the resource name must be unused
    /// within that service.
    pub fn add_resource(
        &mut self,
        service_name: &str,
        resource_name: impl Into<String>,
        resource: ResourceInstance,
    ) -> Result<(), ManifestError> {
        let service = self
            .services
            .get_mut(service_name)
            .ok_or_else(|| ManifestError::UnknownService(service_name.to_string()))?;
        let resource_name = resource_name.into();
        if service.resources.contains_key(&resource_name) {
            return Err(ManifestError::DuplicateResource {
                service: service_name.to_string(),
                resource: resource_name,
            });
        }
        service.resources.insert(resource_name, resource);
        Ok(())
    }

    /// All template names referenced by services and components.
    pub fn referenced_templates(&self) -> Vec<&str> {
        let mut templates: Vec<&str> = self
            .services
            .values()
            .map(|s| s.template.as_str())
            .chain(self.components.values().map(|c| c.template.as_str()))
            .collect();
        templates.sort_unstable();
        templates.dedup();
        templates
    }

    /// All resource types referenced by any service.
    pub fn referenced_resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .services
            .values()
            .flat_map(|s| s.resources.values())
            .map(|r| r.resource_type.as_str())
            .collect();
        types.sort_unstable();
        types.dedup();
        types
    }
}
