//! # atelier_templates
//!
//! Template discovery, parameter resolution and rendering for Atelier.
//!
//! The crate covers the project-creation half of the platform:
//!
//! - [`TemplateCatalog`] discovers template directories and their
//!   `template.json` manifests.
//! - [`ParameterResolver`] collects and validates parameter values from a
//!   [`ValueSource`], honoring conditional visibility between parameters.
//! - [`condition`] is the restricted expression language shared by
//!   parameter visibility, file inclusion and post-scaffold gating.
//! - [`TemplateRenderer`] expands placeholders and conditional blocks in
//!   file content and file names, producing an in-memory output set.
//! - [`post_scaffold`] evaluates cleanup and command actions into intents
//!   for the caller to execute.
//!
//! ## Example
//!
//! ```rust,no_run
//! use atelier_templates::{
//!     MapValueSource, ParameterResolver, TemplateCatalog, TemplateRenderer,
//! };
//!
//! let catalog = TemplateCatalog::new("templates");
//! let template = catalog.load("fastapi-basic").unwrap();
//!
//! let mut source = MapValueSource::new()
//!     .with("ProjectName", "my-api")
//!     .with("IncludeTests", true);
//! let values = ParameterResolver::resolve(&template, &mut source).unwrap();
//!
//! let renderer = TemplateRenderer::new();
//! let files = renderer.render(&template, &values).unwrap();
//! ```

pub mod catalog;
pub mod condition;
pub mod error;
pub mod manifest;
pub mod post_scaffold;
pub mod renderer;
pub mod resolver;
pub mod value;

pub use catalog::{TemplateCatalog, MANIFEST_FILE};
pub use condition::{holds, Condition, Literal, Operator};
pub use error::{ConditionError, DiscoveryError, RenderError, ResolveError};
pub use manifest::{
    CommandAction, FileCondition, FileDeletion, Parameter, ParameterKind, PostScaffold,
    TemplateDefinition, TemplateFile, TemplateManifest, Validation,
};
pub use post_scaffold::{CommandIntent, PostScaffoldPlan};
pub use renderer::{RenderedFile, TemplateRenderer};
pub use resolver::{MapValueSource, ParameterResolver, ValueSource};
pub use value::{ParamValue, ValueMap};
