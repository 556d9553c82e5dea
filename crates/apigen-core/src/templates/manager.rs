//! Template system for code generation
//!
//! Templates ship inside the crate and are registered with a fresh [`Tera`]
//! instance per manager, so rendering never depends on the working directory and
//! no engine state is shared between builds.

// Internal imports (std, crate)
use std::error::Error as StdError;
use std::sync::Arc;

use crate::error::{Error, Result};

// External imports (alphabetized)
use serde::Serialize;
use tera::{Context, Tera};

/// Binder and dispatch module
pub const ROUTES_TEMPLATE: &str = "rust_axum/routes.rs.tera";
/// Docs UI routing shim
pub const DOCS_ROUTES_TEMPLATE: &str = "rust_axum/docs.rs.tera";
/// Docs UI viewer page
pub const DOCS_INDEX_TEMPLATE: &str = "docs/index.html.tera";

const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (
        ROUTES_TEMPLATE,
        include_str!("../../templates/rust_axum/routes.rs.tera"),
    ),
    (
        DOCS_ROUTES_TEMPLATE,
        include_str!("../../templates/rust_axum/docs.rs.tera"),
    ),
    (
        DOCS_INDEX_TEMPLATE,
        include_str!("../../templates/docs/index.html.tera"),
    ),
];

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Tera template engine holding every embedded template
    tera: Arc<Tera>,
}

impl TemplateManager {
    /// Create a manager with every embedded template registered.
    ///
    /// Autoescaping is disabled: most outputs are Rust source, and the HTML template
    /// escapes its values explicitly.
    pub fn embedded() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.add_raw_templates(EMBEDDED_TEMPLATES.iter().copied())?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// List all available templates, sorted
    pub fn list_templates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    /// Render a template with a serializable context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        let tera_context = Context::from_serialize(context)
            .map_err(|e| Error::template(format!("Failed to serialize context: {}", e)))?;

        log::debug!("Rendering template: {}", template_name);
        self.tera
            .render(template_name, &tera_context)
            .map_err(|e| {
                let detail = error_chain(&e);
                log::error!("Template rendering failed for '{}': {}", template_name, detail);
                Error::template(format!(
                    "Failed to render template '{}': {}",
                    template_name, detail
                ))
            })
    }
}

/// Tera reports the useful part of a failure in the source chain
fn error_chain(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut current: Option<&dyn StdError> = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
