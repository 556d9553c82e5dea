//! apigen Core Library
//!
//! This library compiles an API manifest, the description of every endpoint an
//! external analyzer found in handler source, into request binders and dispatch
//! routes, an OpenAPI 3.0.3 document and an optional docs UI bundle.
//!
//! [`compile`] is a pure transform: it performs no I/O, keeps no state between
//! calls and produces byte-identical output for the same input.

pub mod builders;
pub mod config;
pub mod context;
pub mod docs;
pub mod error;
pub mod generate;
pub mod kind;
pub mod manifest;
pub mod openapi;
pub mod ordering;
pub mod schema;
pub mod templates;
pub mod utils;
pub mod validate;

pub use crate::{
    config::Config,
    docs::{BundleFile, DocsBundle},
    error::{Error, Result},
    manifest::Manifest,
    openapi::OpenApiDocument,
    templates::TemplateManager,
};

use crate::context::BuildContext;
use crate::ordering::canonical_endpoints;

/// Name written into the header of generated files
pub const GENERATOR: &str = "apigen";

/// Everything one compilation produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Binder and dispatch module source
    pub source: String,
    /// OpenAPI document bytes, when enabled
    pub openapi: Option<Vec<u8>>,
    /// Docs UI bundle, when enabled
    pub docs: Option<DocsBundle>,
}

/// Compile a manifest into source, OpenAPI document and docs bundle.
///
/// The config is validated first, then the manifest. Either all artifacts are
/// produced or a single error is returned.
///
/// # Errors
///
/// [`Error::Config`] for malformed options, [`Error::Manifest`] for an
/// inconsistent manifest, and template errors should rendering fail.
pub fn compile(manifest: &Manifest, config: &Config) -> Result<Artifacts> {
    let config = config.clone().validated()?;
    manifest.validate()?;

    let endpoints = canonical_endpoints(manifest);
    let mut ctx = BuildContext::new(&endpoints);
    let templates = TemplateManager::embedded()?;

    let source = generate::generate_source(manifest, &endpoints, &ctx, &templates)?;
    let openapi = if config.openapi_enabled {
        Some(openapi::render_document(
            manifest,
            &config,
            &endpoints,
            &mut ctx,
        )?)
    } else {
        None
    };
    let docs = docs::generate_docs(&config, &templates)?;

    log::info!(
        "Compiled {} endpoints (openapi: {}, docs: {})",
        endpoints.len(),
        openapi.is_some(),
        docs.is_some()
    );
    Ok(Artifacts {
        source,
        openapi,
        docs,
    })
}
