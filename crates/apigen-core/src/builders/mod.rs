//! Context builder traits and adapters for language-specific codegen.
pub mod rust;

use crate::manifest::Endpoint;
use serde::Serialize;

/// One endpoint together with the names the build context assigned to it
#[derive(Debug, Clone, Copy)]
pub struct EndpointSite<'a> {
    pub endpoint: &'a Endpoint,
    pub operation_id: &'a str,
    /// Local name of the handler package in the generated module
    pub alias: &'a str,
    /// Suffix shared by the endpoint's generated functions
    pub fn_suffix: &'a str,
}

/// Trait for converting an endpoint into a language-specific template context.
pub trait EndpointContextBuilder {
    /// Context handed to the templates
    type Context: Serialize;

    fn build(&self, site: &EndpointSite<'_>) -> crate::Result<Self::Context>;
}

pub struct EndpointContext;

impl EndpointContext {
    /// Transform endpoints into template contexts.
    ///
    /// Sites must already be in canonical order; the output keeps that order.
    pub fn transform_endpoints<B: EndpointContextBuilder>(
        builder: &B,
        sites: &[EndpointSite<'_>],
    ) -> crate::Result<Vec<B::Context>> {
        sites.iter().map(|site| builder.build(site)).collect()
    }
}
