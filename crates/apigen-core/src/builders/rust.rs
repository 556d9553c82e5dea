//! Rust/axum endpoint context builder.

use super::{EndpointContextBuilder, EndpointSite};
use crate::manifest::{Endpoint, FieldBinding, Manifest};
use crate::templates::BindingLocation;
use crate::utils::{rust_ident, rust_string_literal};
use crate::Error;
use serde::{Deserialize, Serialize};

/// How one bound field is read: which helper, from where, parsed by what
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RustBindingContext {
    /// Field on the request value, raw-escaped if needed
    pub field: String,
    pub field_lit: String,
    pub tag_lit: String,
    /// Variant of the generated `Source` enum
    pub source: String,
    /// `required_one`, `optional_one`, `required_many` or `optional_many`
    pub helper: String,
    pub parser_fn: String,
}

/// Rust-specific context for one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RustEndpointContext {
    pub operation_id: String,
    /// `METHOD path`, for doc comments
    pub route: String,
    /// Qualified handler name, for doc comments
    pub handler: String,
    /// `alias::name` as called from the generated module
    pub handler_call: String,
    /// Binder function; absent when nothing is bound
    pub bind_fn: Option<String>,
    pub dispatch_fn: String,
    pub has_request: bool,
    pub has_response: bool,
    /// Response type is a slice and needs the null guard
    pub resp_is_slice: bool,
    pub request_type: Option<String>,
    pub has_json_body: bool,
    pub bindings: Vec<RustBindingContext>,
    /// Axum extractor parameters of the dispatch function, in extraction order
    pub extractors: Vec<String>,
    /// `RequestParts` fields filled from the extractors
    pub parts_fields: Vec<String>,
    /// Every `RequestParts` field is extracted
    pub parts_complete: bool,
}

impl RustEndpointContext {
    pub fn needs_path(&self) -> bool {
        self.parts_fields.iter().any(|f| f == "path")
    }

    pub fn needs_query(&self) -> bool {
        self.parts_fields.iter().any(|f| f == "query")
    }
}

#[derive(Debug, Clone)]
pub struct RustEndpointContextBuilder<'m> {
    manifest: &'m Manifest,
}

impl<'m> RustEndpointContextBuilder<'m> {
    pub fn new(manifest: &'m Manifest) -> Self {
        Self { manifest }
    }
}

impl EndpointContextBuilder for RustEndpointContextBuilder<'_> {
    type Context = RustEndpointContext;

    fn build(&self, site: &EndpointSite<'_>) -> crate::Result<RustEndpointContext> {
        let endpoint = site.endpoint;
        let bindings = endpoint.active_bindings();

        let mut binds = Vec::new();
        if let Some(info) = bindings {
            for (location, binding) in info.located() {
                binds.push(binding_context(location, binding)?);
            }
        }

        let (extractors, parts_fields) = extractors(endpoint);
        let has_request = endpoint.shape.has_request();
        let has_response = endpoint.shape.has_response();
        let resp_is_slice = match (has_response, endpoint.resp_type.as_deref()) {
            (true, Some(resp)) => self.manifest.is_slice(resp),
            _ => false,
        };

        let bind_fn = match (bindings, endpoint.req_type.as_ref()) {
            (Some(_), Some(_)) => Some(format!("bind_{}", site.fn_suffix)),
            (Some(_), None) => {
                return Err(Error::manifest(format!(
                    "endpoint {} binds fields without a request type",
                    endpoint.route_label()
                )));
            }
            (None, _) => None,
        };

        Ok(RustEndpointContext {
            operation_id: site.operation_id.to_string(),
            route: endpoint.route_label(),
            handler: endpoint.handler.qualified_name(),
            handler_call: format!("{}::{}", site.alias, rust_ident(&endpoint.handler.name)),
            bind_fn,
            dispatch_fn: format!("dispatch_{}", site.fn_suffix),
            has_request,
            has_response,
            resp_is_slice,
            request_type: endpoint.req_type.clone(),
            has_json_body: bindings.map(|b| b.has_json_body).unwrap_or(false),
            bindings: binds,
            parts_complete: parts_fields.len() == 4,
            extractors,
            parts_fields,
        })
    }
}

fn binding_context(
    location: BindingLocation,
    binding: &FieldBinding,
) -> crate::Result<RustBindingContext> {
    let kind = binding.parse_kind()?;
    let optional = binding.is_pointer && location != BindingLocation::Path;
    let helper = match (binding.is_slice, optional) {
        (false, false) => "required_one",
        (false, true) => "optional_one",
        (true, false) => "required_many",
        (true, true) => "optional_many",
    };
    Ok(RustBindingContext {
        field: rust_ident(&binding.field),
        field_lit: rust_string_literal(&binding.field),
        tag_lit: rust_string_literal(&binding.tag),
        source: location.source_variant().to_string(),
        helper: helper.to_string(),
        parser_fn: kind.parser_fn(),
    })
}

/// Extractors a dispatch function needs; the body extractor always comes last
fn extractors(endpoint: &Endpoint) -> (Vec<String>, Vec<String>) {
    let mut params = Vec::new();
    let mut fields = Vec::new();
    let Some(info) = endpoint.active_bindings() else {
        return (params, fields);
    };
    if !info.path.is_empty() {
        params.push("Path(path): Path<HashMap<String, String>>".to_string());
        fields.push("path".to_string());
    }
    if !info.query.is_empty() {
        params.push("Query(query): Query<Vec<(String, String)>>".to_string());
        fields.push("query".to_string());
    }
    if !info.header.is_empty() {
        params.push("headers: HeaderMap".to_string());
        fields.push("headers".to_string());
    }
    if info.has_json_body {
        params.push("body: Bytes".to_string());
        fields.push("body".to_string());
    }
    (params, fields)
}
