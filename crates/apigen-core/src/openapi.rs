//! OpenAPI 3.0.3 document assembly.
//!
//! The document is modelled with plain serde structs rather than a generic JSON
//! value so that every map has a fixed order: paths and components are sorted,
//! responses are sorted by status code, methods inside a path item follow the
//! field order of [`PathItem`], and schema properties keep declaration order.
//!
//! # Examples
//!
//! ```
//! use apigen_core::{compile, Config, Manifest};
//!
//! # fn main() -> apigen_core::Result<()> {
//! let manifest = Manifest::parse_content(r#"
//! endpoints:
//!   - method: GET
//!     path: /health
//!     handler: { package: "crate::handlers", name: health }
//!     shape: NoReqNoResp
//! "#)?;
//! let config = Config { openapi_enabled: true, ..Config::default() };
//! let artifacts = compile(&manifest, &config)?;
//! let document: serde_json::Value = serde_json::from_slice(&artifacts.openapi.unwrap())?;
//! assert_eq!(document["openapi"], "3.0.3");
//! assert!(document["paths"]["/health"]["get"]["responses"]["204"].is_object());
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::BTreeMap;

use crate::config::Config;
use crate::context::BuildContext;
use crate::manifest::{Endpoint, HttpMethod, Manifest};
use crate::schema::{Schema, SchemaRegistry, ERROR_RESPONSE};
use crate::templates::BindingLocation;
use crate::{Error, Result};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};

/// Version written to the `openapi` field
pub const OPENAPI_VERSION: &str = "3.0.3";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Root of the generated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: BTreeMap<String, PathItem>,
    pub components: Components,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// Operations of one path; fields serialize in this order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    pub fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Keyed by status code; integer keys keep numeric order
    pub responses: BTreeMap<u16, Response>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: BindingLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

impl Response {
    fn plain(description: &str) -> Self {
        Self {
            description: description.to_string(),
            content: None,
        }
    }

    fn json(description: &str, schema: Schema) -> Self {
        Self {
            description: description.to_string(),
            content: Some(json_content(schema)),
        }
    }

    fn error(description: &str) -> Self {
        Self::json(description, Schema::component(ERROR_RESPONSE))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: BTreeMap<String, Schema>,
}

fn json_content(schema: Schema) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
    content
}

/// Assembles the document from endpoints in canonical order
pub struct OpenApiBuilder<'m> {
    manifest: &'m Manifest,
    registry: SchemaRegistry<'m>,
}

impl<'m> OpenApiBuilder<'m> {
    pub fn new(manifest: &'m Manifest, ctx: &mut BuildContext) -> Self {
        Self {
            manifest,
            registry: SchemaRegistry::new(manifest, ctx),
        }
    }

    /// Build the document.
    ///
    /// `endpoints` must be the canonical endpoint list `ctx` was created from; an
    /// endpoint's position is its key into the context's operation ids.
    pub fn build(
        mut self,
        config: &Config,
        endpoints: &[&'m Endpoint],
        ctx: &mut BuildContext,
    ) -> Result<OpenApiDocument> {
        let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
        for (index, endpoint) in endpoints.iter().copied().enumerate() {
            let operation_id = ctx
                .operation_id(index)
                .ok_or_else(|| {
                    Error::manifest(format!(
                        "no operation id for endpoint {}",
                        endpoint.route_label()
                    ))
                })?
                .to_string();
            let operation = self.operation(ctx, endpoint, operation_id)?;
            let slot = paths.entry(endpoint.path.clone()).or_default().slot(endpoint.method);
            if slot.is_some() {
                return Err(Error::manifest(format!(
                    "duplicate route {}",
                    endpoint.route_label()
                )));
            }
            *slot = Some(operation);
        }

        let schemas = self.registry.into_components();
        log::debug!(
            "OpenAPI document: {} paths, {} schemas",
            paths.len(),
            schemas.len()
        );

        Ok(OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: config.openapi_title.clone(),
                version: config.openapi_version.clone(),
                description: config.openapi_description.clone(),
            },
            servers: config
                .openapi_servers
                .iter()
                .map(|url| Server { url: url.clone() })
                .collect(),
            paths,
            components: Components { schemas },
        })
    }

    fn operation(
        &mut self,
        ctx: &mut BuildContext,
        endpoint: &'m Endpoint,
        operation_id: String,
    ) -> Result<Operation> {
        let doc = self.manifest.doc_for(endpoint);
        let parameters = self.parameters(endpoint)?;

        let request_body = match (endpoint.active_bindings(), endpoint.req_type.as_deref()) {
            (Some(bindings), Some(req)) if bindings.has_json_body => Some(RequestBody {
                required: true,
                content: json_content(self.registry.schema_for(ctx, req)?),
            }),
            (_, Some(req)) => {
                // Reachable from the request type even without a body
                self.registry.schema_for(ctx, req)?;
                None
            }
            _ => None,
        };

        let mut responses = BTreeMap::new();
        match (endpoint.shape.has_response(), endpoint.resp_type.as_deref()) {
            (true, Some(resp)) => {
                let schema = self.registry.schema_for(ctx, resp)?;
                responses.insert(200, Response::json("Successful response", schema));
            }
            (true, None) => {
                return Err(Error::manifest(format!(
                    "endpoint {} has shape {} without respType",
                    endpoint.route_label(),
                    endpoint.shape.as_str()
                )));
            }
            (false, _) => {
                responses.insert(204, Response::plain("No content"));
            }
        }
        if endpoint.requires_binding() {
            responses.insert(400, Response::error("Invalid request"));
        }
        responses.insert(500, Response::error("Internal server error"));
        self.merge_middleware_responses(endpoint, &mut responses);

        Ok(Operation {
            operation_id,
            summary: doc.and_then(|d| d.summary.clone()),
            description: doc.and_then(|d| d.description.clone()),
            tags: vec![tag_for(&endpoint.path)],
            parameters,
            request_body,
            responses,
        })
    }

    fn parameters(&self, endpoint: &Endpoint) -> Result<Vec<Parameter>> {
        let Some(bindings) = endpoint.active_bindings() else {
            return Ok(Vec::new());
        };
        bindings
            .located()
            .map(|(location, binding)| {
                let scalar = Schema::primitive(binding.parse_kind()?);
                let schema = if binding.is_slice {
                    Schema::array(scalar)
                } else {
                    scalar
                };
                Ok(Parameter {
                    name: binding.tag.clone(),
                    location,
                    description: self
                        .manifest
                        .request_field_doc(endpoint, &binding.field)
                        .map(str::to_string),
                    required: location == BindingLocation::Path || !binding.is_pointer,
                    schema,
                })
            })
            .collect()
    }

    /// Middleware statuses never replace a built-in response or an earlier middleware's
    fn merge_middleware_responses(
        &self,
        endpoint: &Endpoint,
        responses: &mut BTreeMap<u16, Response>,
    ) {
        for middleware in &endpoint.middlewares {
            let Some(metadata) = self.manifest.middleware_metadata.get(middleware) else {
                log::debug!("No metadata for middleware {}", middleware);
                continue;
            };
            for decl in &metadata.may_return {
                responses.entry(decl.status).or_insert_with(|| {
                    if decl.status >= 400 {
                        Response::error(&decl.description)
                    } else {
                        Response::plain(&decl.description)
                    }
                });
            }
        }
    }
}

/// Tag of an operation: the first path segment, braces removed
pub fn tag_for(path: &str) -> String {
    let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
    let name = first
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(first);
    if name.is_empty() {
        "default".to_string()
    } else {
        name.to_string()
    }
}

/// Build the document and serialize it as pretty JSON with a trailing newline
pub fn render_document<'m>(
    manifest: &'m Manifest,
    config: &Config,
    endpoints: &[&'m Endpoint],
    ctx: &mut BuildContext,
) -> Result<Vec<u8>> {
    let document = OpenApiBuilder::new(manifest, ctx).build(config, endpoints, ctx)?;
    let mut bytes = serde_json::to_vec_pretty(&document)?;
    bytes.push(b'\n');
    Ok(bytes)
}
