//! Manifest interchange format consumed by the compiler.
//!
//! The manifest is produced by an external analyzer that inspects handler source.
//! It is a versioned intermediate representation: the compiler never reconstructs
//! any of it, it only reads it. Manifests can be stored as JSON or YAML.
//!
//! Type references are strings ("type-ids"). A type-id resolves, in order, to an
//! entry of [`Manifest::types`], to a primitive [`TypeKind`] name, or to the
//! `[]<type-id>` shorthand for an anonymous slice.

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::kind::TypeKind;
use crate::templates::BindingLocation;
use crate::Error;

// External imports (alphabetized)
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// The only manifest IR version this compiler understands
pub const MANIFEST_VERSION: u32 = 1;

static PATH_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([^{}/]+)\}").unwrap_or_else(|e| panic!("invalid path parameter regex: {e}"))
});

/// The root manifest structure describing one API surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// IR version of the manifest
    #[serde(default = "default_version")]
    pub version: u32,

    /// Every endpoint the API exposes
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,

    /// Named types keyed by type-id
    #[serde(default)]
    pub types: BTreeMap<String, ManifestType>,

    /// Endpoint documentation keyed by handler qualified name
    #[serde(default)]
    pub endpoint_docs: BTreeMap<String, Doc>,

    /// Middleware metadata keyed by middleware qualified name
    #[serde(default)]
    pub middleware_metadata: BTreeMap<String, MiddlewareMetadata>,
}

/// HTTP methods an endpoint can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Lowercase spelling, used for router method functions and OpenAPI operation keys
    pub fn as_lower(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the function implementing an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerRef {
    /// Module path of the handler, e.g. `crate::handlers::pets`
    pub package: String,
    /// Function name inside the package
    pub name: String,
}

impl HandlerRef {
    /// `package::name`, the key used by [`Manifest::endpoint_docs`]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.package, self.name)
    }
}

/// Handler signature category.
///
/// Controls whether a request value is passed to the handler and whether the
/// handler produces a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    NoReqNoResp,
    ReqNoResp,
    NoReqResp,
    ReqResp,
}

impl Shape {
    pub fn has_request(&self) -> bool {
        match self {
            Self::ReqNoResp | Self::ReqResp => true,
            Self::NoReqNoResp | Self::NoReqResp => false,
        }
    }

    pub fn has_response(&self) -> bool {
        match self {
            Self::NoReqResp | Self::ReqResp => true,
            Self::NoReqNoResp | Self::ReqNoResp => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoReqNoResp => "NoReqNoResp",
            Self::ReqNoResp => "ReqNoResp",
            Self::NoReqResp => "NoReqResp",
            Self::ReqResp => "ReqResp",
        }
    }
}

/// One routed endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub method: HttpMethod,

    /// Path template with `{param}` segments
    pub path: String,

    pub handler: HandlerRef,

    pub shape: Shape,

    /// Request type-id, present iff the shape takes a request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req_type: Option<String>,

    /// Response type-id, present iff the shape produces a response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resp_type: Option<String>,

    /// How request fields are bound to transport locations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<BindingInfo>,

    /// Middleware qualified names, outermost first
    #[serde(default)]
    pub middlewares: Vec<String>,
}

impl Endpoint {
    /// Bindings that actually bind something; an empty binding block counts as none
    pub fn active_bindings(&self) -> Option<&BindingInfo> {
        self.bindings.as_ref().filter(|b| !b.is_empty())
    }

    pub fn requires_binding(&self) -> bool {
        self.active_bindings().is_some()
    }

    /// Parameter names appearing in the path template, in template order
    pub fn path_params(&self) -> Vec<&str> {
        path_params(&self.path)
    }

    /// `METHOD path` label used in log lines and error messages
    pub fn route_label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Transport bindings of one request type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingInfo {
    /// Decode the whole body as JSON into the request value
    #[serde(default)]
    pub has_json_body: bool,

    #[serde(default)]
    pub path: Vec<FieldBinding>,

    #[serde(default)]
    pub query: Vec<FieldBinding>,

    #[serde(default)]
    pub header: Vec<FieldBinding>,
}

impl BindingInfo {
    pub fn is_empty(&self) -> bool {
        !self.has_json_body && self.path.is_empty() && self.query.is_empty() && self.header.is_empty()
    }

    /// All field bindings tagged with their location: path, then query, then header
    pub fn located(&self) -> impl Iterator<Item = (BindingLocation, &FieldBinding)> {
        self.path
            .iter()
            .map(|b| (BindingLocation::Path, b))
            .chain(self.query.iter().map(|b| (BindingLocation::Query, b)))
            .chain(self.header.iter().map(|b| (BindingLocation::Header, b)))
    }
}

/// Binding of one request field to a path parameter, query key or header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBinding {
    /// Field name on the request type
    pub field: String,

    /// External name: path parameter, query key or header name
    pub tag: String,

    /// Primitive kind; informational for slice bindings
    #[serde(default)]
    pub kind: String,

    /// Optional value: absence leaves the field unset
    #[serde(default)]
    pub is_pointer: bool,

    /// Repeated value: every occurrence is parsed
    #[serde(default)]
    pub is_slice: bool,

    /// Element kind of a repeated value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem_kind: Option<String>,
}

impl FieldBinding {
    /// Kind every raw value is parsed as.
    ///
    /// For slice bindings this is the element kind.
    pub fn parse_kind(&self) -> crate::Result<TypeKind> {
        let raw = if self.is_slice {
            self.elem_kind.as_deref().ok_or_else(|| {
                Error::manifest(format!(
                    "slice binding '{}' (tag '{}') has no element kind",
                    self.field, self.tag
                ))
            })?
        } else {
            self.kind.as_str()
        };
        TypeKind::from_str(raw).map_err(|e| {
            Error::manifest(format!("binding '{}' (tag '{}'): {}", self.field, self.tag, e))
        })
    }
}

/// Structural category of a named type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeShape {
    Struct,
    Slice,
}

/// A named type reachable from request or response values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestType {
    /// Type-id; when set it must equal the key under which the type is stored
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub kind: TypeShape,

    /// Struct fields in source declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ManifestField>,

    /// Element type-id of a slice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// One struct field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestField {
    /// Source field name
    pub name: String,

    /// Name in the JSON body; empty means the field is only bound from the transport
    #[serde(default)]
    pub json_name: String,

    #[serde(rename = "type")]
    pub type_id: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl ManifestField {
    pub fn in_body(&self) -> bool {
        !self.json_name.is_empty()
    }
}

/// Endpoint documentation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Extra responses a middleware may produce
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiddlewareMetadata {
    #[serde(default)]
    pub may_return: Vec<StatusDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDecl {
    pub status: u16,
    pub description: String,
}

/// A resolved type-id
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeRef<'a> {
    Primitive(TypeKind),
    /// A named struct, with its type-id
    Struct(&'a str, &'a ManifestType),
    /// A slice, with its element type-id
    Slice(&'a str),
}

impl Manifest {
    /// Create an empty manifest at the current IR version
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            endpoints: Vec::new(),
            types: BTreeMap::new(),
            endpoint_docs: BTreeMap::new(),
            middleware_metadata: BTreeMap::new(),
        }
    }

    /// Load a manifest from a JSON or YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or doesn't parse. The manifest is
    /// not validated here; [`crate::compile`] validates it.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading manifest from {}", path.display());
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::manifest(format!("Failed to parse manifest at {}: {}", path.display(), e))
        })
    }

    /// Parse content as either JSON or YAML.
    ///
    /// Content that opens with `{` is treated as JSON so that a JSON syntax error is
    /// reported as such instead of as a confusing YAML error.
    pub fn parse_content(content: &str) -> crate::Result<Self> {
        if content.trim_start().starts_with('{') {
            return Ok(serde_json::from_str(content)?);
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve a type-id.
    ///
    /// # Errors
    ///
    /// A type-id that is neither a known type, a primitive kind nor a `[]` slice
    /// shorthand is a dangling reference.
    pub fn resolve<'a>(&'a self, type_id: &'a str) -> crate::Result<TypeRef<'a>> {
        if let Some((id, ty)) = self.types.get_key_value(type_id) {
            return match ty.kind {
                TypeShape::Struct => Ok(TypeRef::Struct(id.as_str(), ty)),
                TypeShape::Slice => ty
                    .elem
                    .as_deref()
                    .map(TypeRef::Slice)
                    .ok_or_else(|| Error::manifest(format!("slice type '{}' has no elem", id))),
            };
        }
        if let Ok(kind) = TypeKind::from_str(type_id) {
            return Ok(TypeRef::Primitive(kind));
        }
        if let Some(elem) = type_id.strip_prefix("[]") {
            return Ok(TypeRef::Slice(elem));
        }
        Err(Error::manifest(format!("dangling type reference '{}'", type_id)))
    }

    /// Whether a type-id denotes a slice
    pub fn is_slice(&self, type_id: &str) -> bool {
        matches!(self.resolve(type_id), Ok(TypeRef::Slice(_)))
    }

    /// Documentation for the endpoint's handler, if any
    pub fn doc_for(&self, endpoint: &Endpoint) -> Option<&Doc> {
        self.endpoint_docs.get(&endpoint.handler.qualified_name())
    }

    /// Doc comment of a field of the endpoint's request type, looked up by source name
    pub fn request_field_doc(&self, endpoint: &Endpoint, field: &str) -> Option<&str> {
        let req = endpoint.req_type.as_deref()?;
        let ty = self.types.get(req)?;
        ty.fields
            .iter()
            .find(|f| f.name == field)
            .and_then(|f| f.doc.as_deref())
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

fn default_version() -> u32 {
    MANIFEST_VERSION
}

/// Parameter names appearing as `{name}` segments of a path template
pub fn path_params(path: &str) -> Vec<&str> {
    PATH_PARAM
        .captures_iter(path)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PETS_YAML: &str = r#"
version: 1
endpoints:
  - method: GET
    path: /pets/{id}
    handler:
      package: crate::handlers::pets
      name: get_pet
    shape: ReqResp
    reqType: crate::models::GetPetRequest
    respType: crate::models::Pet
    bindings:
      path:
        - field: id
          tag: id
          kind: string
types:
  crate::models::GetPetRequest:
    kind: struct
    fields:
      - name: id
        type: string
  crate::models::Pet:
    kind: struct
    fields:
      - name: id
        jsonName: id
        type: string
        required: true
"#;

    #[test]
    fn test_parse_yaml() -> crate::Result<()> {
        let manifest = Manifest::parse_content(PETS_YAML)?;
        assert_eq!(manifest.version, 1);
        assert_eq!(manifest.endpoints.len(), 1);
        let endpoint = &manifest.endpoints[0];
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert_eq!(endpoint.shape, Shape::ReqResp);
        assert_eq!(endpoint.handler.qualified_name(), "crate::handlers::pets::get_pet");
        let bindings = endpoint.bindings.as_ref().unwrap();
        assert!(!bindings.has_json_body);
        assert_eq!(bindings.path[0].tag, "id");
        assert!(!bindings.path[0].is_pointer);
        assert!(manifest.types["crate::models::GetPetRequest"].fields[0].json_name.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_json_reports_json_errors() {
        let err = Manifest::parse_content("{\"endpoints\": [").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_missing_version_defaults_to_current() -> crate::Result<()> {
        let manifest = Manifest::parse_content("{\"endpoints\": []}")?;
        assert_eq!(manifest.version, MANIFEST_VERSION);
        Ok(())
    }

    #[test]
    fn test_resolve_order() -> crate::Result<()> {
        let manifest = Manifest::parse_content(PETS_YAML)?;
        assert!(matches!(
            manifest.resolve("crate::models::Pet")?,
            TypeRef::Struct("crate::models::Pet", _)
        ));
        assert_eq!(manifest.resolve("int32")?, TypeRef::Primitive(TypeKind::Int32));
        assert_eq!(
            manifest.resolve("[]crate::models::Pet")?,
            TypeRef::Slice("crate::models::Pet")
        );
        assert!(manifest.is_slice("[]string"));
        assert!(manifest.resolve("crate::models::Missing").unwrap_err().is_manifest());
        Ok(())
    }

    #[test]
    fn test_path_params() {
        assert_eq!(path_params("/users/{user_id}/posts/{post}"), vec!["user_id", "post"]);
        assert!(path_params("/health").is_empty());
    }

    #[test]
    fn test_slice_binding_parse_kind_uses_elem() {
        let binding = FieldBinding {
            field: "tags".into(),
            tag: "tag".into(),
            kind: "slice".into(),
            is_pointer: false,
            is_slice: true,
            elem_kind: Some("int16".into()),
        };
        assert_eq!(binding.parse_kind().unwrap(), TypeKind::Int16);

        let missing = FieldBinding { elem_kind: None, ..binding };
        assert!(missing.parse_kind().unwrap_err().is_manifest());
    }

    #[test]
    fn test_request_field_doc() -> crate::Result<()> {
        let mut manifest = Manifest::parse_content(PETS_YAML)?;
        if let Some(ty) = manifest.types.get_mut("crate::models::GetPetRequest") {
            ty.fields[0].doc = Some("Pet identifier".into());
        }
        let endpoint = manifest.endpoints[0].clone();
        assert_eq!(manifest.request_field_doc(&endpoint, "id"), Some("Pet identifier"));
        assert_eq!(manifest.request_field_doc(&endpoint, "nope"), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_from_file() -> crate::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("manifest.yaml");
        tokio::fs::write(&path, PETS_YAML).await?;
        let manifest = Manifest::from_file(&path).await?;
        assert_eq!(manifest.endpoints[0].path, "/pets/{id}");

        let missing = Manifest::from_file(dir.path().join("nope.json")).await;
        assert!(matches!(missing, Err(Error::Io(_))));
        Ok(())
    }
}
