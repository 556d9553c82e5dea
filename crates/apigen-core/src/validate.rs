//! Manifest validation.
//!
//! The compiler fails closed: any inconsistency in the manifest aborts the build
//! with one descriptive [`Error::Manifest`] before a single artifact is rendered.
//! Endpoints are checked in canonical order so the reported error does not depend
//! on the order the analyzer listed them in.

// Internal imports (std, crate)
use std::collections::{HashMap, HashSet};

use crate::manifest::{Endpoint, Manifest, TypeRef, TypeShape, MANIFEST_VERSION};
use crate::ordering::canonical_endpoints;
use crate::templates::BindingLocation;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

impl Manifest {
    /// Check the manifest for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::Manifest`] found.
    pub fn validate(&self) -> Result<()> {
        validate(self)
    }
}

/// Validate a manifest
pub fn validate(manifest: &Manifest) -> Result<()> {
    if manifest.version != MANIFEST_VERSION {
        return Err(Error::manifest(format!(
            "unsupported manifest version {} (expected {})",
            manifest.version, MANIFEST_VERSION
        )));
    }

    validate_types(manifest)?;
    validate_middlewares(manifest)?;

    let mut routes = HashSet::new();
    for endpoint in canonical_endpoints(manifest) {
        validate_endpoint(manifest, endpoint)
            .map_err(|e| with_context(e, &format!("endpoint {}", endpoint.route_label())))?;
        if !routes.insert((endpoint.method, endpoint.path.as_str())) {
            return Err(Error::manifest(format!(
                "duplicate route {}",
                endpoint.route_label()
            )));
        }
    }

    log::debug!(
        "Manifest valid: {} endpoints, {} types",
        manifest.endpoints.len(),
        manifest.types.len()
    );
    Ok(())
}

fn validate_middlewares(manifest: &Manifest) -> Result<()> {
    for (name, metadata) in &manifest.middleware_metadata {
        for decl in &metadata.may_return {
            if !(100..=599).contains(&decl.status) {
                return Err(Error::manifest(format!(
                    "middleware '{}' declares status {} outside 100..=599",
                    name, decl.status
                )));
            }
        }
    }
    Ok(())
}

fn validate_types(manifest: &Manifest) -> Result<()> {
    for (id, ty) in &manifest.types {
        if !ty.id.is_empty() && &ty.id != id {
            return Err(Error::manifest(format!(
                "type stored under '{}' declares id '{}'",
                id, ty.id
            )));
        }
        match ty.kind {
            TypeShape::Slice => {
                let elem = ty.elem.as_deref().ok_or_else(|| {
                    Error::manifest(format!("slice type '{}' has no elem", id))
                })?;
                manifest
                    .resolve(elem)
                    .map_err(|e| with_context(e, &format!("type '{}'", id)))?;
            }
            TypeShape::Struct => {
                let mut json_names = HashSet::new();
                for field in &ty.fields {
                    if field.name.is_empty() {
                        return Err(Error::manifest(format!(
                            "type '{}' has a field without a name",
                            id
                        )));
                    }
                    if field.in_body() && !json_names.insert(field.json_name.as_str()) {
                        return Err(Error::manifest(format!(
                            "type '{}' declares JSON name '{}' twice",
                            id, field.json_name
                        )));
                    }
                    manifest.resolve(&field.type_id).map_err(|e| {
                        with_context(e, &format!("field '{}' of type '{}'", field.name, id))
                    })?;
                }
            }
        }
    }

    let mut state = HashMap::new();
    for id in manifest.types.keys() {
        visit(manifest, id, &mut state, &mut Vec::new())?;
    }
    Ok(())
}

/// Depth-first walk rejecting cycles in type references
fn visit<'a>(
    manifest: &'a Manifest,
    type_id: &'a str,
    state: &mut HashMap<&'a str, Visit>,
    stack: &mut Vec<&'a str>,
) -> Result<()> {
    match state.get(type_id) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::Active) => {
            let mut cycle = stack.clone();
            cycle.push(type_id);
            return Err(Error::manifest(format!(
                "type references form a cycle: {}",
                cycle.join(" -> ")
            )));
        }
        None => {}
    }

    state.insert(type_id, Visit::Active);
    stack.push(type_id);
    let children: Vec<&'a str> = match manifest.resolve(type_id)? {
        TypeRef::Primitive(_) => Vec::new(),
        TypeRef::Struct(_, ty) => ty.fields.iter().map(|f| f.type_id.as_str()).collect(),
        TypeRef::Slice(elem) => vec![elem],
    };
    for child in children {
        visit(manifest, child, state, stack)?;
    }
    stack.pop();
    state.insert(type_id, Visit::Done);
    Ok(())
}

fn validate_endpoint(manifest: &Manifest, endpoint: &Endpoint) -> Result<()> {
    if endpoint.handler.package.is_empty() || endpoint.handler.name.is_empty() {
        return Err(Error::manifest("handler package and name must be set"));
    }
    if !endpoint.path.starts_with('/') {
        return Err(Error::manifest("path must start with '/'"));
    }
    check_path_template(&endpoint.path)?;

    let shape = endpoint.shape.as_str();
    match (endpoint.shape.has_request(), &endpoint.req_type) {
        (true, None) => {
            return Err(Error::manifest(format!("shape {} requires reqType", shape)));
        }
        (false, Some(_)) => {
            return Err(Error::manifest(format!("shape {} takes no reqType", shape)));
        }
        _ => {}
    }
    match (endpoint.shape.has_response(), &endpoint.resp_type) {
        (true, None) => {
            return Err(Error::manifest(format!("shape {} requires respType", shape)));
        }
        (false, Some(_)) => {
            return Err(Error::manifest(format!("shape {} takes no respType", shape)));
        }
        _ => {}
    }
    if endpoint.bindings.is_some() && endpoint.req_type.is_none() {
        return Err(Error::manifest("bindings present without reqType"));
    }

    let mut state = HashMap::new();
    for type_id in endpoint.req_type.iter().chain(endpoint.resp_type.iter()) {
        visit(manifest, type_id, &mut state, &mut Vec::new())?;
    }

    let template_params = endpoint.path_params();
    let mut unique_params = HashSet::new();
    for param in &template_params {
        if !unique_params.insert(*param) {
            return Err(Error::manifest(format!(
                "path parameter '{}' appears twice",
                param
            )));
        }
    }

    let Some(bindings) = endpoint.bindings.as_ref() else {
        if let Some(param) = template_params.first() {
            return Err(Error::manifest(format!(
                "path parameter '{}' has no path binding",
                param
            )));
        }
        return Ok(());
    };

    let mut seen: HashSet<(BindingLocation, String)> = HashSet::new();
    for (location, binding) in bindings.located() {
        if binding.field.is_empty() || binding.tag.is_empty() {
            return Err(Error::manifest(format!(
                "{} binding needs both a field and a tag",
                location.as_str()
            )));
        }
        binding.parse_kind()?;
        if location == BindingLocation::Path && binding.is_slice {
            return Err(Error::manifest(format!(
                "path binding '{}' cannot be a slice",
                binding.tag
            )));
        }
        if location == BindingLocation::Path && binding.is_pointer {
            return Err(Error::manifest(format!(
                "path binding '{}' cannot be optional",
                binding.tag
            )));
        }
        // Header names are case-insensitive on the wire
        let key = match location {
            BindingLocation::Header => binding.tag.to_ascii_lowercase(),
            _ => binding.tag.clone(),
        };
        if !seen.insert((location, key)) {
            return Err(Error::manifest(format!(
                "duplicate {} tag '{}'",
                location.as_str(),
                binding.tag
            )));
        }
        if location == BindingLocation::Path && !unique_params.contains(binding.tag.as_str()) {
            return Err(Error::manifest(format!(
                "path binding '{}' does not appear in the path template",
                binding.tag
            )));
        }
    }
    for param in &template_params {
        if !bindings.path.iter().any(|b| b.tag == *param) {
            return Err(Error::manifest(format!(
                "path parameter '{}' has no path binding",
                param
            )));
        }
    }

    if !bindings.is_empty() {
        if let Some(req) = endpoint.req_type.as_deref() {
            if !matches!(manifest.resolve(req)?, TypeRef::Struct(..)) {
                let what = if bindings.has_json_body {
                    "JSON body"
                } else {
                    "field bindings"
                };
                return Err(Error::manifest(format!(
                    "{} requires a struct request type, '{}' is not one",
                    what, req
                )));
            }
        }
    }

    Ok(())
}

/// Every `{` closes with `}` inside the same segment, around a non-empty name
fn check_path_template(path: &str) -> Result<()> {
    let unbalanced = || Error::manifest(format!("path template '{}' has unbalanced braces", path));
    let mut open: Option<usize> = None;
    for (idx, c) in path.char_indices() {
        match (c, open) {
            ('{', None) => open = Some(idx),
            ('}', Some(start)) => {
                if idx == start + 1 {
                    return Err(Error::manifest(format!(
                        "path template '{}' has an unnamed parameter",
                        path
                    )));
                }
                open = None;
            }
            ('{', Some(_)) | ('}', None) | ('/', Some(_)) => return Err(unbalanced()),
            _ => {}
        }
    }
    match open {
        Some(_) => Err(unbalanced()),
        None => Ok(()),
    }
}

/// Prefix a manifest error message with where it was found
fn with_context(err: Error, what: &str) -> Error {
    match err {
        Error::Manifest(msg) => Error::Manifest(format!("{}: {}", what, msg)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{MiddlewareMetadata, StatusDecl};

    fn parse(yaml: &str) -> Manifest {
        Manifest::parse_content(yaml).unwrap()
    }

    fn message(manifest: &Manifest) -> String {
        match validate(manifest) {
            Err(Error::Manifest(msg)) => msg,
            other => panic!("expected manifest error, got {:?}", other),
        }
    }

    const VALID: &str = r#"
endpoints:
  - method: GET
    path: /pets/{id}
    handler: { package: "crate::handlers::pets", name: get_pet }
    shape: ReqResp
    reqType: crate::models::GetPet
    respType: crate::models::Pet
    bindings:
      path: [{ field: id, tag: id, kind: string }]
      query: [{ field: verbose, tag: verbose, kind: bool, isPointer: true }]
types:
  crate::models::GetPet:
    kind: struct
    fields:
      - { name: id, type: string }
      - { name: verbose, type: bool }
  crate::models::Pet:
    kind: struct
    fields:
      - { name: id, jsonName: id, type: string, required: true }
"#;

    #[test]
    fn test_valid_manifest() {
        assert!(validate(&parse(VALID)).is_ok());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut manifest = parse(VALID);
        manifest.version = 2;
        assert!(message(&manifest).contains("unsupported manifest version 2"));
    }

    #[test]
    fn test_rejects_duplicate_route() {
        let mut manifest = parse(VALID);
        let mut twin = manifest.endpoints[0].clone();
        twin.handler.name = "get_pet_again".into();
        manifest.endpoints.push(twin);
        assert_eq!(message(&manifest), "duplicate route GET /pets/{id}");
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let manifest = parse(&VALID.replace("kind: bool", "kind: boolean"));
        let msg = message(&manifest);
        assert!(msg.contains("Unknown type kind: boolean"), "{msg}");
        assert!(msg.starts_with("endpoint GET /pets/{id}"), "{msg}");
    }

    #[test]
    fn test_rejects_slice_binding_without_elem_kind() {
        let manifest = parse(&VALID.replace(
            "isPointer: true",
            "isPointer: true, isSlice: true",
        ));
        assert!(message(&manifest).contains("has no element kind"));
    }

    #[test]
    fn test_rejects_dangling_reference() {
        let manifest = parse(&VALID.replace(
            "respType: crate::models::Pet",
            "respType: crate::models::Cat",
        ));
        assert!(message(&manifest).contains("dangling type reference 'crate::models::Cat'"));
    }

    #[test]
    fn test_rejects_dangling_field_type() {
        let manifest = parse(&VALID.replace(
            "{ name: id, jsonName: id, type: string, required: true }",
            "{ name: owner, jsonName: owner, type: 'crate::models::Owner' }",
        ));
        let msg = message(&manifest);
        assert!(msg.contains("field 'owner' of type 'crate::models::Pet'"), "{msg}");
    }

    #[test]
    fn test_rejects_cycles() {
        let manifest = parse(
            r#"
types:
  A:
    kind: struct
    fields: [{ name: b, jsonName: b, type: B }]
  B:
    kind: slice
    elem: A
"#,
        );
        assert_eq!(message(&manifest), "type references form a cycle: A -> B -> A");
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let manifest = parse(&VALID.replace("shape: ReqResp", "shape: ReqNoResp"));
        assert!(message(&manifest).contains("shape ReqNoResp takes no respType"));

        let manifest = parse(&VALID.replace("shape: ReqResp", "shape: NoReqResp"));
        assert!(message(&manifest).contains("shape NoReqResp takes no reqType"));
    }

    #[test]
    fn test_rejects_duplicate_tags() {
        let manifest = parse(&VALID.replace(
            "query: [{ field: verbose, tag: verbose, kind: bool, isPointer: true }]",
            "header: [{ field: a, tag: X-Trace, kind: string }, { field: b, tag: x-trace, kind: string }]",
        ));
        assert_eq!(
            message(&manifest),
            "endpoint GET /pets/{id}: duplicate header tag 'x-trace'"
        );
    }

    #[test]
    fn test_rejects_unbound_path_parameter() {
        let manifest = parse(&VALID.replace("path: /pets/{id}", "path: /pets/{id}/{rev}"));
        assert!(message(&manifest).contains("path parameter 'rev' has no path binding"));

        let manifest = parse(&VALID.replace("path: /pets/{id}", "path: /pets/{pet_id}"));
        assert!(message(&manifest).contains("path binding 'id' does not appear"));
    }

    #[test]
    fn test_rejects_json_body_on_non_struct() {
        let manifest = parse(
            r#"
endpoints:
  - method: POST
    path: /tags
    handler: { package: "crate::handlers::tags", name: set_tags }
    shape: ReqNoResp
    reqType: "[]string"
    bindings: { hasJsonBody: true }
"#,
        );
        assert!(message(&manifest).contains("JSON body requires a struct request type"));
    }

    #[test]
    fn test_rejects_optional_path_binding() {
        let manifest = parse(&VALID.replace(
            "path: [{ field: id, tag: id, kind: string }]",
            "path: [{ field: id, tag: id, kind: uint32, isPointer: true }]",
        ));
        assert_eq!(
            message(&manifest),
            "endpoint GET /pets/{id}: path binding 'id' cannot be optional"
        );
    }

    #[test]
    fn test_rejects_unbalanced_path_template() {
        for path in ["/pets/{id", "/pets/id}", "/pets/{{id}}", "/pets/{id/x}"] {
            let manifest = parse(&VALID.replace("path: /pets/{id}", &format!("path: {}", path)));
            let msg = message(&manifest);
            assert!(msg.contains("has unbalanced braces"), "{path}: {msg}");
        }

        let manifest = parse(&VALID.replace("path: /pets/{id}", "path: /pets/{}"));
        assert!(message(&manifest).contains("has an unnamed parameter"));
    }

    #[test]
    fn test_rejects_middleware_status_out_of_range() {
        for status in [0, 99, 600, 999] {
            let mut manifest = parse(VALID);
            manifest.middleware_metadata.insert(
                "crate::middleware::auth".into(),
                MiddlewareMetadata {
                    may_return: vec![StatusDecl {
                        status,
                        description: "Nope".into(),
                    }],
                },
            );
            assert_eq!(
                message(&manifest),
                format!(
                    "middleware 'crate::middleware::auth' declares status {} outside 100..=599",
                    status
                )
            );
        }

        let mut manifest = parse(VALID);
        manifest.middleware_metadata.insert(
            "crate::middleware::auth".into(),
            MiddlewareMetadata {
                may_return: vec![StatusDecl {
                    status: 401,
                    description: "Unauthorized".into(),
                }],
            },
        );
        assert!(validate(&manifest).is_ok());
    }
}
