//! Canonical ordering of endpoints.
//!
//! Analyzers discover handlers in filesystem order, which is not stable across
//! machines. Every artifact is generated from the canonical order instead, so two
//! manifests with the same endpoints in a different order compile to the same
//! bytes. Fields inside one type keep their declaration order.

use std::cmp::Ordering;

use crate::manifest::{Endpoint, Manifest};

/// Sort key: path, method, handler package, handler name; bytewise ascending
pub fn compare(a: &Endpoint, b: &Endpoint) -> Ordering {
    a.path
        .as_bytes()
        .cmp(b.path.as_bytes())
        .then_with(|| a.method.as_str().cmp(b.method.as_str()))
        .then_with(|| a.handler.package.as_bytes().cmp(b.handler.package.as_bytes()))
        .then_with(|| a.handler.name.as_bytes().cmp(b.handler.name.as_bytes()))
}

/// Endpoints of the manifest in canonical order
pub fn canonical_endpoints(manifest: &Manifest) -> Vec<&Endpoint> {
    let mut endpoints: Vec<&Endpoint> = manifest.endpoints.iter().collect();
    endpoints.sort_by(|a, b| compare(a, b));
    endpoints
}

/// Group consecutive endpoints sharing a path.
///
/// Input must be in canonical order, which keeps every path contiguous.
pub fn group_by_path<'a>(endpoints: &[(usize, &'a Endpoint)]) -> Vec<(&'a str, Vec<(usize, &'a Endpoint)>)> {
    let mut groups: Vec<(&'a str, Vec<(usize, &'a Endpoint)>)> = Vec::new();
    for &(index, endpoint) in endpoints {
        if let Some((path, members)) = groups.last_mut() {
            if *path == endpoint.path.as_str() {
                members.push((index, endpoint));
                continue;
            }
        }
        groups.push((endpoint.path.as_str(), vec![(index, endpoint)]));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{HandlerRef, HttpMethod, Shape};

    fn endpoint(method: HttpMethod, path: &str, name: &str) -> Endpoint {
        Endpoint {
            method,
            path: path.into(),
            handler: HandlerRef {
                package: "crate::handlers".into(),
                name: name.into(),
            },
            shape: Shape::NoReqNoResp,
            req_type: None,
            resp_type: None,
            bindings: None,
            middlewares: Vec::new(),
        }
    }

    #[test]
    fn test_sorts_by_path_then_method() {
        let mut manifest = Manifest::new();
        manifest.endpoints = vec![
            endpoint(HttpMethod::Post, "/pets", "create"),
            endpoint(HttpMethod::Get, "/pets/{id}", "get"),
            endpoint(HttpMethod::Get, "/pets", "list"),
            endpoint(HttpMethod::Get, "/health", "health"),
        ];
        let names: Vec<&str> = canonical_endpoints(&manifest)
            .iter()
            .map(|e| e.handler.name.as_str())
            .collect();
        assert_eq!(names, vec!["health", "list", "create", "get"]);
    }

    #[test]
    fn test_bytewise_path_order() {
        // '/' (0x2f) sorts before letters, '_' (0x5f) after uppercase
        let a = endpoint(HttpMethod::Get, "/pets/x", "a");
        let b = endpoint(HttpMethod::Get, "/pets_x", "b");
        let c = endpoint(HttpMethod::Get, "/Pets", "c");
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert_eq!(compare(&c, &a), Ordering::Less);
    }

    #[test]
    fn test_group_by_path() {
        let a = endpoint(HttpMethod::Get, "/pets", "list");
        let b = endpoint(HttpMethod::Post, "/pets", "create");
        let c = endpoint(HttpMethod::Get, "/pets/{id}", "get");
        let groups = group_by_path(&[(0, &a), (1, &b), (2, &c)]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "/pets");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1[0].0, 2);
    }
}
