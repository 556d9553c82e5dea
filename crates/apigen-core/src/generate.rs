//! Binder and dispatch source generation.
//!
//! Endpoint contexts come from the [`RustEndpointContextBuilder`]; this module adds
//! the module-level parts (imports, parsers, helpers, router) and renders the
//! routes template. Parsers are emitted once per kind actually bound anywhere.

// Internal imports (std, crate)
use std::collections::BTreeSet;

use crate::builders::rust::{RustEndpointContext, RustEndpointContextBuilder};
use crate::builders::{EndpointContext, EndpointSite};
use crate::context::{BuildContext, NameRegistry};
use crate::kind::TypeKind;
use crate::manifest::{Endpoint, Manifest};
use crate::ordering::group_by_path;
use crate::templates::manager::ROUTES_TEMPLATE;
use crate::templates::TemplateManager;
use crate::utils::{rust_string_literal, to_snake_case};
use crate::{Error, Result, GENERATOR};

// External imports (alphabetized)
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ParserContext {
    fn_name: String,
    rust_type: &'static str,
    family: &'static str,
    kind: &'static str,
}

#[derive(Debug, Default, Serialize)]
struct HelperFlags {
    required_one: bool,
    optional_one: bool,
    required_many: bool,
    optional_many: bool,
}

#[derive(Debug, Serialize)]
struct RouteContext {
    path_lit: String,
    /// `get(dispatch_a).post(dispatch_b)`
    chain: String,
}

#[derive(Debug, Serialize)]
struct RustModuleContext {
    generator: &'static str,
    use_block: String,
    needs_binding: bool,
    helpers: HelperFlags,
    parsers: Vec<ParserContext>,
    endpoints: Vec<RustEndpointContext>,
    routes: Vec<RouteContext>,
}

/// Render the binder and dispatch module.
///
/// `endpoints` must be in canonical order and `ctx` built from them.
pub fn generate_source(
    manifest: &Manifest,
    endpoints: &[&Endpoint],
    ctx: &BuildContext,
    templates: &TemplateManager,
) -> Result<String> {
    let mut fn_names = NameRegistry::new();
    let mut suffixes = Vec::with_capacity(endpoints.len());
    for index in 0..endpoints.len() {
        let operation_id = ctx
            .operation_id(index)
            .ok_or_else(|| Error::template(format!("no operation id for endpoint #{}", index)))?;
        suffixes.push(fn_names.claim(&to_snake_case(operation_id)));
    }

    let mut sites = Vec::with_capacity(endpoints.len());
    for (index, endpoint) in endpoints.iter().copied().enumerate() {
        let alias = ctx.alias(&endpoint.handler.package).ok_or_else(|| {
            Error::template(format!(
                "handler package {} was never imported",
                endpoint.handler.package
            ))
        })?;
        sites.push(EndpointSite {
            endpoint,
            operation_id: ctx.operation_id(index).unwrap_or_default(),
            alias,
            fn_suffix: &suffixes[index],
        });
    }

    let builder = RustEndpointContextBuilder::new(manifest);
    let typed = EndpointContext::transform_endpoints(&builder, &sites)?;

    let kinds = used_kinds(endpoints)?;
    let parsers: Vec<ParserContext> = kinds
        .iter()
        .map(|kind| ParserContext {
            fn_name: kind.parser_fn(),
            rust_type: kind.rust_type(),
            family: kind.family().as_str(),
            kind: kind.as_str(),
        })
        .collect();

    let mut helpers = HelperFlags::default();
    for binding in typed.iter().flat_map(|e| e.bindings.iter()) {
        match binding.helper.as_str() {
            "required_one" => helpers.required_one = true,
            "optional_one" => helpers.optional_one = true,
            "required_many" => helpers.required_many = true,
            _ => helpers.optional_many = true,
        }
    }
    // required_many is built on optional_many
    helpers.optional_many |= helpers.required_many;

    let indexed: Vec<(usize, &Endpoint)> = endpoints.iter().copied().enumerate().collect();
    let groups = group_by_path(&indexed);
    let mut routing_fns = BTreeSet::new();
    let routes: Vec<RouteContext> = groups
        .iter()
        .map(|(path, members)| {
            let mut chain = String::new();
            for (position, (index, endpoint)) in members.iter().enumerate() {
                let method = endpoint.method.as_lower();
                let dispatch = &typed[*index].dispatch_fn;
                if position == 0 {
                    routing_fns.insert(method);
                    chain.push_str(&format!("{}({})", method, dispatch));
                } else {
                    chain.push_str(&format!(".{}({})", method, dispatch));
                }
            }
            RouteContext {
                path_lit: rust_string_literal(path),
                chain,
            }
        })
        .collect();

    let needs_binding = typed.iter().any(|e| e.bind_fn.is_some());
    let context = RustModuleContext {
        generator: GENERATOR,
        use_block: use_block(ctx, &typed, &routing_fns, needs_binding),
        needs_binding,
        helpers,
        parsers,
        endpoints: typed,
        routes,
    };

    log::debug!(
        "Generating binders for {} endpoints ({} parsers, {} routes)",
        endpoints.len(),
        context.parsers.len(),
        context.routes.len()
    );
    templates.render(ROUTES_TEMPLATE, &context)
}

/// Kinds bound by any endpoint, in declaration order of [`TypeKind`]
fn used_kinds(endpoints: &[&Endpoint]) -> Result<BTreeSet<TypeKind>> {
    let mut kinds = BTreeSet::new();
    for endpoint in endpoints {
        if let Some(info) = endpoint.active_bindings() {
            for (_, binding) in info.located() {
                kinds.insert(binding.parse_kind()?);
            }
        }
    }
    Ok(kinds)
}

/// All `use` lines of the module, grouped std / axum / handlers
fn use_block(
    ctx: &BuildContext,
    endpoints: &[RustEndpointContext],
    routing_fns: &BTreeSet<&'static str>,
    needs_binding: bool,
) -> String {
    let mut groups: Vec<Vec<String>> = Vec::new();

    if needs_binding {
        groups.push(vec!["use std::collections::HashMap;".to_string()]);
    }

    let mut axum = Vec::new();
    if needs_binding {
        axum.push("use axum::body::Bytes;".to_string());
    }
    let needs_path = endpoints.iter().any(RustEndpointContext::needs_path);
    let needs_query = endpoints.iter().any(RustEndpointContext::needs_query);
    match (needs_path, needs_query) {
        (true, true) => axum.push("use axum::extract::{Path, Query};".to_string()),
        (true, false) => axum.push("use axum::extract::Path;".to_string()),
        (false, true) => axum.push("use axum::extract::Query;".to_string()),
        (false, false) => {}
    }
    if needs_binding {
        axum.push("use axum::http::{HeaderMap, StatusCode};".to_string());
    } else {
        axum.push("use axum::http::StatusCode;".to_string());
    }
    axum.push("use axum::response::{IntoResponse, Response};".to_string());
    let routing: Vec<&str> = routing_fns.iter().copied().collect();
    match routing.as_slice() {
        [] => {}
        [single] => axum.push(format!("use axum::routing::{};", single)),
        many => axum.push(format!("use axum::routing::{{{}}};", many.join(", "))),
    }
    axum.push("use axum::{Json, Router};".to_string());
    groups.push(axum);

    let handlers: Vec<String> = ctx
        .imports()
        .iter()
        .map(|import| {
            if import.needs_rename() {
                format!("use {} as {};", import.package, import.alias)
            } else {
                format!("use {};", import.package)
            }
        })
        .collect();
    if !handlers.is_empty() {
        groups.push(handlers);
    }

    groups
        .iter()
        .map(|group| group.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}
