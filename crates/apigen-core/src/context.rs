//! Per-build naming state.
//!
//! Import aliases, operation ids and schema component names must be unique within
//! one build and must come out the same for the same manifest. All of that state
//! lives in a [`BuildContext`] created by [`crate::compile`] and threaded through
//! the pipeline; nothing is kept in statics.

// Internal imports (std, crate)
use std::collections::{HashMap, HashSet};

use crate::manifest::Endpoint;
use crate::utils::{
    last_segment, sanitize_identifier, split_qualified, to_lower_camel_case, to_snake_case,
};

/// Names the generated module already uses for its own imports
const RESERVED_ALIASES: &[&str] = &["axum", "core", "crate", "self", "serde_json", "std", "super"];

/// Hands out unique names, suffixing `2`, `3`, ... on collision
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a name as used without handing it out
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Claim `base`, or the first free `base2`, `base3`, ...
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// One `use` line of the generated module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Module path of the handler package
    pub package: String,
    /// Local name the package is bound to
    pub alias: String,
}

impl Import {
    /// Whether the `use` line needs an explicit `as` clause
    pub fn needs_rename(&self) -> bool {
        last_segment(&self.package) != self.alias
    }
}

/// Naming state of one build
#[derive(Debug, Clone)]
pub struct BuildContext {
    imports: Vec<Import>,
    package_aliases: HashMap<String, String>,
    operation_ids: Vec<String>,
    components: HashMap<String, String>,
    component_names: NameRegistry,
}

impl BuildContext {
    /// Assign import aliases and operation ids.
    ///
    /// `endpoints` must already be in canonical order: suffixes are handed out in
    /// first-encounter order.
    pub fn new(endpoints: &[&Endpoint]) -> Self {
        let mut aliases = NameRegistry::new();
        for reserved in RESERVED_ALIASES {
            aliases.reserve(reserved);
        }
        let mut operations = NameRegistry::new();

        let mut imports = Vec::new();
        let mut package_aliases = HashMap::new();
        let mut operation_ids = Vec::with_capacity(endpoints.len());

        for endpoint in endpoints {
            let package = &endpoint.handler.package;
            if !package_aliases.contains_key(package) {
                let alias = aliases.claim(&default_alias(package));
                log::debug!("Importing {} as {}", package, alias);
                package_aliases.insert(package.clone(), alias.clone());
                imports.push(Import {
                    package: package.clone(),
                    alias,
                });
            }
            operation_ids.push(operations.claim(&operation_id_base(endpoint)));
        }

        Self {
            imports,
            package_aliases,
            operation_ids,
            components: HashMap::new(),
            component_names: NameRegistry::new(),
        }
    }

    /// Handler package imports in first-encounter order
    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn alias(&self, package: &str) -> Option<&str> {
        self.package_aliases.get(package).map(String::as_str)
    }

    /// Operation id of the endpoint at `index` in canonical order
    pub fn operation_id(&self, index: usize) -> Option<&str> {
        self.operation_ids.get(index).map(String::as_str)
    }

    /// Keep a component name away from user types
    pub fn reserve_component(&mut self, name: &str) {
        self.component_names.reserve(name);
    }

    /// Component name of a type-id, assigned on first request
    pub fn component_name(&mut self, type_id: &str) -> String {
        if let Some(name) = self.components.get(type_id) {
            return name.clone();
        }
        let name = self.component_names.claim(&component_base(type_id));
        log::debug!("Schema component {} for {}", name, type_id);
        self.components.insert(type_id.to_string(), name.clone());
        name
    }

    pub fn lookup_component(&self, type_id: &str) -> Option<&str> {
        self.components.get(type_id).map(String::as_str)
    }
}

/// Last package segment as a snake_case identifier
fn default_alias(package: &str) -> String {
    sanitize_identifier(&to_snake_case(last_segment(package)), "handlers")
}

/// Qualified handler name with separators turned into word breaks, lowerCamelCase
fn operation_id_base(endpoint: &Endpoint) -> String {
    let qualified = endpoint.handler.qualified_name();
    let words: Vec<&str> = split_qualified(&qualified)
        .into_iter()
        .skip_while(|segment| *segment == "crate")
        .collect();
    let joined = sanitize_identifier(&words.join("_"), "op");
    let id = to_lower_camel_case(&joined);
    if id.is_empty() {
        "operation".to_string()
    } else {
        id
    }
}

/// Type-id without package qualification, as a safe identifier
fn component_base(type_id: &str) -> String {
    // Generic arguments are qualified too: `Page<crate::models::Pet>` becomes `Page_Pet`
    let outer = match type_id.find('<') {
        Some(idx) => {
            let (head, tail) = type_id.split_at(idx);
            let args = tail
                .trim_start_matches('<')
                .trim_end_matches('>')
                .split(',')
                .map(|arg| last_segment(arg.trim()))
                .collect::<Vec<_>>()
                .join("_");
            format!("{}_{}", last_segment(head), args)
        }
        None => last_segment(type_id).to_string(),
    };
    sanitize_identifier(&outer, "Type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{HandlerRef, HttpMethod, Shape};

    fn endpoint(path: &str, package: &str, name: &str) -> Endpoint {
        Endpoint {
            method: HttpMethod::Get,
            path: path.into(),
            handler: HandlerRef {
                package: package.into(),
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
    fn test_registry_suffixes() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.claim("pets"), "pets");
        assert_eq!(registry.claim("pets"), "pets2");
        registry.reserve("pets3");
        assert_eq!(registry.claim("pets"), "pets4");
        assert_eq!(registry.claim("pets2"), "pets22");
    }

    #[test]
    fn test_imports_once_per_package_with_suffixes() {
        let a = endpoint("/a", "crate::handlers::pets", "list");
        let b = endpoint("/b", "crate::admin::pets", "list");
        let c = endpoint("/c", "crate::handlers::pets", "get");
        let ctx = BuildContext::new(&[&a, &b, &c]);

        assert_eq!(
            ctx.imports(),
            &[
                Import {
                    package: "crate::handlers::pets".into(),
                    alias: "pets".into()
                },
                Import {
                    package: "crate::admin::pets".into(),
                    alias: "pets2".into()
                },
            ]
        );
        assert!(!ctx.imports()[0].needs_rename());
        assert!(ctx.imports()[1].needs_rename());
        assert_eq!(ctx.alias("crate::admin::pets"), Some("pets2"));
    }

    #[test]
    fn test_reserved_aliases_are_suffixed() {
        let a = endpoint("/a", "crate::handlers::axum", "list");
        let ctx = BuildContext::new(&[&a]);
        assert_eq!(ctx.alias("crate::handlers::axum"), Some("axum2"));
    }

    #[test]
    fn test_operation_ids() {
        let a = endpoint("/a", "crate::handlers::pets", "get_pet");
        let b = endpoint("/b", "crate::handlers::pets", "get_pet");
        let ctx = BuildContext::new(&[&a, &b]);
        assert_eq!(ctx.operation_id(0), Some("handlersPetsGetPet"));
        assert_eq!(ctx.operation_id(1), Some("handlersPetsGetPet2"));
        assert_eq!(ctx.operation_id(2), None);
    }

    #[test]
    fn test_component_names_are_stable_and_unique() {
        let mut ctx = BuildContext::new(&[]);
        ctx.reserve_component("ErrorResponse");
        assert_eq!(ctx.component_name("crate::models::Pet"), "Pet");
        assert_eq!(ctx.component_name("crate::legacy::Pet"), "Pet2");
        assert_eq!(ctx.component_name("crate::models::Pet"), "Pet");
        assert_eq!(ctx.component_name("crate::models::ErrorResponse"), "ErrorResponse2");
        assert_eq!(ctx.component_name("crate::models::Page<crate::models::Pet>"), "Page_Pet");
        assert_eq!(ctx.lookup_component("crate::legacy::Pet"), Some("Pet2"));
    }
}
