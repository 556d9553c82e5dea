//! Docs UI bundle: an axum routing shim plus the static viewer.
//!
//! The viewer assets ship inside this crate and change only with a new release of
//! the generator, so the shim serves them with long-lived caching. The OpenAPI
//! document is regenerated on every build and is served with `no-store`.

// Internal imports (std, crate)
use crate::config::{Config, DEFAULT_OPENAPI_JSON_PATH};
use crate::templates::manager::{DOCS_INDEX_TEMPLATE, DOCS_ROUTES_TEMPLATE};
use crate::templates::TemplateManager;
use crate::utils::rust_string_literal;
use crate::{Result, GENERATOR};

// External imports (alphabetized)
use serde::Serialize;

/// Routing shim, relative to the output directory
pub const DOCS_MODULE_FILE: &str = "docs.rs";

const INDEX_FILE: &str = "docs_assets/index.html";
const CSS_FILE: &str = "docs_assets/viewer.css";
const JS_FILE: &str = "docs_assets/viewer.js";

const VIEWER_CSS: &str = include_str!("../assets/viewer.css");
const VIEWER_JS: &str = include_str!("../assets/viewer.js");

/// One file of the bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    /// Path relative to the output directory, `/`-separated
    pub path: String,
    pub contents: String,
}

/// Everything needed to serve the docs UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsBundle {
    /// The routing shim first, then the page and its assets
    pub files: Vec<BundleFile>,
}

impl DocsBundle {
    pub fn file(&self, path: &str) -> Option<&BundleFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Source of the `docs_routes()` shim
    pub fn routes_source(&self) -> Option<&str> {
        self.file(DOCS_MODULE_FILE).map(|f| f.contents.as_str())
    }
}

#[derive(Debug, Serialize)]
struct DocsContext<'a> {
    generator: &'static str,
    title: &'a str,
    docs_path: &'a str,
    openapi_json_path: &'a str,
    assets_path: String,
    openapi_file_lit: String,
    index_file_lit: String,
    css_file_lit: String,
    js_file_lit: String,
    openapi_json_path_lit: String,
    docs_path_lit: String,
    css_route_lit: String,
    js_route_lit: String,
}

/// Generate the docs UI bundle, or nothing when the docs UI is disabled.
///
/// `config` must already be validated.
pub fn generate_docs(config: &Config, templates: &TemplateManager) -> Result<Option<DocsBundle>> {
    if !config.docs_ui_enabled {
        return Ok(None);
    }

    let json_path = config
        .openapi_json_path
        .as_deref()
        .unwrap_or(DEFAULT_OPENAPI_JSON_PATH);
    let assets_path = format!("{}/assets", config.docs_path);
    let context = DocsContext {
        generator: GENERATOR,
        title: &config.openapi_title,
        docs_path: &config.docs_path,
        openapi_json_path: json_path,
        openapi_file_lit: rust_string_literal(&config.openapi_output),
        index_file_lit: rust_string_literal(INDEX_FILE),
        css_file_lit: rust_string_literal(CSS_FILE),
        js_file_lit: rust_string_literal(JS_FILE),
        openapi_json_path_lit: rust_string_literal(json_path),
        docs_path_lit: rust_string_literal(&config.docs_path),
        css_route_lit: rust_string_literal(&format!("{}/viewer.css", assets_path)),
        js_route_lit: rust_string_literal(&format!("{}/viewer.js", assets_path)),
        assets_path,
    };

    log::debug!(
        "Docs UI at {} serving {}",
        config.docs_path,
        json_path
    );
    let files = vec![
        BundleFile {
            path: DOCS_MODULE_FILE.to_string(),
            contents: templates.render(DOCS_ROUTES_TEMPLATE, &context)?,
        },
        BundleFile {
            path: INDEX_FILE.to_string(),
            contents: templates.render(DOCS_INDEX_TEMPLATE, &context)?,
        },
        BundleFile {
            path: CSS_FILE.to_string(),
            contents: VIEWER_CSS.to_string(),
        },
        BundleFile {
            path: JS_FILE.to_string(),
            contents: VIEWER_JS.to_string(),
        },
    ];
    Ok(Some(DocsBundle { files }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(config: Config) -> Option<DocsBundle> {
        let templates = TemplateManager::embedded().unwrap();
        generate_docs(&config.validated().unwrap(), &templates).unwrap()
    }

    #[test]
    fn test_disabled_emits_nothing() {
        assert_eq!(bundle(Config::default()), None);
    }

    #[test]
    fn test_shim_routes_and_cache_headers() {
        let docs = bundle(Config {
            docs_ui_enabled: true,
            docs_path: "/reference/".into(),
            openapi_output: "api.json".into(),
            ..Config::default()
        })
        .unwrap();
        let paths: Vec<&str> = docs.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "docs.rs",
                "docs_assets/index.html",
                "docs_assets/viewer.css",
                "docs_assets/viewer.js"
            ]
        );

        let shim = docs.routes_source().unwrap();
        assert!(shim.contains("include_str!(\"api.json\")"));
        assert!(shim.contains(".route(\"/openapi.json\", get(openapi_json))"));
        assert!(shim.contains(".route(\"/reference\", get(index_html))"));
        assert!(shim.contains(".route(\"/reference/assets/viewer.js\", get(viewer_js))"));
        assert!(shim.contains("\"no-store\""));
        assert!(shim.contains("\"public, max-age=31536000, immutable\""));
    }

    #[test]
    fn test_index_escapes_title() {
        let docs = bundle(Config {
            docs_ui_enabled: true,
            openapi_title: "Pets <&> \"Co\"".into(),
            ..Config::default()
        })
        .unwrap();
        let index = &docs.file("docs_assets/index.html").unwrap().contents;
        assert!(index.contains("<title>Pets &lt;&amp;&gt; &quot;Co&quot;</title>"));
        assert!(index.contains("data-spec-url="));
        assert!(index.contains("openapi.json"));
        assert!(!index.contains("<&>"));
    }
}
