//! Configuration management for API compilation.
//!
//! This module defines the [`Config`] struct holding every option the compiler
//! recognizes. A config can be built programmatically or loaded from a YAML, TOML
//! or JSON file; the format is picked from the file extension.
//!
//! # Examples
//!
//! ```no_run
//! use apigen_core::config::Config;
//!
//! # async fn run() -> apigen_core::Result<()> {
//! // Create a config programmatically
//! let mut config = Config::new("Pet Store", "2.1.0");
//! config.docs_ui_enabled = true;
//! let config = config.validated()?;
//! assert_eq!(config.openapi_json_path.as_deref(), Some("/openapi.json"));
//!
//! // Or load one from a file
//! let config = Config::from_file("apigen.toml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::{Error, Result};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// Default location of the served OpenAPI document when the docs UI needs one
pub const DEFAULT_OPENAPI_JSON_PATH: &str = "/openapi.json";

/// Options recognized by the compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Emit the OpenAPI document
    #[serde(default)]
    pub openapi_enabled: bool,

    /// `info.title` of the document
    #[serde(default = "default_title")]
    pub openapi_title: String,

    /// `info.version` of the document
    #[serde(default = "default_version")]
    pub openapi_version: String,

    /// `info.description` of the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi_description: Option<String>,

    /// File name the document is written to
    #[serde(default = "default_output")]
    pub openapi_output: String,

    /// Base URLs listed under `servers`, in order
    #[serde(default)]
    pub openapi_servers: Vec<String>,

    /// Route the document is served at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi_json_path: Option<String>,

    /// Emit the docs UI bundle
    #[serde(default)]
    pub docs_ui_enabled: bool,

    /// Route the docs viewer is served at
    #[serde(default = "default_docs_path")]
    pub docs_path: String,
}

impl Config {
    /// Create a new Config with default values and the given document title and version
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi_title: title.into(),
            openapi_version: version.into(),
            ..Self::default()
        }
    }

    /// Check the path-shaped options and apply the implied settings.
    ///
    /// Enabling the docs UI turns on OpenAPI output and defaults the JSON path to
    /// [`DEFAULT_OPENAPI_JSON_PATH`]. A trailing slash on the docs path is removed.
    /// Validating an already validated config returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first offending option.
    pub fn validated(mut self) -> Result<Self> {
        if self.docs_ui_enabled {
            self.openapi_enabled = true;
            if self.openapi_json_path.is_none() {
                self.openapi_json_path = Some(DEFAULT_OPENAPI_JSON_PATH.to_string());
            }
        }

        if !self.docs_path.starts_with('/') {
            return Err(Error::config(format!(
                "docs_path must start with '/', got '{}'",
                self.docs_path
            )));
        }
        let trimmed = self.docs_path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(Error::config("docs_path must not be '/'"));
        }
        self.docs_path = trimmed.to_string();

        if let Some(json_path) = &self.openapi_json_path {
            if !json_path.starts_with('/') {
                return Err(Error::config(format!(
                    "openapi_json_path must start with '/', got '{}'",
                    json_path
                )));
            }
            if json_path.ends_with('/') {
                return Err(Error::config(format!(
                    "openapi_json_path must not end with '/', got '{}'",
                    json_path
                )));
            }
            if self.docs_ui_enabled && *json_path == self.docs_path {
                return Err(Error::config(format!(
                    "openapi_json_path and docs_path are both '{}'",
                    json_path
                )));
            }
        }

        if self.openapi_output.is_empty()
            || self.openapi_output.contains(['/', '\\'])
            || self.openapi_output == "."
            || self.openapi_output == ".."
        {
            return Err(Error::config(format!(
                "openapi_output must be a bare file name, got '{}'",
                self.openapi_output
            )));
        }

        for server in &self.openapi_servers {
            if server.starts_with('/') {
                continue;
            }
            Url::parse(server).map_err(|e| {
                Error::config(format!("openapi_servers entry '{}' is not a URL: {}", server, e))
            })?;
        }

        Ok(self)
    }

    /// Load configuration from a YAML, TOML or JSON file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading config from {}", path.display());
        let content = fs::read_to_string(path).await?;
        let config = match ConfigFormat::of(path)? {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
        };
        Ok(config)
    }

    /// Save configuration to a file, in the format its extension names
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match ConfigFormat::of(path)? {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        };
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openapi_enabled: false,
            openapi_title: default_title(),
            openapi_version: default_version(),
            openapi_description: None,
            openapi_output: default_output(),
            openapi_servers: Vec::new(),
            openapi_json_path: None,
            docs_ui_enabled: false,
            docs_path: default_docs_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::config(format!(
                "unsupported config file '{}': expected .yaml, .yml, .toml or .json",
                path.display()
            ))),
        }
    }
}

fn default_title() -> String {
    "API".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_output() -> String {
    "openapi.json".to_string()
}

fn default_docs_path() -> String {
    "/docs".to_string()
}
