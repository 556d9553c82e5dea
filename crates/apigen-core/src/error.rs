//! Error handling for the apigen compiler.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Build-time failures fall into two
//! families: manifest validation errors (the input handed over by the analyzer is
//! inconsistent) and configuration errors (path-shaped options are malformed).
//! Everything else wraps the underlying I/O, parsing or template engine error.
//!
//! # Examples
//!
//! ```
//! use apigen_core::error::{Error, Result};
//!
//! fn check_version(version: u32) -> Result<()> {
//!     if version != 1 {
//!         return Err(Error::manifest(format!("unsupported manifest version {version}")));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_version(1).is_ok());
//! assert!(check_version(7).is_err());
//! ```

use thiserror::Error;

/// Result type for apigen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for apigen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// The manifest is inconsistent or references something that does not exist
    #[error("Manifest validation error: {0}")]
    Manifest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new manifest validation error
    pub fn manifest<S: Into<String>>(msg: S) -> Self {
        Self::Manifest(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Whether this error was caused by the manifest rather than the environment
    pub fn is_manifest(&self) -> bool {
        matches!(self, Self::Manifest(_))
    }

    /// Whether this error was caused by a malformed configuration option
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_display() {
        let err = Error::manifest("duplicate route GET /pets");
        assert_eq!(
            err.to_string(),
            "Manifest validation error: duplicate route GET /pets"
        );
        assert!(err.is_manifest());
        assert!(!err.is_config());
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
