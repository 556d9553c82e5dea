//! Template-facing types shared by the binder generator and the OpenAPI builder

use serde::{Deserialize, Serialize};

/// Transport location a request field is bound from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingLocation {
    Path,
    Query,
    Header,
}

impl BindingLocation {
    /// OpenAPI `in` value, also used in bind error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
        }
    }

    /// Variant name of the generated `Source` enum
    pub fn source_variant(&self) -> &'static str {
        match self {
            Self::Path => "Path",
            Self::Query => "Query",
            Self::Header => "Header",
        }
    }
}
