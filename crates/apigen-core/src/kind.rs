//! Primitive type kinds understood by the binder generator and the schema synthesizer.
//!
//! Kinds travel through the manifest as plain strings so that an unknown kind
//! surfaces as a manifest validation error instead of a deserialization failure.
//!
//! # Examples
//!
//! ```
//! use apigen_core::kind::TypeKind;
//! use std::str::FromStr;
//!
//! let kind = TypeKind::from_str("uint16").unwrap();
//! assert_eq!(kind, TypeKind::Uint16);
//! assert_eq!(kind.rust_type(), "u16");
//! assert_eq!(kind.schema_type(), ("integer", Some("uint16")));
//! assert_eq!(kind.to_string(), "uint16");
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

/// Supported primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    String,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

/// Parser family a kind belongs to; each family has its own parse body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserFamily {
    Text,
    Boolean,
    Integer,
    Float,
}

impl FromStr for TypeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(TypeKind::String),
            "bool" => Ok(TypeKind::Bool),
            "int" => Ok(TypeKind::Int),
            "int8" => Ok(TypeKind::Int8),
            "int16" => Ok(TypeKind::Int16),
            "int32" => Ok(TypeKind::Int32),
            "int64" => Ok(TypeKind::Int64),
            "uint" => Ok(TypeKind::Uint),
            "uint8" => Ok(TypeKind::Uint8),
            "uint16" => Ok(TypeKind::Uint16),
            "uint32" => Ok(TypeKind::Uint32),
            "uint64" => Ok(TypeKind::Uint64),
            "float32" => Ok(TypeKind::Float32),
            "float64" => Ok(TypeKind::Float64),
            _ => Err(format!("Unknown type kind: {}", s)),
        }
    }
}

impl TypeKind {
    /// Returns the manifest spelling of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Returns an iterator over all kinds
    pub fn all() -> impl Iterator<Item = TypeKind> {
        [
            Self::String,
            Self::Bool,
            Self::Int,
            Self::Int8,
            Self::Int16,
            Self::Int32,
            Self::Int64,
            Self::Uint,
            Self::Uint8,
            Self::Uint16,
            Self::Uint32,
            Self::Uint64,
            Self::Float32,
            Self::Float64,
        ]
        .into_iter()
    }

    /// Rust type the generated parser produces.
    ///
    /// `int` and `uint` are 64 bits wide.
    pub fn rust_type(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Bool => "bool",
            Self::Int | Self::Int64 => "i64",
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Uint | Self::Uint64 => "u64",
            Self::Uint8 => "u8",
            Self::Uint16 => "u16",
            Self::Uint32 => "u32",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
        }
    }

    /// Name of the generated parse function for this kind
    pub fn parser_fn(&self) -> String {
        format!("parse_{}", self.as_str())
    }

    pub fn family(&self) -> ParserFamily {
        match self {
            Self::String => ParserFamily::Text,
            Self::Bool => ParserFamily::Boolean,
            Self::Float32 | Self::Float64 => ParserFamily::Float,
            _ => ParserFamily::Integer,
        }
    }

    /// JSON-Schema `(type, format)` pair
    pub fn schema_type(&self) -> (&'static str, Option<&'static str>) {
        match self {
            Self::String => ("string", None),
            Self::Bool => ("boolean", None),
            Self::Int | Self::Int64 => ("integer", Some("int64")),
            Self::Int8 => ("integer", Some("int8")),
            Self::Int16 => ("integer", Some("int16")),
            Self::Int32 => ("integer", Some("int32")),
            Self::Uint | Self::Uint64 => ("integer", Some("uint64")),
            Self::Uint8 => ("integer", Some("uint8")),
            Self::Uint16 => ("integer", Some("uint16")),
            Self::Uint32 => ("integer", Some("uint32")),
            Self::Float32 => ("number", Some("float")),
            Self::Float64 => ("number", Some("double")),
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ParserFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_every_spelling() {
        for kind in TypeKind::all() {
            assert_eq!(TypeKind::from_str(kind.as_str()), Ok(kind));
        }
    }

    #[test]
    fn test_rejects_unknown_kind() {
        let err = TypeKind::from_str("complex128").unwrap_err();
        assert_eq!(err, "Unknown type kind: complex128");
        assert!(TypeKind::from_str("String").is_err());
    }

    #[test]
    fn test_platform_width_kinds_are_64_bit() {
        assert_eq!(TypeKind::Int.rust_type(), "i64");
        assert_eq!(TypeKind::Uint.schema_type(), ("integer", Some("uint64")));
    }

    #[test]
    fn test_float_formats() {
        assert_eq!(TypeKind::Float32.schema_type(), ("number", Some("float")));
        assert_eq!(TypeKind::Float64.schema_type(), ("number", Some("double")));
        assert_eq!(TypeKind::Float64.family(), ParserFamily::Float);
    }
}
