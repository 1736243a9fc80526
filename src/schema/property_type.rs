//! Semantic type tags understood by the admin framework
//!
//! Native ORM column types are numerous and database specific. The admin
//! framework only cares about a handful of semantic tags, listed below.
//!
//! # Supported Types
//!
//! - `string` - Text (VARCHAR, TEXT, UUID, ENUM, ...)
//! - `number` - Integers, floats and decimals
//! - `boolean` - True/False
//! - `date` - Dates, times and timestamps
//! - `mixed` - Free-form JSON payloads (JSON, JSONB, simple-json)
//! - `reference` - Foreign-key backed relation
//! - `array` - Sequence whose element type is not declared
//! - `unknown` - Native type with no mapping; values pass through untouched
//!
//! # Example
//!
//! ```yaml
//! computed_columns:
//!   fullName: string
//!   scores: number[]    # array of numbers
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Date,
    Mixed,
    Reference,
    Array,
    Unknown,
}

impl PropertyType {
    /// Parse a declared type name (computed columns, YAML catalogs)
    ///
    /// Accepts every native alias understood by [`map_native_type`] plus
    /// the semantic tag names themselves.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "string" => Some(PropertyType::String),
            "number" => Some(PropertyType::Number),
            "boolean" => Some(PropertyType::Boolean),
            "date" => Some(PropertyType::Date),
            "mixed" => Some(PropertyType::Mixed),
            "reference" => Some(PropertyType::Reference),
            "array" => Some(PropertyType::Array),
            other => match map_native_type(other) {
                NativeMapping::Known(t) | NativeMapping::ArrayOf(t) => Some(t),
                NativeMapping::Unhandled => None,
            },
        }
    }

    /// Get the tag name as sent to the admin framework
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Date => "date",
            PropertyType::Mixed => "mixed",
            PropertyType::Reference => "reference",
            PropertyType::Array => "array",
            PropertyType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of mapping a native column type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeMapping {
    Known(PropertyType),
    /// Native sequence type (e.g. `simple-array`) with the element tag
    ArrayOf(PropertyType),
    Unhandled,
}

/// Map a native ORM column type to a semantic tag
///
/// Case-insensitive. Length/precision suffixes such as `varchar(255)` or
/// `decimal(10,2)` are ignored.
///
/// # Example
///
/// ```ignore
/// assert_eq!(map_native_type("INT"), NativeMapping::Known(PropertyType::Number));
/// assert_eq!(map_native_type("simple-array"), NativeMapping::ArrayOf(PropertyType::String));
/// ```
pub fn map_native_type(native: &str) -> NativeMapping {
    let lowered = native.trim().to_lowercase();
    let base = lowered.split('(').next().unwrap_or_default().trim();

    let tag = match base {
        "int" | "int2" | "int4" | "int8" | "integer" | "tinyint" | "smallint" | "mediumint"
        | "bigint" | "float" | "float4" | "float8" | "double" | "double precision" | "real"
        | "decimal" | "numeric" | "dec" | "number" | "smallserial" | "serial" | "bigserial" => {
            PropertyType::Number
        }
        "varchar" | "character varying" | "char" | "character" | "nchar" | "nvarchar" | "text"
        | "tinytext" | "mediumtext" | "longtext" | "citext" | "uuid" | "enum" | "string" => {
            PropertyType::String
        }
        "bool" | "boolean" => PropertyType::Boolean,
        "date" | "datetime" | "datetime2" | "timestamp" | "timestamptz"
        | "timestamp without time zone" | "timestamp with time zone" | "time" | "timetz" => {
            PropertyType::Date
        }
        "json" | "jsonb" | "simple-json" | "mixed" | "object" => PropertyType::Mixed,
        "simple-array" => return NativeMapping::ArrayOf(PropertyType::String),
        _ => return NativeMapping::Unhandled,
    };

    NativeMapping::Known(tag)
}
