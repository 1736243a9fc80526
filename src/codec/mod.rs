//! Parameter Codec
//!
//! Translates between the admin framework's flat, dotted, string-keyed
//! parameter maps and typed, nested entity attributes:
//!
//! - [`decode`](decode::decode) (write path): flat map → attributes, with array
//!   reconstruction and per-type coercion.
//! - [`encode`](encode::encode) (read path): entity → flat map.
//!
//! Decoding is fallible only under [`CoercionPolicy::Strict`].

pub mod coerce;
pub mod decode;
pub mod encode;
pub mod errors;
pub mod flat;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::schema::ResourceSchema;
use crate::storage::{Attributes, Entity};

pub use errors::CoercionError;

/// Dotted key → scalar; the framework's wire format for one record
pub type FlatParams = BTreeMap<String, Value>;

/// What to do with malformed numeric or JSON input on write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionPolicy {
    /// Reject the write with a [`CoercionError`]
    Strict,
    /// Log a warning and substitute a default
    #[default]
    BestEffort,
}

impl CoercionPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "strict" => Some(CoercionPolicy::Strict),
            "best_effort" | "besteffort" => Some(CoercionPolicy::BestEffort),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecOptions {
    pub policy: CoercionPolicy,
    /// Parse JSON text sent for scalar `mixed` properties; off by default,
    /// which leaves such values exactly as submitted
    pub parse_scalar_mixed: bool,
    /// Array indices at or above this bound are rejected
    pub max_array_len: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            policy: CoercionPolicy::BestEffort,
            parse_scalar_mixed: false,
            max_array_len: 1000,
        }
    }
}

/// Codec bound to one resource schema
#[derive(Debug, Clone)]
pub struct ParameterCodec<'a> {
    schema: &'a ResourceSchema,
    options: CodecOptions,
}

impl<'a> ParameterCodec<'a> {
    pub fn new(schema: &'a ResourceSchema, options: CodecOptions) -> Self {
        ParameterCodec { schema, options }
    }

    pub fn decode(&self, params: &FlatParams) -> Result<Attributes, CoercionError> {
        decode::decode(params, self.schema, &self.options)
    }

    pub fn encode(&self, entity: &Entity) -> FlatParams {
        encode::encode(entity, self.schema)
    }
}
