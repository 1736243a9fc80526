use thiserror::Error;

/// Malformed input met while decoding flat parameters
///
/// Only raised under [`CoercionPolicy::Strict`](super::CoercionPolicy); the
/// best-effort policy logs and substitutes a default instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoercionError {
    #[error("Invalid number for `{field}`: '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("Invalid JSON for `{field}`: {error}")]
    InvalidJson {
        field: String,
        value: String,
        error: String,
    },

    #[error("Invalid array index in `{key}` for `{field}`")]
    InvalidArrayIndex { field: String, key: String },
}

impl CoercionError {
    /// Field the error is reported under
    pub fn field(&self) -> &str {
        match self {
            CoercionError::InvalidNumber { field, .. }
            | CoercionError::InvalidJson { field, .. }
            | CoercionError::InvalidArrayIndex { field, .. } => field,
        }
    }
}
