use thiserror::Error;

use super::validation::ValidationError;
use crate::storage::StorageError;

/// Errors surfaced by [`Resource`](super::Resource) operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdapterError {
    #[error("{model} record '{id}' not found")]
    NotFound { model: String, id: String },

    /// Rejected write; re-presentable to the end user
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage failure not classified as a constraint violation
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Model '{model}' does not expose usable metadata: {source}")]
    Introspection { model: String, source: StorageError },
}

impl AdapterError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AdapterError::Validation(_))
    }

    pub fn validation_errors(&self) -> Option<&ValidationError> {
        match self {
            AdapterError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
