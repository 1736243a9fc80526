//! # Model Catalog Error Types
//!
//! Errors raised while loading entity model descriptions. Building a
//! property schema from metadata never fails; unknown types degrade to the
//! `unknown` passthrough tag instead.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("No model named `{model}` in catalog.")]
    UnknownModel { model: String },
    #[error("Duplicate model `{model}` in catalog.")]
    DuplicateModel { model: String },
    #[error("Model `{model}` declares no columns.")]
    NoColumns { model: String },
    #[error("Model `{model}` declares property path `{path}` more than once.")]
    DuplicateColumn { model: String, path: String },
    #[error("Failed to read model catalog: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse model catalog: {error}")]
    ConfigParseError { error: String },
}

impl SchemaError {
    /// Create an UnknownModel error listing what the catalog does contain
    pub fn unknown_model_with_context(
        model: impl Into<String>,
        available: &[&str],
    ) -> Self {
        SchemaError::UnknownModel {
            model: format!("{}\n  Available: {}", model.into(), available.join(", ")),
        }
    }
}
