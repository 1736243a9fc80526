//! Validation error shape and the external validator seam
//!
//! Every rejected write reaches the caller as one [`ValidationError`]: a
//! field → `{kind, message}` map plus an optional record-level base error,
//! whether it came from an external validator, a storage constraint or a
//! malformed parameter.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::codec::CoercionError;
use crate::storage::Entity;

/// Kind reported for storage constraint violations
pub const QUERY_FAILED_KIND: &str = "QueryFailedError";

/// Kind reported for parameters that could not be coerced
pub const COERCION_KIND: &str = "CoercionError";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyError {
    pub kind: String,
    pub message: String,
}

impl PropertyError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        PropertyError {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// One violated rule as reported by a validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Validation failed: {}", describe(.property_errors, .base_error))]
pub struct ValidationError {
    pub property_errors: BTreeMap<String, PropertyError>,
    pub base_error: Option<PropertyError>,
}

fn describe(
    property_errors: &BTreeMap<String, PropertyError>,
    base_error: &Option<PropertyError>,
) -> String {
    let mut parts: Vec<String> = property_errors
        .iter()
        .map(|(field, error)| format!("{}: {}", field, error.message))
        .collect();
    if let Some(base) = base_error {
        parts.insert(0, base.message.clone());
    }
    parts.join("; ")
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless one is already recorded
    pub fn with_property(
        mut self,
        field: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.property_errors
            .entry(field.into())
            .or_insert_with(|| PropertyError::new(kind, message));
        self
    }

    pub fn with_base(mut self, kind: impl Into<String>, message: impl Into<String>) -> Self {
        self.base_error = Some(PropertyError::new(kind, message));
        self
    }

    /// Build from violations in reported order, keeping the first one per field
    pub fn from_violations(violations: impl IntoIterator<Item = FieldViolation>) -> Self {
        violations
            .into_iter()
            .fold(ValidationError::new(), |errors, v| {
                errors.with_property(v.field, v.rule, v.message)
            })
    }

    pub fn is_empty(&self) -> bool {
        self.property_errors.is_empty() && self.base_error.is_none()
    }

    pub fn property(&self, field: &str) -> Option<&PropertyError> {
        self.property_errors.get(field)
    }
}

impl From<CoercionError> for ValidationError {
    fn from(error: CoercionError) -> Self {
        ValidationError::new().with_property(error.field(), COERCION_KIND, error.to_string())
    }
}

/// External validation run before every save
#[async_trait]
pub trait EntityValidator: Send + Sync {
    async fn validate(&self, entity: &Entity) -> Result<(), ValidationError>;
}

/// Validates entities by deserializing them into a `validator`-annotated type
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct NewUser {
///     #[validate(email)]
///     email: String,
/// }
///
/// let resource = Resource::new(repo, config)?.with_validator(TypedValidator::<NewUser>::new());
/// ```
pub struct TypedValidator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedValidator<T> {
    pub fn new() -> Self {
        TypedValidator {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TypedValidator<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    fn check(&self, entity: &Entity) -> Result<(), ValidationError> {
        let typed: T = serde_json::from_value(Value::Object(entity.attributes.clone()))
            .map_err(|e| ValidationError::new().with_base("DeserializationError", e.to_string()))?;

        typed.validate().map_err(|errors| {
            let mut fields: Vec<(String, Vec<validator::ValidationError>)> = errors
                .field_errors()
                .into_iter()
                .map(|(field, list)| (field.to_string(), list.clone()))
                .collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));

            ValidationError::from_violations(fields.into_iter().filter_map(|(field, list)| {
                let first = list.into_iter().next()?;
                let message = match &first.message {
                    Some(message) => message.to_string(),
                    None => format!("{} failed the '{}' rule", field, first.code),
                };
                Some(FieldViolation {
                    field,
                    rule: first.code.to_string(),
                    message,
                })
            }))
        })
    }
}

#[async_trait]
impl<T> EntityValidator for TypedValidator<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    async fn validate(&self, entity: &Entity) -> Result<(), ValidationError> {
        self.check(entity)
    }
}
