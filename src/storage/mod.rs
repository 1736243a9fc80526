//! Storage-layer contract consumed by the resource adapter.
//!
//! The ORM itself (query execution, connections, migrations) lives outside
//! this crate. It is reached through two traits:
//!
//! - [`SchemaIntrospection`] exposes the static entity metadata the adapter
//!   builds its property schema from.
//! - [`EntityRepository`] exposes the instance operations (count, find, save,
//!   delete) the adapter awaits on.
//!
//! Entities travel as [`Entity`] values wrapping a JSON attribute map, which is
//! the shape most ORMs can hydrate into and out of.

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::codec::flat::insert_path;
use crate::filter::{FindOptions, WhereCondition};
use crate::schema::EntityMetadata;

pub use memory::MemoryRepository;

/// Typed, possibly nested attributes of one entity instance
pub type Attributes = serde_json::Map<String, Value>;

/// Classification of storage-layer failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageErrorKind {
    /// The statement was rejected by the database (constraint violation,
    /// uniqueness, foreign key). Translated into validation errors.
    QueryFailed,
    /// The connection to the database failed
    Connection,
    /// Anything else the storage layer reports
    Other,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: String,
    /// Offending column, when the storage layer can name one
    pub column: Option<String>,
}

impl StorageError {
    pub fn query_failed(message: impl Into<String>, column: Option<String>) -> Self {
        StorageError {
            kind: StorageErrorKind::QueryFailed,
            message: message.into(),
            column,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        StorageError {
            kind: StorageErrorKind::Connection,
            message: message.into(),
            column: None,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        StorageError {
            kind: StorageErrorKind::Other,
            message: message.into(),
            column: None,
        }
    }

    pub fn is_query_failed(&self) -> bool {
        self.kind == StorageErrorKind::QueryFailed
    }
}

/// Primary key of an entity as handed over by the admin framework
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Build an id from an attribute value, if it holds a usable key
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Number),
            Value::String(s) if !s.is_empty() => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    /// Ids compare by their textual form, so `5` and `"5"` address the same row
    pub fn matches(&self, value: &Value) -> bool {
        match value {
            Value::Number(n) => n.to_string() == self.to_string(),
            Value::String(s) => *s == self.to_string(),
            _ => false,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Number(n) => Value::from(*n),
            RecordId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Number(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

/// One ORM-managed entity instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity {
    pub attributes: Attributes,
}

impl Entity {
    pub fn new(attributes: Attributes) -> Self {
        Entity { attributes }
    }

    /// Look up an attribute by dotted path (`address.city`)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.attributes.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Assign one top-level attribute, keeping every other attribute as it was
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// Set the value at a dotted path, creating intermediate objects
    ///
    /// Sibling attributes along the path keep their values; the value itself
    /// replaces whatever sat at the path.
    pub fn set_path(&mut self, path: &str, value: Value) {
        insert_path(&mut self.attributes, path, value);
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }
}

impl From<Attributes> for Entity {
    fn from(attributes: Attributes) -> Self {
        Entity { attributes }
    }
}

/// Static schema metadata a model must expose to be adapted
pub trait SchemaIntrospection {
    fn metadata(&self) -> Result<EntityMetadata, StorageError>;
}

/// Instance operations of one entity model
#[async_trait]
pub trait EntityRepository: SchemaIntrospection + Send + Sync {
    async fn count(&self, condition: &WhereCondition) -> Result<u64, StorageError>;

    async fn find(&self, options: &FindOptions) -> Result<Vec<Entity>, StorageError>;

    async fn find_one(&self, id: &RecordId) -> Result<Option<Entity>, StorageError>;

    async fn find_by_ids(&self, ids: &[RecordId]) -> Result<Vec<Entity>, StorageError>;

    /// Build a new, not yet persisted instance
    fn create(&self, attributes: Attributes) -> Entity;

    /// Persist an instance and return it as stored (generated ids included)
    async fn save(&self, entity: Entity) -> Result<Entity, StorageError>;

    async fn delete(&self, id: &RecordId) -> Result<(), StorageError>;
}
