//! AdminBridge - ORM entity models as admin panel resources
//!
//! This crate adapts ORM-managed entity models to the uniform resource
//! contract of a generic administrative interface through:
//! - Property schemas derived from column metadata and computed columns
//! - Filter translation into native query conditions
//! - A parameter codec between flat, dotted form data and typed attributes
//! - Record wrappers and a resource façade with validate-and-save semantics

pub mod codec;
pub mod config;
pub mod filter;
pub mod record;
pub mod resource;
pub mod schema;
pub mod storage;

pub use codec::{CodecOptions, CoercionError, CoercionPolicy, FlatParams, ParameterCodec};
pub use config::{AdapterConfig, ConfigError};
pub use filter::{Filter, FilterValue, FindOperator, FindOptions, WhereCondition};
pub use record::{Record, RecordJson};
pub use resource::{
    is_adapter_for, AdapterError, EntityValidator, FindParams, Resource, SortParams,
    TypedValidator, ValidationError,
};
pub use schema::{ModelCatalog, Property, PropertyType, ResourceSchema};
pub use storage::{
    Attributes, Entity, EntityRepository, MemoryRepository, RecordId, SchemaIntrospection,
    StorageError,
};
