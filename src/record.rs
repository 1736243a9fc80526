//! Record Wrapper
//!
//! Pairs one entity instance with its resource schema and exposes the flat
//! parameter view the admin framework renders. The view is captured when the
//! record is built; [`Record::to_parameters`] re-encodes from the entity.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::codec::flat::{flatten, merge};
use crate::codec::{encode::encode, FlatParams};
use crate::resource::validation::{PropertyError, ValidationError};
use crate::schema::ResourceSchema;
use crate::storage::{Entity, RecordId};

#[derive(Debug, Clone)]
pub struct Record {
    entity: Entity,
    schema: Arc<ResourceSchema>,
    params: FlatParams,
    errors: ValidationError,
    populated: BTreeMap<String, Record>,
}

/// Serializable view of a record as the framework consumes it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordJson {
    pub id: Option<RecordId>,
    pub params: FlatParams,
    pub populated: BTreeMap<String, RecordJson>,
    pub errors: BTreeMap<String, PropertyError>,
}

impl Record {
    pub fn new(entity: Entity, schema: Arc<ResourceSchema>) -> Self {
        let params = encode(&entity, &schema);
        Record {
            entity,
            schema,
            params,
            errors: ValidationError::default(),
            populated: BTreeMap::new(),
        }
    }

    /// Primary key, read through the schema's id property
    pub fn id(&self) -> Option<RecordId> {
        let id_property = self.schema.id_property()?;
        self.entity
            .get(id_property.path())
            .and_then(RecordId::from_value)
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn into_entity(self) -> Entity {
        self.entity
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// Flat parameter view as currently held by the record
    pub fn params(&self) -> &FlatParams {
        &self.params
    }

    pub fn param(&self, path: &str) -> Option<&Value> {
        self.params.get(path)
    }

    /// Encode the wrapped entity; repeated calls yield identical maps
    pub fn to_parameters(&self) -> FlatParams {
        encode(&self.entity, &self.schema)
    }

    /// Overlay submitted data onto the held parameters
    ///
    /// Nested payloads are flattened to dotted keys first; only the addressed
    /// leaves are replaced.
    pub fn merge_parameters(&mut self, payload: &Value) {
        merge(&mut self.params, flatten(payload));
    }

    pub fn errors(&self) -> &ValidationError {
        &self.errors
    }

    pub fn set_errors(&mut self, errors: ValidationError) {
        self.errors = errors;
    }

    pub fn populated(&self) -> &BTreeMap<String, Record> {
        &self.populated
    }

    pub fn set_populated(&mut self, name: impl Into<String>, record: Record) {
        self.populated.insert(name.into(), record);
    }

    pub fn to_json(&self) -> RecordJson {
        RecordJson {
            id: self.id(),
            params: self.params.clone(),
            populated: self
                .populated
                .iter()
                .map(|(name, record)| (name.clone(), record.to_json()))
                .collect(),
            errors: self.errors.property_errors.clone(),
        }
    }
}
