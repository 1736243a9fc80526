//! Resource Adapter
//!
//! [`Resource`] implements the admin framework's resource contract for one
//! entity model: schema introspection, list/count/find reads routed through
//! the filter translator, and create/update/delete writes routed through the
//! parameter codec and the validate-and-save protocol.
//!
//! The schema is built once in [`Resource::new`] and shared read-only with
//! every [`Record`] the resource hands out.

pub mod errors;
pub mod validation;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::codec::flat::remove_path;
use crate::codec::{FlatParams, ParameterCodec};
use crate::config::AdapterConfig;
use crate::filter::{translate, Filter, FindOptions, Order, SortDirection};
use crate::record::Record;
use crate::schema::{EntityMetadata, Property, PropertyType, ResourceSchema};
use crate::storage::{
    Attributes, Entity, EntityRepository, RecordId, SchemaIntrospection, StorageError,
};

pub use errors::AdapterError;
pub use validation::{
    EntityValidator, FieldViolation, PropertyError, TypedValidator, ValidationError,
    COERCION_KIND, QUERY_FAILED_KIND,
};

/// Database name and type reported when the connection declares none
pub const DEFAULT_DATABASE: &str = "orm";

/// Sort request of a list call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortParams {
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

/// Pagination and sort request of a list call; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindParams {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub sort: Option<SortParams>,
}

/// True iff `candidate` exposes the metadata a [`Resource`] is built from
///
/// Never fails: an introspection error reads as "not adaptable".
pub fn is_adapter_for(candidate: &dyn SchemaIntrospection) -> bool {
    match candidate.metadata() {
        Ok(_) => true,
        Err(e) => {
            debug!("Not adaptable: {}", e);
            false
        }
    }
}

pub struct Resource<R: EntityRepository> {
    repository: Arc<R>,
    metadata: EntityMetadata,
    schema: Arc<ResourceSchema>,
    config: AdapterConfig,
    validator: Option<Arc<dyn EntityValidator>>,
}

impl<R: EntityRepository> Resource<R> {
    pub fn new(repository: R, config: AdapterConfig) -> Result<Self, AdapterError> {
        Self::from_shared(Arc::new(repository), config)
    }

    pub fn from_shared(repository: Arc<R>, config: AdapterConfig) -> Result<Self, AdapterError> {
        let metadata = repository
            .metadata()
            .map_err(|source| AdapterError::Introspection {
                model: std::any::type_name::<R>().to_string(),
                source,
            })?;
        let schema = Arc::new(ResourceSchema::from_metadata(&metadata));
        info!(
            "Resource '{}' ready with {} properties",
            metadata.name,
            schema.len()
        );

        Ok(Resource {
            repository,
            metadata,
            schema,
            config,
            validator: None,
        })
    }

    /// Run `validator` before every save
    pub fn with_validator(mut self, validator: impl EntityValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn is_adapter_for(candidate: &dyn SchemaIntrospection) -> bool {
        is_adapter_for(candidate)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn schema(&self) -> &Arc<ResourceSchema> {
        &self.schema
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn database_name(&self) -> &str {
        self.metadata
            .connection
            .database
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DATABASE)
    }

    pub fn database_type(&self) -> &str {
        self.metadata
            .connection
            .db_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DATABASE)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn id(&self) -> &str {
        &self.metadata.name
    }

    pub fn properties(&self) -> Vec<&Property> {
        self.schema.properties().collect()
    }

    pub fn property(&self, path: &str) -> Option<&Property> {
        self.schema.property(path)
    }

    /// Storage request for a list call, with defaults applied
    pub fn find_options(&self, filter: &Filter, params: &FindParams) -> FindOptions {
        let sort = params.sort.clone().unwrap_or_default();
        FindOptions {
            where_clause: translate(filter, &self.schema),
            take: params.limit.unwrap_or(self.config.default_limit),
            skip: params.offset.unwrap_or(0),
            order: Order {
                sort_by: sort.sort_by,
                direction: sort.direction.unwrap_or_default(),
            },
        }
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, AdapterError> {
        let condition = translate(filter, &self.schema);
        debug!("{}.count where {:?}", self.name(), condition);
        Ok(self.repository.count(&condition).await?)
    }

    pub async fn find(
        &self,
        filter: &Filter,
        params: &FindParams,
    ) -> Result<Vec<Record>, AdapterError> {
        let options = self.find_options(filter, params);
        debug!(
            "{}.find take={} skip={} order={:?} {}",
            self.name(),
            options.take,
            options.skip,
            options.order.sort_by,
            options.order.direction.to_sql()
        );
        let entities = self.repository.find(&options).await?;
        Ok(self.records(entities))
    }

    pub async fn find_one(&self, id: &RecordId) -> Result<Option<Record>, AdapterError> {
        debug!("{}.find_one {}", self.name(), id);
        let entity = self.repository.find_one(id).await?;
        Ok(entity.map(|e| self.record(e)))
    }

    pub async fn find_many(&self, ids: &[RecordId]) -> Result<Vec<Record>, AdapterError> {
        debug!("{}.find_many {} ids", self.name(), ids.len());
        let entities = self.repository.find_by_ids(ids).await?;
        Ok(self.records(entities))
    }

    /// Decode `params`, build a new entity and persist it
    pub async fn create(&self, params: &FlatParams) -> Result<Attributes, AdapterError> {
        let attributes = self.decode(params)?;
        debug!("{}.create {} attributes", self.name(), attributes.len());
        let entity = self.repository.create(attributes);
        let saved = self.validate_and_save(entity).await?;
        Ok(saved.into_attributes())
    }

    /// Decode `params` and assign them onto the stored entity
    ///
    /// Attributes the parameters do not mention keep their stored values.
    pub async fn update(
        &self,
        id: &RecordId,
        params: &FlatParams,
    ) -> Result<Attributes, AdapterError> {
        let Some(mut entity) = self.repository.find_one(id).await? else {
            return Err(AdapterError::NotFound {
                model: self.name().to_string(),
                id: id.to_string(),
            });
        };

        let mut attributes = self.decode(params)?;
        debug!(
            "{}.update {} with {} attributes",
            self.name(),
            id,
            attributes.len()
        );
        // Each property lands on its own path; stored siblings of a nested leaf stay.
        for property in self.schema.properties() {
            let mut paths = vec![property.path()];
            if property.property_type() == PropertyType::Reference {
                paths.push(property.relation_attribute());
            }
            for path in paths {
                if let Some(value) = remove_path(&mut attributes, path) {
                    entity.set_path(path, value);
                }
            }
        }
        for (name, value) in attributes {
            entity.assign(name, value);
        }
        let saved = self.validate_and_save(entity).await?;
        Ok(saved.into_attributes())
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), AdapterError> {
        debug!("{}.delete {}", self.name(), id);
        match self.repository.delete(id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_query_failed() => {
                let mut errors =
                    ValidationError::new().with_base(QUERY_FAILED_KIND, e.message.clone());
                if let Some(column) = &e.column {
                    errors = errors.with_property(column, QUERY_FAILED_KIND, e.message.clone());
                }
                Err(errors.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Run the external validator (if any), then persist
    ///
    /// Validator failures and storage constraint violations come back as
    /// [`AdapterError::Validation`]; other storage errors pass through.
    pub async fn validate_and_save(&self, entity: Entity) -> Result<Entity, AdapterError> {
        if let Some(validator) = &self.validator {
            validator.validate(&entity).await?;
        }

        match self.repository.save(entity).await {
            Ok(saved) => Ok(saved),
            Err(e) if e.is_query_failed() => Err(constraint_violation(e).into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Attach the entities referenced by `property` to each record
    ///
    /// The foreign keys are read from each record's `property.name()`
    /// parameter and loaded in one batch; records whose key resolves to no
    /// entity are left untouched.
    pub async fn populate(
        &self,
        records: &mut [Record],
        property: &Property,
    ) -> Result<(), AdapterError> {
        let key = property.name();
        let ids: Vec<RecordId> = records
            .iter()
            .filter_map(|r| r.param(key).and_then(RecordId::from_value))
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        debug!("{}.populate '{}' with {} ids", self.name(), key, ids.len());
        let loaded: BTreeMap<String, Record> = self
            .repository
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|e| self.record(e))
            .filter_map(|r| r.id().map(|id| (id.to_string(), r)))
            .collect();

        for record in records.iter_mut() {
            let Some(fk) = record.param(key).and_then(RecordId::from_value) else {
                continue;
            };
            if let Some(target) = loaded.get(&fk.to_string()) {
                record.set_populated(key, target.clone());
            }
        }
        Ok(())
    }

    fn decode(&self, params: &FlatParams) -> Result<Attributes, ValidationError> {
        let codec = ParameterCodec::new(&self.schema, self.config.codec_options());
        Ok(codec.decode(params)?)
    }

    fn record(&self, entity: Entity) -> Record {
        Record::new(entity, Arc::clone(&self.schema))
    }

    fn records(&self, entities: Vec<Entity>) -> Vec<Record> {
        entities.into_iter().map(|e| self.record(e)).collect()
    }
}

/// Re-signal a constraint violation as a validation error on its column
fn constraint_violation(error: StorageError) -> ValidationError {
    match error.column {
        Some(column) => {
            ValidationError::new().with_property(column, QUERY_FAILED_KIND, error.message)
        }
        None => ValidationError::new().with_base(QUERY_FAILED_KIND, error.message),
    }
}
