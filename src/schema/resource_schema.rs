use log::{debug, info};
use std::collections::BTreeMap;

use super::metadata::EntityMetadata;
use super::property::Property;

/// Property set of one entity model, keyed by storage path
///
/// Built once when the resource adapter is constructed and read-only
/// afterwards; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSchema {
    properties: BTreeMap<String, Property>,
}

impl ResourceSchema {
    /// Merge native columns with computed declarations
    ///
    /// Computed attributes win when their path collides with a native column.
    pub fn from_metadata(metadata: &EntityMetadata) -> Self {
        let mut properties = BTreeMap::new();

        for (index, column) in metadata.columns.iter().enumerate() {
            let property = Property::from_column(column, index);
            properties.insert(property.path().to_string(), property);
        }

        for (path, type_name) in metadata.computed_columns.iter() {
            let property = Property::computed(path, type_name);
            if properties.contains_key(path) {
                debug!(
                    "Computed column '{}' on {} shadows the native column with the same path",
                    path, metadata.name
                );
            }
            properties.insert(path.to_string(), property);
        }

        info!(
            "Built schema for {}: {} properties ({} computed)",
            metadata.name,
            properties.len(),
            metadata.computed_columns.len()
        );

        ResourceSchema { properties }
    }

    pub fn from_properties(properties: impl IntoIterator<Item = Property>) -> Self {
        ResourceSchema {
            properties: properties
                .into_iter()
                .map(|p| (p.path().to_string(), p))
                .collect(),
        }
    }

    pub fn property(&self, path: &str) -> Option<&Property> {
        self.properties.get(path)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Primary key property, if the model declares one
    pub fn id_property(&self) -> Option<&Property> {
        self.properties.values().find(|p| p.is_id())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
