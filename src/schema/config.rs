/// Model catalog loading.
///
/// A catalog describes one or more entity models in YAML (or JSON, which is
/// valid YAML), so the CLI and tests can build resources without a live ORM:
///
/// ```yaml
/// models:
///   - name: Post
///     connection:
///       database: blog
///       type: postgres
///     columns:
///       - property_path: id
///         column_type: int
///         is_primary: true
///       - property_path: title
///         column_type: varchar
///     computed_columns:
///       excerpt: string
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::errors::SchemaError;
use super::metadata::EntityMetadata;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelCatalog {
    pub models: Vec<EntityMetadata>,
}

impl ModelCatalog {
    /// Load and check a catalog from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|e| SchemaError::ConfigReadError {
            error: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        let catalog: ModelCatalog =
            serde_yaml::from_str(content).map_err(|e| SchemaError::ConfigParseError {
                error: e.to_string(),
            })?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Structural checks: unique model names, non-empty and unique columns
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut names = HashSet::new();
        for model in &self.models {
            if !names.insert(model.name.as_str()) {
                return Err(SchemaError::DuplicateModel {
                    model: model.name.clone(),
                });
            }
            if model.columns.is_empty() {
                return Err(SchemaError::NoColumns {
                    model: model.name.clone(),
                });
            }
            let mut paths = HashSet::new();
            for column in &model.columns {
                if !paths.insert(column.property_path.as_str()) {
                    return Err(SchemaError::DuplicateColumn {
                        model: model.name.clone(),
                        path: column.property_path.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn model(&self, name: &str) -> Result<&EntityMetadata, SchemaError> {
        self.models.iter().find(|m| m.name == name).ok_or_else(|| {
            let available: Vec<&str> = self.models.iter().map(|m| m.name.as_str()).collect();
            SchemaError::unknown_model_with_context(name, &available)
        })
    }
}
