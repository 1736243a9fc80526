//! Static entity metadata as exposed by the ORM.
//!
//! Models can be described in YAML, e.g.:
//!
//! ```yaml
//! name: Comment
//! connection:
//!   database: blog
//!   type: postgres
//! columns:
//!   - property_path: id
//!     column_type: int
//!     is_primary: true
//!   - property_path: postId
//!     column_type: int
//!     relation:
//!       property_name: post
//!       target: Post
//!   - property_path: tags
//!     column_type: varchar
//!     is_array: true
//! computed_columns:
//!   excerpt: string
//! ```

use serde::{Deserialize, Serialize};

use super::computed::ComputedColumns;

/// Connection the model is bound to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default, rename = "type")]
    pub db_type: Option<String>,
}

/// Relation side of a foreign-key column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationMetadata {
    /// Relation attribute on the entity (`post` for the `postId` column)
    pub property_name: String,
    /// Referenced entity name
    pub target: String,
}

/// One native column descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Attribute path on the entity, dotted for embedded columns
    pub property_path: String,
    /// Native type name as declared on the column (`varchar`, `int`, `jsonb`, ...)
    pub column_type: String,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub relation: Option<RelationMetadata>,
}

impl ColumnMetadata {
    pub fn new(property_path: impl Into<String>, column_type: impl Into<String>) -> Self {
        ColumnMetadata {
            property_path: property_path.into(),
            column_type: column_type.into(),
            is_array: false,
            is_primary: false,
            relation: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn relation(mut self, property_name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation = Some(RelationMetadata {
            property_name: property_name.into(),
            target: target.into(),
        });
        self
    }
}

/// Everything the adapter needs to know about one entity model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,
    #[serde(default)]
    pub connection: ConnectionOptions,
    pub columns: Vec<ColumnMetadata>,
    #[serde(default)]
    pub computed_columns: ComputedColumns,
}

impl EntityMetadata {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnMetadata>) -> Self {
        EntityMetadata {
            name: name.into(),
            connection: ConnectionOptions::default(),
            columns,
            computed_columns: ComputedColumns::default(),
        }
    }

    pub fn with_connection(mut self, database: &str, db_type: &str) -> Self {
        self.connection = ConnectionOptions {
            database: Some(database.to_string()),
            db_type: Some(db_type.to_string()),
        };
        self
    }

    pub fn with_computed(mut self, computed: ComputedColumns) -> Self {
        self.computed_columns = computed;
        self
    }

    /// Primary key column, if one is declared
    pub fn primary_column(&self) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.is_primary)
    }
}
