use log::warn;
use serde::Serialize;

use super::metadata::ColumnMetadata;
use super::property_type::{map_native_type, NativeMapping, PropertyType};

/// Normalized view of one native column or computed attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    path: String,
    #[serde(rename = "type")]
    kind: PropertyType,
    is_array: bool,
    is_id: bool,
    /// Position among native columns; `None` for computed attributes
    position: Option<usize>,
    /// Native type name, kept for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    native_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relation_attribute: Option<String>,
    #[serde(skip)]
    numeric_key: bool,
}

impl Property {
    /// Build a property from a native column descriptor at `position`
    pub fn from_column(column: &ColumnMetadata, position: usize) -> Self {
        let mapping = map_native_type(&column.column_type);
        let (mut kind, sequence) = match mapping {
            NativeMapping::Known(t) => (t, false),
            NativeMapping::ArrayOf(t) => (t, true),
            NativeMapping::Unhandled => {
                warn!(
                    "Unhandled native type '{}' for column '{}', values will pass through untouched",
                    column.column_type, column.property_path
                );
                (PropertyType::Unknown, false)
            }
        };
        let numeric_key = kind == PropertyType::Number;

        let (reference, relation_attribute) = match &column.relation {
            Some(relation) => {
                kind = PropertyType::Reference;
                (
                    Some(relation.target.clone()),
                    Some(relation.property_name.clone()),
                )
            }
            None => (None, None),
        };

        Property {
            path: column.property_path.clone(),
            kind,
            is_array: column.is_array || sequence,
            is_id: column.is_primary,
            position: Some(position),
            native_type: Some(column.column_type.clone()),
            reference,
            relation_attribute,
            numeric_key,
        }
    }

    /// Build a property for a computed attribute declared as `type_name`
    ///
    /// `type_name` may carry a `[]` suffix to declare an array of that type.
    pub fn computed(path: &str, type_name: &str) -> Self {
        let trimmed = type_name.trim();
        let (element, sequence) = match trimmed.strip_suffix("[]") {
            Some(inner) => (inner, true),
            None => (trimmed, false),
        };
        let kind = PropertyType::parse(element).unwrap_or_else(|| {
            warn!(
                "Unknown declared type '{}' for computed column '{}'",
                type_name, path
            );
            PropertyType::Unknown
        });

        Property {
            path: path.to_string(),
            kind,
            is_array: sequence,
            is_id: false,
            position: None,
            native_type: None,
            reference: None,
            relation_attribute: None,
            numeric_key: false,
        }
    }

    /// Storage path (dotted for embedded attributes)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path without trailing array index segments
    pub fn name(&self) -> &str {
        let mut name = self.path.as_str();
        while let Some((head, tail)) = name.rsplit_once('.') {
            if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
                break;
            }
            name = head;
        }
        name
    }

    /// Semantic type tag; for arrays this is the element type
    pub fn property_type(&self) -> PropertyType {
        self.kind
    }

    pub fn is_array(&self) -> bool {
        self.is_array || self.kind == PropertyType::Array
    }

    pub fn is_id(&self) -> bool {
        self.is_id
    }

    pub fn is_sortable(&self) -> bool {
        self.kind != PropertyType::Mixed && !self.is_array()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn is_computed(&self) -> bool {
        self.position.is_none()
    }

    pub fn native_type(&self) -> Option<&str> {
        self.native_type.as_deref()
    }

    /// Referenced entity name for `reference` properties
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Relation attribute the foreign key is assigned through
    ///
    /// Falls back to the path when no relation is declared.
    pub fn relation_attribute(&self) -> &str {
        self.relation_attribute.as_deref().unwrap_or(&self.path)
    }

    /// Whether reference ids are numeric (parsed as numbers on write)
    pub fn has_numeric_key(&self) -> bool {
        self.numeric_key
    }
}
