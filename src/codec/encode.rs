//! Read path: entity attributes → flat parameters

use serde_json::Value;

use super::flat::flatten_into;
use super::FlatParams;
use crate::schema::{Property, PropertyType, ResourceSchema};
use crate::storage::Entity;

/// Encode an entity into the framework's flat parameter map
///
/// Properties without a matching attribute are omitted; absence, not
/// `null`, signals "no data".
pub fn encode(entity: &Entity, schema: &ResourceSchema) -> FlatParams {
    let mut params = FlatParams::new();

    for property in schema.properties() {
        let Some(value) = attribute_for(entity, property) else {
            continue;
        };

        if property.is_array() {
            match value {
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        let key = format!("{}.{}", property.path(), index);
                        encode_element(property, &key, item, &mut params);
                    }
                }
                Value::Null => {}
                other => {
                    params.insert(property.path().to_string(), other.clone());
                }
            }
            continue;
        }

        let encoded = match property.property_type() {
            PropertyType::Mixed if value.is_null() => Value::Null,
            PropertyType::Mixed => Value::String(value.to_string()),
            _ => value.clone(),
        };
        params.insert(property.path().to_string(), encoded);
    }

    params
}

/// Attribute value for a property, falling back to a loaded relation's id
fn attribute_for<'a>(entity: &'a Entity, property: &Property) -> Option<&'a Value> {
    if let Some(value) = entity.get(property.path()) {
        return Some(value);
    }
    if property.property_type() == PropertyType::Reference {
        return match entity.get(property.relation_attribute()) {
            Some(Value::Object(relation)) => relation.get("id"),
            _ => None,
        };
    }
    None
}

fn encode_element(property: &Property, key: &str, item: &Value, params: &mut FlatParams) {
    match (property.property_type(), item) {
        (_, Value::Null) => {
            params.insert(key.to_string(), Value::Null);
        }
        (PropertyType::Mixed, structured) => {
            params.insert(key.to_string(), Value::String(structured.to_string()));
        }
        (_, nested @ (Value::Object(_) | Value::Array(_))) => flatten_into(key, nested, params),
        (_, scalar) => {
            params.insert(key.to_string(), scalar.clone());
        }
    }
}
