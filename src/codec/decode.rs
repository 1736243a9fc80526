//! Write path: flat parameters → typed entity attributes
//!
//! Runs in two passes over the schema:
//!
//! 1. **Array reconstruction** - every `name.<index>` key of an array
//!    property is folded into one sequence stored under `name`. Indices are
//!    the authoritative slot; gaps become `null`.
//! 2. **Type coercion** - each property present in the input is coerced
//!    according to its type (numbers parsed, mixed array elements parsed
//!    from JSON text, references wrapped as `{id}` on the relation attribute).
//!
//! Keys matching no property are kept as they came, then everything is
//! rebuilt into nested attributes.

use log::warn;
use serde_json::{Map, Value};

use super::coerce::{as_text, parse_number};
use super::errors::CoercionError;
use super::flat::{insert_path, take, unflatten};
use super::{CodecOptions, CoercionPolicy, FlatParams};
use crate::schema::{Property, PropertyType, ResourceSchema};
use crate::storage::Attributes;

/// Decode a flat parameter map into attributes ready to assign on an entity
pub fn decode(
    params: &FlatParams,
    schema: &ResourceSchema,
    options: &CodecOptions,
) -> Result<Attributes, CoercionError> {
    let mut prepared = params.clone();

    for property in schema.properties().filter(|p| p.is_array()) {
        if let Some(sequence) = collect_array(&mut prepared, property, options)? {
            prepared.insert(property.name().to_string(), sequence);
        }
    }

    // Coerced values are held apart so the relation attribute of a reference
    // cannot be re-read as input by a later property.
    let mut coerced = FlatParams::new();
    for property in schema.properties() {
        let Some(raw) = take(&mut prepared, property.path()) else {
            continue;
        };

        if property.is_array() {
            let value = match raw {
                Value::Array(items) => Value::Array(
                    items
                        .into_iter()
                        .map(|item| coerce_element(property, item, options))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                other => other,
            };
            coerced.insert(property.path().to_string(), value);
            continue;
        }

        match property.property_type() {
            PropertyType::Mixed => {
                let value = if options.parse_scalar_mixed {
                    parse_json_text(property, raw, options)?
                } else {
                    raw
                };
                coerced.insert(property.path().to_string(), value);
            }
            PropertyType::Number => {
                let value = coerce_number(property, raw, options)?;
                coerced.insert(property.path().to_string(), value);
            }
            PropertyType::Reference => {
                let id = coerce_reference_id(property, raw, options)?;
                coerced.insert(property.path().to_string(), id.clone());
                let relation = if id.is_null() {
                    Value::Null
                } else {
                    let mut wrapped = Map::new();
                    wrapped.insert("id".to_string(), id);
                    Value::Object(wrapped)
                };
                coerced.insert(property.relation_attribute().to_string(), relation);
            }
            _ => {
                coerced.insert(property.path().to_string(), raw);
            }
        }
    }

    let mut attributes = unflatten(&prepared);
    for (path, value) in coerced {
        insert_path(&mut attributes, &path, value);
    }
    Ok(attributes)
}

/// Fold `name.<index>` keys (and a bare `name` key) into one sequence
///
/// Returns `None` when the input mentions the property in no form.
fn collect_array(
    prepared: &mut FlatParams,
    property: &Property,
    options: &CodecOptions,
) -> Result<Option<Value>, CoercionError> {
    let name = property.name();
    let prefix = format!("{}.", name);
    let keys: Vec<String> = prepared
        .keys()
        .filter(|k| k.starts_with(&prefix))
        .cloned()
        .collect();
    let bare = prepared.remove(name);

    let mut slots = match bare {
        None if keys.is_empty() => return Ok(None),
        Some(Value::Null) if keys.is_empty() => return Ok(Some(Value::Null)),
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(other) => vec![other],
    };

    for key in keys {
        let value = prepared.remove(&key).unwrap_or(Value::Null);
        let suffix = &key[prefix.len()..];
        let (index_text, rest) = match suffix.split_once('.') {
            Some((index, rest)) => (index, Some(rest)),
            None => (suffix, None),
        };

        let index = match parse_index(index_text) {
            Some(index) if index < options.max_array_len => index,
            _ => {
                if options.policy == CoercionPolicy::Strict {
                    return Err(CoercionError::InvalidArrayIndex {
                        field: name.to_string(),
                        key,
                    });
                }
                warn!("Dropping '{}': not a valid index for array '{}'", key, name);
                continue;
            }
        };

        if slots.len() <= index {
            slots.resize(index + 1, Value::Null);
        }
        match rest {
            None => slots[index] = value,
            Some(rest) => {
                if !slots[index].is_object() {
                    slots[index] = Value::Object(Map::new());
                }
                if let Value::Object(element) = &mut slots[index] {
                    insert_path(element, rest, value);
                }
            }
        }
    }

    Ok(Some(Value::Array(slots)))
}

fn parse_index(text: &str) -> Option<usize> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn coerce_element(
    property: &Property,
    item: Value,
    options: &CodecOptions,
) -> Result<Value, CoercionError> {
    match property.property_type() {
        PropertyType::Mixed => parse_json_text(property, item, options),
        PropertyType::Number => match &item {
            Value::String(s) if !s.is_empty() => coerce_number(property, item, options),
            _ => Ok(item),
        },
        _ => Ok(item),
    }
}

/// Parse JSON text; structured values and `null` are already decoded
fn parse_json_text(
    property: &Property,
    value: Value,
    options: &CodecOptions,
) -> Result<Value, CoercionError> {
    let Value::String(text) = value else {
        return Ok(value);
    };
    match serde_json::from_str(&text) {
        Ok(parsed) => Ok(parsed),
        Err(e) if options.policy == CoercionPolicy::Strict => Err(CoercionError::InvalidJson {
            field: property.path().to_string(),
            value: text,
            error: e.to_string(),
        }),
        Err(e) => {
            warn!(
                "Keeping raw text for '{}': not valid JSON ({})",
                property.path(),
                e
            );
            Ok(Value::String(text))
        }
    }
}

/// Empty text reads as `null`; malformed text is an error or `null` per policy
fn coerce_number(
    property: &Property,
    value: Value,
    options: &CodecOptions,
) -> Result<Value, CoercionError> {
    if matches!(value, Value::Number(_) | Value::Null) {
        return Ok(value);
    }
    let Some(text) = as_text(&value) else {
        return Ok(value);
    };
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match parse_number(&text) {
        Some(number) => Ok(number),
        None => malformed_number(property, text, options),
    }
}

fn coerce_reference_id(
    property: &Property,
    raw: Value,
    options: &CodecOptions,
) -> Result<Value, CoercionError> {
    match raw {
        Value::Null => Ok(Value::Null),
        Value::String(ref s) if s.trim().is_empty() => Ok(Value::Null),
        other if property.has_numeric_key() => coerce_number(property, other, options),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        other => Ok(other),
    }
}

fn malformed_number(
    property: &Property,
    text: String,
    options: &CodecOptions,
) -> Result<Value, CoercionError> {
    if options.policy == CoercionPolicy::Strict {
        return Err(CoercionError::InvalidNumber {
            field: property.path().to_string(),
            value: text,
        });
    }
    warn!(
        "Discarding '{}' for '{}': not a number",
        text,
        property.path()
    );
    Ok(Value::Null)
}
