//! Dotted-key helpers for the framework's flat parameter maps
//!
//! `{"address": {"city": "Oslo"}, "tags": ["a"]}` flattens to
//! `{"address.city": "Oslo", "tags.0": "a"}` and back.

use serde_json::{Map, Value};

use super::FlatParams;

/// Flatten a nested JSON object into dotted keys
///
/// Empty objects and arrays are kept as leaves so they survive a round trip.
/// Anything but an object flattens to an empty map.
pub fn flatten(value: &Value) -> FlatParams {
    let mut out = FlatParams::new();
    if let Value::Object(map) = value {
        for (key, child) in map {
            flatten_into(key, child, &mut out);
        }
    }
    out
}

pub(crate) fn flatten_into(prefix: &str, value: &Value, out: &mut FlatParams) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(&format!("{}.{}", prefix, key), child, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(&format!("{}.{}", prefix, index), child, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

/// Insert `value` at a dotted path, creating intermediate objects
///
/// A non-object value sitting on an intermediate segment is replaced.
pub fn insert_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(child) = slot {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Remove and return the value at a dotted path
///
/// Intermediate objects left empty by the removal are dropped too.
pub fn remove_path(target: &mut Map<String, Value>, path: &str) -> Option<Value> {
    match path.split_once('.') {
        None => target.remove(path),
        Some((head, rest)) => {
            let Some(Value::Object(child)) = target.get_mut(head) else {
                return None;
            };
            let removed = remove_path(child, rest);
            if removed.is_some() && child.is_empty() {
                target.remove(head);
            }
            removed
        }
    }
}

/// Rebuild nested attributes from dotted keys
pub fn unflatten(params: &FlatParams) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in params {
        insert_path(&mut out, key, value.clone());
    }
    out
}

/// Remove and return the value addressed by `path`
///
/// The exact key wins; otherwise every `path.*` key is collected into a
/// nested object. Returns `None` when neither form is present.
pub fn take(params: &mut FlatParams, path: &str) -> Option<Value> {
    let prefix = format!("{}.", path);
    let nested_keys: Vec<String> = params
        .keys()
        .filter(|k| k.starts_with(&prefix))
        .cloned()
        .collect();

    if let Some(exact) = params.remove(path) {
        for key in nested_keys {
            params.remove(&key);
        }
        return Some(exact);
    }
    if nested_keys.is_empty() {
        return None;
    }

    let mut object = Map::new();
    for key in nested_keys {
        if let Some(value) = params.remove(&key) {
            insert_path(&mut object, &key[prefix.len()..], value);
        }
    }
    Some(Value::Object(object))
}

/// Deep-merge `overlay` into `base`, leaf key by leaf key
///
/// Keys of `base` that `overlay` does not address are kept, so a partial
/// array or object update only replaces the addressed leaves.
pub fn merge(base: &mut FlatParams, overlay: FlatParams) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}
