//! Filter Translator
//!
//! Converts the admin framework's generic filter (field → value, list or
//! range) into a [`WhereCondition`] the storage layer understands. The
//! property schema decides how each value is read:
//!
//! | property type      | single value            | range              |
//! |--------------------|-------------------------|--------------------|
//! | number             | `=` parsed number       | numeric bounds     |
//! | boolean            | `=` parsed boolean      | raw bounds         |
//! | date               | `=` normalized date     | normalized bounds  |
//! | string             | `LIKE %value%`          | raw bounds         |
//! | reference          | `=` id (numeric if key) | raw bounds         |
//! | mixed / unknown    | `=` JSON value          | raw bounds         |
//!
//! Fields absent from the schema are passed through unchanged; the storage
//! layer stays authoritative on whether they exist.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::condition::{escape_like, FindOperator, WhereCondition};
use crate::codec::coerce::{as_text, normalize_date, parse_bool, parse_number};
use crate::schema::{Property, PropertyType, ResourceSchema};

/// Suffixes the framework uses to send range bounds as flat keys
const RANGE_FROM_SUFFIX: &str = "~~from";
const RANGE_TO_SUFFIX: &str = "~~to";

/// Range bounds; either side may be open
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterRange {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Ahead of `Range`: a struct also deserializes from a sequence
    List(Vec<Value>),
    Range(FilterRange),
    Single(Value),
}

impl FilterValue {
    pub fn single(value: impl Into<Value>) -> Self {
        FilterValue::Single(value.into())
    }

    pub fn range(from: Option<&str>, to: Option<&str>) -> Self {
        FilterValue::Range(FilterRange {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterElement {
    pub path: String,
    pub value: FilterValue,
}

/// Generic filter as sent by the admin framework
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub filters: BTreeMap<String, FilterElement>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, value: FilterValue) -> Self {
        self.filters.insert(
            path.to_string(),
            FilterElement {
                path: path.to_string(),
                value,
            },
        );
        self
    }

    /// Build a filter from the framework's flat query form
    ///
    /// `{"title": "foo", "createdAt~~from": "2024-01-01"}` becomes a
    /// single-value element for `title` and a range element for `createdAt`.
    /// Empty values are ignored.
    pub fn from_flat(params: &BTreeMap<String, String>) -> Self {
        let mut filter = Filter::new();
        for (key, raw) in params {
            if raw.is_empty() {
                continue;
            }
            let (path, bound) = if let Some(path) = key.strip_suffix(RANGE_FROM_SUFFIX) {
                (path, Some(true))
            } else if let Some(path) = key.strip_suffix(RANGE_TO_SUFFIX) {
                (path, Some(false))
            } else {
                (key.as_str(), None)
            };

            match bound {
                None => filter = filter.with(path, FilterValue::single(raw.as_str())),
                Some(is_from) => {
                    let element = filter
                        .filters
                        .entry(path.to_string())
                        .or_insert_with(|| FilterElement {
                            path: path.to_string(),
                            value: FilterValue::range(None, None),
                        });
                    if let FilterValue::Range(FilterRange { from, to }) = &mut element.value {
                        if is_from {
                            *from = Some(raw.clone());
                        } else {
                            *to = Some(raw.clone());
                        }
                    }
                }
            }
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Translate a generic filter into the storage layer's condition shape
pub fn translate(filter: &Filter, schema: &ResourceSchema) -> WhereCondition {
    let mut condition = WhereCondition::new();

    for (field, element) in &filter.filters {
        let operator = match schema.property(field) {
            Some(property) => translate_for_property(property, &element.value),
            None => {
                debug!("Filter field '{}' is not in the schema, passing through", field);
                translate_passthrough(&element.value)
            }
        };
        if let Some(operator) = operator {
            condition.insert(field.clone(), operator);
        }
    }

    condition
}

fn translate_for_property(property: &Property, value: &FilterValue) -> Option<FindOperator> {
    let kind = property.property_type();
    match value {
        FilterValue::Single(Value::Null) => Some(FindOperator::IsNull),
        FilterValue::Single(single) => Some(match kind {
            PropertyType::String if !property.is_array() => match as_text(single) {
                Some(text) => FindOperator::Like(format!("%{}%", escape_like(&text))),
                None => FindOperator::Equal(single.clone()),
            },
            _ => FindOperator::Equal(coerce_scalar(property, single)),
        }),
        FilterValue::List(items) => Some(FindOperator::In(
            items.iter().map(|v| coerce_scalar(property, v)).collect(),
        )),
        FilterValue::Range(FilterRange { from, to }) => {
            let bound = |raw: &String| coerce_scalar(property, &Value::String(raw.clone()));
            range_operator(from.as_ref().map(bound), to.as_ref().map(bound))
        }
    }
}

fn translate_passthrough(value: &FilterValue) -> Option<FindOperator> {
    match value {
        FilterValue::Single(Value::Null) => Some(FindOperator::IsNull),
        FilterValue::Single(single) => Some(FindOperator::Equal(single.clone())),
        FilterValue::List(items) => Some(FindOperator::In(items.clone())),
        FilterValue::Range(FilterRange { from, to }) => range_operator(
            from.clone().map(Value::String),
            to.clone().map(Value::String),
        ),
    }
}

fn range_operator(from: Option<Value>, to: Option<Value>) -> Option<FindOperator> {
    match (from, to) {
        (Some(low), Some(high)) => Some(FindOperator::Between(low, high)),
        (Some(low), None) => Some(FindOperator::MoreThanOrEqual(low)),
        (None, Some(high)) => Some(FindOperator::LessThanOrEqual(high)),
        (None, None) => None,
    }
}

/// Read one filter value as the property's type; unreadable text is kept
fn coerce_scalar(property: &Property, value: &Value) -> Value {
    let Some(text) = as_text(value) else {
        return value.clone();
    };

    let coerced = match property.property_type() {
        PropertyType::Number => parse_number(&text),
        PropertyType::Boolean => parse_bool(&text).map(Value::Bool),
        PropertyType::Date => normalize_date(&text).map(Value::String),
        PropertyType::Reference if property.has_numeric_key() => parse_number(&text),
        PropertyType::Mixed | PropertyType::Unknown => serde_json::from_str(&text).ok(),
        _ => None,
    };

    coerced.unwrap_or_else(|| value.clone())
}
