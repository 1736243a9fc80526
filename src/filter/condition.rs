//! Native query-condition shapes handed to the storage layer
//!
//! - Comparison operators: `=`, `LIKE`, `IN`, `BETWEEN`, `>=`, `<=`, `IS NULL`
//! - Pagination: `take` / `skip`
//! - Ordering: one column, ascending or descending
//!
//! [`FindOperator::matches`] evaluates an operator against an in-memory value
//! so repositories without a query language (and tests) can apply conditions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Field → operator; all entries must hold (implicit AND)
pub type WhereCondition = BTreeMap<String, FindOperator>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FindOperator {
    Equal(Value),
    /// SQL-style pattern matched case-insensitively: `%` any run, `_` one
    /// character, [`LIKE_ESCAPE`] before either makes it literal
    Like(String),
    In(Vec<Value>),
    Between(Value, Value),
    MoreThanOrEqual(Value),
    LessThanOrEqual(Value),
    IsNull,
}

impl FindOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            FindOperator::Equal(_) => "=",
            FindOperator::Like(_) => "LIKE",
            FindOperator::In(_) => "IN",
            FindOperator::Between(_, _) => "BETWEEN",
            FindOperator::MoreThanOrEqual(_) => ">=",
            FindOperator::LessThanOrEqual(_) => "<=",
            FindOperator::IsNull => "IS NULL",
        }
    }

    /// Evaluate against an attribute value (`None` when the attribute is absent)
    pub fn matches(&self, candidate: Option<&Value>) -> bool {
        let candidate = match candidate {
            None | Some(Value::Null) => return matches!(self, FindOperator::IsNull),
            Some(value) => value,
        };

        match self {
            FindOperator::Equal(expected) => values_equal(candidate, expected),
            FindOperator::Like(pattern) => match candidate {
                Value::String(s) => like_matches(s, pattern),
                Value::Number(n) => like_matches(&n.to_string(), pattern),
                _ => false,
            },
            FindOperator::In(options) => options.iter().any(|o| values_equal(candidate, o)),
            FindOperator::Between(low, high) => {
                matches!(
                    compare_values(candidate, low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(
                    compare_values(candidate, high),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
            FindOperator::MoreThanOrEqual(low) => matches!(
                compare_values(candidate, low),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FindOperator::LessThanOrEqual(high) => matches!(
                compare_values(candidate, high),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FindOperator::IsNull => false,
        }
    }
}

/// Sort direction; ascending unless stated otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction (case-insensitive); anything but `desc` is ascending
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Column to sort by; storage order when `None`
    pub sort_by: Option<String>,
    pub direction: SortDirection,
}

/// Complete read request for the storage layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    #[serde(rename = "where")]
    pub where_clause: WhereCondition,
    pub take: u32,
    pub skip: u32,
    pub order: Order,
}

/// Escape character of [`FindOperator::Like`] patterns (`ESCAPE '\'` in SQL)
pub const LIKE_ESCAPE: char = '\\';

/// Escape `%`, `_` and the escape character so `text` matches literally
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        // Loose equality between numbers and their text form (ids from forms)
        (Value::Number(x), Value::String(y)) | (Value::String(y), Value::Number(x)) => {
            x.to_string() == *y
        }
        _ => a == b,
    }
}

pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::String(y)) => x.as_f64()?.partial_cmp(&y.parse::<f64>().ok()?),
        (Value::String(x), Value::Number(y)) => x.parse::<f64>().ok()?.partial_cmp(&y.as_f64()?),
        _ => None,
    }
}

enum LikeToken {
    AnySequence,
    AnyChar,
    Literal(char),
}

fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::AnySequence,
            '_' => LikeToken::AnyChar,
            LIKE_ESCAPE => LikeToken::Literal(chars.next().unwrap_or(LIKE_ESCAPE)),
            other => LikeToken::Literal(other),
        });
    }
    tokens
}

fn like_matches(candidate: &str, pattern: &str) -> bool {
    let candidate: Vec<char> = candidate.to_lowercase().chars().collect();
    let tokens = like_tokens(&pattern.to_lowercase());

    // matched[i]: the tokens seen so far can consume exactly candidate[..i]
    let mut matched = vec![false; candidate.len() + 1];
    matched[0] = true;
    for token in &tokens {
        let mut next = vec![false; candidate.len() + 1];
        for i in 0..=candidate.len() {
            match token {
                LikeToken::AnySequence => {
                    next[i] = matched[i] || (i > 0 && next[i - 1]);
                }
                LikeToken::AnyChar => {
                    next[i] = i > 0 && matched[i - 1];
                }
                LikeToken::Literal(c) => {
                    next[i] = i > 0 && matched[i - 1] && candidate[i - 1] == *c;
                }
            }
        }
        matched = next;
    }
    matched[candidate.len()]
}
