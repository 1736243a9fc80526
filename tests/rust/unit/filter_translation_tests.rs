//! Filter translation against the blog fixture schema

use std::collections::BTreeMap;

use serde_json::json;

use adminbridge::filter::translate;
use adminbridge::{Filter, FilterValue, FindOperator};

use super::blog_schema;

fn flat_query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_flat_query_form_translation() {
    let schema = blog_schema("Post");
    let filter = Filter::from_flat(&flat_query(&[
        ("title", "rust"),
        ("likes~~from", "10"),
        ("likes~~to", "20"),
        ("createdAt~~from", "2024-01-01"),
        ("published", "true"),
        ("authorId", "3"),
        ("tags", ""),
    ]));

    let condition = translate(&filter, &schema);
    assert_eq!(
        condition.get("title"),
        Some(&FindOperator::Like("%rust%".to_string()))
    );
    assert_eq!(
        condition.get("likes"),
        Some(&FindOperator::Between(json!(10), json!(20)))
    );
    assert_eq!(
        condition.get("createdAt"),
        Some(&FindOperator::MoreThanOrEqual(json!(
            "2024-01-01T00:00:00.000Z"
        )))
    );
    assert_eq!(
        condition.get("published"),
        Some(&FindOperator::Equal(json!(true)))
    );
    assert_eq!(
        condition.get("authorId"),
        Some(&FindOperator::Equal(json!(3)))
    );
    assert!(!condition.contains_key("tags"));
}

#[test]
fn test_unknown_fields_pass_through() {
    let schema = blog_schema("Post");
    let filter = Filter::new()
        .with("legacyFlag", FilterValue::single("yes"))
        .with("region", FilterValue::List(vec![json!("eu"), json!("us")]));

    let condition = translate(&filter, &schema);
    assert_eq!(
        condition.get("legacyFlag"),
        Some(&FindOperator::Equal(json!("yes")))
    );
    assert_eq!(
        condition.get("region"),
        Some(&FindOperator::In(vec![json!("eu"), json!("us")]))
    );
}

#[test]
fn test_filter_deserializes_from_framework_json() {
    let schema = blog_schema("Post");
    let filter: Filter = serde_json::from_value(json!({
        "filters": {
            "likes": {"path": "likes", "value": {"from": "5"}},
            "id": {"path": "id", "value": ["1", "2"]},
            "title": {"path": "title", "value": null}
        }
    }))
    .unwrap();

    let condition = translate(&filter, &schema);
    assert_eq!(
        condition.get("likes"),
        Some(&FindOperator::MoreThanOrEqual(json!(5)))
    );
    assert_eq!(
        condition.get("id"),
        Some(&FindOperator::In(vec![json!(1), json!(2)]))
    );
    assert_eq!(condition.get("title"), Some(&FindOperator::IsNull));
}
