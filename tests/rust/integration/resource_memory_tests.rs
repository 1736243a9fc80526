//! Resource adapter end to end over the in-memory repository

use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use adminbridge::filter::SortDirection;
use adminbridge::resource::{COERCION_KIND, QUERY_FAILED_KIND};
use adminbridge::{
    AdapterConfig, AdapterError, Attributes, CoercionPolicy, Filter, FilterValue, FindParams,
    FlatParams, MemoryRepository, RecordId, Resource, SortParams, TypedValidator,
};

use super::blog_model;

#[allow(dead_code)]
#[derive(Debug, Deserialize, Validate)]
struct NewUser {
    #[validate(email(message = "Email is not valid"))]
    email: String,
    #[validate(length(min = 2))]
    name: String,
}

fn attrs(value: Value) -> Attributes {
    value.as_object().cloned().unwrap()
}

fn flat(value: Value) -> FlatParams {
    value
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn users() -> Resource<MemoryRepository> {
    let repository = MemoryRepository::new(blog_model("User"))
        .with_unique("email")
        .with_rows([
            attrs(json!({
                "email": "ada@blog.io",
                "name": "Ada",
                "address": {"city": "Oslo", "zip": "0150"}
            })),
            attrs(json!({"email": "linus@blog.io", "name": "Linus"})),
        ]);
    Resource::new(repository, AdapterConfig::default()).unwrap()
}

fn posts_with(config: AdapterConfig) -> Resource<MemoryRepository> {
    let repository = MemoryRepository::new(blog_model("Post")).with_rows([
        attrs(json!({"title": "Borrowing", "likes": 30, "tags": ["rust"], "authorId": 1})),
        attrs(json!({"title": "Lifetimes", "likes": 10, "tags": ["rust", "types"], "authorId": 2})),
        attrs(json!({"title": "Gardening", "likes": 20, "tags": [], "authorId": 1})),
    ]);
    Resource::new(repository, config).unwrap()
}

fn posts() -> Resource<MemoryRepository> {
    posts_with(AdapterConfig::default())
}

#[tokio::test]
async fn test_resource_introspection() {
    let posts = posts();
    assert_eq!(posts.name(), "Post");
    assert_eq!(posts.database_name(), "blog");
    assert_eq!(posts.database_type(), "postgres");
    assert_eq!(posts.properties().len(), 10);
    assert!(posts.property("authorId").is_some());
    assert!(posts.property("author").is_none());
}

#[tokio::test]
async fn test_create_decodes_flat_params() {
    let posts = posts();
    let saved = posts
        .create(&flat(json!({
            "title": "Traits",
            "likes": "12",
            "tags.0": "rust",
            "tags.1": "generics",
            "authorId": "2",
            "history.0": "{\"rev\":1}"
        })))
        .await
        .unwrap();

    assert_eq!(saved["id"], json!(4));
    assert_eq!(saved["likes"], json!(12));
    assert_eq!(saved["tags"], json!(["rust", "generics"]));
    assert_eq!(saved["author"], json!({"id": 2}));
    assert_eq!(saved["history"], json!([{"rev": 1}]));
    assert_eq!(posts.count(&Filter::new()).await.unwrap(), 4);
}

#[tokio::test]
async fn test_find_filters_sorts_and_pages() {
    let posts = posts();
    let filter = Filter::new().with("title", FilterValue::single("ing"));
    assert_eq!(posts.count(&filter).await.unwrap(), 2);

    let params = FindParams {
        limit: Some(1),
        offset: None,
        sort: Some(SortParams {
            sort_by: Some("likes".to_string()),
            direction: Some(SortDirection::Desc),
        }),
    };
    let records = posts.find(&filter, &params).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].param("title"), Some(&json!("Borrowing")));

    let params = FindParams {
        offset: Some(1),
        ..params
    };
    let records = posts.find(&filter, &params).await.unwrap();
    assert_eq!(records[0].param("title"), Some(&json!("Gardening")));
}

#[tokio::test]
async fn test_search_text_is_matched_literally() {
    let posts = posts();
    posts
        .create(&flat(json!({"title": "snake_case"})))
        .await
        .unwrap();

    let underscore = Filter::new().with("title", FilterValue::single("e_c"));
    assert_eq!(posts.count(&underscore).await.unwrap(), 1);

    let not_a_wildcard = Filter::new().with("title", FilterValue::single("a_e"));
    assert_eq!(posts.count(&not_a_wildcard).await.unwrap(), 0);

    let percent = Filter::new().with("title", FilterValue::single("%"));
    assert_eq!(posts.count(&percent).await.unwrap(), 0);
}

#[tokio::test]
async fn test_find_one_and_find_many_wrap_records() {
    let posts = posts();

    let record = posts.find_one(&RecordId::Number(2)).await.unwrap().unwrap();
    assert_eq!(record.id(), Some(RecordId::Number(2)));
    assert_eq!(record.param("tags.1"), Some(&json!("types")));
    assert_eq!(record.to_parameters(), record.to_parameters());

    assert!(posts.find_one(&RecordId::Number(99)).await.unwrap().is_none());

    let ids = [RecordId::Number(1), RecordId::from("3")];
    let records = posts.find_many(&ids).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_update_assigns_onto_stored_entity() {
    let posts = posts();
    let saved = posts
        .update(&RecordId::Number(1), &flat(json!({"title": "Ownership"})))
        .await
        .unwrap();

    assert_eq!(saved["title"], json!("Ownership"));
    assert_eq!(saved["likes"], json!(30));
    assert_eq!(saved["tags"], json!(["rust"]));

    let reloaded = posts.find_one(&RecordId::Number(1)).await.unwrap().unwrap();
    assert_eq!(reloaded.param("title"), Some(&json!("Ownership")));
}

#[tokio::test]
async fn test_update_nested_leaf_keeps_siblings() {
    let users = users();
    let saved = users
        .update(&RecordId::Number(1), &flat(json!({"address.city": "Bergen"})))
        .await
        .unwrap();
    assert_eq!(saved["address"], json!({"city": "Bergen", "zip": "0150"}));

    let reloaded = users.find_one(&RecordId::Number(1)).await.unwrap().unwrap();
    assert_eq!(reloaded.param("address.city"), Some(&json!("Bergen")));
    assert_eq!(reloaded.param("address.zip"), Some(&json!("0150")));
    assert_eq!(reloaded.param("email"), Some(&json!("ada@blog.io")));
}

#[tokio::test]
async fn test_update_reference_replaces_relation_whole() {
    let posts = posts();
    let saved = posts
        .update(&RecordId::Number(1), &flat(json!({"authorId": "2"})))
        .await
        .unwrap();
    assert_eq!(saved["authorId"], json!(2));
    assert_eq!(saved["author"], json!({"id": 2}));
    assert_eq!(saved["title"], json!("Borrowing"));
}

#[tokio::test]
async fn test_nested_columns_encode_as_dotted_params() {
    let users = users();
    let record = users.find_one(&RecordId::Number(1)).await.unwrap().unwrap();
    assert_eq!(record.param("address.city"), Some(&json!("Oslo")));
    assert_eq!(record.param("address.zip"), Some(&json!("0150")));
    assert!(record.param("address").is_none());

    let other = users.find_one(&RecordId::Number(2)).await.unwrap().unwrap();
    assert!(other.param("address.city").is_none());
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let posts = posts();
    let err = posts
        .update(&RecordId::Number(42), &flat(json!({"title": "x"})))
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::NotFound { ref id, .. } if id == "42"));
    assert!(!err.is_validation());
}

#[tokio::test]
async fn test_unique_violation_surfaces_on_column() {
    let users = users();
    let err = users
        .create(&flat(json!({"email": "ada@blog.io", "name": "Other Ada"})))
        .await
        .unwrap_err();

    let errors = err.validation_errors().unwrap();
    let email = errors.property("email").unwrap();
    assert_eq!(email.kind, QUERY_FAILED_KIND);
    assert!(email.message.contains("unique"));
    assert_eq!(users.count(&Filter::new()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_strict_coercion_becomes_validation_error() {
    let config = AdapterConfig {
        coercion_policy: CoercionPolicy::Strict,
        ..AdapterConfig::default()
    };
    let posts = posts_with(config);
    let err = posts
        .create(&flat(json!({"title": "x", "likes": "lots"})))
        .await
        .unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.property("likes").unwrap().kind, COERCION_KIND);
    assert_eq!(posts.count(&Filter::new()).await.unwrap(), 3);
}

#[tokio::test]
async fn test_best_effort_coercion_stores_null() {
    let posts = posts();
    let saved = posts
        .create(&flat(json!({"title": "x", "likes": "lots"})))
        .await
        .unwrap();
    assert_eq!(saved["likes"], Value::Null);
}

#[tokio::test]
async fn test_typed_validator_blocks_save() {
    let users = users().with_validator(TypedValidator::<NewUser>::new());

    let err = users
        .create(&flat(json!({"email": "not-an-email", "name": "Grace"})))
        .await
        .unwrap_err();
    let errors = err.validation_errors().unwrap();
    let email = errors.property("email").unwrap();
    assert_eq!(email.kind, "email");
    assert_eq!(email.message, "Email is not valid");
    assert!(errors.property("name").is_none());
    assert_eq!(users.count(&Filter::new()).await.unwrap(), 2);

    let saved = users
        .create(&flat(json!({"email": "grace@blog.io", "name": "Grace"})))
        .await
        .unwrap();
    assert_eq!(saved["id"], json!(3));
}

#[tokio::test]
async fn test_populate_attaches_referenced_records() {
    let posts = posts();
    let users = users();
    let mut records = posts
        .find(&Filter::new(), &FindParams::default())
        .await
        .unwrap();

    let author = posts.property("authorId").unwrap();
    users.populate(&mut records, author).await.unwrap();

    for record in &records {
        let populated = &record.populated()["authorId"];
        assert_eq!(populated.param("id"), record.param("authorId"));
    }
    let json = records[1].to_json();
    assert_eq!(
        json.populated["authorId"].params.get("email"),
        Some(&json!("linus@blog.io"))
    );
}

#[tokio::test]
async fn test_delete_removes_row() {
    let posts = posts();
    posts.delete(&RecordId::Number(2)).await.unwrap();
    assert_eq!(posts.count(&Filter::new()).await.unwrap(), 2);
    assert!(posts.find_one(&RecordId::Number(2)).await.unwrap().is_none());
}
