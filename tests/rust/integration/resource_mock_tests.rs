//! Resource adapter against a mocked storage layer
//!
//! Pins down exactly what the adapter asks of the repository and how it
//! reclassifies what the repository reports.

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};

use adminbridge::filter::{FindOptions, SortDirection, WhereCondition};
use adminbridge::resource::{EntityValidator, QUERY_FAILED_KIND};
use adminbridge::schema::EntityMetadata;
use adminbridge::storage::StorageErrorKind;
use adminbridge::{
    is_adapter_for, AdapterConfig, AdapterError, Attributes, Entity, EntityRepository, Filter,
    FilterValue, FindOperator, FindParams, FlatParams, RecordId, Resource, SchemaIntrospection,
    StorageError, ValidationError,
};

use super::blog_model;

mock! {
    pub Repository {}

    impl SchemaIntrospection for Repository {
        fn metadata(&self) -> Result<EntityMetadata, StorageError>;
    }

    #[async_trait]
    impl EntityRepository for Repository {
        async fn count(&self, condition: &WhereCondition) -> Result<u64, StorageError>;
        async fn find(&self, options: &FindOptions) -> Result<Vec<Entity>, StorageError>;
        async fn find_one(&self, id: &RecordId) -> Result<Option<Entity>, StorageError>;
        async fn find_by_ids(&self, ids: &[RecordId]) -> Result<Vec<Entity>, StorageError>;
        fn create(&self, attributes: Attributes) -> Entity;
        async fn save(&self, entity: Entity) -> Result<Entity, StorageError>;
        async fn delete(&self, id: &RecordId) -> Result<(), StorageError>;
    }
}

/// Mock exposing the blog `User` model
fn user_repository() -> MockRepository {
    let mut mock = MockRepository::new();
    mock.expect_metadata()
        .returning(|| Ok(blog_model("User")));
    mock.expect_create().returning(Entity::new);
    mock
}

fn resource(mock: MockRepository) -> Resource<MockRepository> {
    Resource::new(mock, AdapterConfig::default()).unwrap()
}

fn flat(value: Value) -> FlatParams {
    value
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn entity(value: Value) -> Entity {
    Entity::new(value.as_object().cloned().unwrap())
}

struct RejectAll;

#[async_trait]
impl EntityValidator for RejectAll {
    async fn validate(&self, _entity: &Entity) -> Result<(), ValidationError> {
        Err(ValidationError::new().with_property("name", "isNotEmpty", "name should not be empty"))
    }
}

#[tokio::test]
async fn test_find_applies_pagination_defaults() {
    let mut mock = user_repository();
    mock.expect_find()
        .withf(|options: &FindOptions| {
            options.take == 10
                && options.skip == 0
                && options.order.direction == SortDirection::Asc
                && options.order.sort_by.is_none()
                && options.where_clause.is_empty()
        })
        .times(1)
        .returning(|_| Ok(vec![]));

    let records = resource(mock)
        .find(&Filter::new(), &FindParams::default())
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_count_routes_filter_through_translator() {
    let mut mock = user_repository();
    mock.expect_count()
        .withf(|condition: &WhereCondition| {
            condition.get("name") == Some(&FindOperator::Like("%ada%".to_string()))
                && condition.get("id") == Some(&FindOperator::Equal(json!(1)))
        })
        .times(1)
        .returning(|_| Ok(1));

    let filter = Filter::new()
        .with("name", FilterValue::single("ada"))
        .with("id", FilterValue::single("1"));
    assert_eq!(resource(mock).count(&filter).await.unwrap(), 1);
}

#[tokio::test]
async fn test_save_constraint_failure_keyed_by_column() {
    let mut mock = user_repository();
    mock.expect_save().times(1).returning(|_| {
        Err(StorageError::query_failed(
            "duplicate key value violates unique constraint \"UQ_user_email\"",
            Some("email".to_string()),
        ))
    });

    let err = resource(mock)
        .create(&flat(json!({"email": "ada@blog.io"})))
        .await
        .unwrap_err();

    let expected = ValidationError::new().with_property(
        "email",
        QUERY_FAILED_KIND,
        "duplicate key value violates unique constraint \"UQ_user_email\"",
    );
    assert_eq!(err, AdapterError::Validation(expected));
}

#[tokio::test]
async fn test_save_constraint_failure_without_column_is_base_error() {
    let mut mock = user_repository();
    mock.expect_save()
        .returning(|_| Err(StorageError::query_failed("check constraint failed", None)));

    let err = resource(mock)
        .create(&flat(json!({"email": "ada@blog.io"})))
        .await
        .unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert!(errors.property_errors.is_empty());
    assert_eq!(errors.base_error.as_ref().unwrap().kind, QUERY_FAILED_KIND);
}

#[tokio::test]
async fn test_save_other_failure_propagates() {
    let mut mock = user_repository();
    mock.expect_save()
        .returning(|_| Err(StorageError::connection("connection reset")));

    let err = resource(mock)
        .create(&flat(json!({"email": "ada@blog.io"})))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Storage(StorageError {
            kind: StorageErrorKind::Connection,
            ..
        })
    ));
}

#[tokio::test]
async fn test_validator_rejection_skips_save() {
    let mut mock = user_repository();
    mock.expect_save().never();

    let resource = resource(mock).with_validator(RejectAll);
    let err = resource
        .create(&flat(json!({"email": "ada@blog.io"})))
        .await
        .unwrap_err();

    let name = err.validation_errors().unwrap().property("name").unwrap().clone();
    assert_eq!(name.kind, "isNotEmpty");
    assert_eq!(name.message, "name should not be empty");
}

#[tokio::test]
async fn test_delete_constraint_failure_is_base_validation_error() {
    let mut mock = user_repository();
    mock.expect_delete()
        .withf(|id: &RecordId| *id == RecordId::Number(1))
        .returning(|_| {
            Err(StorageError::query_failed(
                "update or delete on table \"user\" violates foreign key constraint",
                None,
            ))
        });

    let err = resource(mock)
        .delete(&RecordId::Number(1))
        .await
        .unwrap_err();

    let errors = err.validation_errors().unwrap();
    let base = errors.base_error.as_ref().unwrap();
    assert_eq!(base.kind, QUERY_FAILED_KIND);
    assert!(base.message.contains("foreign key"));
    assert!(errors.property_errors.is_empty());
}

#[tokio::test]
async fn test_delete_other_failure_propagates() {
    let mut mock = user_repository();
    mock.expect_delete()
        .returning(|_| Err(StorageError::other("table is locked")));

    let err = resource(mock)
        .delete(&RecordId::Number(1))
        .await
        .unwrap_err();
    assert_eq!(err, AdapterError::Storage(StorageError::other("table is locked")));
}

#[tokio::test]
async fn test_update_keeps_unmentioned_attributes() {
    let mut mock = user_repository();
    mock.expect_find_one()
        .returning(|_| Ok(Some(entity(json!({"id": 7, "email": "old@blog.io", "name": "Ada"})))));
    mock.expect_save()
        .withf(|saved: &Entity| {
            saved.get("email") == Some(&json!("new@blog.io"))
                && saved.get("name") == Some(&json!("Ada"))
                && saved.get("id") == Some(&json!(7))
        })
        .times(1)
        .returning(Ok);

    let saved = resource(mock)
        .update(&RecordId::Number(7), &flat(json!({"email": "new@blog.io"})))
        .await
        .unwrap();
    assert_eq!(saved["name"], json!("Ada"));
}

#[tokio::test]
async fn test_update_nested_leaf_saves_merged_object() {
    let mut mock = user_repository();
    mock.expect_find_one().returning(|_| {
        Ok(Some(entity(
            json!({"id": 1, "address": {"city": "Oslo", "zip": "0150"}}),
        )))
    });
    mock.expect_save()
        .withf(|saved: &Entity| {
            saved.get("address.city") == Some(&json!("Bergen"))
                && saved.get("address.zip") == Some(&json!("0150"))
        })
        .times(1)
        .returning(Ok);

    resource(mock)
        .update(&RecordId::Number(1), &flat(json!({"address.city": "Bergen"})))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_missing_record_skips_save() {
    let mut mock = user_repository();
    mock.expect_find_one().returning(|_| Ok(None));
    mock.expect_save().never();

    let err = resource(mock)
        .update(&RecordId::from("abc"), &flat(json!({"email": "x"})))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AdapterError::NotFound {
            model: "User".to_string(),
            id: "abc".to_string()
        }
    );
}

#[tokio::test]
async fn test_failed_introspection_is_not_adaptable() {
    let mut mock = MockRepository::new();
    mock.expect_metadata()
        .returning(|| Err(StorageError::other("entity is not registered")));

    assert!(!is_adapter_for(&mock));
    assert!(matches!(
        Resource::new(mock, AdapterConfig::default()),
        Err(AdapterError::Introspection { .. })
    ));
}
