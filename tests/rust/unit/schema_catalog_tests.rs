//! Property schema construction from the blog fixture catalog

use adminbridge::schema::{ModelCatalog, SchemaError};
use adminbridge::PropertyType;

use super::{blog_schema, BLOG_CATALOG};

#[test]
fn test_catalog_lists_models() {
    let catalog = ModelCatalog::from_yaml_file(BLOG_CATALOG).unwrap();
    let names: Vec<_> = catalog.models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["User", "Post"]);
    assert!(matches!(
        catalog.model("Comment"),
        Err(SchemaError::UnknownModel { .. })
    ));
}

#[test]
fn test_post_properties() {
    let schema = blog_schema("Post");
    assert_eq!(schema.len(), 10);

    let tags = schema.property("tags").unwrap();
    assert!(tags.is_array());
    assert_eq!(tags.property_type(), PropertyType::String);
    assert_eq!(tags.position(), Some(5));

    let author = schema.property("authorId").unwrap();
    assert_eq!(author.property_type(), PropertyType::Reference);
    assert_eq!(author.reference(), Some("User"));
    assert_eq!(author.relation_attribute(), "author");
    assert!(author.has_numeric_key());

    assert_eq!(
        schema.property("createdAt").unwrap().property_type(),
        PropertyType::Date
    );
    assert_eq!(schema.id_property().unwrap().path(), "id");
}

#[test]
fn test_computed_columns_are_registered() {
    let schema = blog_schema("Post");

    let history = schema.property("history").unwrap();
    assert!(history.is_computed());
    assert!(history.is_array());
    assert_eq!(history.property_type(), PropertyType::Mixed);
    assert!(!history.is_sortable());

    let excerpt = schema.property("excerpt").unwrap();
    assert_eq!(excerpt.property_type(), PropertyType::String);
    assert_eq!(excerpt.position(), None);
}

#[test]
fn test_schema_serializes_type_tags() {
    let schema = blog_schema("Post");
    let json = serde_json::to_value(schema.property("metadata").unwrap()).unwrap();
    assert_eq!(json["type"], "mixed");
    assert_eq!(json["path"], "metadata");
}
