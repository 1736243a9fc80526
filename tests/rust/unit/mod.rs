//! Unit tests - Tests that run without external dependencies
//!
//! These exercise the public translation API (schema, filters, codec) against
//! the blog fixture catalog.

mod filter_translation_tests;
mod schema_catalog_tests;

use adminbridge::{ModelCatalog, ResourceSchema};

pub const BLOG_CATALOG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/blog.yaml");

/// Property schema of one model of the blog fixture
pub fn blog_schema(model: &str) -> ResourceSchema {
    let catalog = ModelCatalog::from_yaml_file(BLOG_CATALOG).expect("fixture catalog loads");
    ResourceSchema::from_metadata(catalog.model(model).expect("model is in the fixture"))
}
