pub mod computed;
pub mod config;
pub mod errors;
pub mod metadata;
pub mod property;
pub mod property_type;
pub mod resource_schema;

pub use computed::ComputedColumns;
pub use config::ModelCatalog;
pub use errors::SchemaError;
pub use metadata::{ColumnMetadata, ConnectionOptions, EntityMetadata, RelationMetadata};
pub use property::Property;
pub use property_type::{map_native_type, NativeMapping, PropertyType};
pub use resource_schema::ResourceSchema;
