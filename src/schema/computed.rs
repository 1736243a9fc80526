//! Computed (pseudo) columns
//!
//! Attributes that are not backed by a native column but should still show
//! up in the admin panel. A model registers them statically, either in code
//! or in its YAML description:
//!
//! ```ignore
//! let computed = ComputedColumns::new()
//!     .column("fullName", "string")
//!     .column("history", "mixed[]");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute name → declared type name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComputedColumns(BTreeMap<String, String>);

impl ComputedColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a computed attribute with its declared type
    pub fn column(mut self, path: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.0.insert(path.into(), type_name.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, String)> for ComputedColumns {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ComputedColumns(iter.into_iter().collect())
    }
}
