use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider-maintained index over one or more properties of a storage class.
///
/// Planner code treats descriptors as opaque handles: it only asks whether a
/// descriptor covers a key and hands it back to [`StorageProvider::probe_index`].
///
/// [`StorageProvider::probe_index`]: super::StorageProvider::probe_index
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name, unique within the provider.
    pub name: String,
    /// Internal class the index is defined on.
    pub class_name: String,
    /// Indexed property keys in definition order.
    pub fields: Vec<String>,
}

impl IndexDescriptor {
    /// Creates a descriptor.
    pub fn new<I, S>(name: impl Into<String>, class_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `key` is one of the indexed fields.
    pub fn covers(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field == key)
    }
}

impl fmt::Display for IndexDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}.{})", self.name, self.class_name, self.fields.join(","))
    }
}
