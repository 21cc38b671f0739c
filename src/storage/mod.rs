//! Storage provider seam and the in-memory reference graph.
//!
//! The planner and resolver never touch a storage engine directly. They talk to
//! two capability traits: [`IndexProvider`] answers index metadata questions and
//! [`StorageProvider`] enumerates elements. A concrete engine implements both
//! and is handed to a graph step as an `Arc<dyn Graph>`.

use std::collections::BTreeSet;

use crate::query::Value;
use crate::types::{ElementId, Result};

mod descriptor;
mod element;

/// JSON fixtures that populate a [`MemGraph`].
pub mod fixture;

/// In-memory graph implementing both provider traits.
pub mod memory;

pub use descriptor::IndexDescriptor;
pub use element::{Element, ElementKind};
pub use fixture::Fixture;
pub use memory::MemGraph;

/// Lazy element stream produced by a storage primitive.
///
/// Each item may carry a provider-side failure; consumers must stop at the
/// first error rather than skip it.
pub type ElementIter<'a> = Box<dyn Iterator<Item = Result<Element>> + 'a>;

/// Index metadata consulted while choosing an access path.
pub trait IndexProvider {
    /// Property keys indexed for elements of `kind` carrying `class_label`.
    fn indexed_keys(&self, kind: ElementKind, class_label: &str) -> Result<BTreeSet<String>>;
    /// Index descriptors defined on the internal class `class_name`.
    fn class_indexes(&self, class_name: &str) -> Result<Vec<IndexDescriptor>>;
    /// Maps a user-facing class label to the provider's internal class name.
    fn to_internal_class_name(&self, label: &str, kind: ElementKind) -> String;
}

/// Element enumeration primitives consumed by the resolver.
pub trait StorageProvider {
    /// Looks up elements by identifier. Unknown identifiers are skipped.
    fn lookup_by_ids(&self, kind: ElementKind, ids: &[ElementId]) -> Result<ElementIter<'_>>;
    /// Enumerates every element of `kind`.
    fn full_scan(&self, kind: ElementKind) -> Result<ElementIter<'_>>;
    /// Probes the `key` field of `index` with each of `values` in order.
    /// `key` is always one of the index's fields.
    fn probe_index(
        &self,
        index: &IndexDescriptor,
        key: &str,
        values: &[Value],
    ) -> Result<ElementIter<'_>>;
}

/// Storage engine handle attached to a graph step.
pub trait Graph: IndexProvider + StorageProvider + Send + Sync {
    /// Metadata view of the engine.
    fn as_index_provider(&self) -> &dyn IndexProvider;
    /// Enumeration view of the engine.
    fn as_storage_provider(&self) -> &dyn StorageProvider;
}

impl<T> Graph for T
where
    T: IndexProvider + StorageProvider + Send + Sync,
{
    fn as_index_provider(&self) -> &dyn IndexProvider {
        self
    }

    fn as_storage_provider(&self) -> &dyn StorageProvider {
        self
    }
}
