//! Reference provider that keeps vertices, edges, and index definitions in
//! memory.
//!
//! Elements are stored in identifier order, so scans and per-value index
//! probes are deterministic. A probe on a composite index matches the
//! requested field only.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::query::Value;
use crate::storage::{
    Element, ElementIter, ElementKind, IndexDescriptor, IndexProvider, StorageProvider,
};
use crate::types::{ElementId, PenumbraError, Result};

/// Provider primitive that should fail, used to exercise error propagation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fault {
    /// `lookup_by_ids` fails before yielding anything.
    Lookup,
    /// `full_scan` fails before yielding anything.
    Scan,
    /// `probe_index` fails before yielding anything.
    Probe,
    /// Metadata calls fail.
    Metadata,
    /// Every element stream fails after yielding `after` elements.
    MidStream {
        /// Number of elements yielded before the failure.
        after: usize,
    },
}

/// Per-primitive call counters.
#[derive(Debug, Default)]
struct CallCounters {
    metadata: AtomicU64,
    lookups: AtomicU64,
    scans: AtomicU64,
    probes: AtomicU64,
}

/// Snapshot of [`MemGraph`] call counters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CallStats {
    /// `indexed_keys` + `class_indexes` calls.
    pub metadata: u64,
    /// `lookup_by_ids` calls.
    pub lookups: u64,
    /// `full_scan` calls.
    pub scans: u64,
    /// `probe_index` calls.
    pub probes: u64,
}

/// In-memory graph.
#[derive(Debug, Default)]
pub struct MemGraph {
    vertices: BTreeMap<ElementId, Element>,
    edges: BTreeMap<ElementId, Element>,
    indexes: Vec<IndexDescriptor>,
    fault: Option<Fault>,
    calls: CallCounters,
}

impl MemGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an element.
    pub fn insert(&mut self, element: Element) {
        let target = match element.kind {
            ElementKind::Vertex => &mut self.vertices,
            ElementKind::Edge => &mut self.edges,
        };
        target.insert(element.id, element);
    }

    /// Builder-style [`MemGraph::insert`].
    pub fn with_element(mut self, element: Element) -> Self {
        self.insert(element);
        self
    }

    /// Defines an index. Definition order is the order `class_indexes`
    /// reports descriptors in.
    pub fn create_index(&mut self, index: IndexDescriptor) -> Result<()> {
        if index.fields.is_empty() {
            return Err(PenumbraError::Invalid("index requires at least one field"));
        }
        if self.indexes.iter().any(|existing| existing.name == index.name) {
            return Err(PenumbraError::InvalidOwned(format!(
                "index '{}' already exists",
                index.name
            )));
        }
        debug!(index = %index, "memgraph.create_index");
        self.indexes.push(index);
        Ok(())
    }

    /// Builder-style index definition on `label` of `kind`.
    pub fn with_index<I, S>(
        mut self,
        name: &str,
        kind: ElementKind,
        label: &str,
        fields: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let class_name = self.to_internal_class_name(label, kind);
        self.create_index(IndexDescriptor::new(name, class_name, fields))?;
        Ok(self)
    }

    /// Makes one provider primitive fail from now on.
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Number of stored elements of `kind`.
    pub fn len(&self, kind: ElementKind) -> usize {
        self.elements(kind).len()
    }

    /// Whether the graph holds no elements at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Call counters accumulated so far.
    pub fn call_stats(&self) -> CallStats {
        CallStats {
            metadata: self.calls.metadata.load(Ordering::Relaxed),
            lookups: self.calls.lookups.load(Ordering::Relaxed),
            scans: self.calls.scans.load(Ordering::Relaxed),
            probes: self.calls.probes.load(Ordering::Relaxed),
        }
    }

    fn elements(&self, kind: ElementKind) -> &BTreeMap<ElementId, Element> {
        match kind {
            ElementKind::Vertex => &self.vertices,
            ElementKind::Edge => &self.edges,
        }
    }

    fn check_fault(&self, point: Fault) -> Result<()> {
        if self.fault == Some(point) {
            return Err(PenumbraError::Storage(format!("injected {point:?} failure")));
        }
        Ok(())
    }

    fn stream<'a, I>(&self, items: I) -> ElementIter<'a>
    where
        I: Iterator<Item = Element> + 'a,
    {
        match self.fault {
            Some(Fault::MidStream { after }) => Box::new(
                items
                    .map(Ok::<Element, PenumbraError>)
                    .take(after)
                    .chain(std::iter::once(Err(PenumbraError::Storage(
                        "injected mid-stream failure".into(),
                    )))),
            ),
            _ => Box::new(items.map(Ok::<Element, PenumbraError>)),
        }
    }

    fn class_of(&self, element: &Element) -> String {
        self.to_internal_class_name(&element.label, element.kind)
    }
}

impl IndexProvider for MemGraph {
    fn indexed_keys(&self, kind: ElementKind, class_label: &str) -> Result<BTreeSet<String>> {
        self.calls.metadata.fetch_add(1, Ordering::Relaxed);
        self.check_fault(Fault::Metadata)?;
        let class_name = self.to_internal_class_name(class_label, kind);
        Ok(self
            .indexes
            .iter()
            .filter(|idx| idx.class_name == class_name)
            .flat_map(|idx| idx.fields.iter().cloned())
            .collect())
    }

    fn class_indexes(&self, class_name: &str) -> Result<Vec<IndexDescriptor>> {
        self.calls.metadata.fetch_add(1, Ordering::Relaxed);
        self.check_fault(Fault::Metadata)?;
        Ok(self
            .indexes
            .iter()
            .filter(|idx| idx.class_name == class_name)
            .cloned()
            .collect())
    }

    fn to_internal_class_name(&self, label: &str, kind: ElementKind) -> String {
        let base = kind.base_class();
        if label == base {
            base.to_owned()
        } else {
            format!("{base}_{label}")
        }
    }
}

impl StorageProvider for MemGraph {
    fn lookup_by_ids(&self, kind: ElementKind, ids: &[ElementId]) -> Result<ElementIter<'_>> {
        self.calls.lookups.fetch_add(1, Ordering::Relaxed);
        self.check_fault(Fault::Lookup)?;
        let elements = self.elements(kind);
        let found: Vec<Element> = ids
            .iter()
            .filter_map(|id| elements.get(id).cloned())
            .collect();
        Ok(self.stream(found.into_iter()))
    }

    fn full_scan(&self, kind: ElementKind) -> Result<ElementIter<'_>> {
        self.calls.scans.fetch_add(1, Ordering::Relaxed);
        self.check_fault(Fault::Scan)?;
        Ok(self.stream(self.elements(kind).values().cloned()))
    }

    fn probe_index(
        &self,
        index: &IndexDescriptor,
        key: &str,
        values: &[Value],
    ) -> Result<ElementIter<'_>> {
        self.calls.probes.fetch_add(1, Ordering::Relaxed);
        self.check_fault(Fault::Probe)?;
        if !self.indexes.iter().any(|idx| idx.name == index.name) {
            return Err(PenumbraError::NotFound);
        }
        if !index.covers(key) {
            return Err(PenumbraError::InvalidOwned(format!(
                "index '{}' does not cover '{key}'",
                index.name
            )));
        }
        let mut hits = Vec::new();
        for value in values {
            for element in self.vertices.values().chain(self.edges.values()) {
                if self.class_of(element) != index.class_name {
                    continue;
                }
                if element
                    .property(key)
                    .is_some_and(|actual| actual.loose_eq(value))
                {
                    hits.push(element.clone());
                }
            }
        }
        Ok(self.stream(hits.into_iter()))
    }
}
