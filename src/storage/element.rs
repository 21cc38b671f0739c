use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::Value;
use crate::types::ElementId;

/// Whether a start step resolves vertices or edges.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Graph vertex.
    Vertex,
    /// Graph edge.
    Edge,
}

impl ElementKind {
    /// Name of the storage base class every class of this kind extends.
    pub const fn base_class(self) -> &'static str {
        match self {
            ElementKind::Vertex => "V",
            ElementKind::Edge => "E",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Vertex => write!(f, "vertex"),
            ElementKind::Edge => write!(f, "edge"),
        }
    }
}

/// Vertex or edge handed out by a storage provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element identifier, unique per kind.
    pub id: ElementId,
    /// Vertex or edge.
    pub kind: ElementKind,
    /// Class label (the user-facing type name).
    pub label: String,
    /// Property map.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    /// Tail vertex for edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_vertex: Option<ElementId>,
    /// Head vertex for edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_vertex: Option<ElementId>,
}

impl Element {
    /// Creates a vertex with no properties.
    pub fn vertex(id: impl Into<ElementId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Vertex,
            label: label.into(),
            properties: BTreeMap::new(),
            out_vertex: None,
            in_vertex: None,
        }
    }

    /// Creates an edge `out -> in` with no properties.
    pub fn edge(
        id: impl Into<ElementId>,
        label: impl Into<String>,
        out_vertex: impl Into<ElementId>,
        in_vertex: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Edge,
            label: label.into(),
            properties: BTreeMap::new(),
            out_vertex: Some(out_vertex.into()),
            in_vertex: Some(in_vertex.into()),
        }
    }

    /// Adds a property, replacing any previous value under `key`.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Reads a property value.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ElementKind::Vertex => write!(f, "v[{}]", self.id),
            ElementKind::Edge => match (self.out_vertex, self.in_vertex) {
                (Some(out), Some(inv)) => {
                    write!(f, "e[{}][{}-{}->{}]", self.id, out, self.label, inv)
                }
                _ => write!(f, "e[{}]", self.id),
            },
        }
    }
}
