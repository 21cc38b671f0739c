use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::query::Value;
use crate::storage::{Element, ElementKind, MemGraph};
use crate::types::{ElementId, Result};

/// Serialized graph used by the CLI and integration tests.
///
/// Property values are plain JSON (`"name": "Alice"`, `"weight": [1, 2]`).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Fixture {
    /// Vertex records.
    #[serde(default)]
    pub vertices: Vec<VertexRecord>,
    /// Edge records.
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    /// Index definitions, created in order after all elements.
    #[serde(default)]
    pub indexes: Vec<IndexRecord>,
}

/// One vertex of a [`Fixture`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VertexRecord {
    /// Vertex identifier.
    pub id: u64,
    /// Class label.
    pub label: String,
    /// Property values; JSON objects are rejected.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// One edge of a [`Fixture`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EdgeRecord {
    /// Edge identifier.
    pub id: u64,
    /// Class label.
    pub label: String,
    /// Source vertex.
    pub out: u64,
    /// Target vertex, serialized as `in`.
    #[serde(rename = "in")]
    pub in_vertex: u64,
    /// Property values; JSON objects are rejected.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// Index definition of a [`Fixture`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IndexRecord {
    /// Unique index name.
    pub name: String,
    /// Element kind the index covers.
    pub kind: ElementKind,
    /// Class label the index is defined on.
    pub label: String,
    /// Indexed property keys.
    pub fields: Vec<String>,
}

impl Fixture {
    /// Reads a fixture from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parses a fixture from a JSON string.
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Materializes the fixture into a [`MemGraph`].
    pub fn into_graph(self) -> Result<MemGraph> {
        let mut graph = MemGraph::new();
        for record in self.vertices {
            let mut element = Element::vertex(record.id, record.label);
            element.properties = convert_props(&record.properties)?;
            graph.insert(element);
        }
        for record in self.edges {
            let mut element = Element::edge(
                record.id,
                record.label,
                ElementId(record.out),
                ElementId(record.in_vertex),
            );
            element.properties = convert_props(&record.properties)?;
            graph.insert(element);
        }
        for record in self.indexes {
            graph = graph.with_index(&record.name, record.kind, &record.label, record.fields)?;
        }
        Ok(graph)
    }
}

fn convert_props(raw: &BTreeMap<String, serde_json::Value>) -> Result<BTreeMap<String, Value>> {
    raw.iter()
        .map(|(key, value)| Ok((key.clone(), Value::try_from(value)?)))
        .collect()
}
