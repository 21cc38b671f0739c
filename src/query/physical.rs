//! Access paths selected by the planner.

use std::fmt;

use serde::Serialize;

use crate::query::Value;
use crate::storage::IndexDescriptor;
use crate::types::ElementId;

/// Index probe chosen for a start step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndexQuery {
    /// Index to probe.
    pub index: IndexDescriptor,
    /// Constraint key that selected the index.
    pub key: String,
    /// Probe values in constraint order.
    pub values: Vec<Value>,
}

impl fmt::Display for IndexQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexQuery(index={}, {}=", self.index, self.key)?;
        write!(f, "{})", Value::List(self.values.clone()))
    }
}

/// How candidate elements are fetched. Exactly one per resolution.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum AccessPath {
    /// Direct lookup of explicit identifiers.
    ById {
        /// Identifiers in caller order.
        ids: Vec<ElementId>,
    },
    /// Single-index probe.
    ByIndex(IndexQuery),
    /// Enumerate every element of the kind.
    FullScan,
}

impl AccessPath {
    /// Operator name used in explain output.
    pub fn name(&self) -> &'static str {
        match self {
            AccessPath::ById { .. } => "ById",
            AccessPath::ByIndex(_) => "IndexProbe",
            AccessPath::FullScan => "FullScan",
        }
    }

    /// Whether the path uses an index.
    pub fn is_index(&self) -> bool {
        matches!(self, AccessPath::ByIndex(_))
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPath::ById { ids } => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "ById([{}])", ids.join(", "))
            }
            AccessPath::ByIndex(query) => write!(f, "{query}"),
            AccessPath::FullScan => write!(f, "FullScan"),
        }
    }
}
