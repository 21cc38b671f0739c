#![forbid(unsafe_code)]

//! Identifier newtypes and the crate-wide error type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a vertex or an edge.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ElementId {
    fn from(value: u64) -> Self {
        ElementId(value)
    }
}

impl From<ElementId> for u64 {
    fn from(value: ElementId) -> Self {
        value.0
    }
}

/// Errors raised while planning or resolving a start step.
#[derive(thiserror::Error, Debug)]
pub enum PenumbraError {
    /// I/O failure, e.g. while reading a fixture.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid argument with a static description.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    /// Invalid argument with a formatted description.
    #[error("invalid argument: {0}")]
    InvalidOwned(String),
    /// A named provider object does not exist.
    #[error("not found")]
    NotFound,
    /// The step was planned or resolved without an attached graph.
    #[error("graph step has no graph attached")]
    NoGraph,
    /// A constraint operand has the wrong shape for its predicate.
    #[error("constraint on '{key}' requires {expected}")]
    TypeMismatch {
        /// Constraint key.
        key: String,
        /// Operand shape the predicate needs.
        expected: &'static str,
    },
    /// Provider-side failure.
    #[error("storage: {0}")]
    Storage(String),
    /// Fixture (de)serialization failure.
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PenumbraError>;
