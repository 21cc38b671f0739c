//! Penumbra: access-path planning and residual filtering for traversal start
//! steps.
//!
//! The [`query`] module holds the planner, resolver, and start step; the
//! [`storage`] module defines the provider seam and an in-memory graph.

#![warn(missing_docs)]

pub mod query;
pub mod storage;
pub mod types;

pub use query::{AccessPath, Constraint, GraphStep, Planner, PlannerConfig, Predicate, Value};
pub use storage::{Element, ElementKind, Graph, MemGraph};
pub use types::{ElementId, PenumbraError, Result};
