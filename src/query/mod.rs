#![forbid(unsafe_code)]

//! Start-step planning and resolution.
//!
//! A [`GraphStep`] collects constraints while a traversal is assembled. At
//! execution time the [`Planner`] picks one access path (explicit ids, a single
//! index probe, or a full scan) and the [`Resolver`] runs it, re-checking every
//! candidate against every constraint.

/// Constraints, key classification, and the constraint store.
pub mod constraint;

/// Explain trees for diagnostics.
pub mod explain;

/// Access paths produced by the planner.
pub mod physical;

/// Access-path selection.
pub mod planner;

/// Opt-in resolution counters.
pub mod profile;

/// Access-path execution and residual filtering.
pub mod resolver;

/// Start step tying constraints, planner, and resolver together.
pub mod step;

mod value;

pub use constraint::{classify_key, Constraint, ConstraintStore, KeyKind, Predicate};
pub use explain::{ExplainNode, ExplainProp, StepExplain};
pub use physical::{AccessPath, IndexQuery};
pub use planner::{Planner, PlannerConfig};
pub use resolver::Resolver;
pub use step::GraphStep;
pub use value::Value;
