//! Start step of a traversal: resolves the initial vertices or edges.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::query::constraint::{Constraint, ConstraintStore};
use crate::query::explain::StepExplain;
use crate::query::physical::{AccessPath, IndexQuery};
use crate::query::planner::{Planner, PlannerConfig};
use crate::query::resolver::Resolver;
use crate::storage::{Element, ElementKind, Graph};
use crate::types::{ElementId, PenumbraError, Result};

/// Start step owning its constraints, explicit ids, and graph handle.
///
/// Constraints are appended while the traversal is assembled; resolution only
/// borrows the step, so nothing can be added once it is running.
pub struct GraphStep {
    kind: ElementKind,
    ids: Vec<ElementId>,
    labels: BTreeSet<String>,
    constraints: ConstraintStore,
    planner: Planner,
    graph: Option<Arc<dyn Graph>>,
}

impl GraphStep {
    /// Creates a step resolving elements of `kind`, optionally restricted to
    /// explicit ids.
    pub fn new<I>(kind: ElementKind, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ElementId>,
    {
        Self {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
            labels: BTreeSet::new(),
            constraints: ConstraintStore::new(),
            planner: Planner::default(),
            graph: None,
        }
    }

    /// Step resolving vertices.
    pub fn vertices<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ElementId>,
    {
        Self::new(ElementKind::Vertex, ids)
    }

    /// Step resolving edges.
    pub fn edges<I>(ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ElementId>,
    {
        Self::new(ElementKind::Edge, ids)
    }

    /// Attaches the graph the step resolves against.
    pub fn attach(mut self, graph: Arc<dyn Graph>) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Replaces the planner configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.planner = Planner::new(config);
        self
    }

    /// Adds step labels inherited from the step being replaced.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Appends a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Builder-style [`GraphStep::add_constraint`].
    pub fn has(mut self, constraint: Constraint) -> Self {
        self.add_constraint(constraint);
        self
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> &[Constraint] {
        self.constraints.as_slice()
    }

    /// Element kind resolved by the step.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Explicit ids, empty when none were supplied.
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    /// Step labels.
    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    fn graph(&self) -> Result<&dyn Graph> {
        self.graph.as_deref().ok_or(PenumbraError::NoGraph)
    }

    /// Index the step would use if it had no explicit ids.
    pub fn find_index(&self) -> Result<Option<IndexQuery>> {
        let graph = self.graph()?;
        self.planner
            .find_index(self.constraints(), self.kind, graph.as_index_provider())
    }

    /// Chooses the access path for this step.
    pub fn plan(&self) -> Result<AccessPath> {
        let graph = self.graph()?;
        self.planner.plan(
            self.constraints(),
            &self.ids,
            self.kind,
            graph.as_index_provider(),
        )
    }

    /// Plans and resolves the step. Every returned element satisfies every
    /// constraint; calling again re-reads the provider.
    pub fn resolve(&self) -> Result<Vec<Element>> {
        let path = self.plan()?;
        let graph = self.graph()?;
        Resolver::new(graph.as_storage_provider()).resolve(&path, self.kind, self.constraints())
    }

    /// Plans the step and describes the chosen path.
    pub fn explain(&self) -> Result<StepExplain> {
        let path = self.plan()?;
        Ok(StepExplain::new(
            self.to_string(),
            &path,
            self.kind,
            self.constraints(),
        ))
    }
}

impl fmt::Debug for GraphStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStep")
            .field("kind", &self.kind)
            .field("ids", &self.ids)
            .field("labels", &self.labels)
            .field("constraints", &self.constraints)
            .field("attached", &self.graph.is_some())
            .finish()
    }
}

impl fmt::Display for GraphStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GraphStep({}", self.kind)?;
        if !self.ids.is_empty() {
            let ids: Vec<String> = self.ids.iter().map(ToString::to_string).collect();
            write!(f, ",[{}]", ids.join(", "))?;
        }
        if !self.constraints.is_empty() {
            let constraints: Vec<String> =
                self.constraints.iter().map(ToString::to_string).collect();
            write!(f, ",[{}]", constraints.join(", "))?;
        }
        write!(f, ")")?;
        if !self.labels.is_empty() {
            let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
            write!(f, "@[{}]", labels.join(", "))?;
        }
        Ok(())
    }
}
