//! Rule-based access-path selection for start steps.

use tracing::{debug, warn};

use crate::query::constraint::{class_label, Constraint};
use crate::query::physical::{AccessPath, IndexQuery};
use crate::storage::{ElementKind, IndexProvider};
use crate::types::{ElementId, Result};

/// Planner inputs that influence diagnostics.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    /// Emit a warning whenever a full scan is chosen.
    pub warn_on_full_scan: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            warn_on_full_scan: true,
        }
    }
}

/// Chooses between identifier lookup, a single index probe, and a full scan.
///
/// Selection is deterministic: the first label constraint scopes the lookup,
/// the first indexed `eq`/`within` constraint drives it, and the first index
/// covering that key wins. Other constraints are left to residual filtering.
#[derive(Clone, Debug, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    /// Creates a planner with the given configuration.
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Picks the access path for one resolution.
    pub fn plan(
        &self,
        constraints: &[Constraint],
        ids: &[ElementId],
        kind: ElementKind,
        indexes: &dyn IndexProvider,
    ) -> Result<AccessPath> {
        if !ids.is_empty() {
            debug!(kind = %kind, ids = ids.len(), "planner.ids");
            return Ok(AccessPath::ById { ids: ids.to_vec() });
        }
        if let Some(query) = self.find_index(constraints, kind, indexes)? {
            return Ok(AccessPath::ByIndex(query));
        }
        if self.config.warn_on_full_scan {
            warn!(
                kind = %kind,
                constraints = constraints.len(),
                "planner.full_scan"
            );
        }
        Ok(AccessPath::FullScan)
    }

    /// Looks for an index that can serve `constraints`, ignoring explicit ids.
    pub fn find_index(
        &self,
        constraints: &[Constraint],
        kind: ElementKind,
        indexes: &dyn IndexProvider,
    ) -> Result<Option<IndexQuery>> {
        let Some(label) = class_label(constraints) else {
            return Ok(None);
        };
        let indexed_keys = indexes.indexed_keys(kind, &label)?;
        let Some(driver) = constraints.iter().find(|c| {
            c.predicate().is_index_eligible() && indexed_keys.contains(c.key())
        }) else {
            return Ok(None);
        };
        let values = driver.probe_values()?;
        let class_name = indexes.to_internal_class_name(&label, kind);
        let descriptor = indexes
            .class_indexes(&class_name)?
            .into_iter()
            .find(|idx| idx.covers(driver.key()));
        let Some(index) = descriptor else {
            warn!(class = %class_name, key = driver.key(), "planner.index_miss");
            return Ok(None);
        };
        debug!(
            index = %index,
            key = driver.key(),
            values = values.len(),
            "planner.index_selected"
        );
        Ok(Some(IndexQuery {
            index,
            key: driver.key().to_owned(),
            values,
        }))
    }
}
