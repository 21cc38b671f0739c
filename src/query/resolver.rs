//! Executes an access path and applies residual filtering.

use tracing::debug;

use crate::query::constraint::{test_all, Constraint};
use crate::query::physical::AccessPath;
use crate::query::profile::{profile_timer, record_resolution, ResolveProfileKind};
use crate::storage::{Element, ElementIter, ElementKind, StorageProvider};
use crate::types::{PenumbraError, Result};

/// Runs access paths against a [`StorageProvider`].
///
/// Whatever the path, every candidate is re-checked against the full
/// constraint set; index hits are never assumed to satisfy anything.
pub struct Resolver<'a> {
    storage: &'a dyn StorageProvider,
}

impl<'a> Resolver<'a> {
    /// Binds the resolver to a storage provider.
    pub fn new(storage: &'a dyn StorageProvider) -> Self {
        Self { storage }
    }

    /// Fetches candidates for `path` and keeps those satisfying every
    /// constraint, in provider order.
    ///
    /// Provider failures and constraint evaluation errors abort the whole
    /// resolution; no truncated result is ever returned.
    pub fn resolve(
        &self,
        path: &AccessPath,
        kind: ElementKind,
        constraints: &[Constraint],
    ) -> Result<Vec<Element>> {
        let timer = profile_timer();
        let (profile_kind, candidates) = match path {
            AccessPath::ById { ids } => {
                // Identifier lookups are materialized before filtering.
                let found = self
                    .storage
                    .lookup_by_ids(kind, ids)?
                    .collect::<Result<Vec<_>>>()?;
                let stream: ElementIter<'_> =
                    Box::new(found.into_iter().map(Ok::<Element, PenumbraError>));
                (ResolveProfileKind::ById, stream)
            }
            AccessPath::ByIndex(query) => (
                ResolveProfileKind::ByIndex,
                self.storage
                    .probe_index(&query.index, &query.key, &query.values)?,
            ),
            AccessPath::FullScan => (ResolveProfileKind::FullScan, self.storage.full_scan(kind)?),
        };
        let (elements, read) = filter_all(candidates, constraints)?;
        record_resolution(profile_kind, timer, read, elements.len() as u64);
        debug!(
            path = path.name(),
            kind = %kind,
            candidates = read,
            kept = elements.len(),
            "resolver.resolved"
        );
        Ok(elements)
    }
}

fn filter_all(
    candidates: ElementIter<'_>,
    constraints: &[Constraint],
) -> Result<(Vec<Element>, u64)> {
    let mut kept = Vec::new();
    let mut read = 0u64;
    for candidate in candidates {
        let element = candidate?;
        read += 1;
        if test_all(&element, constraints)? {
            kept.push(element);
        }
    }
    Ok((kept, read))
}
