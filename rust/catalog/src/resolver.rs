// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discipline ("fag") resolution from model revision ids.

use crate::model_cache::ModelCacheStore;
use crate::types::ModelCacheEntry;
use rustc_hash::{FxHashMap, FxHashSet};

/// Label used when a revision has no cache row or no discipline.
pub const UNKNOWN_DISCIPLINE: &str = "Unknown";

/// Lookup table from revision id to model cache row.
///
/// Loaded once per result page so each item resolves in O(1).
#[derive(Debug, Default, Clone)]
pub struct DisciplineResolver {
    entries: FxHashMap<String, ModelCacheEntry>,
}

impl DisciplineResolver {
    pub fn new(entries: impl IntoIterator<Item = ModelCacheEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.revision_id.clone(), entry))
                .collect(),
        }
    }

    /// Load the rows for the given revisions with a single store lookup.
    ///
    /// A store failure is logged and yields an empty resolver: every item
    /// then resolves to [`UNKNOWN_DISCIPLINE`] and the query still succeeds.
    pub async fn load<'a, S, I>(store: &S, revision_ids: I) -> Self
    where
        S: ModelCacheStore + ?Sized,
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = FxHashSet::default();
        let ids: Vec<String> = revision_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect();

        if ids.is_empty() {
            return Self::default();
        }

        match store.lookup(&ids).await {
            Ok(rows) => {
                tracing::debug!(
                    requested = ids.len(),
                    found = rows.len(),
                    "Loaded model cache rows"
                );
                Self::new(rows)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    revisions = ids.len(),
                    "Model cache lookup failed, disciplines fall back to Unknown"
                );
                Self::default()
            }
        }
    }

    /// Discipline for a revision, or `"Unknown"`.
    pub fn resolve(&self, model_revision_id: &str) -> &str {
        self.entries
            .get(model_revision_id)
            .and_then(|entry| entry.discipline.as_deref())
            .map(str::trim)
            .filter(|discipline| !discipline.is_empty())
            .unwrap_or(UNKNOWN_DISCIPLINE)
    }

    /// Model name for a revision, or `""` when it has no cache row.
    pub fn model_name(&self, model_revision_id: &str) -> &str {
        self.entries
            .get(model_revision_id)
            .map(|entry| entry.model_name.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
