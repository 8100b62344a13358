// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read access to the local model cache (revision -> model name, discipline).
//!
//! Rows are written by an external ingestion process; the engine only reads.

use crate::error::ModelCacheError;
use crate::types::ModelCacheEntry;
use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::sync::RwLock;

/// Keyed read access to model cache rows.
#[async_trait]
pub trait ModelCacheStore: Send + Sync {
    /// Fetch the rows for the given revision ids. Ids without a row are
    /// simply absent from the result.
    async fn lookup(&self, revision_ids: &[String]) -> Result<Vec<ModelCacheEntry>, ModelCacheError>;
}

/// Model cache held in process memory.
///
/// Safe to update while queries are reading from it.
#[derive(Debug, Default)]
pub struct InMemoryModelCache {
    entries: RwLock<FxHashMap<String, ModelCacheEntry>>,
}

impl InMemoryModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ModelCacheEntry>) -> Self {
        let cache = Self::new();
        for entry in entries {
            cache.upsert(entry);
        }
        cache
    }

    /// Insert or replace the row for `entry.revision_id`.
    pub fn upsert(&self, entry: ModelCacheEntry) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(entry.revision_id.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ModelCacheStore for InMemoryModelCache {
    async fn lookup(&self, revision_ids: &[String]) -> Result<Vec<ModelCacheEntry>, ModelCacheError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(revision_ids
            .iter()
            .filter_map(|id| entries.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(revision_id: &str, discipline: Option<&str>) -> ModelCacheEntry {
        ModelCacheEntry {
            revision_id: revision_id.to_string(),
            model_name: format!("{revision_id}.ifc"),
            discipline: discipline.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_lookup_skips_missing_rows() {
        let cache = InMemoryModelCache::from_entries([entry("r1", Some("architecture"))]);

        let rows = cache
            .lookup(&["r1".to_string(), "r2".to_string()])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].revision_id, "r1");
    }

    #[tokio::test]
    async fn test_upsert_replaces_row() {
        let cache = InMemoryModelCache::new();
        assert!(cache.is_empty());

        cache.upsert(entry("r1", None));
        cache.upsert(entry("r1", Some("structural")));

        assert_eq!(cache.len(), 1);
        let rows = cache.lookup(&["r1".to_string()]).await.unwrap();
        assert_eq!(rows[0].discipline.as_deref(), Some("structural"));
    }
}
