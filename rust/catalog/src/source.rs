// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog sources: the seam between the engine and the external catalog.
//!
//! A source declares which filters it can apply itself through
//! [`Capabilities`]. The engine pushes down only what is declared and does
//! the rest client-side, so a full-scan source and a source with native
//! filtering produce the same pages.

use crate::error::SourceError;
use crate::types::{IfcObject, ProjectScope, TypeSummary};
use async_trait::async_trait;
use rustc_hash::FxHashMap;

/// What a source can do on its own side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Applies `SourceQuery::ifc_type` as an exact match.
    pub type_filter: bool,
    /// Applies `SourceQuery::search` with the engine's matching rules.
    pub search: bool,
    /// Honors `offset`/`limit`, returns objects ordered by `object_id`
    /// ascending and reports the unpaginated total.
    pub pagination: bool,
    /// Serves per-type counts without returning objects.
    pub type_summary: bool,
}

impl Capabilities {
    /// A source that can only list every object in scope.
    pub const FULL_SCAN: Capabilities = Capabilities {
        type_filter: false,
        search: false,
        pagination: false,
        type_summary: false,
    };

    /// A source that filters, searches, paginates and aggregates natively.
    pub const FULL_PUSHDOWN: Capabilities = Capabilities {
        type_filter: true,
        search: true,
        pagination: true,
        type_summary: true,
    };
}

/// Query sent to a source. Fields are only set when the matching
/// capability is declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceQuery {
    pub ifc_type: Option<String>,
    /// Trimmed, lower-cased needle.
    pub search: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Objects returned by a source.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    pub objects: Vec<IfcObject>,
    /// Unpaginated match count, reported by paginating sources.
    pub total: Option<u64>,
}

/// Access to an external object catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    /// Per-type counts. Only called when `capabilities().type_summary`.
    async fn object_types(&self, scope: &ProjectScope) -> Result<TypeSummary, SourceError>;

    async fn query_objects(
        &self,
        scope: &ProjectScope,
        query: &SourceQuery,
    ) -> Result<SourcePage, SourceError>;
}

/// In-memory catalog keyed by project scope.
///
/// Returns objects in insertion order unless it declares pagination, and
/// applies exactly the pushdowns its capabilities advertise.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    projects: FxHashMap<String, Vec<IfcObject>>,
    capabilities: Capabilities,
}

impl StaticCatalog {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            projects: FxHashMap::default(),
            capabilities,
        }
    }

    /// Load a fixture of the form `{ "<scope>": [ { ...object... } ] }`.
    pub fn from_json(json: &str, capabilities: Capabilities) -> serde_json::Result<Self> {
        let projects: FxHashMap<String, Vec<IfcObject>> = serde_json::from_str(json)?;
        Ok(Self {
            projects,
            capabilities,
        })
    }

    pub fn with_objects(
        mut self,
        scope: &str,
        objects: impl IntoIterator<Item = IfcObject>,
    ) -> Self {
        self.projects
            .entry(scope.to_string())
            .or_default()
            .extend(objects);
        self
    }

    /// Number of project scopes held.
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    fn objects(&self, scope: &ProjectScope) -> &[IfcObject] {
        self.projects
            .get(scope.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn object_types(&self, scope: &ProjectScope) -> Result<TypeSummary, SourceError> {
        let mut summary = TypeSummary::new();
        for obj in self.objects(scope) {
            *summary.entry(obj.ifc_type.clone()).or_insert(0) += 1;
        }
        Ok(summary)
    }

    async fn query_objects(
        &self,
        scope: &ProjectScope,
        query: &SourceQuery,
    ) -> Result<SourcePage, SourceError> {
        let caps = self.capabilities;
        let mut objects: Vec<IfcObject> = self
            .objects(scope)
            .iter()
            .filter(|obj| match (&query.ifc_type, caps.type_filter) {
                (Some(ifc_type), true) => &obj.ifc_type == ifc_type,
                _ => true,
            })
            .filter(|obj| match (&query.search, caps.search) {
                (Some(needle), true) => obj.matches_search(needle),
                _ => true,
            })
            .cloned()
            .collect();

        if !caps.pagination {
            return Ok(SourcePage {
                objects,
                total: None,
            });
        }

        objects.sort_by_key(|obj| obj.object_id);
        let total = objects.len() as u64;
        let offset = usize::try_from(query.offset.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        let objects = objects.into_iter().skip(offset).take(limit).collect();

        Ok(SourcePage {
            objects,
            total: Some(total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(id: i64, ifc_type: &str) -> IfcObject {
        IfcObject {
            object_id: id,
            global_id: format!("guid-{id}"),
            name: format!("Element {id}"),
            ifc_type: ifc_type.to_string(),
            model_revision_id: "rev".to_string(),
        }
    }

    fn scope() -> ProjectScope {
        ProjectScope::new("p1").unwrap()
    }

    #[tokio::test]
    async fn test_full_scan_ignores_pushdowns() {
        let catalog = StaticCatalog::new(Capabilities::FULL_SCAN)
            .with_objects("p1", [object(3, "IfcWall"), object(1, "IfcDoor")]);

        let query = SourceQuery {
            ifc_type: Some("IfcWall".into()),
            offset: Some(1),
            limit: Some(1),
            ..Default::default()
        };
        let page = catalog.query_objects(&scope(), &query).await.unwrap();

        assert_eq!(page.objects.len(), 2);
        assert_eq!(page.objects[0].object_id, 3);
        assert_eq!(page.total, None);
    }

    #[tokio::test]
    async fn test_pushdown_filters_and_paginates() {
        let catalog = StaticCatalog::new(Capabilities::FULL_PUSHDOWN).with_objects(
            "p1",
            [
                object(5, "IfcWall"),
                object(2, "IfcWall"),
                object(9, "IfcDoor"),
                object(1, "IfcWall"),
            ],
        );

        let query = SourceQuery {
            ifc_type: Some("IfcWall".into()),
            offset: Some(1),
            limit: Some(1),
            ..Default::default()
        };
        let page = catalog.query_objects(&scope(), &query).await.unwrap();

        assert_eq!(page.total, Some(3));
        assert_eq!(page.objects.len(), 1);
        assert_eq!(page.objects[0].object_id, 2);
    }

    #[tokio::test]
    async fn test_unknown_scope_is_empty() {
        let catalog = StaticCatalog::new(Capabilities::FULL_SCAN).with_objects("p1", [object(1, "IfcWall")]);
        let other = ProjectScope::new("p2").unwrap();

        let page = catalog
            .query_objects(&other, &SourceQuery::default())
            .await
            .unwrap();
        assert!(page.objects.is_empty());
        assert!(catalog.object_types(&other).await.unwrap().is_empty());
    }

    #[test]
    fn test_from_json_fixture() {
        let json = r#"{
            "p1": [
                {"object_id": 1, "global_id": "a", "name": "Wall", "ifc_type": "IfcWall", "model_revision_id": 10},
                {"object_id": 2, "global_id": "b", "name": "Door", "ifc_type": "IfcDoor", "model_revision_id": "r-11"}
            ],
            "p2": []
        }"#;
        let catalog = StaticCatalog::from_json(json, Capabilities::FULL_SCAN).unwrap();
        assert_eq!(catalog.project_count(), 2);
        assert_eq!(catalog.objects(&scope())[0].model_revision_id, "10");
    }
}
