// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog query engine.
//!
//! Turns a catalog source into type summaries and stable, discipline
//! annotated result pages. Pages are always ordered by `object_id`, whatever
//! order the source returns objects in.

use crate::error::{CatalogError, Result, SourceError};
use crate::model_cache::ModelCacheStore;
use crate::resolver::DisciplineResolver;
use crate::source::{CatalogSource, SourceQuery};
use crate::types::{CatalogItem, CatalogPage, IfcObject, ProductFilter, ProjectScope, TypeSummary};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Query engine over a catalog source and the local model cache.
#[derive(Clone)]
pub struct CatalogEngine {
    source: Arc<dyn CatalogSource>,
    model_cache: Arc<dyn ModelCacheStore>,
}

impl CatalogEngine {
    pub fn new(source: Arc<dyn CatalogSource>, model_cache: Arc<dyn ModelCacheStore>) -> Self {
        Self {
            source,
            model_cache,
        }
    }

    /// Count objects per IFC type in `scope`. Types with no objects are omitted.
    pub async fn type_summary(&self, scope: &ProjectScope) -> Result<TypeSummary> {
        let start = Instant::now();

        let mut summary = if self.source.capabilities().type_summary {
            self.with_retry("object_types", || self.source.object_types(scope))
                .await?
        } else {
            let all = SourceQuery::default();
            let page = self
                .with_retry("query_objects", || self.source.query_objects(scope, &all))
                .await?;
            count_by_type(&page.objects)
        };
        summary.retain(|_, count| *count > 0);

        tracing::info!(
            scope = %scope,
            types = summary.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Type summary computed"
        );

        Ok(summary)
    }

    /// Filter, order and paginate the catalog, annotating each item with its
    /// model name and discipline.
    ///
    /// Either returns a complete page or an error; `total` always counts every
    /// match regardless of the requested page.
    pub async fn query_products(
        &self,
        scope: &ProjectScope,
        filter: &ProductFilter,
    ) -> Result<CatalogPage> {
        filter.validate()?;
        let start = Instant::now();

        let caps = self.source.capabilities();
        let needle = filter.search_needle();
        let type_pushed = filter.ifc_type.is_none() || caps.type_filter;
        let search_pushed = needle.is_none() || caps.search;

        let (objects, total) = if caps.pagination && type_pushed && search_pushed {
            tracing::debug!(scope = %scope, "Paginating at source");
            self.fetch_page(scope, filter, needle).await?
        } else {
            tracing::debug!(
                scope = %scope,
                type_pushed,
                search_pushed,
                "Fetching all matches for client-side pagination"
            );
            self.fetch_all_matching(scope, filter, needle).await?
        };

        let resolver = DisciplineResolver::load(
            self.model_cache.as_ref(),
            objects.iter().map(|obj| obj.model_revision_id.as_str()),
        )
        .await;

        let items: Vec<CatalogItem> = objects
            .into_iter()
            .map(|obj| annotate(obj, &resolver))
            .collect();

        tracing::info!(
            scope = %scope,
            ifc_type = ?filter.ifc_type,
            search = ?filter.search,
            page = filter.page,
            page_size = filter.page_size,
            total,
            returned = items.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Product query served"
        );

        Ok(CatalogPage {
            items,
            total,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    /// One source call for exactly the requested page.
    async fn fetch_page(
        &self,
        scope: &ProjectScope,
        filter: &ProductFilter,
        needle: Option<String>,
    ) -> Result<(Vec<IfcObject>, u64)> {
        let query = SourceQuery {
            ifc_type: filter.ifc_type.clone(),
            search: needle,
            offset: Some(filter.offset()),
            limit: Some(u64::from(filter.page_size)),
        };

        let page = self
            .with_retry("query_objects", || self.source.query_objects(scope, &query))
            .await?;

        let total = page.total.ok_or_else(|| {
            CatalogError::UpstreamUnavailable(
                "paginating catalog source did not report a total".into(),
            )
        })?;

        let mut objects = page.objects;
        sort_stable(&mut objects);
        objects.truncate(filter.page_size as usize);

        Ok((objects, total))
    }

    /// Fetch every candidate, finish filtering locally, then order and slice.
    async fn fetch_all_matching(
        &self,
        scope: &ProjectScope,
        filter: &ProductFilter,
        needle: Option<String>,
    ) -> Result<(Vec<IfcObject>, u64)> {
        let caps = self.source.capabilities();
        let query = SourceQuery {
            ifc_type: filter.ifc_type.clone().filter(|_| caps.type_filter),
            search: needle.clone().filter(|_| caps.search),
            offset: None,
            limit: None,
        };

        let page = self
            .with_retry("query_objects", || self.source.query_objects(scope, &query))
            .await?;

        let mut matches: Vec<IfcObject> = page
            .objects
            .into_iter()
            .filter(|obj| {
                filter
                    .ifc_type
                    .as_ref()
                    .map_or(true, |ifc_type| &obj.ifc_type == ifc_type)
            })
            .filter(|obj| needle.as_deref().map_or(true, |n| obj.matches_search(n)))
            .collect();

        let total = matches.len() as u64;
        sort_stable(&mut matches);

        let objects = matches
            .into_iter()
            .skip(usize::try_from(filter.offset()).unwrap_or(usize::MAX))
            .take(filter.page_size as usize)
            .collect();

        Ok((objects, total))
    }

    /// Run a source call, retrying once if the first failure is transient.
    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, SourceError>>,
    {
        match call().await {
            Ok(value) => Ok(value),
            Err(e) if e.transient => {
                tracing::warn!(operation, error = %e, "Transient catalog failure, retrying once");
                call().await.map_err(|e| {
                    tracing::error!(operation, error = %e, "Catalog retry failed");
                    CatalogError::from(e)
                })
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "Catalog request failed");
                Err(e.into())
            }
        }
    }
}

fn count_by_type(objects: &[IfcObject]) -> TypeSummary {
    let mut summary = TypeSummary::new();
    for obj in objects {
        *summary.entry(obj.ifc_type.clone()).or_insert(0) += 1;
    }
    summary
}

fn sort_stable(objects: &mut [IfcObject]) {
    objects.sort_by(|a, b| {
        a.object_id
            .cmp(&b.object_id)
            .then_with(|| a.global_id.cmp(&b.global_id))
    });
}

fn annotate(obj: IfcObject, resolver: &DisciplineResolver) -> CatalogItem {
    let fag = resolver.resolve(&obj.model_revision_id).to_string();
    let model_name = resolver.model_name(&obj.model_revision_id).to_string();
    CatalogItem {
        object_id: obj.object_id,
        global_id: obj.global_id,
        name: obj.name,
        ifc_type: obj.ifc_type,
        model_name,
        fag,
    }
}
