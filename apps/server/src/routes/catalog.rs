// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog endpoints: type summary and product listing.

use crate::error::ApiError;
use crate::scope::resolve_scope;
use crate::types::{ProductQueryParams, TypeSummaryResponse};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use ifc_catalog_core::{CatalogPage, ProductFilter};

/// GET /api/v1/catalog/types - Object counts per IFC type.
///
/// A request without a resolvable project gets an empty summary.
pub async fn type_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TypeSummaryResponse>, ApiError> {
    let Some(scope) = resolve_scope(&headers, state.config.default_project_id.as_deref()) else {
        tracing::debug!("No project scope, returning empty type summary");
        return Ok(Json(TypeSummaryResponse::default()));
    };

    let types = state.engine.type_summary(&scope).await?;
    Ok(Json(TypeSummaryResponse { types }))
}

/// GET /api/v1/catalog/products - Filtered, paginated products.
pub async fn query_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ProductQueryParams>, QueryRejection>,
) -> Result<Json<CatalogPage>, ApiError> {
    let Query(params) = params?;
    let scope = resolve_scope(&headers, state.config.default_project_id.as_deref())
        .ok_or(ApiError::UnresolvedScope)?;

    let filter = ProductFilter::from(params);
    let page = state.engine.query_products(&scope, &filter).await?;
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::scope::PROJECT_HEADER;
    use crate::{app, AppState};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use ifc_catalog_core::{
        Capabilities, CatalogEngine, IfcObject, InMemoryModelCache, ModelCacheEntry, StaticCatalog,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router() -> Router {
        let walls = (1..=577).map(|i| IfcObject {
            object_id: 1000 - i,
            global_id: format!("0Wall{i:04}"),
            name: format!("Basic Wall {i}"),
            ifc_type: "IfcWall".into(),
            model_revision_id: if i % 2 == 0 { "r-ark".into() } else { "r-unmapped".into() },
        });
        let source = StaticCatalog::new(Capabilities::FULL_SCAN).with_objects("p1", walls);
        let cache = InMemoryModelCache::from_entries([ModelCacheEntry {
            revision_id: "r-ark".into(),
            model_name: "ARK".into(),
            discipline: Some("architecture".into()),
        }]);

        let mut config = Config::from_env();
        config.default_project_id = None;
        let config = Arc::new(config);

        let state = AppState {
            engine: CatalogEngine::new(Arc::new(source), Arc::new(cache)),
            config: config.clone(),
            model_cache_backend: "memory",
        };
        app(state, &config)
    }

    async fn get(uri: &str, project: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(project) = project {
            request = request.header(PROJECT_HEADER, project);
        }
        let response = router()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_type_summary() {
        let (status, body) = get("/api/v1/catalog/types", Some("p1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"types": {"IfcWall": 577}}));
    }

    #[tokio::test]
    async fn test_type_summary_without_scope_is_empty() {
        let (status, body) = get("/api/v1/catalog/types", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"types": {}}));
    }

    #[tokio::test]
    async fn test_products_first_page() {
        let (status, body) =
            get("/api/v1/catalog/products?ifc_type=IfcWall&page=1&page_size=20", Some("p1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 577);
        assert_eq!(body["page"], 1);
        assert_eq!(body["page_size"], 20);

        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 20);
        // Lowest object id first: i = 577 -> 423, unmapped revision
        assert_eq!(items[0]["object_id"], 423);
        assert_eq!(items[0]["fag"], "Unknown");
        assert_eq!(items[1]["fag"], "architecture");
        assert_eq!(items[1]["model_name"], "ARK");
    }

    #[tokio::test]
    async fn test_products_defaults() {
        let (status, body) = get("/api/v1/catalog/products", Some("p1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["page_size"], 20);
        assert_eq!(body["items"].as_array().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_products_past_last_page() {
        let (status, body) = get("/api/v1/catalog/products?page=30&page_size=20", Some("p1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"], serde_json::json!([]));
        assert_eq!(body["total"], 577);
    }

    #[tokio::test]
    async fn test_products_search() {
        let (_, body) = get("/api/v1/catalog/products?search=basic%20wall%2057", Some("p1")).await;
        // 57 and 570..577
        assert_eq!(body["total"], 9);
    }

    #[tokio::test]
    async fn test_products_page_size_too_large() {
        let (status, body) = get("/api/v1/catalog/products?page_size=1000", Some("p1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTER");
    }

    #[tokio::test]
    async fn test_products_malformed_page() {
        let (status, body) = get("/api/v1/catalog/products?page=abc", Some("p1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTER");
    }

    #[tokio::test]
    async fn test_products_without_scope() {
        let (status, body) = get("/api/v1/catalog/products", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNRESOLVED_SCOPE");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model_cache"], "memory");
    }
}
