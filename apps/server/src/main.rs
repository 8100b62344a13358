// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Catalog Server - browse IFC objects hosted by an external
//! model-collaboration service.
//!
//! This server provides a REST API for selecting building-model objects to
//! reference from a case. It supports:
//!
//! - Object counts per IFC type for a project
//! - Type-filtered, searchable, stably paginated product listings
//! - Discipline ("fag") annotation from the local model cache
//!
//! The project is taken from the `X-Project-Id` header, falling back to
//! `DEFAULT_PROJECT_ID`.
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/catalog/types` - Type summary
//! - `GET /api/v1/catalog/products` - Product page (`ifc_type`, `search`, `page`, `page_size`)

use anyhow::Context;
use axum::{http::HeaderValue, http::Method, routing::get, Router};
use ifc_catalog_core::{
    Capabilities, CatalogEngine, CatalogSource, InMemoryModelCache, ModelCacheStore, StaticCatalog,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
mod error;
mod routes;
mod scope;
mod services;
mod types;

use config::{Config, LogFormat};
use services::{HttpCatalogClient, PgModelCache};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: CatalogEngine,
    pub config: Arc<Config>,
    /// Which model cache backs discipline resolution.
    pub model_cache_backend: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_format);

    tracing::info!(
        port = config.port,
        catalog_base_url = %config.catalog_base_url,
        catalog_fixture = ?config.catalog_fixture,
        database = config.database_url.is_some(),
        default_project = ?config.default_project_id,
        "Starting IFC-Lite Catalog Server"
    );

    let source = build_source(&config).await?;
    let (model_cache, model_cache_backend) = build_model_cache(&config).await?;

    let state = AppState {
        engine: CatalogEngine::new(source, model_cache),
        config: Arc::new(config.clone()),
        model_cache_backend,
    };

    let app = app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,tower_http=debug,ifc_catalog_server=debug,ifc_catalog_core=debug".into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

/// Fixture catalog when `CATALOG_FIXTURE` is set, else the REST client.
async fn build_source(config: &Config) -> anyhow::Result<Arc<dyn CatalogSource>> {
    if let Some(path) = &config.catalog_fixture {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read catalog fixture {path}"))?;
        let catalog = StaticCatalog::from_json(&json, Capabilities::FULL_SCAN)
            .with_context(|| format!("invalid catalog fixture {path}"))?;
        tracing::warn!(
            path = %path,
            projects = catalog.project_count(),
            "Serving catalog from fixture file"
        );
        return Ok(Arc::new(catalog));
    }

    let client = HttpCatalogClient::new(
        &config.catalog_base_url,
        config.catalog_api_token.clone(),
        Duration::from_secs(config.catalog_timeout_secs),
        config.catalog_fetch_page_size,
        config.catalog_max_fetch_pages,
    )
    .context("failed to create catalog client")?;
    Ok(Arc::new(client))
}

/// PostgreSQL when `DATABASE_URL` is set, else an empty in-memory cache.
async fn build_model_cache(
    config: &Config,
) -> anyhow::Result<(Arc<dyn ModelCacheStore>, &'static str)> {
    match &config.database_url {
        Some(url) => {
            let cache = PgModelCache::connect(
                url,
                config.database_max_connections,
                config.run_migrations,
            )
            .await
            .context("failed to connect model cache database")?;
            tracing::info!("Model cache backed by PostgreSQL");
            let cache: Arc<dyn ModelCacheStore> = Arc::new(cache);
            Ok((cache, "postgres"))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, every discipline resolves to Unknown");
            let cache: Arc<dyn ModelCacheStore> = Arc::new(InMemoryModelCache::new());
            Ok((cache, "memory"))
        }
    }
}

/// Build the router with all routes and middleware.
pub fn app(state: AppState, config: &Config) -> Router {
    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        // Health check
        .route("/api/v1/health", get(routes::health::check))
        // Catalog endpoints
        .route("/api/v1/catalog/types", get(routes::catalog::type_summary))
        .route("/api/v1/catalog/products", get(routes::catalog::query_products))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow_any() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers(Any)
}
