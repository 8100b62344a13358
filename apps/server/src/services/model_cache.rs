// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PostgreSQL-backed model cache.

use async_trait::async_trait;
use ifc_catalog_core::{ModelCacheEntry, ModelCacheError, ModelCacheStore};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Read-only view of `catalog.model_cache`.
#[derive(Debug, Clone)]
pub struct PgModelCache {
    pool: PgPool,
}

impl PgModelCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool and optionally apply the bundled migrations.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        run_migrations: bool,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        if run_migrations {
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Model cache migrations applied");
        }

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ModelCacheStore for PgModelCache {
    async fn lookup(&self, revision_ids: &[String]) -> Result<Vec<ModelCacheEntry>, ModelCacheError> {
        let rows = sqlx::query_as::<_, (String, String, Option<String>)>(
            r#"
            SELECT revision_id, model_name, discipline
            FROM catalog.model_cache
            WHERE revision_id = ANY($1)
            "#,
        )
        .bind(revision_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ModelCacheError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(revision_id, model_name, discipline)| ModelCacheEntry {
                revision_id,
                model_name,
                discipline,
            })
            .collect())
    }
}
