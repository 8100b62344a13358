// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Allowed CORS origins (comma-separated, or "*" for all in development).
    pub cors_origins: Vec<String>,
    /// Root URL of the external model-collaboration service.
    pub catalog_base_url: String,
    /// Bearer token for the catalog service.
    pub catalog_api_token: Option<String>,
    /// Per-request timeout for catalog calls in seconds.
    pub catalog_timeout_secs: u64,
    /// Upstream page size used while scanning the catalog.
    pub catalog_fetch_page_size: u32,
    /// Upper bound on upstream pages fetched for one scan.
    pub catalog_max_fetch_pages: u32,
    /// JSON fixture served instead of the external catalog.
    pub catalog_fixture: Option<String>,
    /// PostgreSQL connection string for the model cache.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub database_max_connections: u32,
    /// Apply bundled migrations on startup.
    pub run_migrations: bool,
    /// Scope used when a request carries no `X-Project-Id` header.
    pub default_project_id: Option<String>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .unwrap_or(8080),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| {
                    // Default: allow common development origins
                    "http://localhost:3000,http://localhost:5173,http://127.0.0.1:3000,http://127.0.0.1:5173".into()
                })
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            catalog_base_url: std::env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| "https://api.catenda.com".into()),
            catalog_api_token: optional_var("CATALOG_API_TOKEN"),
            catalog_timeout_secs: std::env::var("CATALOG_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".into())
                .parse()
                .unwrap_or(15),
            catalog_fetch_page_size: std::env::var("CATALOG_FETCH_PAGE_SIZE")
                .unwrap_or_else(|_| "1000".into())
                .parse()
                .unwrap_or(1000),
            catalog_max_fetch_pages: std::env::var("CATALOG_MAX_FETCH_PAGES")
                .unwrap_or_else(|_| "100".into())
                .parse()
                .unwrap_or(100),
            catalog_fixture: optional_var("CATALOG_FIXTURE"),
            database_url: optional_var("DATABASE_URL"),
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .unwrap_or(5),
            run_migrations: std::env::var("RUN_MIGRATIONS")
                .map(|v| !matches!(v.trim(), "0" | "false" | "no"))
                .unwrap_or(true),
            default_project_id: optional_var("DEFAULT_PROJECT_ID"),
            log_format: match std::env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    /// Whether any origin may call the API.
    pub fn cors_allow_any(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Read a variable, treating blank values as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
