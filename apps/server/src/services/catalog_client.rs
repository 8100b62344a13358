// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! REST client for the external model-collaboration service's IFC product catalog.

use async_trait::async_trait;
use ifc_catalog_core::{
    string_or_integer, Capabilities, CatalogSource, IfcObject, ProjectScope, SourceError,
    SourcePage, SourceQuery, TypeSummary,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Catalog client for the collaboration service REST API.
///
/// The service filters by IFC type and serves type counts, but has no
/// search and no stable ordering, so product listings are full scans over
/// its page-numbered endpoint.
pub struct HttpCatalogClient {
    base_url: Url,
    api_token: Option<String>,
    fetch_page_size: u32,
    max_fetch_pages: u32,
    http: reqwest::Client,
}

/// Product as returned by the service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductResponse {
    #[serde(alias = "id")]
    object_id: i64,
    global_id: String,
    #[serde(default)]
    name: Option<String>,
    ifc_type: String,
    #[serde(deserialize_with = "string_or_integer", alias = "revision")]
    revision_id: String,
}

impl From<ProductResponse> for IfcObject {
    fn from(product: ProductResponse) -> Self {
        IfcObject {
            object_id: product.object_id,
            global_id: product.global_id,
            name: product.name.unwrap_or_default(),
            ifc_type: product.ifc_type,
            model_revision_id: product.revision_id,
        }
    }
}

impl HttpCatalogClient {
    /// Create a new catalog client.
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
        fetch_page_size: u32,
        max_fetch_pages: u32,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("catalog base URL cannot carry a path: {base_url}");
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            base_url,
            api_token,
            fetch_page_size: fetch_page_size.max(1),
            max_fetch_pages: max_fetch_pages.max(1),
            http,
        })
    }

    /// `{base}/v2/projects/{scope}/ifc/products[/{suffix}]`
    fn products_url(&self, scope: &ProjectScope, suffix: Option<&str>) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SourceError::permanent("catalog base URL cannot carry a path"))?;
            segments
                .pop_if_empty()
                .extend(["v2", "projects", scope.as_str(), "ifc", "products"]);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    /// Build request headers.
    fn headers(&self) -> Result<HeaderMap, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.api_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| SourceError::permanent(format!("Invalid token header: {e}")))?,
            );
        }
        Ok(headers)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let resp = self
            .http
            .get(url.clone())
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = format!("Catalog request {} returned {}: {}", url.path(), status, body);
            return Err(if is_transient_status(status) {
                SourceError::transient(message)
            } else {
                SourceError::permanent(message)
            });
        }

        resp.json().await.map_err(|e| request_error(&url, e))
    }

    /// Walk the page-numbered listing until a short page comes back.
    ///
    /// A catalog that exactly fills the page cap is confirmed by one extra
    /// request; only a non-empty page past the cap is an error.
    async fn scan_products(
        &self,
        scope: &ProjectScope,
        ifc_type: Option<&str>,
    ) -> Result<Vec<IfcObject>, SourceError> {
        let url = self.products_url(scope, None)?;
        let mut objects = Vec::new();

        for page in 1..=self.max_fetch_pages {
            let batch = self.fetch_products_page(&url, page, ifc_type).await?;
            let batch_len = batch.len();
            objects.extend(batch.into_iter().map(IfcObject::from));

            tracing::debug!(
                scope = %scope,
                page,
                batch = batch_len,
                fetched = objects.len(),
                "Fetched catalog page"
            );

            if batch_len < self.fetch_page_size as usize {
                return Ok(objects);
            }
        }

        let overflow = self
            .fetch_products_page(&url, self.max_fetch_pages.saturating_add(1), ifc_type)
            .await?;
        if overflow.is_empty() {
            return Ok(objects);
        }

        Err(SourceError::permanent(format!(
            "Catalog scan for project {} exceeded {} pages of {}",
            scope, self.max_fetch_pages, self.fetch_page_size
        )))
    }

    async fn fetch_products_page(
        &self,
        url: &Url,
        page: u32,
        ifc_type: Option<&str>,
    ) -> Result<Vec<ProductResponse>, SourceError> {
        let mut query = vec![
            ("page", page.to_string()),
            ("pageSize", self.fetch_page_size.to_string()),
        ];
        if let Some(ifc_type) = ifc_type {
            query.push(("ifcType", ifc_type.to_string()));
        }

        self.get_json(url.clone(), &query).await
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            type_filter: true,
            type_summary: true,
            ..Capabilities::FULL_SCAN
        }
    }

    async fn object_types(&self, scope: &ProjectScope) -> Result<TypeSummary, SourceError> {
        let url = self.products_url(scope, Some("ifctypes"))?;
        self.get_json(url, &[]).await
    }

    async fn query_objects(
        &self,
        scope: &ProjectScope,
        query: &SourceQuery,
    ) -> Result<SourcePage, SourceError> {
        let objects = self.scan_products(scope, query.ifc_type.as_deref()).await?;
        Ok(SourcePage {
            objects,
            total: None,
        })
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn request_error(url: &Url, err: reqwest::Error) -> SourceError {
    let message = format!("Catalog request {} failed: {}", url.path(), err);
    if err.is_timeout() || err.is_connect() || err.is_request() {
        SourceError::transient(message)
    } else {
        SourceError::permanent(message)
    }
}
