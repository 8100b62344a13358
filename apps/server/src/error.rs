// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and handling for the server.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ifc_catalog_core::CatalogError;
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Catalog service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Project scope could not be resolved")]
    UnresolvedScope,

    #[error("Invalid query string: {0}")]
    InvalidQuery(#[from] QueryRejection),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::UpstreamUnavailable(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE"),
            ApiError::InvalidFilter(_) => (StatusCode::BAD_REQUEST, "INVALID_FILTER"),
            ApiError::UnresolvedScope => (StatusCode::BAD_REQUEST, "UNRESOLVED_SCOPE"),
            ApiError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "INVALID_FILTER"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UpstreamUnavailable(msg) => ApiError::UpstreamUnavailable(msg),
            CatalogError::InvalidFilter(msg) => ApiError::InvalidFilter(msg),
            CatalogError::UnresolvedScope => ApiError::UnresolvedScope,
        }
    }
}
