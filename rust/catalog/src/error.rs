// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for catalog queries.

use thiserror::Error;

/// Result type for catalog engine operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors surfaced by the catalog query engine.
///
/// Discipline lookup misses are never errors; they resolve to the
/// `"Unknown"` fallback instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The external catalog could not be reached or refused the request.
    #[error("Catalog service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Pagination or filter parameters are out of range.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// No project scope could be determined for the request.
    #[error("Project scope could not be resolved")]
    UnresolvedScope,
}

impl From<SourceError> for CatalogError {
    fn from(err: SourceError) -> Self {
        CatalogError::UpstreamUnavailable(err.message)
    }
}

/// Failure reported by a catalog source.
///
/// Authentication, network and decoding failures all collapse into this one
/// kind; `transient` marks the ones worth a single retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SourceError {
    pub message: String,
    pub transient: bool,
}

impl SourceError {
    /// A failure that may succeed on retry (timeout, connect error, 5xx).
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: true,
        }
    }

    /// A failure that will not go away by retrying (auth, 4xx, bad payload).
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: false,
        }
    }
}

/// Failure reading the local model cache.
#[derive(Error, Debug)]
#[error("Model cache error: {0}")]
pub struct ModelCacheError(pub String);
