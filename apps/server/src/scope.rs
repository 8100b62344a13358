// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project scope resolution for incoming requests.

use axum::http::HeaderMap;
use ifc_catalog_core::ProjectScope;

/// Header carrying the caller's project id.
pub const PROJECT_HEADER: &str = "x-project-id";

/// Scope from the `X-Project-Id` header, else the configured default.
pub fn resolve_scope(headers: &HeaderMap, default_project_id: Option<&str>) -> Option<ProjectScope> {
    headers
        .get(PROJECT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(ProjectScope::new)
        .or_else(|| default_project_id.and_then(ProjectScope::new))
}
