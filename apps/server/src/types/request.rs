// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use ifc_catalog_core::ProductFilter;
use serde::Deserialize;

/// Query parameters for product listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQueryParams {
    /// Exact IFC type filter.
    #[serde(default)]
    pub ifc_type: Option<String>,

    /// Case-insensitive search on name or GlobalId.
    #[serde(default)]
    pub search: Option<String>,

    /// 1-based page number (default 1).
    #[serde(default)]
    pub page: Option<u32>,

    /// Page size (default 20, max 100).
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl From<ProductQueryParams> for ProductFilter {
    fn from(params: ProductQueryParams) -> Self {
        ProductFilter::new(params.ifc_type, params.search, params.page, params.page_size)
    }
}
