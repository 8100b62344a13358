// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use ifc_catalog_core::TypeSummary;
use serde::{Deserialize, Serialize};

/// Object counts per IFC type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSummaryResponse {
    pub types: TypeSummary,
}
