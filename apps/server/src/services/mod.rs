// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog source and model cache implementations backing the engine.

pub mod catalog_client;
pub mod model_cache;

pub use catalog_client::HttpCatalogClient;
pub use model_cache::PgModelCache;
