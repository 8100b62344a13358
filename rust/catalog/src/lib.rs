// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Lite Catalog Core
//!
//! Query engine for IFC object catalogs hosted by an external
//! model-collaboration service.
//!
//! ## Overview
//!
//! - **Type summaries**: object counts per IFC type within a project
//! - **Product queries**: exact type filter, case-insensitive search on name
//!   or GUID, stable pagination ordered by `object_id`
//! - **Discipline resolution**: each object's model revision is looked up in
//!   a local model cache to attach a model name and discipline ("fag"),
//!   falling back to `"Unknown"`
//!
//! Sources declare what they can filter or paginate themselves through
//! [`Capabilities`]; the engine does the remainder client-side so results do
//! not depend on the source.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_catalog_core::{CatalogEngine, Capabilities, InMemoryModelCache, ProductFilter, ProjectScope, StaticCatalog};
//! use std::sync::Arc;
//!
//! let source = StaticCatalog::new(Capabilities::FULL_SCAN).with_objects("p1", objects);
//! let engine = CatalogEngine::new(Arc::new(source), Arc::new(InMemoryModelCache::new()));
//!
//! let scope = ProjectScope::new("p1").unwrap();
//! let filter = ProductFilter::new(Some("IfcWall".into()), None, Some(1), Some(20));
//! let page = engine.query_products(&scope, &filter).await?;
//! println!("{} of {} walls", page.items.len(), page.total);
//! ```

pub mod engine;
pub mod error;
pub mod model_cache;
pub mod resolver;
pub mod source;
pub mod types;

pub use engine::CatalogEngine;
pub use error::{CatalogError, ModelCacheError, Result, SourceError};
pub use model_cache::{InMemoryModelCache, ModelCacheStore};
pub use resolver::{DisciplineResolver, UNKNOWN_DISCIPLINE};
pub use source::{Capabilities, CatalogSource, SourcePage, SourceQuery, StaticCatalog};
pub use types::{
    string_or_integer, CatalogItem, CatalogPage, IfcObject, ModelCacheEntry, ProductFilter,
    ProjectScope, TypeSummary, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
