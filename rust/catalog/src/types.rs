// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog data model: raw objects, filters and result pages.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Count of objects per IFC type within a project scope.
///
/// Keys are kept sorted so serialized output is deterministic.
pub type TypeSummary = BTreeMap<String, u64>;

/// Project boundary within which catalog queries are restricted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectScope(String);

impl ProjectScope {
    /// Returns `None` for blank identifiers.
    pub fn new(id: impl AsRef<str>) -> Option<Self> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object as delivered by the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfcObject {
    /// Catalog-wide unique id, also the pagination sort key.
    pub object_id: i64,
    /// IFC GUID.
    pub global_id: String,
    #[serde(default)]
    pub name: String,
    /// IFC type name (e.g., "IfcWall").
    pub ifc_type: String,
    /// Model snapshot the object belongs to. Upstream sends either a string
    /// or an integer.
    #[serde(deserialize_with = "string_or_integer")]
    pub model_revision_id: String,
}

impl IfcObject {
    /// Case-insensitive containment on `name`, exact or containment on `global_id`.
    ///
    /// `needle` must already be trimmed and lower-cased.
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        if self.name.to_lowercase().contains(needle) {
            return true;
        }
        self.global_id == needle
            || self.global_id.contains(needle)
            || self.global_id.to_lowercase().contains(needle)
    }
}

/// Accepts `"r-12"` as well as `12` and stores both as strings.
pub fn string_or_integer<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}

/// Row of the local model cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCacheEntry {
    pub revision_id: String,
    pub model_name: String,
    /// Empty or missing means the model was never mapped to a discipline.
    #[serde(default)]
    pub discipline: Option<String>,
}

/// Object annotated with its model name and discipline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub object_id: i64,
    pub global_id: String,
    pub name: String,
    pub ifc_type: String,
    pub model_name: String,
    /// Discipline label ("fag"), `"Unknown"` when unresolved.
    pub fag: String,
}

/// One page of filtered catalog results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    /// Number of matches before pagination.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Filter and pagination parameters for product queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact IFC type match.
    pub ifc_type: Option<String>,
    /// Free-text search on name or GUID.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            ifc_type: None,
            search: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductFilter {
    /// Build a filter from optional request parameters, applying defaults.
    ///
    /// Blank `ifc_type` and `search` values are treated as absent.
    pub fn new(
        ifc_type: Option<String>,
        search: Option<String>,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Self {
        Self {
            ifc_type: non_blank(ifc_type),
            search: non_blank(search),
            page: page.unwrap_or(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Reject out-of-range pagination instead of clamping it.
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(CatalogError::InvalidFilter(format!(
                "page must be >= 1, got {}",
                self.page
            )));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(CatalogError::InvalidFilter(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        Ok(())
    }

    /// Number of matches preceding the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Lower-cased search needle, if any.
    pub fn search_needle(&self) -> Option<String> {
        self.search.as_deref().map(|s| s.trim().to_lowercase())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(id: i64, name: &str, guid: &str) -> IfcObject {
        IfcObject {
            object_id: id,
            global_id: guid.to_string(),
            name: name.to_string(),
            ifc_type: "IfcWall".to_string(),
            model_revision_id: "rev-1".to_string(),
        }
    }

    #[test]
    fn test_scope_rejects_blank() {
        assert!(ProjectScope::new("   ").is_none());
        assert_eq!(ProjectScope::new(" p-1 ").unwrap().as_str(), "p-1");
    }

    #[test]
    fn test_revision_id_accepts_string_or_integer() {
        let from_int: IfcObject = serde_json::from_str(
            r#"{"object_id":1,"global_id":"g","name":"n","ifc_type":"IfcWall","model_revision_id":42}"#,
        )
        .unwrap();
        assert_eq!(from_int.model_revision_id, "42");

        let from_str: IfcObject = serde_json::from_str(
            r#"{"object_id":1,"global_id":"g","ifc_type":"IfcWall","model_revision_id":"r-7"}"#,
        )
        .unwrap();
        assert_eq!(from_str.model_revision_id, "r-7");
        assert_eq!(from_str.name, "");
    }

    #[test]
    fn test_search_is_case_insensitive_on_name() {
        let obj = wall(1, "Basic Wall: Exterior 300mm", "2O2Fr$t4X7Zf8NOew3FLOH");
        assert!(obj.matches_search("exterior"));
        assert!(obj.matches_search("basic wall"));
        assert!(!obj.matches_search("interior"));
    }

    #[test]
    fn test_search_matches_global_id() {
        let obj = wall(1, "Wall", "2O2Fr$t4X7Zf8NOew3FLOH");
        assert!(obj.matches_search("2O2Fr$t4X7Zf8NOew3FLOH"));
        assert!(obj.matches_search(&"2O2Fr$t4".to_lowercase()));
        assert!(!obj.matches_search("zzz"));
    }

    #[test]
    fn test_filter_defaults_and_blank_values() {
        let filter = ProductFilter::new(Some("  ".into()), Some(" Door ".into()), None, None);
        assert_eq!(filter.ifc_type, None);
        assert_eq!(filter.search.as_deref(), Some("Door"));
        assert_eq!(filter.search_needle().as_deref(), Some("door"));
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_filter_validation() {
        assert!(ProductFilter::default().validate().is_ok());

        let too_large = ProductFilter::new(None, None, None, Some(1000));
        assert!(matches!(
            too_large.validate(),
            Err(CatalogError::InvalidFilter(_))
        ));

        let zero_page = ProductFilter::new(None, None, Some(0), None);
        assert!(matches!(
            zero_page.validate(),
            Err(CatalogError::InvalidFilter(_))
        ));

        let zero_size = ProductFilter::new(None, None, None, Some(0));
        assert!(zero_size.validate().is_err());

        let max = ProductFilter::new(None, None, None, Some(MAX_PAGE_SIZE));
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_offset() {
        let filter = ProductFilter::new(None, None, Some(3), Some(20));
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn test_item_serializes_fag_field() {
        let item = CatalogItem {
            object_id: 7,
            global_id: "g".into(),
            name: "Wall".into(),
            ifc_type: "IfcWall".into(),
            model_name: "ARK".into(),
            fag: "architecture".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["fag"], "architecture");
        assert_eq!(json["model_name"], "ARK");
    }
}
