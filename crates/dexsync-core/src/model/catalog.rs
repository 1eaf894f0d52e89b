// ── Catalog entries ──

use serde::{Deserialize, Serialize};

/// One entry discovered while paging the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItemSummary {
    pub id: u32,
    pub name: String,
    pub source_url: String,
}

/// Full record for a single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItemDetail {
    pub id: u32,
    pub name: String,
    /// Type names in slot order.
    pub types: Vec<String>,
    /// Ability names in slot order.
    pub abilities: Vec<String>,
    pub primary_image_url: Option<String>,
}

/// Forward paging position of the collection cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionCursor {
    /// Number of items fetched so far; the offset of the next page.
    pub offset: usize,
    /// Once false, stays false until the next refresh.
    pub has_more: bool,
}

impl Default for CollectionCursor {
    fn default() -> Self {
        Self {
            offset: 0,
            has_more: true,
        }
    }
}
