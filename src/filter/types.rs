use serde::{Deserialize, Serialize};

/// Fields the free-text `search` parameter looks in.
pub const SEARCH_FIELDS: &[&str] = &[
    "HS CODE",
    "Product Name",
    "Item Description",
    "Grade",
    "Grade Category",
    "Importer Name",
    "Actual Importer Name",
    "Consignor Name",
];

/// Raw query string of `GET /api/data`. Everything arrives as text so that
/// malformed numbers fall back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub product: Option<String>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// `_id`: the order records were stored in.
    Insertion,
    Field(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub key: SortKey,
    pub sort: SortDirection,
}

impl Default for FilterOrderInfo {
    fn default() -> Self {
        Self {
            key: SortKey::Insertion,
            sort: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let pages = total.div_ceil(u64::from(limit.max(1)));
        Self { page, limit, total, pages }
    }
}

/// One page of results plus the size of the whole match set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}
