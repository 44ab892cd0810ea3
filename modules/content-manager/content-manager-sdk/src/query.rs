//! Query and paging models.

use serde::{Deserialize, Serialize};

use crate::filter::{AttributePath, Filter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub path: AttributePath,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortKey {
    #[must_use]
    pub fn asc(path: impl Into<AttributePath>) -> Self {
        Self {
            path: path.into(),
            order: SortOrder::Asc,
        }
    }

    #[must_use]
    pub fn desc(path: impl Into<AttributePath>) -> Self {
        Self {
            path: path.into(),
            order: SortOrder::Desc,
        }
    }
}

/// 1-based page request. A missing page size falls back to the configured
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub page: u64,
    #[serde(default)]
    pub page_size: Option<u64>,
}

fn first_page() -> u64 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: first_page(),
            page_size: None,
        }
    }
}

/// A structured query against one content type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityQuery {
    #[serde(default)]
    pub filters: Option<Filter>,
    #[serde(default)]
    pub sort: Vec<SortKey>,
    /// Field selection. `None` selects everything readable.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl EntityQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filters(mut self, filter: Filter) -> Self {
        self.filters = Some(filter);
        self
    }

    #[must_use]
    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn page(mut self, page: u64, page_size: u64) -> Self {
        self.pagination = Pagination {
            page,
            page_size: Some(page_size),
        };
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u64,
    pub page_size: u64,
    pub page_count: u64,
    pub total: u64,
}

impl PageInfo {
    /// Page metadata for `total` matches split into pages of `page_size`.
    #[must_use]
    pub fn new(page: u64, page_size: u64, total: u64) -> Self {
        Self {
            page,
            page_size,
            page_count: if page_size == 0 {
                0
            } else {
                total.div_ceil(page_size)
            },
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Page<T> {
    #[must_use]
    pub fn empty(page: u64, page_size: u64) -> Self {
        Self {
            results: Vec::new(),
            pagination: PageInfo::new(page, page_size, 0),
        }
    }

    /// Convert results while keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
