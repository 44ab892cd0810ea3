//! Configuration for the content manager.

use content_manager_sdk::Pagination;
use serde::Deserialize;

/// Module configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentManagerConfig {
    /// Page size used when a query does not ask for one.
    pub default_page_size: u64,

    /// Upper bound for a requested page size.
    pub max_page_size: u64,

    /// Upper bound for the number of ids in one bulk delete.
    pub max_bulk_delete_ids: usize,

    /// Also populate the paths read by the caller's read-grant conditions when
    /// fetching a single entry, so conditions on relations can be evaluated.
    pub populate_condition_paths: bool,
}

impl Default for ContentManagerConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            max_bulk_delete_ids: 1000,
            populate_condition_paths: false,
        }
    }
}

impl ContentManagerConfig {
    /// Fill in a missing page size and bound page and page size to `>= 1`.
    #[must_use]
    pub fn clamp_pagination(&self, pagination: Pagination) -> Pagination {
        let max = self.max_page_size.max(1);
        let page_size = pagination
            .page_size
            .unwrap_or(self.default_page_size)
            .clamp(1, max);

        Pagination {
            page: pagination.page.max(1),
            page_size: Some(page_size),
        }
    }
}
