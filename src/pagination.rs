//! Query parameters for paginated listing endpoints.

use serde::Deserialize;

const DEFAULT_PAGE_SIZE: u64 = 25;
const MAX_PAGE_SIZE: u64 = 100;

/// The pagination query parameters of a listing endpoint, e.g.
/// `/api/transactions?page=2&per_page=50`.
///
/// Pages are numbered from one. Both parameters are optional.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PaginationParams {
    /// Which page to fetch, starting at one.
    #[serde(default = "default_page")]
    pub page: u64,
    /// How many items to return per page, capped at 100.
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// The number of items to fetch for this page.
    ///
    /// Zero and oversized `per_page` values are clamped rather than
    /// rejected.
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }

    /// The number of items to skip to reach this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit()
    }
}
