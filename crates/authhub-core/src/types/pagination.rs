//! Pagination for list operations.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u64 = 25;
const MAX_PAGE_SIZE: u64 = 100;

/// A 1-based page request. Out-of-range values are clamped rather than
/// rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page, capped at 100.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Builds a request, clamping the page to at least 1 and the page
    /// size into 1..=100.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// The SQL `OFFSET` for this page.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.page_size
    }

    /// The SQL `LIMIT` for this page.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results together with the totals a caller needs to
/// render paging controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// The items on this page.
    pub items: Vec<T>,
    /// The requested page number.
    pub page: u64,
    /// The requested page size.
    pub page_size: u64,
    /// Total matching items across all pages.
    pub total_items: u64,
    /// Total page count (at least 1, even when empty).
    pub total_pages: u64,
}

impl<T: Serialize> PageResponse<T> {
    /// Wraps a page of items with its totals.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            total_items.div_ceil(page_size)
        };
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
