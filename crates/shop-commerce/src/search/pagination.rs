//! Page navigation state for list views.

use serde::{Deserialize, Serialize};

/// Pagination info as a list view presents it.
///
/// `page` is 1-based. The order and product endpoints count from zero; use
/// [`Pagination::from_zero_based`] at that boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u64,
    /// Total number of pages, at least 1.
    pub total_pages: u32,
}

impl Pagination {
    /// Create pagination info. `page` is clamped to at least 1 and
    /// `per_page` to at least 1.
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = if total == 0 {
            1
        } else {
            let pages = total.div_ceil(u64::from(per_page));
            u32::try_from(pages).unwrap_or(u32::MAX)
        };

        Self {
            page: page.max(1),
            per_page,
            total,
            total_pages,
        }
    }

    /// Pagination for a server page numbered from zero.
    pub fn from_zero_based(page: u32, per_page: u32, total: u64) -> Self {
        Self::new(page.saturating_add(1), per_page, total)
    }

    /// Zero-based page index for the API.
    pub fn api_page(&self) -> u32 {
        self.page - 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Page numbers to show, a window of at most `max_visible` around the
    /// current page.
    pub fn page_numbers(&self, max_visible: usize) -> Vec<u32> {
        let max_visible = u32::try_from(max_visible.max(1)).unwrap_or(u32::MAX);
        if self.total_pages <= max_visible {
            return (1..=self.total_pages).collect();
        }

        let half = max_visible / 2;
        let start = self.page.saturating_sub(half).max(1);
        let end = (start + max_visible - 1).min(self.total_pages);
        let start = (end + 1).saturating_sub(max_visible).max(1);

        (start..=end).collect()
    }

    /// Check if on first page.
    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    /// Check if on last page.
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    /// Get start item number (1-indexed), 0 when there are no items.
    pub fn start_item(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            u64::from(self.page - 1) * u64::from(self.per_page) + 1
        }
    }

    /// Get end item number.
    pub fn end_item(&self) -> u64 {
        (u64::from(self.page) * u64::from(self.per_page)).min(self.total)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 10, 0)
    }
}
