//! Pagination helpers for list views.

mod pagination;

pub use pagination::Pagination;
