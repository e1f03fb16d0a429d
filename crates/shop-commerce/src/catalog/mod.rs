//! Product catalog module.
//!
//! Products, list queries, pages and catalog statistics.

mod listing;
mod product;

pub use listing::{
    BatchRequest, ImageUpload, ProductPage, ProductQuery, ProductStats, SortOrder,
    DEFAULT_PRODUCT_PAGE_SIZE,
};
pub use product::{
    validate_discount, validate_price, Product, ProductDraft, ProductUpdate, SpecValue,
};
