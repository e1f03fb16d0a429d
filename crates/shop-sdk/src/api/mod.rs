//! Typed wrappers over the storefront REST endpoints.
//!
//! Each wrapper is a thin, stateless view of a [`FetchClient`](shop_data::FetchClient):
//! it builds the request, sends it and decodes the payload. State lives in
//! the stores.

mod admin;
mod cart;
mod order;
mod product;

pub use admin::{AdminApi, UserManagement, UserPage, UserQuery, UserStatistics};
pub use cart::CartApi;
pub use order::OrderApi;
pub use product::ProductApi;
