//! State stores.
//!
//! Each store wraps one area of the API, keeps the last server reply for
//! the view layer and reports failures through the [`Notifier`].
//!
//! [`Notifier`]: shop_data::Notifier

mod cart;
mod loading;
mod order;
mod product;

pub use cart::{CartOp, CartStore};
pub use loading::{LoadingFlags, LoadingGuard};
pub use order::{OrderOp, OrderStore, StatusCounts};
pub use product::{ProductOp, ProductStore};
