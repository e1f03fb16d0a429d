//! Orders module.
//!
//! Orders are created server-side (one per product line) and only read or
//! transitioned from here.

mod listing;
mod order;

pub use listing::{
    decode_created_orders, CreateOrderRequest, OrderPage, OrderQuery, OrderStatistics,
    PurchaseStatus, DEFAULT_ORDER_PAGE_SIZE,
};
pub use order::{Order, OrderStatus};
