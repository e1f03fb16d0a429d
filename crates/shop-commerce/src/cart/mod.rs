//! Shopping cart module.
//!
//! The cart is owned by the server; these types mirror its last reply and
//! describe the requests that change it.

mod cart;
mod details;

pub use cart::{AddToCart, CartLine, CartState, UpdateCart};
pub use details::CartLineDetail;
