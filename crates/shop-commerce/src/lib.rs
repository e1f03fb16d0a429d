//! Storefront domain types.
//!
//! Everything here is plain data plus the computations derived from it. No
//! I/O happens in this crate; the SDK fetches the values and hands them in.
//!
//! - **Catalog**: products, list queries and pages, catalog statistics
//! - **Cart**: the server-mirrored cart and its mutation requests
//! - **Checkout**: orders, order pages, purchase checks
//! - **Search**: pagination for list views
//!
//! # Example
//!
//! ```rust
//! use shop_commerce::prelude::*;
//!
//! let lamp = Product::new(ProductId::new(1), "Desk Lamp", Money::from_decimal(20.0));
//! let cart: CartState = serde_json::from_str(
//!     r#"{"userId": 7, "productQuantities": {"1": 2}}"#,
//! ).unwrap();
//!
//! assert_eq!(cart.total_items(), 2);
//! assert_eq!(cart.total_amount(&[lamp]), Money::from_decimal(40.0));
//! ```

mod de;
pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod search;

pub use error::{CommerceError, CommerceResult};
pub use ids::*;
pub use money::Money;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, CommerceResult};
    pub use crate::ids::*;
    pub use crate::money::Money;

    // Catalog
    pub use crate::catalog::{
        BatchRequest, ImageUpload, Product, ProductDraft, ProductPage, ProductQuery,
        ProductStats, ProductUpdate, SortOrder, SpecValue,
    };

    // Cart
    pub use crate::cart::{AddToCart, CartLine, CartLineDetail, CartState, UpdateCart};

    // Checkout
    pub use crate::checkout::{
        CreateOrderRequest, Order, OrderPage, OrderQuery, OrderStatistics, OrderStatus,
        PurchaseStatus,
    };

    // Search
    pub use crate::search::Pagination;
}
