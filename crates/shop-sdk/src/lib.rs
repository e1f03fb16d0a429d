//! Storefront client SDK.
//!
//! Thin endpoint wrappers ([`api`]), server-mirroring state stores
//! ([`store`]) and a [`Storefront`] context that wires them to one
//! [`FetchClient`](shop_data::FetchClient) and one session.
//!
//! ```rust,ignore
//! use shop_sdk::prelude::*;
//!
//! let app = Storefront::new(ClientConfig::default())?;
//! app.login("alice", "secret").await?;
//!
//! app.products().fetch_products(&ProductQuery::new()).await?;
//! app.cart().add_to_cart(ProductId::new(7), 2).await?;
//! let orders = app.cart().create_order().await?;
//! ```

pub mod api;
mod app;
pub mod config;
mod error;
pub mod logging;
pub mod search;
pub mod store;

pub use app::{Storefront, StorefrontBuilder};
pub use config::ClientConfig;
pub use error::{CheckoutError, ConfigError, StoreError};
pub use search::SearchDebouncer;

pub use shop_auth as auth;
pub use shop_commerce as commerce;
pub use shop_data as data;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::store::{CartStore, OrderStore, ProductStore};
    pub use crate::{CheckoutError, ClientConfig, StoreError, Storefront};
    pub use shop_auth::{AuthError, AuthStore, Role, User};
    pub use shop_commerce::prelude::*;
    pub use shop_data::{ApiError, ClientEvent, Notice, Notifier};
}
