//! HTTP client wrapper for the storefront REST API.
//!
//! Attaches the bearer token from the current session, unwraps the
//! `{success, data, message}` envelope, and normalizes every failure into
//! one [`ApiError`] shape. A 401 clears the session and is broadcast as a
//! [`ClientEvent`] so the view layer can send the user back to login.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_data::FetchClient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Product {
//!     id: i64,
//!     #[serde(rename = "productName")]
//!     name: String,
//! }
//!
//! let client = FetchClient::new("http://localhost:8080/api");
//!
//! let product: Product = client.get("/products/123").send().await?;
//!
//! let page: serde_json::Value = client
//!     .get("/products/search")
//!     .query("keyword", "lamp")
//!     .query("page", 0)
//!     .send()
//!     .await?;
//! ```

mod client;
pub mod envelope;
mod error;
pub mod notify;
mod request;
mod response;
mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{
    ClientEvent, ClientRequestBuilder, FetchClient, SessionHook, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT,
};
pub use envelope::Envelope;
pub use error::{ApiError, ErrorKind};
pub use notify::{Notice, NoticeLevel, Notifier};
pub use request::{Method, Multipart, Request, RequestBuilder};
pub use response::Response;
pub use transport::{HyperTransport, Transport};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ApiError, ClientEvent, ErrorKind, FetchClient, Method, Notice, Notifier, SessionHook,
    };
}
