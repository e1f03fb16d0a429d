//! Durable key-value storage for the storefront client.
//!
//! Stands in for the browser's `localStorage`: string values under string
//! keys, with typed JSON helpers on top.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_cache::Cache;
//!
//! let cache = Cache::open("~/.local/share/shop/session.json")?;
//!
//! // Raw string values
//! cache.set_raw("token", "eyJhbGciOi...")?;
//!
//! // JSON values
//! cache.set("userInfo", &user)?;
//! let user: Option<User> = cache.get("userInfo")?;
//!
//! cache.delete("token")?;
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::{Cache, KvStore};
pub use store::{FileStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore};
}
