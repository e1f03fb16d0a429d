//! SDK errors.

use shop_cache::CacheError;
use shop_commerce::CommerceError;
use shop_data::ApiError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a store operation.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The request failed. The client has already logged and announced it.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input rejected before anything was sent.
    #[error(transparent)]
    Invalid(#[from] CommerceError),
}

impl StoreError {
    /// Whether the user has already been told about this error.
    pub fn announced(&self) -> bool {
        matches!(self, StoreError::Api(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, StoreError::Api(e) if e.is_unauthorized())
    }
}

/// Failure of the cart checkout pipeline.
#[derive(Error, Debug, Clone)]
pub enum CheckoutError {
    #[error("Please log in before placing an order")]
    NotLoggedIn,

    /// The saved token is past its expiry; the session has been cleared.
    #[error("Your session has expired, please log in again")]
    TokenExpired,

    #[error("Your cart is empty, nothing to order")]
    EmptyCart,

    /// The server accepted the request but created nothing.
    #[error("No orders were created")]
    NoOrdersCreated,

    /// The server's reply was not a list of orders.
    #[error("Order creation failed: {0}")]
    UnexpectedShape(String),

    /// The server rejected the session mid-checkout.
    #[error("Your session has expired, please log in again")]
    SessionExpired,

    #[error(transparent)]
    Api(ApiError),
}

impl CheckoutError {
    /// Whether the client already told the user about this error.
    ///
    /// 401 is never announced by the client, so it counts as unannounced.
    pub fn announced(&self) -> bool {
        matches!(self, CheckoutError::Api(e) if !e.is_unauthorized())
    }

    /// Whether the checkout was stopped before any request was made.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            CheckoutError::NotLoggedIn | CheckoutError::TokenExpired | CheckoutError::EmptyCart
        )
    }
}

impl From<ApiError> for CheckoutError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            CheckoutError::SessionExpired
        } else {
            CheckoutError::Api(err)
        }
    }
}

/// Configuration or storage setup failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to encode TOML config: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to open session storage: {0}")]
    Storage(#[from] CacheError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_becomes_session_expired() {
        let err = CheckoutError::from(ApiError::from_status(401, None));
        assert!(matches!(err, CheckoutError::SessionExpired));
        assert!(!err.announced());
    }

    #[test]
    fn test_other_api_errors_are_announced() {
        let err = CheckoutError::from(ApiError::from_status(500, None));
        assert!(err.announced());
        assert!(!err.is_local());
        assert!(CheckoutError::EmptyCart.is_local());
    }

    #[test]
    fn test_store_error_announced() {
        assert!(StoreError::from(ApiError::network("down")).announced());
        assert!(!StoreError::from(CommerceError::InvalidQuantity(0)).announced());
    }
}
