//! Authentication errors.

use shop_data::ApiError;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No session is active.
    #[error("not logged in")]
    NotLoggedIn,

    /// Token missing, malformed or expired.
    #[error("token invalid or expired")]
    InvalidToken,

    /// Unrecognized role name.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Registration form whose passwords differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Session storage failed.
    #[error("cache error: {0}")]
    Cache(#[from] shop_cache::CacheError),

    /// Request to the auth endpoints failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            AuthError::NotLoggedIn | AuthError::InvalidToken => true,
            AuthError::Api(err) => err.is_unauthorized(),
            _ => false,
        }
    }
}
