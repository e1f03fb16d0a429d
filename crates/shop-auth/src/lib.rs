//! Authentication for the storefront client.
//!
//! Holds the current session (token and user), persists it across runs,
//! inspects JWT payloads for expiry and wraps the `/auth` endpoints.
//!
//! Token checks here are advisory. The client cannot verify signatures; a
//! local expiry check only saves a request the server would reject anyway.

mod api;
mod error;
mod session;
mod token;
mod user;

pub use api::AuthApi;
pub use error::AuthError;
pub use session::{AuthStore, TOKEN_KEY, USER_INFO_KEY};
pub use token::{
    is_jwt_token_expiring_soon, is_jwt_token_expiring_soon_at, is_jwt_token_valid,
    is_jwt_token_valid_at, jwt_expiration, parse_jwt_payload, DEFAULT_EXPIRY_THRESHOLD_SECS,
};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, Role, User, UserPatch};
