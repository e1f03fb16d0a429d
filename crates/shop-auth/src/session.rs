//! The current session and its persistence.

use crate::token;
use crate::user::{LoginResponse, Role, User, UserPatch};
use crate::AuthError;
use parking_lot::RwLock;
use shop_cache::Cache;
use shop_commerce::UserId;
use shop_data::SessionHook;
use tracing::{debug, info, warn};

/// Storage key of the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the JSON-encoded user.
pub const USER_INFO_KEY: &str = "userInfo";

#[derive(Debug, Default)]
struct SessionState {
    token: String,
    user: Option<User>,
}

/// Holds the token and user of the signed-in account.
///
/// Both are written through to the [`Cache`] so a new process picks the
/// session back up. Logged in means the token is non-empty.
#[derive(Debug)]
pub struct AuthStore {
    cache: Cache,
    state: RwLock<SessionState>,
}

impl AuthStore {
    /// Create a store and restore any session saved in `cache`.
    ///
    /// Unreadable saved values are discarded with a warning.
    pub fn new(cache: Cache) -> Self {
        let token = cache.get_raw(TOKEN_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read saved token");
            None
        });
        let user = cache.get::<User>(USER_INFO_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable saved user");
            None
        });

        let state = SessionState {
            token: token.unwrap_or_default(),
            user,
        };
        if !state.token.is_empty() {
            debug!(user = ?state.user.as_ref().map(|u| &u.username), "Restored session");
        }

        Self {
            cache,
            state: RwLock::new(state),
        }
    }

    /// Store a fresh session in memory and in the cache.
    pub fn login(&self, response: &LoginResponse) -> Result<(), AuthError> {
        {
            let mut state = self.state.write();
            state.token = response.token.clone();
            state.user = Some(response.user.clone());
        }
        self.cache.set_raw(TOKEN_KEY, &response.token)?;
        self.cache.set(USER_INFO_KEY, &response.user)?;
        info!(user = %response.user.username, "Logged in");
        Ok(())
    }

    /// Drop the session from memory and from the cache.
    ///
    /// Memory is cleared first, so the store reads as logged out even when
    /// the cache write fails.
    pub fn logout(&self) -> Result<(), AuthError> {
        let was_logged_in = {
            let mut state = self.state.write();
            let was = !state.token.is_empty();
            *state = SessionState::default();
            was
        };
        self.cache.delete(TOKEN_KEY)?;
        self.cache.delete(USER_INFO_KEY)?;
        if was_logged_in {
            info!("Logged out");
        }
        Ok(())
    }

    /// Merge `patch` into the current user and persist the result.
    pub fn update_user_info(&self, patch: UserPatch) -> Result<User, AuthError> {
        let updated = {
            let mut state = self.state.write();
            let user = state.user.as_mut().ok_or(AuthError::NotLoggedIn)?;
            patch.apply(user);
            user.clone()
        };
        self.cache.set(USER_INFO_KEY, &updated)?;
        Ok(updated)
    }

    pub fn token(&self) -> Option<String> {
        let state = self.state.read();
        (!state.token.is_empty()).then(|| state.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        !self.state.read().token.is_empty()
    }

    /// Whether the saved token is present and not past its `exp` claim.
    pub fn is_token_valid(&self) -> bool {
        token::is_jwt_token_valid(&self.state.read().token)
    }

    /// Exact role match.
    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn role(&self) -> Option<Role> {
        self.state.read().user.as_ref().map(|u| u.role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn is_shoper(&self) -> bool {
        self.has_role(Role::Shoper)
    }

    pub fn can_manage_products(&self) -> bool {
        self.role().is_some_and(|r| r.can_manage_products())
    }

    /// Username, empty when logged out.
    pub fn username(&self) -> String {
        self.state
            .read()
            .user
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.state.read().user.as_ref().map(|u| u.id)
    }
}

impl SessionHook for AuthStore {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }

    fn session_expired(&self) {
        warn!("Session rejected by server, clearing");
        if let Err(e) = self.logout() {
            warn!(error = %e, "Failed to clear saved session");
        }
    }
}
