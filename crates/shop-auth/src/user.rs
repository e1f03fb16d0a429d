//! User types.

use crate::AuthError;
use serde::{Deserialize, Serialize};
use shop_commerce::UserId;
use std::fmt;
use std::str::FromStr;

/// User role for authorization.
///
/// Roles are flat: `has_role` is an exact match, not a level comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular customer.
    #[default]
    User,
    /// Merchant. Manages their own products and sees their sales.
    Shoper,
    /// Administrator.
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Shoper, Role::Admin];

    /// Get role as wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Shoper => "SHOPER",
            Role::Admin => "ADMIN",
        }
    }

    /// Whether this role may create and edit products.
    pub fn can_manage_products(&self) -> bool {
        matches!(self, Role::Shoper | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "SHOPER" => Ok(Role::Shoper),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(AuthError::UnknownRole(s.to_string())),
        }
    }
}

/// The signed-in user as the server describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Partial profile update. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub updated_at: Option<String>,
}

impl UserPatch {
    pub(crate) fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(updated_at) = self.updated_at {
            user.updated_at = Some(updated_at);
        }
    }
}

impl From<User> for UserPatch {
    fn from(user: User) -> Self {
        Self {
            username: Some(user.username),
            email: Some(user.email),
            role: Some(user.role),
            updated_at: user.updated_at,
        }
    }
}

/// Body for `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Body for `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    /// Build a registration form, rejecting mismatched passwords.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let password = password.into();
        let confirm_password = confirm_password.into();
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password,
            confirm_password,
        })
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Token lifetime in seconds, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_value(Role::Shoper).unwrap(), json!("SHOPER"));
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!(matches!("root".parse::<Role>(), Err(AuthError::UnknownRole(_))));
    }

    #[test]
    fn test_role_product_management() {
        assert!(!Role::User.can_manage_products());
        assert!(Role::Shoper.can_manage_products());
        assert!(Role::Admin.can_manage_products());
    }

    #[test]
    fn test_login_response_decodes() {
        let resp: LoginResponse = serde_json::from_value(json!({
            "token": "a.b.c",
            "tokenType": "Bearer",
            "expiresIn": 86400,
            "user": {"id": 1, "username": "alice", "email": "a@x.io", "role": "USER"}
        }))
        .unwrap();
        assert_eq!(resp.user.role, Role::User);
        assert_eq!(resp.expires_in, Some(86400));
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let mut user = User {
            id: UserId::new(1),
            username: "alice".to_string(),
            email: "a@x.io".to_string(),
            role: Role::User,
            created_at: None,
            updated_at: None,
        };
        UserPatch {
            email: Some("alice@x.io".to_string()),
            ..Default::default()
        }
        .apply(&mut user);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@x.io");
    }

    #[test]
    fn test_register_rejects_mismatch() {
        let err = RegisterRequest::new("bob", "b@x.io", "pw1", "pw2").unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));

        let req = RegisterRequest::new("bob", "b@x.io", "pw", "pw").unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["confirmPassword"], "pw");
    }

    #[test]
    fn test_debug_hides_password() {
        let req = LoginRequest::new("alice", "hunter2");
        assert!(!format!("{:?}", req).contains("hunter2"));
    }
}
