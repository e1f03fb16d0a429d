//! `/admin/users` endpoints. ADMIN only; the server enforces it.

use serde::{Deserialize, Serialize};
use shop_auth::Role;
use shop_commerce::catalog::SortOrder;
use shop_commerce::UserId;
use shop_data::{ApiError, FetchClient};

/// An account as the user-management screens see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserManagement {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Filters for the user list. `page` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub enabled: Option<bool>,
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub sort_direction: SortOrder,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            username: None,
            email: None,
            role: None,
            enabled: None,
            page: 0,
            size: 10,
            sort_by: "createdAt".to_string(),
            sort_direction: SortOrder::Desc,
        }
    }
}

impl UserQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(username) = &self.username {
            pairs.push(("username", username.clone()));
        }
        if let Some(email) = &self.email {
            pairs.push(("email", email.clone()));
        }
        if let Some(role) = self.role {
            pairs.push(("role", role.as_str().to_string()));
        }
        if let Some(enabled) = self.enabled {
            pairs.push(("enabled", enabled.to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("size", self.size.to_string()));
        pairs.push(("sortBy", self.sort_by.clone()));
        pairs.push(("sortDirection", self.sort_direction.as_str().to_string()));
        pairs
    }
}

/// A Spring page of users. `number` is zero-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPage {
    pub content: Vec<UserManagement>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
    pub first: bool,
    pub last: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserStatistics {
    pub total_users: u64,
    pub enabled_users: u64,
    pub disabled_users: u64,
    pub user_count: u64,
    pub shoper_count: u64,
    pub admin_count: u64,
}

#[derive(Debug, Clone)]
pub struct AdminApi {
    client: FetchClient,
}

impl AdminApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    pub async fn list_users(&self, query: &UserQuery) -> Result<UserPage, ApiError> {
        let mut builder = self.client.get("/admin/users/list");
        for (key, value) in query.to_pairs() {
            builder = builder.query(key, value);
        }
        builder.send().await
    }

    pub async fn user_statistics(&self) -> Result<UserStatistics, ApiError> {
        self.client.get("/admin/users/statistics").send().await
    }

    /// Enable a disabled account or disable an enabled one.
    pub async fn toggle_user_enabled(&self, id: UserId) -> Result<(), ApiError> {
        self.client
            .put(format!("/admin/users/{}/toggle-enabled", id))
            .send_empty()
            .await
    }

    /// The role travels as a bare string body.
    pub async fn update_user_role(&self, id: UserId, role: Role) -> Result<(), ApiError> {
        self.client
            .put(format!("/admin/users/{}/role", id))
            .text(role.as_str())
            .send_empty()
            .await
    }
}
