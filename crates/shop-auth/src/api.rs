//! `/auth` endpoints.

use crate::user::{LoginRequest, LoginResponse, RegisterRequest, User};
use crate::AuthError;
use shop_data::FetchClient;

/// Wrapper over the authentication endpoints.
///
/// Stateless: recording the session is the caller's job, see
/// [`AuthStore::login`](crate::AuthStore::login).
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: FetchClient,
}

impl AuthApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        Ok(self
            .client
            .post("/auth/login")
            .json(request)?
            .send()
            .await?)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        Ok(self
            .client
            .post("/auth/register")
            .json(request)?
            .send()
            .await?)
    }

    /// Profile of the account the bearer token belongs to.
    pub async fn user_info(&self) -> Result<User, AuthError> {
        Ok(self.client.get("/auth/userinfo").send().await?)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        Ok(self.client.post("/auth/logout").send_empty().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthStore, Role};
    use serde_json::json;
    use shop_cache::Cache;
    use shop_data::testing::ScriptedTransport;
    use shop_data::{ErrorKind, Method};
    use std::sync::Arc;

    fn api() -> (AuthApi, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let client = FetchClient::new("http://localhost:8080/api").with_transport(transport.clone());
        (AuthApi::new(client), transport)
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let (api, transport) = api();
        transport.push_ok(json!({
            "token": "h.p.s",
            "expiresIn": 3600,
            "user": {"id": 3, "username": "bob", "email": "bob@x.io", "role": "SHOPER"}
        }));

        let resp = api.login(&LoginRequest::new("bob", "pw")).await.unwrap();
        assert_eq!(resp.user.role, Role::Shoper);

        let req = transport.last_request().unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/auth/login");
        assert_eq!(req.json_body().unwrap(), json!({"username": "bob", "password": "pw"}));
    }

    #[tokio::test]
    async fn test_login_failure_surfaces_server_message() {
        let (api, transport) = api();
        transport.push_fail("Bad credentials");

        let err = api.login(&LoginRequest::new("bob", "nope")).await.unwrap_err();
        match err {
            AuthError::Api(e) => {
                assert_eq!(e.kind, ErrorKind::Business);
                assert_eq!(e.message, "Bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_store_token_is_sent_afterwards() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(AuthStore::new(Cache::in_memory()));
        let client = FetchClient::new("http://localhost:8080/api")
            .with_transport(transport.clone())
            .with_session(store.clone());
        let api = AuthApi::new(client);

        transport.push_ok(json!({
            "token": "h.p.s",
            "user": {"id": 3, "username": "bob", "role": "USER"}
        }));
        let resp = api.login(&LoginRequest::new("bob", "pw")).await.unwrap();
        store.login(&resp).unwrap();

        transport.push_ok(json!({"id": 3, "username": "bob", "role": "USER"}));
        let me = api.user_info().await.unwrap();
        assert_eq!(me.username, "bob");
        assert_eq!(
            transport.last_request().unwrap().header("Authorization"),
            Some("Bearer h.p.s")
        );
    }

    #[tokio::test]
    async fn test_unauthorized_clears_store() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(AuthStore::new(Cache::in_memory()));
        store
            .login(&LoginResponse {
                token: "stale".to_string(),
                token_type: None,
                expires_in: None,
                user: User {
                    id: shop_commerce::UserId::new(1),
                    username: "bob".to_string(),
                    email: String::new(),
                    role: Role::User,
                    created_at: None,
                    updated_at: None,
                },
            })
            .unwrap();
        let client = FetchClient::new("http://localhost:8080/api")
            .with_transport(transport.clone())
            .with_session(store.clone());

        transport.push_status(401);
        let err = AuthApi::new(client).user_info().await.unwrap_err();
        assert!(err.is_auth_failure());
        assert!(!store.is_logged_in());
    }
}
