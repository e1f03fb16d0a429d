//! Application context: one client, one session and one of each store.

use crate::api::{AdminApi, CartApi, OrderApi, ProductApi};
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::store::{CartStore, OrderStore, ProductStore};
use shop_auth::{AuthApi, AuthError, AuthStore, LoginRequest, RegisterRequest, User, UserPatch};
use shop_cache::Cache;
use shop_data::notify::{LogNotifier, SilentNotifier};
use shop_data::{ClientEvent, FetchClient, Notice, Notifier, Transport};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Everything a front end needs, wired together.
///
/// Stores are shared through `Arc`, so handles can be cloned into tasks.
/// Build one per session root with [`Storefront::builder`].
#[derive(Debug)]
pub struct Storefront {
    config: ClientConfig,
    client: FetchClient,
    auth: Arc<AuthStore>,
    auth_api: AuthApi,
    products: Arc<ProductStore>,
    cart: Arc<CartStore>,
    orders: Arc<OrderStore>,
    admin: AdminApi,
}

#[derive(Default)]
pub struct StorefrontBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    notifier: Option<Arc<dyn Notifier>>,
    cache: Option<Cache>,
}

impl StorefrontBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the HTTP transport, e.g. with a scripted one in tests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Session storage to use instead of the configured one.
    pub fn cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Result<Storefront, ConfigError> {
        let config = self.config;
        let cache = match (self.cache, &config.storage.path) {
            (Some(cache), _) => cache,
            (None, Some(path)) => Cache::open(path)?,
            (None, None) => Cache::in_memory(),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None if config.notifications.enabled => Arc::new(LogNotifier),
            None => Arc::new(SilentNotifier),
        };

        let auth = Arc::new(AuthStore::new(cache));
        let mut client = FetchClient::new(config.api.base_url.clone())
            .with_timeout(config.timeout())
            .with_session(auth.clone())
            .with_notifier(notifier.clone());
        if let Some(transport) = self.transport {
            client = client.with_transport(transport);
        }

        let products = Arc::new(ProductStore::new(
            ProductApi::new(client.clone()),
            notifier.clone(),
        ));
        let cart = Arc::new(CartStore::new(
            CartApi::new(client.clone()),
            OrderApi::new(client.clone()),
            auth.clone(),
            products.clone(),
            notifier.clone(),
        ));
        let orders = Arc::new(OrderStore::new(OrderApi::new(client.clone()), notifier));

        Ok(Storefront {
            auth_api: AuthApi::new(client.clone()),
            admin: AdminApi::new(client.clone()),
            config,
            client,
            auth,
            products,
            cart,
            orders,
        })
    }
}

impl Storefront {
    pub fn builder() -> StorefrontBuilder {
        StorefrontBuilder::default()
    }

    /// Context with default settings and an in-memory session.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    pub fn products(&self) -> &Arc<ProductStore> {
        &self.products
    }

    pub fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    pub fn orders(&self) -> &Arc<OrderStore> {
        &self.orders
    }

    pub fn admin(&self) -> &AdminApi {
        &self.admin
    }

    /// Client events, most importantly [`ClientEvent::Unauthorized`].
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.client.subscribe()
    }

    /// Log in and record the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let response = self
            .auth_api
            .login(&LoginRequest::new(username, password))
            .await?;
        self.auth.login(&response)?;
        self.client
            .notifier()
            .notify(Notice::success(format!("Welcome back, {}", response.user.username)));
        Ok(response.user)
    }

    /// Create an account. The new account is not logged in.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        let request = RegisterRequest::new(username, email, password, confirm_password)?;
        let user = self.auth_api.register(&request).await?;
        info!(user = %user.username, "Registered");
        self.client
            .notifier()
            .notify(Notice::success("Registration successful, please log in"));
        Ok(user)
    }

    /// End the session. The server is told first, but the local session
    /// and every store are cleared even if that call fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        if self.auth.is_logged_in() {
            if let Err(e) = self.auth_api.logout().await {
                warn!(error = %e, "Server logout failed, clearing the local session anyway");
            }
        }
        self.auth.logout()?;
        self.cart.reset();
        self.orders.reset();
        self.products.clear();
        Ok(())
    }

    /// Reload the profile from the server and store it.
    pub async fn refresh_user(&self) -> Result<User, AuthError> {
        let user = self.auth_api.user_info().await?;
        self.auth.update_user_info(UserPatch::from(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shop_data::testing::ScriptedTransport;

    fn storefront() -> (Storefront, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let app = Storefront::builder()
            .transport(transport.clone())
            .notifier(Arc::new(SilentNotifier))
            .build()
            .unwrap();
        (app, transport)
    }

    fn login_reply() -> serde_json::Value {
        json!({
            "token": "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJhbGljZSJ9.sig",
            "tokenType": "Bearer",
            "user": {"id": 1, "username": "alice", "email": "a@example.com", "role": "SHOPER"}
        })
    }

    #[tokio::test]
    async fn test_login_attaches_token_to_later_requests() {
        let (app, transport) = storefront();
        transport.push_ok(login_reply());
        let user = app.login("alice", "secret").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(app.auth().can_manage_products());

        transport.push_ok(json!({"userId": 1, "productQuantities": {}}));
        app.cart().fetch_cart().await.unwrap();
        let req = transport.last_request().unwrap();
        assert_eq!(
            req.header("Authorization"),
            Some("Bearer eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJhbGljZSJ9.sig")
        );
    }

    #[tokio::test]
    async fn test_logout_survives_server_failure() {
        let (app, transport) = storefront();
        transport.push_ok(login_reply());
        app.login("alice", "secret").await.unwrap();
        transport.push_ok(json!({"userId": 1, "productQuantities": {"3": 1}}));
        app.cart().fetch_cart().await.unwrap();

        transport.push_status(500);
        app.logout().await.unwrap();
        assert!(!app.auth().is_logged_in());
        assert!(app.cart().is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_mismatched_passwords() {
        let (app, transport) = storefront();
        let err = app.register("bob", "b@example.com", "one", "two").await.unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_user_updates_session() {
        let (app, transport) = storefront();
        transport.push_ok(login_reply());
        app.login("alice", "secret").await.unwrap();

        transport.push_ok(json!({"id": 1, "username": "alice", "email": "new@example.com", "role": "ADMIN"}));
        let user = app.refresh_user().await.unwrap();
        assert_eq!(user.email, "new@example.com");
        assert!(app.auth().is_admin());
    }

    #[test]
    fn test_storage_path_is_opened() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::default();
        config.storage.path = Some(dir.path().join("session.json"));
        assert!(Storefront::new(config).is_ok());
    }
}
