//! The cart mirror and the checkout pipeline.

use super::loading::LoadingFlags;
use super::product::ProductStore;
use crate::api::{CartApi, OrderApi};
use crate::error::{CheckoutError, StoreError};
use parking_lot::RwLock;
use shop_auth::AuthStore;
use shop_commerce::cart::{AddToCart, CartLine, CartLineDetail, CartState, UpdateCart};
use shop_commerce::checkout::Order;
use shop_commerce::{Money, ProductId};
use shop_data::{ApiError, Notice, Notifier};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Cart operations with their own loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOp {
    Fetch,
    Add,
    Update,
    Remove,
    Clear,
    Statistics,
    Checkout,
}

#[derive(Debug, Default)]
struct CartView {
    cart: CartState,
    error: Option<String>,
}

/// Mirror of the server-side cart.
///
/// Every successful call replaces the cart with exactly what the server
/// returned. Mutations and checkout pass through one gate, so overlapping
/// calls reach the server in the order they were issued and the last
/// reply applied is the reply to the last mutation.
pub struct CartStore {
    api: CartApi,
    orders: OrderApi,
    auth: Arc<AuthStore>,
    catalog: Arc<ProductStore>,
    notifier: Arc<dyn Notifier>,
    view: RwLock<CartView>,
    loading: LoadingFlags<CartOp>,
    gate: Mutex<()>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("view", &self.view)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    pub fn new(
        api: CartApi,
        orders: OrderApi,
        auth: Arc<AuthStore>,
        catalog: Arc<ProductStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            orders,
            auth,
            catalog,
            notifier,
            view: RwLock::new(CartView::default()),
            loading: LoadingFlags::new(),
            gate: Mutex::new(()),
        }
    }

    // ----- snapshots -----

    pub fn cart(&self) -> CartState {
        self.view.read().cart.clone()
    }

    /// Message of the last failure, cleared when the next operation starts.
    pub fn error(&self) -> Option<String> {
        self.view.read().error.clone()
    }

    pub fn items(&self) -> Vec<CartLine> {
        self.view.read().cart.items()
    }

    pub fn total_items(&self) -> u64 {
        self.view.read().cart.total_items()
    }

    pub fn is_empty(&self) -> bool {
        self.view.read().cart.is_empty()
    }

    pub fn has_items(&self) -> bool {
        self.view.read().cart.has_items()
    }

    pub fn is_product_in_cart(&self, product_id: ProductId) -> bool {
        self.view.read().cart.contains(product_id)
    }

    pub fn product_quantity(&self, product_id: ProductId) -> u32 {
        self.view.read().cart.quantity_of(product_id)
    }

    /// Lines joined with whatever the product store has loaded.
    pub fn items_with_details(&self) -> Vec<CartLineDetail> {
        let products = self.catalog.products();
        self.view.read().cart.with_details(&products)
    }

    /// Total against the loaded products. Lines whose product is not loaded
    /// count as zero.
    pub fn total_amount(&self) -> Money {
        let products = self.catalog.products();
        self.view.read().cart.total_amount(&products)
    }

    pub fn is_loading(&self, op: CartOp) -> bool {
        self.loading.is_loading(op)
    }

    pub fn is_busy(&self) -> bool {
        self.loading.any()
    }

    /// Forget the local cart, e.g. after logout.
    pub fn reset(&self) {
        *self.view.write() = CartView::default();
    }

    // ----- reads -----

    pub async fn fetch_cart(&self) -> Result<CartState, StoreError> {
        self.apply(CartOp::Fetch, "Failed to load cart", self.api.get_cart())
            .await
    }

    /// Cart aggregates. The endpoint answers with the cart, which replaces
    /// the local one like any other reply.
    pub async fn get_cart_statistics(&self) -> Result<CartState, StoreError> {
        self.apply(
            CartOp::Statistics,
            "Failed to load cart statistics",
            self.api.statistics(),
        )
        .await
    }

    // ----- mutations -----

    /// Add `quantity` of a product. The quantity must be a positive
    /// integer; the server enforces the upper bound.
    pub async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartState, StoreError> {
        let request = match AddToCart::new(product_id, quantity) {
            Ok(request) => request,
            Err(e) => return Err(self.fail("Failed to add to cart", e.into())),
        };
        let _gate = self.gate.lock().await;
        self.apply(CartOp::Add, "Failed to add to cart", self.api.add_item(&request))
            .await
    }

    /// Replace the quantities of one or more lines.
    pub async fn update_cart(&self, update: UpdateCart) -> Result<CartState, StoreError> {
        let _gate = self.gate.lock().await;
        self.apply(
            CartOp::Update,
            "Failed to update cart",
            self.api.update_items(&update),
        )
        .await
    }

    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<CartState, StoreError> {
        let _gate = self.gate.lock().await;
        self.apply(
            CartOp::Remove,
            "Failed to remove item",
            self.api.remove_item(product_id),
        )
        .await
    }

    pub async fn clear_cart(&self) -> Result<CartState, StoreError> {
        let _gate = self.gate.lock().await;
        self.apply(CartOp::Clear, "Failed to clear cart", self.api.clear())
            .await
    }

    async fn apply(
        &self,
        op: CartOp,
        context: &str,
        call: impl Future<Output = Result<CartState, ApiError>>,
    ) -> Result<CartState, StoreError> {
        let _loading = self.loading.start(op);
        self.view.write().error = None;
        match call.await {
            Ok(cart) => {
                debug!(?op, lines = cart.line_count(), "cart replaced");
                self.view.write().cart = cart.clone();
                Ok(cart)
            }
            Err(err) => Err(self.fail(context, err.into())),
        }
    }

    fn fail(&self, context: &str, err: StoreError) -> StoreError {
        error!(error = %err, "{}", context);
        let message = describe(context, &err.to_string());
        if !err.announced() {
            self.notifier.notify(Notice::error(message.clone()));
        }
        self.view.write().error = Some(message);
        err
    }

    // ----- checkout -----

    /// Turn the whole cart into orders, one per line.
    ///
    /// Not logged in, an expired token and an empty cart are refused
    /// without a request; an expired token also ends the session. The
    /// emptiness check waits for cart mutations already in flight. Whenever
    /// the server answers with a list of orders the cart is fetched again
    /// instead of being cleared locally.
    pub async fn create_order(&self) -> Result<Vec<Order>, CheckoutError> {
        let result = self.checkout().await;
        match &result {
            Ok(orders) => {
                info!(count = orders.len(), "Checkout complete");
                self.notifier
                    .notify(Notice::success("Order created successfully"));
            }
            Err(err) => {
                if matches!(
                    err,
                    CheckoutError::TokenExpired | CheckoutError::SessionExpired
                ) {
                    if let Err(e) = self.auth.logout() {
                        warn!(error = %e, "Failed to clear session");
                    }
                }
                error!(error = %err, "Checkout failed");
                let message = err.to_string();
                if !err.announced() {
                    self.notifier.notify(Notice::error(message.clone()));
                }
                self.view.write().error = Some(message);
            }
        }
        result
    }

    async fn checkout(&self) -> Result<Vec<Order>, CheckoutError> {
        if !self.auth.is_logged_in() {
            return Err(CheckoutError::NotLoggedIn);
        }
        if !self.auth.is_token_valid() {
            return Err(CheckoutError::TokenExpired);
        }

        // Queued behind any mutation already in flight, so the emptiness
        // check sees the cart that mutation produced.
        let _gate = self.gate.lock().await;
        if self.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let _loading = self.loading.start(CartOp::Checkout);
        self.view.write().error = None;
        let line_count = self.view.read().cart.line_count();

        let orders = self.orders.create_orders_from_cart().await?;

        // The server answered with a list, so whatever it created has
        // already left the cart.
        match self.api.get_cart().await {
            Ok(cart) => self.view.write().cart = cart,
            Err(e) => warn!(error = %e, "Failed to refresh cart after checkout"),
        }

        if orders.is_empty() {
            return Err(CheckoutError::NoOrdersCreated);
        }
        if orders.len() < line_count {
            warn!(
                lines = line_count,
                orders = orders.len(),
                "Fewer orders than cart lines were created"
            );
        }
        Ok(orders)
    }
}

fn describe(context: &str, detail: &str) -> String {
    if detail.is_empty() {
        context.to_string()
    } else {
        format!("{}: {}", context, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ProductApi;
    use serde_json::{json, Value};
    use shop_auth::LoginResponse;
    use shop_cache::Cache;
    use shop_data::notify::{NoticeLevel, RecordingNotifier};
    use shop_data::testing::ScriptedTransport;
    use shop_data::FetchClient;
    use std::time::Duration;

    // {"sub":"alice"}, no expiry
    const LIVE_TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJhbGljZSJ9.sig";
    // {"sub":"alice","exp":1000000000}
    const EXPIRED_TOKEN: &str =
        "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJhbGljZSIsImV4cCI6MTAwMDAwMDAwMH0.sig";

    struct Harness {
        store: CartStore,
        auth: Arc<AuthStore>,
        transport: Arc<ScriptedTransport>,
        notices: Arc<RecordingNotifier>,
    }

    fn harness() -> Harness {
        let transport = Arc::new(ScriptedTransport::new());
        let notices = Arc::new(RecordingNotifier::new());
        let auth = Arc::new(AuthStore::new(Cache::in_memory()));
        let client = FetchClient::new("http://localhost:8080/api")
            .with_transport(transport.clone())
            .with_session(auth.clone())
            .with_notifier(notices.clone());
        let catalog = Arc::new(ProductStore::new(
            ProductApi::new(client.clone()),
            notices.clone(),
        ));
        let store = CartStore::new(
            CartApi::new(client.clone()),
            OrderApi::new(client),
            auth.clone(),
            catalog,
            notices.clone(),
        );
        Harness {
            store,
            auth,
            transport,
            notices,
        }
    }

    fn login(auth: &AuthStore, token: &str) {
        let response: LoginResponse = serde_json::from_value(json!({
            "token": token,
            "user": {"id": 1, "username": "alice", "email": "a@example.com", "role": "USER"}
        }))
        .unwrap();
        auth.login(&response).unwrap();
    }

    fn cart(quantities: Value) -> Value {
        json!({"userId": 1, "productQuantities": quantities})
    }

    async fn filled(h: &Harness) {
        h.transport.push_ok(cart(json!({"1": 2, "2": 3})));
        h.store.fetch_cart().await.unwrap();
    }

    #[tokio::test]
    async fn test_replies_replace_the_cart() {
        let h = harness();
        filled(&h).await;
        assert_eq!(h.store.total_items(), 5);

        // The server caps the quantity; the local cart follows the server
        h.transport.push_ok(cart(json!({"1": 2, "2": 3, "3": 1})));
        let state = h.store.add_to_cart(ProductId::new(3), 50).await.unwrap();
        assert_eq!(h.store.cart(), state);
        assert_eq!(h.store.product_quantity(ProductId::new(3)), 1);

        h.transport.push_ok(cart(json!({"2": 3})));
        h.store.remove_from_cart(ProductId::new(1)).await.unwrap();
        assert!(!h.store.is_product_in_cart(ProductId::new(1)));
        assert_eq!(h.store.items().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_cart() {
        let h = harness();
        filled(&h).await;
        h.transport.push_fail("Product is out of stock");

        let err = h.store.add_to_cart(ProductId::new(9), 1).await.unwrap_err();
        assert!(err.announced());
        assert_eq!(h.store.total_items(), 5);
        assert!(h.store.error().unwrap().contains("out of stock"));
        // One toast, from the client
        assert_eq!(h.notices.messages(NoticeLevel::Error).len(), 1);
        assert!(!h.store.is_loading(CartOp::Add));
    }

    #[tokio::test]
    async fn test_invalid_quantity_is_not_sent() {
        let h = harness();
        let err = h.store.add_to_cart(ProductId::new(1), 0).await.unwrap_err();
        assert!(!err.announced());
        assert_eq!(h.transport.request_count(), 0);
        assert_eq!(h.notices.messages(NoticeLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_clear_with_empty_reply() {
        let h = harness();
        filled(&h).await;
        h.transport.push_ok(Value::Null);
        h.store.clear_cart().await.unwrap();
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_requires_login() {
        let h = harness();
        filled(&h).await;
        let before = h.transport.request_count();

        let err = h.store.create_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotLoggedIn));
        assert_eq!(h.transport.request_count(), before);
    }

    #[tokio::test]
    async fn test_checkout_with_expired_token() {
        let h = harness();
        login(&h.auth, EXPIRED_TOKEN);
        filled(&h).await;
        let before = h.transport.request_count();

        let err = h.store.create_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::TokenExpired));
        assert_eq!(h.transport.request_count(), before);
        assert!(!h.auth.is_logged_in());
        assert!(h.store.error().is_some());
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let h = harness();
        login(&h.auth, LIVE_TOKEN);

        let err = h.store.create_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(err.to_string().contains("empty"));
        assert_eq!(h.transport.request_count(), 0);
        assert_eq!(
            h.notices.messages(NoticeLevel::Error),
            vec![err.to_string()]
        );
    }

    #[tokio::test]
    async fn test_checkout_refetches_cart() {
        let h = harness();
        login(&h.auth, LIVE_TOKEN);
        filled(&h).await;

        h.transport.push_json(
            200,
            json!([
                {"id": 10, "productId": 1, "quantity": 2, "status": "PENDING"},
                {"id": 11, "productId": 2, "quantity": 3, "status": "PENDING"}
            ]),
        );
        h.transport.push_ok(cart(json!({})));

        let orders = h.store.create_order().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(h.store.is_empty());

        let paths: Vec<String> = h.transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(&paths[1..], ["/orders/create-from-cart", "/cart/get"]);
        assert_eq!(
            h.notices.messages(NoticeLevel::Success),
            vec!["Order created successfully".to_string()]
        );
    }

    #[tokio::test]
    async fn test_checkout_with_nothing_created() {
        let h = harness();
        login(&h.auth, LIVE_TOKEN);
        filled(&h).await;
        h.transport.push_ok(json!([]));
        h.transport.push_ok(cart(json!({"1": 2, "2": 3})));

        let err = h.store.create_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::NoOrdersCreated));
        // The server answered with a list, so the cart is still resynced
        assert_eq!(h.transport.last_request().unwrap().path, "/cart/get");
        assert_eq!(h.store.total_items(), 5);
    }

    #[tokio::test]
    async fn test_checkout_with_entity_shaped_orders() {
        let h = harness();
        login(&h.auth, LIVE_TOKEN);
        h.transport.push_ok(cart(json!({"1": 2})));
        h.store.fetch_cart().await.unwrap();

        h.transport.push_json(
            200,
            json!([{
                "id": 10,
                "user": {"id": 1},
                "product": {"id": 1},
                "seller": {"id": 2},
                "quantity": 2,
                "unitPrice": 10.0,
                "totalAmount": 20.0,
                "status": "PENDING",
                "createdAt": "2024-05-01T10:00:00"
            }]),
        );
        h.transport.push_ok(cart(json!({})));

        let orders = h.store.create_order().await.unwrap();
        assert_eq!(orders[0].product_id, ProductId::new(1));
        assert_eq!(orders[0].seller_id.get(), 2);
        assert_eq!(h.store.cart().line_count(), 0);
        assert_eq!(h.transport.request_count(), 3);
        assert_eq!(h.transport.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_waits_for_pending_add() {
        let h = harness();
        login(&h.auth, LIVE_TOKEN);
        h.transport
            .push_ok_delayed(cart(json!({"1": 1})), Duration::from_millis(200));
        h.transport.push_json(
            200,
            json!([{"id": 10, "productId": 1, "quantity": 1, "status": "PENDING"}]),
        );
        h.transport.push_ok(cart(json!({})));

        // The add is polled first and holds the gate while its reply is
        // delayed; checkout only looks at the cart after it.
        let (added, ordered) = tokio::join!(
            h.store.add_to_cart(ProductId::new(1), 1),
            h.store.create_order()
        );
        assert_eq!(added.unwrap().line_count(), 1);
        assert_eq!(ordered.unwrap().len(), 1);

        let paths: Vec<String> = h.transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, ["/cart/items", "/orders/create-from-cart", "/cart/get"]);
    }

    #[tokio::test]
    async fn test_checkout_with_malformed_reply() {
        let h = harness();
        login(&h.auth, LIVE_TOKEN);
        filled(&h).await;
        h.transport.push_ok(json!({"message": "queued"}));

        let err = h.store.create_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::UnexpectedShape(_)));
        assert_eq!(h.notices.messages(NoticeLevel::Error).len(), 1);
        // No list came back, so nothing tells us the cart changed
        assert_eq!(h.transport.last_request().unwrap().path, "/orders/create-from-cart");
    }

    #[tokio::test]
    async fn test_checkout_unauthorized() {
        let h = harness();
        login(&h.auth, LIVE_TOKEN);
        filled(&h).await;
        h.transport.push_status(401);

        let err = h.store.create_order().await.unwrap_err();
        assert!(matches!(err, CheckoutError::SessionExpired));
        assert!(!h.auth.is_logged_in());
        assert_eq!(
            h.notices.messages(NoticeLevel::Error),
            vec!["Your session has expired, please log in again".to_string()]
        );
    }

    #[tokio::test]
    async fn test_details_join_against_catalog() {
        let h = harness();
        filled(&h).await;
        // Nothing loaded in the catalog yet
        let details = h.store.items_with_details();
        assert_eq!(details.len(), 2);
        assert!(details.iter().all(|d| !d.is_resolved()));
        assert!(h.store.total_amount().is_zero());
    }
}
