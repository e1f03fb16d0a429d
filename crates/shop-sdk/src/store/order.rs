//! Order list, detail and statistics state.

use super::loading::LoadingFlags;
use crate::api::OrderApi;
use crate::error::StoreError;
use parking_lot::RwLock;
use shop_commerce::checkout::{
    CreateOrderRequest, Order, OrderPage, OrderQuery, OrderStatistics, OrderStatus,
    DEFAULT_ORDER_PAGE_SIZE,
};
use shop_commerce::search::Pagination;
use shop_commerce::{OrderId, ProductId};
use shop_data::{ApiError, Notice, Notifier};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderOp {
    List,
    Detail,
    Statistics,
    Update,
}

/// Order counts per status for the loaded page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub by_status: HashMap<OrderStatus, usize>,
}

impl StatusCounts {
    pub fn get(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
struct OrderView {
    orders: Vec<Order>,
    error: Option<String>,
    current: Option<Order>,
    current_error: Option<String>,
    /// 1-based, as shown to the user.
    current_page: u32,
    page_size: u32,
    total_elements: u64,
    total_pages: u32,
    selected_status: Option<OrderStatus>,
    statistics: Option<OrderStatistics>,
}

impl Default for OrderView {
    fn default() -> Self {
        Self {
            orders: Vec::new(),
            error: None,
            current: None,
            current_error: None,
            current_page: 1,
            page_size: DEFAULT_ORDER_PAGE_SIZE,
            total_elements: 0,
            total_pages: 0,
            selected_status: None,
            statistics: None,
        }
    }
}

/// Orders of the signed-in buyer or seller.
pub struct OrderStore {
    api: OrderApi,
    notifier: Arc<dyn Notifier>,
    view: RwLock<OrderView>,
    loading: LoadingFlags<OrderOp>,
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore")
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

impl OrderStore {
    pub fn new(api: OrderApi, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            view: RwLock::new(OrderView::default()),
            loading: LoadingFlags::new(),
        }
    }

    pub fn orders(&self) -> Vec<Order> {
        self.view.read().orders.clone()
    }

    pub fn current(&self) -> Option<Order> {
        self.view.read().current.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.view.read().error.clone()
    }

    pub fn current_error(&self) -> Option<String> {
        self.view.read().current_error.clone()
    }

    pub fn statistics(&self) -> Option<OrderStatistics> {
        self.view.read().statistics.clone()
    }

    pub fn selected_status(&self) -> Option<OrderStatus> {
        self.view.read().selected_status
    }

    pub fn is_loading(&self, op: OrderOp) -> bool {
        self.loading.is_loading(op)
    }

    /// Paging of the loaded list, 1-based.
    pub fn pagination(&self) -> Pagination {
        let view = self.view.read();
        Pagination::new(view.current_page, view.page_size, view.total_elements)
    }

    pub fn total_pages(&self) -> u32 {
        self.view.read().total_pages
    }

    /// Counts per status over the loaded orders.
    pub fn orders_by_status(&self) -> StatusCounts {
        let view = self.view.read();
        let mut counts = StatusCounts {
            total: view.orders.len(),
            by_status: HashMap::new(),
        };
        for order in &view.orders {
            *counts.by_status.entry(order.status).or_insert(0) += 1;
        }
        counts
    }

    /// Loaded orders matching the selected status filter.
    pub fn filtered_orders(&self) -> Vec<Order> {
        let view = self.view.read();
        match view.selected_status {
            Some(status) => view
                .orders
                .iter()
                .filter(|o| o.status == status)
                .cloned()
                .collect(),
            None => view.orders.clone(),
        }
    }

    pub fn set_page(&self, page: u32) {
        self.view.write().current_page = page.max(1);
    }

    pub fn set_page_size(&self, size: u32) {
        let mut view = self.view.write();
        view.page_size = size.max(1);
        view.current_page = 1;
    }

    pub fn set_status_filter(&self, status: Option<OrderStatus>) {
        let mut view = self.view.write();
        view.selected_status = status;
        view.current_page = 1;
    }

    /// Back to the initial state.
    pub fn reset(&self) {
        *self.view.write() = OrderView::default();
    }

    fn default_query(&self) -> OrderQuery {
        let view = self.view.read();
        OrderQuery::new(view.current_page.saturating_sub(1), view.page_size)
            .with_status(view.selected_status)
    }

    // ----- lists -----

    /// Load the buyer's orders. Without a query, the stored page, size and
    /// status filter are used.
    pub async fn fetch_orders(&self, query: Option<OrderQuery>) -> Result<OrderPage, StoreError> {
        let query = query.unwrap_or_else(|| self.default_query());
        self.load_page("Failed to load orders", query, self.api.my_orders(&query))
            .await
    }

    /// Load the orders for the seller's products.
    pub async fn fetch_seller_orders(
        &self,
        query: Option<OrderQuery>,
    ) -> Result<OrderPage, StoreError> {
        let query = query.unwrap_or_else(|| self.default_query());
        self.load_page(
            "Failed to load seller orders",
            query,
            self.api.seller_orders(&query),
        )
        .await
    }

    async fn load_page(
        &self,
        context: &str,
        query: OrderQuery,
        call: impl Future<Output = Result<OrderPage, ApiError>>,
    ) -> Result<OrderPage, StoreError> {
        let _loading = self.loading.start(OrderOp::List);
        self.view.write().error = None;
        match call.await {
            Ok(page) => {
                let mut view = self.view.write();
                view.orders = page.orders.clone();
                view.current_page = page.current_page + 1;
                view.page_size = query.size;
                view.total_elements = page.total_elements;
                view.total_pages = page.total_pages;
                Ok(page)
            }
            Err(err) => {
                let err = StoreError::from(err);
                let message = self.report(context, &err);
                self.view.write().error = Some(message);
                Err(err)
            }
        }
    }

    // ----- detail -----

    pub async fn fetch_order_detail(&self, id: OrderId) -> Result<Order, StoreError> {
        let _loading = self.loading.start(OrderOp::Detail);
        self.view.write().current_error = None;
        match self.api.order(id).await {
            Ok(order) => {
                self.view.write().current = Some(order.clone());
                Ok(order)
            }
            Err(err) => {
                let err = StoreError::from(err);
                let message = self.report("Failed to load order", &err);
                self.view.write().current_error = Some(message);
                Err(err)
            }
        }
    }

    pub async fn fetch_statistics(&self) -> Result<OrderStatistics, StoreError> {
        let _loading = self.loading.start(OrderOp::Statistics);
        match self.api.statistics().await {
            Ok(stats) => {
                self.view.write().statistics = Some(stats.clone());
                Ok(stats)
            }
            Err(err) => {
                let err = StoreError::from(err);
                self.report("Failed to load order statistics", &err);
                Err(err)
            }
        }
    }

    /// Whether the signed-in user has bought `product_id`. Any failure
    /// reads as "no".
    pub async fn check_purchase_status(&self, product_id: ProductId) -> bool {
        match self.api.check_purchase(product_id).await {
            Ok(status) => status.has_purchased,
            Err(e) => {
                warn!(product = %product_id, error = %e, "Purchase check failed");
                false
            }
        }
    }

    // ----- mutations -----

    /// Buy a single product and put the order at the head of the list.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, StoreError> {
        let _loading = self.loading.start(OrderOp::Update);
        match self.api.create_order(request).await {
            Ok(order) => {
                {
                    let mut view = self.view.write();
                    view.orders.insert(0, order.clone());
                    view.total_elements += 1;
                }
                self.notifier.notify(Notice::success("Order created successfully"));
                Ok(order)
            }
            Err(err) => Err(self.fail("Failed to create order", err.into())),
        }
    }

    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let result = self.api.update_status(id, status).await;
        self.apply_change(id, "Order status updated", "Failed to update order", result)
            .await
    }

    pub async fn cancel_order(&self, id: OrderId) -> Result<Order, StoreError> {
        let result = self.api.cancel(id).await;
        self.apply_change(id, "Order cancelled", "Failed to cancel order", result)
            .await
    }

    /// Put the server's copy of the order into the list and the detail view.
    /// A reply without the order is followed by a fetch of it.
    async fn apply_change(
        &self,
        id: OrderId,
        success: &str,
        context: &str,
        result: Result<Option<Order>, ApiError>,
    ) -> Result<Order, StoreError> {
        let _loading = self.loading.start(OrderOp::Update);
        let order = match result {
            Ok(Some(order)) => Ok(order),
            Ok(None) => self.api.order(id).await,
            Err(err) => Err(err),
        };
        match order {
            Ok(order) => {
                {
                    let mut view = self.view.write();
                    if let Some(slot) = view.orders.iter_mut().find(|o| o.id == order.id) {
                        *slot = order.clone();
                    }
                    if view.current.as_ref().is_some_and(|c| c.id == order.id) {
                        view.current = Some(order.clone());
                    }
                    view.error = None;
                }
                self.notifier.notify(Notice::success(success));
                Ok(order)
            }
            Err(err) => Err(self.fail(context, err.into())),
        }
    }

    fn fail(&self, context: &str, err: StoreError) -> StoreError {
        let message = self.report(context, &err);
        self.view.write().error = Some(message);
        err
    }

    fn report(&self, context: &str, err: &StoreError) -> String {
        error!(error = %err, "{}", context);
        let message = format!("{}: {}", context, err);
        if !err.announced() {
            self.notifier.notify(Notice::error(message.clone()));
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use shop_data::notify::{NoticeLevel, RecordingNotifier};
    use shop_data::testing::ScriptedTransport;
    use shop_data::FetchClient;

    fn harness() -> (OrderStore, Arc<ScriptedTransport>, Arc<RecordingNotifier>) {
        let transport = Arc::new(ScriptedTransport::new());
        let notices = Arc::new(RecordingNotifier::new());
        let client = FetchClient::new("http://localhost:8080/api")
            .with_transport(transport.clone())
            .with_notifier(notices.clone());
        (
            OrderStore::new(OrderApi::new(client), notices.clone()),
            transport,
            notices,
        )
    }

    fn order(id: i64, status: &str) -> Value {
        json!({"id": id, "productId": 1, "quantity": 1, "status": status})
    }

    fn page(orders: Vec<Value>, current: u32, total: u64) -> Value {
        json!({
            "orders": orders,
            "currentPage": current,
            "totalElements": total,
            "totalPages": 2,
            "hasNext": current == 0,
            "hasPrevious": current > 0
        })
    }

    async fn loaded() -> (OrderStore, Arc<ScriptedTransport>, Arc<RecordingNotifier>) {
        let (store, transport, notices) = harness();
        transport.push_ok(page(
            vec![order(1, "PENDING"), order(2, "PAID"), order(3, "PENDING")],
            0,
            13,
        ));
        store.fetch_orders(None).await.unwrap();
        (store, transport, notices)
    }

    #[tokio::test]
    async fn test_pages_translate_to_one_based() {
        let (store, transport, _) = loaded().await;
        assert_eq!(store.pagination().page, 1);
        assert_eq!(store.pagination().total, 13);
        assert_eq!(transport.last_request().unwrap().path, "/orders/my-orders?page=0&size=10");

        store.set_page(2);
        transport.push_ok(page(vec![order(4, "SHIPPED")], 1, 13));
        store.fetch_orders(None).await.unwrap();
        assert_eq!(transport.last_request().unwrap().path, "/orders/my-orders?page=1&size=10");
        assert_eq!(store.pagination().page, 2);
    }

    #[tokio::test]
    async fn test_status_filter_resets_page() {
        let (store, transport, _) = loaded().await;
        store.set_page(2);
        store.set_status_filter(Some(OrderStatus::Paid));
        assert_eq!(store.pagination().page, 1);

        transport.push_ok(page(vec![order(2, "PAID")], 0, 1));
        store.fetch_seller_orders(None).await.unwrap();
        assert_eq!(
            transport.last_request().unwrap().path,
            "/orders/seller-orders?page=0&size=10&status=PAID"
        );
    }

    #[tokio::test]
    async fn test_null_page_is_zero_state() {
        let (store, transport, _) = harness();
        transport.push_ok(Value::Null);
        let page = store.fetch_orders(None).await.unwrap();
        assert_eq!(page, OrderPage::default());
        assert!(store.orders().is_empty());
        assert_eq!(store.pagination().page, 1);
    }

    #[tokio::test]
    async fn test_counts_and_filter() {
        let (store, _, _) = loaded().await;
        let counts = store.orders_by_status();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.get(OrderStatus::Pending), 2);
        assert_eq!(counts.get(OrderStatus::Shipped), 0);

        store.set_status_filter(Some(OrderStatus::Pending));
        assert_eq!(store.filtered_orders().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_replaces_list_entry_and_detail() {
        let (store, transport, notices) = loaded().await;
        transport.push_ok(order(1, "PENDING"));
        store.fetch_order_detail(OrderId::new(1)).await.unwrap();

        transport.push_ok(order(1, "CANCELLED"));
        store.cancel_order(OrderId::new(1)).await.unwrap();

        assert_eq!(store.orders()[0].status, OrderStatus::Cancelled);
        assert_eq!(store.current().unwrap().status, OrderStatus::Cancelled);
        assert_eq!(
            notices.messages(NoticeLevel::Success),
            vec!["Order cancelled".to_string()]
        );
    }

    #[tokio::test]
    async fn test_status_update_without_body_refetches() {
        let (store, transport, _) = loaded().await;
        transport.push_ok(Value::Null);
        transport.push_ok(order(2, "SHIPPED"));

        let updated = store
            .update_order_status(OrderId::new(2), OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(store.orders()[1].status, OrderStatus::Shipped);
        assert_eq!(transport.last_request().unwrap().path, "/orders/2");
    }

    #[tokio::test]
    async fn test_failed_update_is_announced_once() {
        let (store, transport, notices) = loaded().await;
        transport.push_fail("Order cannot be cancelled");
        assert!(store.cancel_order(OrderId::new(3)).await.is_err());
        assert_eq!(notices.messages(NoticeLevel::Error).len(), 1);
        assert!(store.error().unwrap().contains("cannot be cancelled"));
        assert_eq!(store.orders()[2].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_purchase_check_defaults_to_false() {
        let (store, transport, _) = harness();
        transport.push_ok(json!({"hasPurchased": true, "productId": 5}));
        assert!(store.check_purchase_status(ProductId::new(5)).await);

        transport.push_status(500);
        assert!(!store.check_purchase_status(ProductId::new(5)).await);
    }

    #[tokio::test]
    async fn test_create_order_prepends() {
        let (store, transport, _) = loaded().await;
        transport.push_ok(order(9, "PENDING"));
        let request = CreateOrderRequest::new(ProductId::new(1), 1).unwrap();
        store.create_order(&request).await.unwrap();
        assert_eq!(store.orders()[0].id, OrderId::new(9));
        assert_eq!(store.pagination().total, 14);
    }
}
