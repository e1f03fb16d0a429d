//! `/orders` endpoints.

use crate::error::CheckoutError;
use serde_json::Value;
use shop_commerce::checkout::{
    decode_created_orders, CreateOrderRequest, Order, OrderPage, OrderQuery, OrderStatistics,
    OrderStatus, PurchaseStatus,
};
use shop_commerce::{CommerceError, OrderId, ProductId};
use shop_data::{ApiError, FetchClient};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct OrderApi {
    client: FetchClient,
}

impl OrderApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Buy a single product directly.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        let mut builder = self.client.post("/orders/create");
        for (key, value) in request.to_pairs() {
            builder = builder.query(key, value);
        }
        builder.send().await
    }

    /// Turn the whole cart into orders, one per line.
    ///
    /// The reply is normalized to a list here; an empty list is returned
    /// as-is.
    pub async fn create_orders_from_cart(&self) -> Result<Vec<Order>, CheckoutError> {
        let value = self.client.post("/orders/create-from-cart").send_value().await?;
        let orders = decode_created_orders(value).map_err(|e| match e {
            CommerceError::UnexpectedShape(msg) => CheckoutError::UnexpectedShape(msg),
            other => CheckoutError::UnexpectedShape(other.to_string()),
        })?;
        debug!(count = orders.len(), "orders created from cart");
        Ok(orders)
    }

    pub async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.client.get(format!("/orders/{}", id)).send().await
    }

    /// Orders placed by the current user.
    pub async fn my_orders(&self, query: &OrderQuery) -> Result<OrderPage, ApiError> {
        self.page("/orders/my-orders", query).await
    }

    /// Orders for products the current user sells.
    pub async fn seller_orders(&self, query: &OrderQuery) -> Result<OrderPage, ApiError> {
        self.page("/orders/seller-orders", query).await
    }

    async fn page(&self, path: &str, query: &OrderQuery) -> Result<OrderPage, ApiError> {
        let mut builder = self.client.get(path);
        for (key, value) in query.to_pairs() {
            builder = builder.query(key, value);
        }
        let value = builder.send_value().await?;
        Ok(OrderPage::from_payload(value).unwrap_or_else(|| {
            warn!(path, "unreadable order page, using an empty one");
            OrderPage::default()
        }))
    }

    /// Move an order to `status`. `None` when the server replies without
    /// the order.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, ApiError> {
        let value = self
            .client
            .put(format!("/orders/{}/status", id))
            .query("newStatus", status.as_str())
            .send_value()
            .await?;
        optional_order(value)
    }

    /// Cancel an order. `None` when the server replies without the order.
    pub async fn cancel(&self, id: OrderId) -> Result<Option<Order>, ApiError> {
        let value = self
            .client
            .put(format!("/orders/{}/cancel", id))
            .send_value()
            .await?;
        optional_order(value)
    }

    pub async fn statistics(&self) -> Result<OrderStatistics, ApiError> {
        self.client.get("/orders/statistics").send().await
    }

    /// Whether the current user has ever bought `product_id`.
    pub async fn check_purchase(&self, product_id: ProductId) -> Result<PurchaseStatus, ApiError> {
        self.client
            .get(format!("/orders/check-purchase/{}", product_id))
            .send()
            .await
    }
}

/// The order in a mutation reply. Orders decode leniently, so an object
/// without an `id` (a status message, say) counts as no order.
fn optional_order(value: Value) -> Result<Option<Order>, ApiError> {
    if !value.get("id").is_some_and(|id| !id.is_null()) {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ApiError::malformed(format!("Unexpected response shape: {}", e)))
}
