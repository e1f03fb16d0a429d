//! `/cart` endpoints. Every call answers with the whole cart.

use serde_json::Value;
use shop_commerce::cart::{AddToCart, CartState, UpdateCart};
use shop_commerce::ProductId;
use shop_data::{ApiError, FetchClient};

#[derive(Debug, Clone)]
pub struct CartApi {
    client: FetchClient,
}

impl CartApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    pub async fn get_cart(&self) -> Result<CartState, ApiError> {
        self.client.get("/cart/get").send().await
    }

    pub async fn add_item(&self, request: &AddToCart) -> Result<CartState, ApiError> {
        self.client.post("/cart/items").json(request)?.send().await
    }

    /// Replace the quantities of the listed products.
    pub async fn update_items(&self, request: &UpdateCart) -> Result<CartState, ApiError> {
        self.client.put("/cart/items").json(request)?.send().await
    }

    pub async fn remove_item(&self, product_id: ProductId) -> Result<CartState, ApiError> {
        self.client
            .delete(format!("/cart/items/{}", product_id))
            .send()
            .await
    }

    /// Empty the cart. A reply without a body means an empty cart.
    pub async fn clear(&self) -> Result<CartState, ApiError> {
        match self.client.delete("/cart").send_value().await? {
            Value::Null => Ok(CartState::default()),
            value => serde_json::from_value(value)
                .map_err(|e| ApiError::malformed(format!("Unexpected response shape: {}", e))),
        }
    }

    /// Cart aggregates. The server answers with the cart itself.
    pub async fn statistics(&self) -> Result<CartState, ApiError> {
        self.client.get("/cart/statistics").send().await
    }
}
