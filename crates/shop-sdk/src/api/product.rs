//! `/products` endpoints.

use serde_json::{json, Value};
use shop_commerce::catalog::{
    BatchRequest, ImageUpload, Product, ProductDraft, ProductPage, ProductQuery, ProductStats,
    ProductUpdate,
};
use shop_commerce::{Money, ProductId};
use shop_data::{ApiError, ClientRequestBuilder, FetchClient, Multipart};

#[derive(Debug, Clone)]
pub struct ProductApi {
    client: FetchClient,
}

fn with_query<'a>(
    mut builder: ClientRequestBuilder<'a>,
    query: &ProductQuery,
) -> ClientRequestBuilder<'a> {
    for (key, value) in query.to_pairs() {
        builder = builder.query(key, value);
    }
    builder
}

impl ProductApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Public catalog.
    pub async fn list(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        with_query(self.client.get("/products"), query).send().await
    }

    /// Products owned by the current merchant (all products for ADMIN).
    pub async fn merchant(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        with_query(self.client.get("/products/merchant"), query)
            .send()
            .await
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, ApiError> {
        self.client.get(format!("/products/{}", id)).send().await
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        self.client.post("/products").json(draft)?.send().await
    }

    pub async fn update(&self, id: ProductId, update: &ProductUpdate) -> Result<Product, ApiError> {
        self.client
            .put(format!("/products/{}", id))
            .json(update)?
            .send()
            .await
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), ApiError> {
        self.client
            .delete(format!("/products/{}", id))
            .send_empty()
            .await
    }

    /// Flip `isAvailable`. `None` when the server replies without the
    /// product.
    pub async fn toggle_availability(&self, id: ProductId) -> Result<Option<Product>, ApiError> {
        let value = self
            .client
            .post(format!("/products/{}/toggle-availability", id))
            .send_value()
            .await?;
        match value {
            Value::Object(_) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ApiError::malformed(format!("Unexpected response shape: {}", e))),
            _ => Ok(None),
        }
    }

    pub async fn update_stock(&self, id: ProductId, stock_quantity: i64) -> Result<Product, ApiError> {
        self.client
            .put(format!("/products/{}/stock", id))
            .json(&json!({ "stockQuantity": stock_quantity }))?
            .send()
            .await
    }

    pub async fn update_price(&self, id: ProductId, price: Money) -> Result<Product, ApiError> {
        self.client
            .put(format!("/products/{}/price", id))
            .json(&json!({ "price": price }))?
            .send()
            .await
    }

    pub async fn update_discount(&self, id: ProductId, discount: f64) -> Result<Product, ApiError> {
        self.client
            .put(format!("/products/{}/discount", id))
            .json(&json!({ "discount": discount }))?
            .send()
            .await
    }

    /// Upload the main image as a multipart `file` field.
    pub async fn upload_image(
        &self,
        id: ProductId,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<ImageUpload, ApiError> {
        let form = Multipart::new().file("file", filename, content_type, data);
        self.client
            .post(format!("/products/{}/image", id))
            .multipart(form)
            .send()
            .await
    }

    pub async fn delete_image(&self, id: ProductId, image_url: Option<&str>) -> Result<(), ApiError> {
        self.client
            .delete(format!("/products/{}/image", id))
            .query_opt("imageUrl", image_url)
            .send_empty()
            .await
    }

    pub async fn search(&self, keyword: &str, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let query = query.clone().keyword(keyword);
        with_query(self.client.get("/products/search"), &query)
            .send()
            .await
    }

    pub async fn by_category(
        &self,
        category: &str,
        query: &ProductQuery,
    ) -> Result<ProductPage, ApiError> {
        let path = format!("/products/category/{}", urlencoding::encode(category));
        with_query(self.client.get(path), query).send().await
    }

    pub async fn top_selling(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        with_query(self.client.get("/products/top-selling"), query)
            .send()
            .await
    }

    pub async fn newest(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        with_query(self.client.get("/products/newest"), query)
            .send()
            .await
    }

    pub async fn statistics(&self) -> Result<ProductStats, ApiError> {
        self.client.get("/products/statistics").send().await
    }

    pub async fn batch_publish(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        self.batch("publish", ids).await
    }

    pub async fn batch_unpublish(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        self.batch("unpublish", ids).await
    }

    pub async fn batch_delete(&self, ids: &[ProductId]) -> Result<(), ApiError> {
        self.batch("delete", ids).await
    }

    async fn batch(&self, action: &str, ids: &[ProductId]) -> Result<(), ApiError> {
        let body = BatchRequest {
            product_ids: ids.to_vec(),
        };
        self.client
            .post(format!("/products/batch/{}", action))
            .json(&body)?
            .send_empty()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_data::testing::ScriptedTransport;
    use shop_data::Method;
    use std::sync::Arc;

    fn api() -> (ProductApi, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let client = FetchClient::new("http://localhost:8080/api").with_transport(transport.clone());
        (ProductApi::new(client), transport)
    }

    fn product(id: i64) -> Value {
        json!({"id": id, "productName": "Lamp", "price": 12.5, "isAvailable": true})
    }

    #[tokio::test]
    async fn test_list_sends_query() {
        let (api, transport) = api();
        transport.push_ok(json!({"data": [product(1)], "total": 1, "page": 0, "size": 12}));

        let page = api
            .list(&ProductQuery::new().page(0).size(12).category("home"))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        let path = transport.last_request().unwrap().path;
        assert!(path.starts_with("/products?"));
        assert!(path.contains("category=home"));
    }

    #[tokio::test]
    async fn test_search_sets_keyword() {
        let (api, transport) = api();
        transport.push_ok(json!({"data": []}));
        api.search("desk lamp", &ProductQuery::new()).await.unwrap();
        assert_eq!(
            transport.last_request().unwrap().path,
            "/products/search?keyword=desk%20lamp"
        );
    }

    #[tokio::test]
    async fn test_category_segment_is_encoded() {
        let (api, transport) = api();
        transport.push_ok(json!({"data": []}));
        api.by_category("home & garden", &ProductQuery::new()).await.unwrap();
        assert_eq!(
            transport.last_request().unwrap().path,
            "/products/category/home%20%26%20garden"
        );
    }

    #[tokio::test]
    async fn test_price_body() {
        let (api, transport) = api();
        transport.push_ok(product(3));
        api.update_price(ProductId::new(3), Money::from_cents(1999)).await.unwrap();
        let req = transport.last_request().unwrap();
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.path, "/products/3/price");
        assert_eq!(req.json_body().unwrap(), json!({"price": 19.99}));
    }

    #[tokio::test]
    async fn test_toggle_without_body() {
        let (api, transport) = api();
        transport.push_ok(json!(null));
        assert!(api.toggle_availability(ProductId::new(3)).await.unwrap().is_none());
        assert_eq!(
            transport.last_request().unwrap().path,
            "/products/3/toggle-availability"
        );
    }

    #[tokio::test]
    async fn test_upload_is_multipart() {
        let (api, transport) = api();
        transport.push_ok(json!({"imageUrl": "/uploads/3.png"}));
        let upload = api
            .upload_image(ProductId::new(3), "3.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(upload.image_url, "/uploads/3.png");

        let req = transport.last_request().unwrap();
        assert!(req
            .header("Content-Type")
            .unwrap()
            .starts_with("multipart/form-data; boundary="));
    }

    #[tokio::test]
    async fn test_batch_body() {
        let (api, transport) = api();
        transport.push_ok(json!(null));
        api.batch_delete(&[ProductId::new(1), ProductId::new(2)]).await.unwrap();
        let req = transport.last_request().unwrap();
        assert_eq!(req.path, "/products/batch/delete");
        assert_eq!(req.json_body().unwrap(), json!({"productIds": [1, 2]}));
    }
}
