//! Product list, detail and statistics state.

use super::loading::LoadingFlags;
use crate::api::ProductApi;
use crate::error::StoreError;
use parking_lot::RwLock;
use shop_commerce::catalog::{
    validate_discount, validate_price, ImageUpload, Product, ProductDraft, ProductPage,
    ProductQuery, ProductStats, ProductUpdate, DEFAULT_PRODUCT_PAGE_SIZE,
};
use shop_commerce::search::Pagination;
use shop_commerce::{CommerceError, Money, ProductId};
use shop_data::{ApiError, Notice, Notifier};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, warn};

/// Operations with their own loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductOp {
    List,
    Detail,
    Mutate,
    Statistics,
}

#[derive(Debug)]
struct ProductView {
    products: Vec<Product>,
    current: Option<Product>,
    pagination: Pagination,
    stats: Option<ProductStats>,
    error: Option<String>,
}

impl Default for ProductView {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            current: None,
            pagination: empty_pagination(),
            stats: None,
            error: None,
        }
    }
}

fn empty_pagination() -> Pagination {
    Pagination::new(1, DEFAULT_PRODUCT_PAGE_SIZE, 0)
}

/// Mirrors the product list and the product being viewed.
///
/// Mutations apply only what the server returns: the matching list entry
/// and the current product are replaced by the server's object, never
/// patched locally.
pub struct ProductStore {
    api: ProductApi,
    notifier: Arc<dyn Notifier>,
    view: RwLock<ProductView>,
    loading: LoadingFlags<ProductOp>,
}

impl std::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore")
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

impl ProductStore {
    pub fn new(api: ProductApi, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            view: RwLock::new(ProductView::default()),
            loading: LoadingFlags::new(),
        }
    }

    // ----- snapshots -----

    pub fn products(&self) -> Vec<Product> {
        self.view.read().products.clone()
    }

    pub fn current(&self) -> Option<Product> {
        self.view.read().current.clone()
    }

    /// Product with `id` from the loaded list.
    pub fn find(&self, id: ProductId) -> Option<Product> {
        self.view.read().products.iter().find(|p| p.id == id).cloned()
    }

    pub fn pagination(&self) -> Pagination {
        self.view.read().pagination
    }

    pub fn total_products(&self) -> u64 {
        self.view.read().pagination.total
    }

    pub fn has_next(&self) -> bool {
        self.view.read().pagination.has_next()
    }

    pub fn has_prev(&self) -> bool {
        self.view.read().pagination.has_prev()
    }

    pub fn stats(&self) -> Option<ProductStats> {
        self.view.read().stats.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.view.read().error.clone()
    }

    pub fn is_loading(&self, op: ProductOp) -> bool {
        self.loading.is_loading(op)
    }

    /// Drop the list, the current product and the pagination.
    pub fn clear(&self) {
        let mut view = self.view.write();
        view.products.clear();
        view.current = None;
        view.pagination = empty_pagination();
        view.error = None;
    }

    // ----- lists -----

    pub async fn fetch_products(&self, query: &ProductQuery) -> Result<ProductPage, StoreError> {
        self.load_list("Failed to load products", self.api.list(query)).await
    }

    /// Products of the signed-in merchant.
    pub async fn fetch_merchant_products(
        &self,
        query: &ProductQuery,
    ) -> Result<ProductPage, StoreError> {
        self.load_list("Failed to load products", self.api.merchant(query))
            .await
    }

    pub async fn search_products(
        &self,
        keyword: &str,
        query: &ProductQuery,
    ) -> Result<ProductPage, StoreError> {
        self.load_list("Product search failed", self.api.search(keyword, query))
            .await
    }

    pub async fn fetch_products_by_category(
        &self,
        category: &str,
        query: &ProductQuery,
    ) -> Result<ProductPage, StoreError> {
        self.load_list(
            "Failed to load category",
            self.api.by_category(category, query),
        )
        .await
    }

    pub async fn fetch_top_selling(&self, query: &ProductQuery) -> Result<ProductPage, StoreError> {
        self.load_list("Failed to load top sellers", self.api.top_selling(query))
            .await
    }

    pub async fn fetch_newest(&self, query: &ProductQuery) -> Result<ProductPage, StoreError> {
        self.load_list("Failed to load new arrivals", self.api.newest(query))
            .await
    }

    /// Replace the list with a fetched page. On failure the list is emptied
    /// rather than left showing results for a different query.
    async fn load_list(
        &self,
        context: &str,
        call: impl Future<Output = Result<ProductPage, ApiError>>,
    ) -> Result<ProductPage, StoreError> {
        let _loading = self.loading.start(ProductOp::List);
        match call.await {
            Ok(page) => {
                let mut view = self.view.write();
                view.pagination = Pagination::from_zero_based(
                    page.page,
                    if page.size == 0 {
                        DEFAULT_PRODUCT_PAGE_SIZE
                    } else {
                        page.size
                    },
                    page.total,
                );
                view.products = page.data.clone();
                view.error = None;
                Ok(page)
            }
            Err(err) => {
                {
                    let mut view = self.view.write();
                    view.products.clear();
                    view.pagination = empty_pagination();
                }
                Err(self.fail(context, err.into()))
            }
        }
    }

    // ----- detail -----

    pub async fn fetch_product(&self, id: ProductId) -> Result<Product, StoreError> {
        let _loading = self.loading.start(ProductOp::Detail);
        match self.api.get(id).await {
            Ok(product) => {
                self.view.write().current = Some(product.clone());
                Ok(product)
            }
            Err(err) => Err(self.fail("Failed to load product", err.into())),
        }
    }

    // ----- mutations -----

    /// Create a product and put it at the head of the list.
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, StoreError> {
        if let Err(e) = draft.validate() {
            return Err(self.fail("Invalid product", e.into()));
        }
        let _loading = self.loading.start(ProductOp::Mutate);
        match self.api.create(draft).await {
            Ok(product) => {
                self.view.write().products.insert(0, product.clone());
                self.notifier.notify(Notice::success("Product created"));
                Ok(product)
            }
            Err(err) => Err(self.fail("Failed to create product", err.into())),
        }
    }

    pub async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, StoreError> {
        if let Err(e) = update.validate() {
            return Err(self.fail("Invalid product update", e.into()));
        }
        self.replace_with("Product updated", "Failed to update product", self.api.update(id, update))
            .await
    }

    /// Remove a product, dropping it from the list and the detail view.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let _loading = self.loading.start(ProductOp::Mutate);
        match self.api.delete(id).await {
            Ok(()) => {
                self.remove_local(&[id]);
                self.notifier.notify(Notice::success("Product deleted"));
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to delete product", err.into())),
        }
    }

    /// Flip availability. When the server replies without the product it
    /// is fetched again, so the local copy is still the server's.
    pub async fn toggle_availability(&self, id: ProductId) -> Result<Product, StoreError> {
        let _loading = self.loading.start(ProductOp::Mutate);
        let result = match self.api.toggle_availability(id).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => self.api.get(id).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(product) => {
                self.replace_local(&product);
                let message = if product.is_available {
                    "Product is now listed"
                } else {
                    "Product is now unlisted"
                };
                self.notifier.notify(Notice::success(message));
                Ok(product)
            }
            Err(err) => Err(self.fail("Failed to change availability", err.into())),
        }
    }

    pub async fn update_stock(&self, id: ProductId, stock_quantity: i64) -> Result<Product, StoreError> {
        if stock_quantity < 0 {
            return Err(self.fail(
                "Invalid stock",
                CommerceError::InvalidQuantity(stock_quantity).into(),
            ));
        }
        self.replace_with(
            "Stock updated",
            "Failed to update stock",
            self.api.update_stock(id, stock_quantity),
        )
        .await
    }

    pub async fn update_price(&self, id: ProductId, price: f64) -> Result<Product, StoreError> {
        if let Err(e) = validate_price(price) {
            return Err(self.fail("Invalid price", e.into()));
        }
        self.replace_with(
            "Price updated",
            "Failed to update price",
            self.api.update_price(id, Money::from_decimal(price)),
        )
        .await
    }

    /// Set the discount percentage (0 to 100).
    pub async fn update_discount(&self, id: ProductId, discount: f64) -> Result<Product, StoreError> {
        if let Err(e) = validate_discount(discount) {
            return Err(self.fail("Invalid discount", e.into()));
        }
        self.replace_with(
            "Discount updated",
            "Failed to update discount",
            self.api.update_discount(id, discount),
        )
        .await
    }

    /// Upload the main image, then reload the product.
    pub async fn upload_image(
        &self,
        id: ProductId,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<ImageUpload, StoreError> {
        let _loading = self.loading.start(ProductOp::Mutate);
        let upload = match self.api.upload_image(id, filename, content_type, data).await {
            Ok(upload) => upload,
            Err(err) => return Err(self.fail("Failed to upload image", err.into())),
        };
        self.notifier.notify(Notice::success("Image uploaded"));
        self.reload(id).await;
        Ok(upload)
    }

    /// Delete an image (the main one when `image_url` is `None`), then
    /// reload the product.
    pub async fn delete_image(&self, id: ProductId, image_url: Option<&str>) -> Result<(), StoreError> {
        let _loading = self.loading.start(ProductOp::Mutate);
        if let Err(err) = self.api.delete_image(id, image_url).await {
            return Err(self.fail("Failed to delete image", err.into()));
        }
        self.notifier.notify(Notice::success("Image deleted"));
        self.reload(id).await;
        Ok(())
    }

    /// List several products. The loaded list is not touched; refetch it to
    /// see the change.
    pub async fn batch_publish(&self, ids: &[ProductId]) -> Result<(), StoreError> {
        self.batch(ids, "Products listed", "Failed to list products", self.api.batch_publish(ids))
            .await
    }

    pub async fn batch_unpublish(&self, ids: &[ProductId]) -> Result<(), StoreError> {
        self.batch(
            ids,
            "Products unlisted",
            "Failed to unlist products",
            self.api.batch_unpublish(ids),
        )
        .await
    }

    /// Delete several products and drop them locally.
    pub async fn batch_delete(&self, ids: &[ProductId]) -> Result<(), StoreError> {
        self.batch(ids, "Products deleted", "Failed to delete products", self.api.batch_delete(ids))
            .await?;
        self.remove_local(ids);
        Ok(())
    }

    async fn batch(
        &self,
        ids: &[ProductId],
        success: &str,
        context: &str,
        call: impl Future<Output = Result<(), ApiError>>,
    ) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let _loading = self.loading.start(ProductOp::Mutate);
        match call.await {
            Ok(()) => {
                self.notifier
                    .notify(Notice::success(format!("{} ({})", success, ids.len())));
                Ok(())
            }
            Err(err) => Err(self.fail(context, err.into())),
        }
    }

    // ----- statistics -----

    /// Catalog statistics. On failure the zero-state statistics are stored
    /// and the error is still returned.
    pub async fn fetch_statistics(&self) -> Result<ProductStats, StoreError> {
        let _loading = self.loading.start(ProductOp::Statistics);
        match self.api.statistics().await {
            Ok(stats) => {
                self.view.write().stats = Some(stats.clone());
                Ok(stats)
            }
            Err(err) => {
                self.view.write().stats = Some(ProductStats::default());
                Err(self.fail("Failed to load statistics", err.into()))
            }
        }
    }

    // ----- helpers -----

    async fn replace_with(
        &self,
        success: &str,
        context: &str,
        call: impl Future<Output = Result<Product, ApiError>>,
    ) -> Result<Product, StoreError> {
        let _loading = self.loading.start(ProductOp::Mutate);
        match call.await {
            Ok(product) => {
                self.replace_local(&product);
                self.notifier.notify(Notice::success(success));
                Ok(product)
            }
            Err(err) => Err(self.fail(context, err.into())),
        }
    }

    async fn reload(&self, id: ProductId) {
        match self.api.get(id).await {
            Ok(product) => self.replace_local(&product),
            Err(e) => warn!(product = %id, error = %e, "Failed to reload product"),
        }
    }

    fn replace_local(&self, product: &Product) {
        let mut view = self.view.write();
        if let Some(slot) = view.products.iter_mut().find(|p| p.id == product.id) {
            *slot = product.clone();
        }
        if view.current.as_ref().is_some_and(|c| c.id == product.id) {
            view.current = Some(product.clone());
        }
        view.error = None;
    }

    fn remove_local(&self, ids: &[ProductId]) {
        let mut view = self.view.write();
        view.products.retain(|p| !ids.contains(&p.id));
        if view.current.as_ref().is_some_and(|c| ids.contains(&c.id)) {
            view.current = None;
        }
    }

    fn fail(&self, context: &str, err: StoreError) -> StoreError {
        error!(error = %err, "{}", context);
        let message = format!("{}: {}", context, err);
        if !err.announced() {
            self.notifier.notify(Notice::error(message.clone()));
        }
        self.view.write().error = Some(message);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use shop_data::notify::{NoticeLevel, RecordingNotifier};
    use shop_data::testing::ScriptedTransport;
    use shop_data::FetchClient;

    struct Harness {
        store: ProductStore,
        transport: Arc<ScriptedTransport>,
        notices: Arc<RecordingNotifier>,
    }

    fn harness() -> Harness {
        let transport = Arc::new(ScriptedTransport::new());
        let notices = Arc::new(RecordingNotifier::new());
        let client = FetchClient::new("http://localhost:8080/api")
            .with_transport(transport.clone())
            .with_notifier(notices.clone());
        Harness {
            store: ProductStore::new(ProductApi::new(client), notices.clone()),
            transport,
            notices,
        }
    }

    fn product(id: i64, available: bool, stock: i64) -> Value {
        json!({
            "id": id,
            "productName": format!("p{}", id),
            "price": 10.0,
            "isAvailable": available,
            "stockQuantity": stock
        })
    }

    async fn seeded() -> Harness {
        let h = harness();
        h.transport.push_ok(json!({
            "data": [product(1, true, 5), product(2, true, 0)],
            "total": 2,
            "page": 0,
            "size": 12,
            "totalPages": 1
        }));
        h.store.fetch_products(&ProductQuery::new()).await.unwrap();
        h
    }

    #[tokio::test]
    async fn test_fetch_sets_list_and_pagination() {
        let h = seeded().await;
        assert_eq!(h.store.products().len(), 2);
        let p = h.store.pagination();
        assert_eq!(p.page, 1);
        assert_eq!(p.total, 2);
        assert!(!h.store.has_next());
        assert!(!h.store.is_loading(ProductOp::List));
    }

    #[tokio::test]
    async fn test_failed_fetch_empties_list() {
        let h = seeded().await;
        h.transport.push_status(500);
        assert!(h.store.fetch_products(&ProductQuery::new()).await.is_err());
        assert!(h.store.products().is_empty());
        assert_eq!(h.store.pagination().total, 0);
        assert!(h.store.error().is_some());
        // The client already announced the failure
        assert_eq!(h.notices.messages(NoticeLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_with_server_object() {
        let h = seeded().await;
        h.transport.push_ok(product(2, true, 3));
        h.store.fetch_product(ProductId::new(2)).await.unwrap();

        // The server recalculates availability on its own
        h.transport.push_ok(product(2, false, 0));
        let updated = h.store.update_stock(ProductId::new(2), 0).await.unwrap();
        assert!(!updated.is_available);
        assert!(!h.store.find(ProductId::new(2)).unwrap().is_available);
        assert!(!h.store.current().unwrap().is_available);
        assert_eq!(
            h.notices.messages(NoticeLevel::Success),
            vec!["Stock updated".to_string()]
        );
    }

    #[tokio::test]
    async fn test_create_prepends() {
        let h = seeded().await;
        h.transport.push_ok(product(9, true, 1));
        let draft = ProductDraft {
            product_name: "p9".to_string(),
            price: 10.0,
            stock_quantity: 1,
            is_available: true,
            ..Default::default()
        };
        h.store.create_product(&draft).await.unwrap();
        assert_eq!(h.store.products()[0].id, ProductId::new(9));
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_sent() {
        let h = seeded().await;
        let before = h.transport.request_count();
        let draft = ProductDraft {
            product_name: " ".to_string(),
            ..Default::default()
        };
        let err = h.store.create_product(&draft).await.unwrap_err();
        assert!(!err.announced());
        assert_eq!(h.transport.request_count(), before);
        assert_eq!(h.notices.messages(NoticeLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_delete_clears_current() {
        let h = seeded().await;
        h.transport.push_ok(product(1, true, 5));
        h.store.fetch_product(ProductId::new(1)).await.unwrap();

        h.transport.push_ok(json!(null));
        h.store.delete_product(ProductId::new(1)).await.unwrap();
        assert!(h.store.find(ProductId::new(1)).is_none());
        assert!(h.store.current().is_none());
    }

    #[tokio::test]
    async fn test_toggle_refetches_when_reply_is_empty() {
        let h = seeded().await;
        h.transport.push_ok(json!(null));
        h.transport.push_ok(product(1, false, 5));

        let product = h.store.toggle_availability(ProductId::new(1)).await.unwrap();
        assert!(!product.is_available);
        assert!(!h.store.find(ProductId::new(1)).unwrap().is_available);
        assert_eq!(h.transport.last_request().unwrap().path, "/products/1");
    }

    #[tokio::test]
    async fn test_discount_out_of_range() {
        let h = seeded().await;
        assert!(h.store.update_discount(ProductId::new(1), 120.0).await.is_err());
        assert_eq!(h.transport.pending(), 0);
    }

    #[tokio::test]
    async fn test_statistics_fall_back_to_zero() {
        let h = harness();
        h.transport.push_status(503);
        assert!(h.store.fetch_statistics().await.is_err());
        assert_eq!(h.store.stats(), Some(ProductStats::default()));
    }

    #[tokio::test]
    async fn test_batch_delete_drops_locally() {
        let h = seeded().await;
        h.transport.push_ok(json!(null));
        h.store
            .batch_delete(&[ProductId::new(1), ProductId::new(2)])
            .await
            .unwrap();
        assert!(h.store.products().is_empty());
    }
}
