//! Order queries, pages, statistics and creation requests.

use super::{Order, OrderStatus};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size for order lists.
pub const DEFAULT_ORDER_PAGE_SIZE: u32 = 10;

/// Paging and filter for the order list endpoints. `page` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderQuery {
    pub page: u32,
    pub size: u32,
    pub status: Option<OrderStatus>,
}

impl Default for OrderQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_ORDER_PAGE_SIZE,
            status: None,
        }
    }
}

impl OrderQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<OrderStatus>) -> Self {
        self.status = status;
        self
    }

    /// Query-string pairs. `status` is omitted when unset.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
        ];
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }
}

/// One page of orders. `current_page` is zero-based.
///
/// `Default` is the zero-state page used whenever the server's payload
/// cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub current_page: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl OrderPage {
    /// Read a page from a raw payload.
    ///
    /// Returns `None` when the payload is not an object or does not decode,
    /// so the caller can fall back to the zero-state page.
    pub fn from_payload(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Order counters for the current user (or seller).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub total_amount: Money,
}

/// Answer of the purchase check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseStatus {
    pub has_purchased: bool,
    pub product_id: ProductId,
}

/// Single-product purchase, sent as query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

impl CreateOrderRequest {
    pub fn new(product_id: ProductId, quantity: i64) -> Result<Self, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let quantity =
            u32::try_from(quantity).map_err(|_| CommerceError::InvalidQuantity(quantity))?;
        Ok(Self {
            product_id,
            quantity,
            remarks: None,
            shipping_address: None,
            contact_phone: None,
        })
    }

    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn shipping_address(mut self, address: impl Into<String>) -> Self {
        self.shipping_address = Some(address.into());
        self
    }

    pub fn contact_phone(mut self, phone: impl Into<String>) -> Self {
        self.contact_phone = Some(phone.into());
        self
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("productId", self.product_id.to_string()),
            ("quantity", self.quantity.to_string()),
        ];
        if let Some(remarks) = &self.remarks {
            pairs.push(("remarks", remarks.clone()));
        }
        if let Some(address) = &self.shipping_address {
            pairs.push(("shippingAddress", address.clone()));
        }
        if let Some(phone) = &self.contact_phone {
            pairs.push(("contactPhone", phone.clone()));
        }
        pairs
    }
}

/// Normalize the create-from-cart payload to a list of orders.
///
/// Accepts a bare array, `{data: [...]}` and `{data: {data: [...]}}`; the
/// list is found on the raw value before any element is decoded. Anything
/// else (including `null`) is an
/// [`UnexpectedShape`](CommerceError::UnexpectedShape) error.
///
/// Elements decode leniently (see [`Order`]); an element that is not an
/// object at all is skipped. An empty list is returned as-is; deciding
/// whether that is a failure is up to the caller.
pub fn decode_created_orders(value: Value) -> Result<Vec<Order>, CommerceError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut outer) => match outer.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Object(mut inner)) => match inner.remove("data") {
                Some(Value::Array(items)) => items,
                _ => return Err(unexpected("an object")),
            },
            _ => return Err(unexpected("an object")),
        },
        other => return Err(unexpected(shape_of(&other))),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn unexpected(shape: &str) -> CommerceError {
    CommerceError::UnexpectedShape(format!("expected a list of orders, got {}", shape))
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
