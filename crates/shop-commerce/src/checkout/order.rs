//! Order types.

use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, awaiting payment.
    #[default]
    Pending,
    Paid,
    Shipped,
    Completed,
    Cancelled,
    /// A status this client does not know. Kept so the rest of the order
    /// still reads.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Every known status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Paid => "Paid",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Unknown => "Unknown",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Only a pending order can be cancelled; the server refuses the rest.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| CommerceError::UnknownOrderStatus(s.to_string()))
    }
}

/// An order. One order covers exactly one product line.
///
/// Product, price and seller fields are a snapshot taken when the order was
/// placed; they do not follow later catalog changes.
///
/// Decoding accepts both the flat order DTO and the entity shape, where the
/// buyer, product and seller are nested objects (`{"product": {"id": 1}}`).
/// Missing or `null` fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "OrderWire")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub username: String,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_description: Option<String>,
    pub product_image: Option<String>,
    pub seller_id: UserId,
    pub seller_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub status_description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub remarks: Option<String>,
    pub shipping_info: Option<String>,
    pub payment_info: Option<String>,
    pub shipping_address: Option<String>,
    pub contact_phone: Option<String>,
}

/// Nested entity reference inside an entity-shaped order.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EntityRef {
    id: Option<i64>,
    username: Option<String>,
    product_name: Option<String>,
    description: Option<String>,
    main_image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OrderWire {
    id: Option<OrderId>,
    user_id: Option<UserId>,
    username: Option<String>,
    product_id: Option<ProductId>,
    product_name: Option<String>,
    product_description: Option<String>,
    product_image: Option<String>,
    seller_id: Option<UserId>,
    seller_name: Option<String>,
    quantity: Option<u32>,
    unit_price: Option<Money>,
    total_amount: Option<Money>,
    status: Option<OrderStatus>,
    status_description: Option<String>,
    created_at: Option<Value>,
    updated_at: Option<Value>,
    remarks: Option<String>,
    shipping_info: Option<String>,
    payment_info: Option<String>,
    shipping_address: Option<String>,
    contact_phone: Option<String>,
    user: Option<EntityRef>,
    product: Option<EntityRef>,
    seller: Option<EntityRef>,
}

/// Timestamps come as ISO strings, or as a field array when the server's
/// date module is off. Either way the client only displays them.
fn timestamp(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<OrderWire> for Order {
    fn from(wire: OrderWire) -> Self {
        let user = wire.user.unwrap_or_default();
        let product = wire.product.unwrap_or_default();
        let seller = wire.seller.unwrap_or_default();
        Self {
            id: wire.id.unwrap_or_default(),
            user_id: wire.user_id.or(user.id.map(UserId::new)).unwrap_or_default(),
            username: wire.username.or(user.username).unwrap_or_default(),
            product_id: wire
                .product_id
                .or(product.id.map(ProductId::new))
                .unwrap_or_default(),
            product_name: wire.product_name.or(product.product_name).unwrap_or_default(),
            product_description: wire.product_description.or(product.description),
            product_image: wire.product_image.or(product.main_image_url),
            seller_id: wire
                .seller_id
                .or(seller.id.map(UserId::new))
                .unwrap_or_default(),
            seller_name: wire.seller_name.or(seller.username).unwrap_or_default(),
            quantity: wire.quantity.unwrap_or_default(),
            unit_price: wire.unit_price.unwrap_or_default(),
            total_amount: wire.total_amount.unwrap_or_default(),
            status: wire.status.unwrap_or_default(),
            status_description: wire.status_description,
            created_at: timestamp(wire.created_at),
            updated_at: timestamp(wire.updated_at),
            remarks: wire.remarks,
            shipping_info: wire.shipping_info,
            payment_info: wire.payment_info,
            shipping_address: wire.shipping_address,
            contact_phone: wire.contact_phone,
        }
    }
}

impl Order {
    /// Status description from the server, or the local display name.
    pub fn status_label(&self) -> &str {
        self.status_description
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.status.display_name())
    }

    pub fn can_cancel(&self) -> bool {
        self.status.can_cancel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(OrderStatus::Cancelled).unwrap(),
            json!("CANCELLED")
        );
        let s: OrderStatus = serde_json::from_value(json!("SHIPPED")).unwrap();
        assert_eq!(s, OrderStatus::Shipped);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("paid".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert_eq!(" COMPLETED ".parse::<OrderStatus>().unwrap(), OrderStatus::Completed);
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_cancel_rules() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(!OrderStatus::Paid.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Completed.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
        assert!(!OrderStatus::Unknown.can_cancel());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let s: OrderStatus = serde_json::from_value(json!("REFUNDED")).unwrap();
        assert_eq!(s, OrderStatus::Unknown);
        // Parsing user input stays strict
        assert!("refunded".parse::<OrderStatus>().is_err());
        assert!(!OrderStatus::ALL.contains(&OrderStatus::Unknown));
    }

    #[test]
    fn test_deserialize_order_entity() {
        let order: Order = serde_json::from_value(json!({
            "id": 10,
            "user": {"id": 1, "username": "alice", "email": "a@example.com"},
            "product": {"id": 7, "productName": "Desk Lamp", "price": 19.5},
            "seller": {"id": 2, "username": "lamps-r-us"},
            "quantity": 2,
            "unitPrice": 19.5,
            "totalAmount": 39.0,
            "status": "PENDING",
            "createdAt": [2024, 5, 1, 10, 0],
            "updatedAt": null
        }))
        .unwrap();

        assert_eq!(order.id, OrderId::new(10));
        assert_eq!(order.user_id, UserId::new(1));
        assert_eq!(order.username, "alice");
        assert_eq!(order.product_id, ProductId::new(7));
        assert_eq!(order.product_name, "Desk Lamp");
        assert_eq!(order.seller_id, UserId::new(2));
        assert_eq!(order.seller_name, "lamps-r-us");
        assert_eq!(order.total_amount, Money::from_decimal(39.0));
        assert_eq!(order.created_at.as_deref(), Some("[2024,5,1,10,0]"));
        assert!(order.updated_at.is_none());
    }

    #[test]
    fn test_flat_fields_win_over_nested() {
        let order: Order = serde_json::from_value(json!({
            "id": 3,
            "productId": 5,
            "product": {"id": 6},
            "quantity": null,
            "status": null
        }))
        .unwrap();
        assert_eq!(order.product_id, ProductId::new(5));
        assert_eq!(order.quantity, 0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_serialized_order_reads_back() {
        let order: Order = serde_json::from_value(json!({
            "id": 4, "productId": 1, "quantity": 1, "status": "SHIPPED"
        }))
        .unwrap();
        let back: Order = serde_json::from_value(serde_json::to_value(&order).unwrap()).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn test_deserialize_order_dto() {
        let order: Order = serde_json::from_value(json!({
            "id": 100,
            "userId": 1,
            "username": "alice",
            "productId": 7,
            "productName": "Desk Lamp",
            "sellerId": 2,
            "sellerName": "lamps-r-us",
            "quantity": 2,
            "unitPrice": 19.5,
            "totalAmount": 39.0,
            "status": "PENDING",
            "statusDescription": "",
            "createdAt": "2024-05-01T10:00:00"
        }))
        .unwrap();

        assert_eq!(order.id, OrderId::new(100));
        assert_eq!(order.total_amount, Money::from_decimal(39.0));
        assert_eq!(order.status_label(), "Pending");
        assert!(order.can_cancel());
    }
}
