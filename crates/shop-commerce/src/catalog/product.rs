//! Product types.

use crate::de::null_as_default;
use crate::ids::{ProductId, UserId};
use crate::money::Money;
use crate::{CommerceError, CommerceResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Allowed values for one specification dimension.
///
/// The backend stores specifications as free-form JSON. Most entries are a
/// list of options (`"color": ["red", "blue"]`) but single scalars show up
/// too, so both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Many(Vec<Value>),
    One(Value),
}

impl SpecValue {
    /// The values rendered as display strings.
    pub fn options(&self) -> Vec<String> {
        fn render(v: &Value) -> String {
            match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }
        }
        match self {
            SpecValue::Many(values) => values.iter().map(render).collect(),
            SpecValue::One(Value::Null) => Vec::new(),
            SpecValue::One(value) => vec![render(value)],
        }
    }
}

/// A product as returned by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sales_count: i64,
    /// Percentage off, 0 to 100.
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock_quantity: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_available: bool,
    #[serde(default)]
    pub creator_id: Option<UserId>,
    #[serde(default)]
    pub creator_username: Option<String>,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub specifications: Option<BTreeMap<String, SpecValue>>,
    #[serde(default)]
    pub extended_attributes: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Product {
    /// Minimal product, mostly useful for tests and fixtures.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            product_name: name.into(),
            description: None,
            price,
            sales_count: 0,
            discount: 0.0,
            stock_quantity: 0,
            is_available: true,
            creator_id: None,
            creator_username: None,
            main_image_url: None,
            specifications: None,
            extended_attributes: None,
            category: None,
            brand: None,
            color: None,
            size: None,
            tags: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Price after discount.
    pub fn discounted_price(&self) -> Money {
        if self.has_discount() {
            self.price.discounted(self.discount)
        } else {
            self.price
        }
    }

    pub fn has_discount(&self) -> bool {
        self.discount > 0.0
    }

    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Available and in stock.
    pub fn is_purchasable(&self) -> bool {
        self.is_available && self.in_stock()
    }

    /// Owned by `user`.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.creator_id == Some(user)
    }

    /// Specification options for `name`, empty when absent.
    pub fn spec_options(&self, name: &str) -> Vec<String> {
        self.specifications
            .as_ref()
            .and_then(|specs| specs.get(name))
            .map(SpecValue::options)
            .unwrap_or_default()
    }
}

/// Body for creating a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub stock_quantity: i64,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, SpecValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl ProductDraft {
    /// Check the fields the server would reject anyway.
    pub fn validate(&self) -> CommerceResult<()> {
        if self.product_name.trim().is_empty() {
            return Err(CommerceError::MissingField("productName"));
        }
        validate_price(self.price)?;
        if let Some(discount) = self.discount {
            validate_discount(discount)?;
        }
        if self.stock_quantity < 0 {
            return Err(CommerceError::InvalidQuantity(self.stock_quantity));
        }
        Ok(())
    }
}

/// Partial update body. Only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, SpecValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ProductUpdate::default()
    }

    pub fn validate(&self) -> CommerceResult<()> {
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(discount) = self.discount {
            validate_discount(discount)?;
        }
        if let Some(stock) = self.stock_quantity {
            if stock < 0 {
                return Err(CommerceError::InvalidQuantity(stock));
            }
        }
        Ok(())
    }
}

pub fn validate_price(price: f64) -> CommerceResult<()> {
    if price < 0.0 || !price.is_finite() {
        return Err(CommerceError::InvalidPrice(price));
    }
    Ok(())
}

pub fn validate_discount(discount: f64) -> CommerceResult<()> {
    if !(0.0..=100.0).contains(&discount) {
        return Err(CommerceError::InvalidDiscount(discount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_product() {
        let product: Product = serde_json::from_value(json!({
            "id": 12,
            "productName": "Desk Lamp",
            "price": 39.9,
            "salesCount": 4,
            "discount": 10,
            "stockQuantity": 3,
            "isAvailable": true,
            "creatorId": 2,
            "specifications": {"color": ["black", "white"], "voltage": "220V"},
            "createdAt": "2024-05-01T10:00:00"
        }))
        .unwrap();

        assert_eq!(product.id, ProductId::new(12));
        assert_eq!(product.price, Money::from_cents(3990));
        assert_eq!(product.spec_options("color"), vec!["black", "white"]);
        assert_eq!(product.spec_options("voltage"), vec!["220V"]);
        assert!(product.spec_options("size").is_empty());
        assert!(product.is_owned_by(UserId::new(2)));
    }

    #[test]
    fn test_null_numeric_columns_read_as_defaults() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "productName": "Lamp",
            "price": 10.0,
            "discount": null,
            "salesCount": null,
            "stockQuantity": null,
            "isAvailable": null,
            "mainImageUrl": null
        }))
        .unwrap();
        assert_eq!(product.discount, 0.0);
        assert_eq!(product.sales_count, 0);
        assert_eq!(product.stock_quantity, 0);
        assert!(!product.is_available);
        assert_eq!(product.discounted_price(), Money::from_decimal(10.0));
    }

    #[test]
    fn test_discounted_price() {
        let mut p = Product::new(ProductId::new(1), "Mug", Money::from_decimal(20.0));
        assert_eq!(p.discounted_price(), Money::from_decimal(20.0));
        p.discount = 25.0;
        assert_eq!(p.discounted_price(), Money::from_decimal(15.0));
    }

    #[test]
    fn test_purchasable() {
        let mut p = Product::new(ProductId::new(1), "Mug", Money::from_decimal(20.0));
        assert!(!p.is_purchasable());
        p.stock_quantity = 1;
        assert!(p.is_purchasable());
        p.is_available = false;
        assert!(!p.is_purchasable());
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = ProductUpdate {
            price: Some(9.5),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"price": 9.5}));
        assert!(!update.is_empty());
        assert!(ProductUpdate::default().is_empty());
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = ProductDraft {
            product_name: "Lamp".to_string(),
            price: 10.0,
            stock_quantity: 5,
            is_available: true,
            ..Default::default()
        };
        assert!(draft.validate().is_ok());

        draft.discount = Some(120.0);
        assert_eq!(draft.validate(), Err(CommerceError::InvalidDiscount(120.0)));

        draft.discount = None;
        draft.product_name = "  ".to_string();
        assert_eq!(draft.validate(), Err(CommerceError::MissingField("productName")));
    }
}
