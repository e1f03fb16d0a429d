//! Server-mirrored cart state and mutation requests.

use crate::error::CommerceError;
use crate::ids::{ProductId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The cart exactly as the server last reported it.
///
/// Keys of `product_quantities` are product ids in string form. A missing
/// key means the product is not in the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CartState {
    pub user_id: UserId,
    pub product_quantities: BTreeMap<String, u32>,
}

/// One (productId, quantity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartState {
    /// An empty cart for `user_id`.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            product_quantities: BTreeMap::new(),
        }
    }

    /// Line items, ordered by product id.
    ///
    /// Keys that are not numeric ids are skipped.
    pub fn items(&self) -> Vec<CartLine> {
        let mut lines: Vec<CartLine> = self
            .product_quantities
            .iter()
            .filter_map(|(key, &quantity)| {
                key.parse::<ProductId>()
                    .ok()
                    .map(|product_id| CartLine {
                        product_id,
                        quantity,
                    })
            })
            .collect();
        lines.sort_by_key(|l| l.product_id);
        lines
    }

    /// Sum of all quantities.
    pub fn total_items(&self) -> u64 {
        self.product_quantities
            .values()
            .map(|&q| u64::from(q))
            .sum()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.product_quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_quantities.is_empty()
    }

    pub fn has_items(&self) -> bool {
        !self.is_empty()
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.product_quantities
            .contains_key(&product_id.to_string())
    }

    /// Quantity of `product_id`, 0 when absent.
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.product_quantities
            .get(&product_id.to_string())
            .copied()
            .unwrap_or(0)
    }
}

/// Body for `POST /cart/items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    pub product_quantity: u32,
}

impl AddToCart {
    /// Validate that `quantity` is a positive integer.
    pub fn new(product_id: ProductId, quantity: i64) -> Result<Self, CommerceError> {
        Ok(Self {
            product_id,
            product_quantity: positive_quantity(quantity)?,
        })
    }
}

/// Body for `PUT /cart/items`: replaces the quantity of each listed product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCart {
    pub product_quantities: BTreeMap<String, u32>,
}

impl UpdateCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantity for one product.
    pub fn set(mut self, product_id: ProductId, quantity: i64) -> Result<Self, CommerceError> {
        self.product_quantities
            .insert(product_id.to_string(), positive_quantity(quantity)?);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.product_quantities.is_empty()
    }
}

fn positive_quantity(quantity: i64) -> Result<u32, CommerceError> {
    if quantity < 1 {
        return Err(CommerceError::InvalidQuantity(quantity));
    }
    u32::try_from(quantity).map_err(|_| CommerceError::InvalidQuantity(quantity))
}
