//! Joining cart lines against the product catalog.

use crate::cart::{CartLine, CartState};
use crate::catalog::Product;
use crate::ids::ProductId;
use crate::money::Money;

/// A cart line with its product looked up.
///
/// The lookup is a weak reference: the product may have been deleted or
/// simply not loaded yet, in which case `product` is `None` and the
/// subtotal is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineDetail {
    pub product_id: ProductId,
    pub quantity: u32,
    pub product: Option<Product>,
    pub subtotal: Money,
}

impl CartLineDetail {
    fn from_line(line: CartLine, catalog: &[Product]) -> Self {
        let product = catalog.iter().find(|p| p.id == line.product_id).cloned();
        let subtotal = product
            .as_ref()
            .map(|p| p.price.times(line.quantity))
            .unwrap_or_default();
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            product,
            subtotal,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.product.is_some()
    }
}

impl CartState {
    /// Each line joined with the matching product from `catalog`.
    pub fn with_details(&self, catalog: &[Product]) -> Vec<CartLineDetail> {
        self.items()
            .into_iter()
            .map(|line| CartLineDetail::from_line(line, catalog))
            .collect()
    }

    /// Sum of line subtotals against `catalog`.
    pub fn total_amount(&self, catalog: &[Product]) -> Money {
        self.with_details(catalog).iter().map(|d| d.subtotal).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;

    fn state(pairs: &[(i64, u32)]) -> CartState {
        CartState {
            user_id: UserId::new(1),
            product_quantities: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn product(id: i64, price: f64) -> Product {
        Product::new(ProductId::new(id), format!("p{}", id), Money::from_decimal(price))
    }

    #[test]
    fn test_total_amount_join() {
        let cart = state(&[(1, 2), (2, 3)]);
        let catalog = vec![product(1, 10.0), product(2, 5.0)];
        assert_eq!(cart.total_amount(&catalog), Money::from_decimal(35.0));
    }

    #[test]
    fn test_missing_product_contributes_zero() {
        let cart = state(&[(1, 2), (2, 3)]);
        let catalog = vec![product(1, 10.0)];

        let details = cart.with_details(&catalog);
        assert_eq!(details.len(), 2);
        assert!(details[0].is_resolved());
        assert!(!details[1].is_resolved());
        assert_eq!(details[1].subtotal, Money::zero());
        assert_eq!(cart.total_amount(&catalog), Money::from_decimal(20.0));
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let cart = state(&[]);
        assert_eq!(cart.total_amount(&[product(1, 3.0)]), Money::zero());
    }
}
