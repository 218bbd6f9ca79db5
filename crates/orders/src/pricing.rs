//! Pricing snapshots.
//!
//! Prices are captured at the moment of purchase so that later catalog
//! price changes never retroactively alter historical orders. Pure
//! functions only: no mutation, no I/O beyond what the cart join already
//! provided. Totals use checked arithmetic; an overflowing total is an
//! `InvalidArgument`, caught before any stock moves.

use serde::{Deserialize, Serialize};

use storefront_cart::CartLine;
use storefront_core::{DomainError, DomainResult, ProductId};

/// Per-item price capture: what was bought, how many, at what unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: i64,
}

impl PriceSnapshot {
    pub fn line_total(&self) -> DomainResult<i64> {
        self.unit_price
            .checked_mul(self.quantity)
            .ok_or_else(|| DomainError::invalid_argument("line total overflows"))
    }
}

/// Capture the price of one cart line as observed in its joined product.
pub fn snapshot(line: &CartLine) -> PriceSnapshot {
    PriceSnapshot {
        product_id: line.product_id(),
        quantity: line.quantity(),
        unit_price: line.product.price,
    }
}

/// Total for a set of snapshots: Σ unit_price × quantity.
pub fn order_total(items: &[PriceSnapshot]) -> DomainResult<i64> {
    items.iter().try_fold(0i64, |acc, item| {
        acc.checked_add(item.line_total()?)
            .ok_or_else(|| DomainError::invalid_argument("order total overflows"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_cart::CartItem;
    use storefront_catalog::Product;
    use storefront_core::UserId;

    fn line(price: i64, quantity: i64) -> CartLine {
        let product_id = ProductId::new();
        CartLine {
            item: CartItem {
                user_id: UserId::new(),
                product_id,
                quantity,
                created_at: Utc::now(),
            },
            product: Product {
                id: product_id,
                name: "belly".to_string(),
                description: String::new(),
                price,
                stock: 100,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        }
    }

    #[test]
    fn snapshot_captures_price_quantity_and_product() {
        let l = line(1500, 3);
        let snap = snapshot(&l);
        assert_eq!(snap.product_id, l.product_id());
        assert_eq!(snap.quantity, 3);
        assert_eq!(snap.unit_price, 1500);
        assert_eq!(snap.line_total().unwrap(), 4500);
    }

    #[test]
    fn snapshot_is_immune_to_later_price_changes() {
        let mut l = line(1000, 2);
        let snap = snapshot(&l);

        l.product.price = 9999;

        assert_eq!(snap.unit_price, 1000);
        assert_eq!(snap.line_total().unwrap(), 2000);
    }

    #[test]
    fn order_total_sums_line_totals() {
        let a = snapshot(&line(100, 2));
        let b = snapshot(&line(250, 4));
        assert_eq!(order_total(&[a, b]).unwrap(), 200 + 1000);
    }

    #[test]
    fn empty_order_totals_zero() {
        assert_eq!(order_total(&[]).unwrap(), 0);
    }

    #[test]
    fn overflowing_line_total_is_rejected() {
        let snap = snapshot(&line(i64::MAX, 2));
        assert!(matches!(
            snap.line_total().unwrap_err(),
            DomainError::InvalidArgument(_)
        ));
        assert!(matches!(
            order_total(&[snap]).unwrap_err(),
            DomainError::InvalidArgument(_)
        ));
    }

    #[test]
    fn overflowing_order_total_is_rejected() {
        // Each line is fine on its own; the sum is not.
        let a = snapshot(&line(i64::MAX / 2, 1));
        let b = snapshot(&line(i64::MAX / 2, 1));
        let c = snapshot(&line(i64::MAX / 2, 1));
        assert!(matches!(
            order_total(&[a, b, c]).unwrap_err(),
            DomainError::InvalidArgument(_)
        ));
    }
}
