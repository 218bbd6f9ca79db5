use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::Product;
use storefront_core::{ProductId, UserId};

/// One cart row: a user's desired quantity of one product.
///
/// `(user_id, product_id)` is the unique key; quantity is always ≥ 1 —
/// a zero-quantity row is deleted, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// A cart item joined with the current product snapshot.
///
/// The snapshot (name, price, stock) is what read-time decisions and the
/// order assembler's validation/pricing passes work from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    pub fn product_id(&self) -> ProductId {
        self.item.product_id
    }

    pub fn quantity(&self) -> i64 {
        self.item.quantity
    }
}
