use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::{DomainResult, ProductId, UserId};

use crate::item::{CartItem, CartLine};

/// Per-user cart storage.
///
/// Rows are scoped to one user; no cross-user coordination is required.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Add `quantity` to an existing `(user, product)` row or create one.
    ///
    /// Rejects `quantity <= 0` with `InvalidArgument`; `NotFound` if the
    /// product does not exist.
    async fn upsert_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<CartItem>;

    /// Remove a row. Returns whether a row existed.
    async fn remove_cart_item(&self, user_id: UserId, product_id: ProductId)
        -> DomainResult<bool>;

    /// The user's cart joined with current product snapshots, newest first.
    async fn list_cart(&self, user_id: UserId) -> DomainResult<Vec<CartLine>>;

    /// Delete all of the user's cart rows; returns how many were removed.
    ///
    /// Only called as the final step of a successful order placement.
    async fn clear_cart(&self, user_id: UserId) -> DomainResult<u64>;
}

#[async_trait]
impl<S> CartStore for Arc<S>
where
    S: CartStore + ?Sized,
{
    async fn upsert_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<CartItem> {
        (**self).upsert_cart_item(user_id, product_id, quantity).await
    }

    async fn remove_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> DomainResult<bool> {
        (**self).remove_cart_item(user_id, product_id).await
    }

    async fn list_cart(&self, user_id: UserId) -> DomainResult<Vec<CartLine>> {
        (**self).list_cart(user_id).await
    }

    async fn clear_cart(&self, user_id: UserId) -> DomainResult<u64> {
        (**self).clear_cart(user_id).await
    }
}
