use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainResult, OrderId, OrderItemId, ProductId, UserId};

use crate::pricing::PriceSnapshot;

/// A confirmed order. Immutable once created.
///
/// `total_price` equals the sum of `price × quantity` over the order's own
/// items, fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// One line of an order. `price` is the unit price observed at order
/// creation, not a live reference to the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub price: i64,
}

/// An order together with its items, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Input for the durable order write: priced, itemized, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub total_price: i64,
    pub items: Vec<PriceSnapshot>,
}

/// Durable order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create the order and all of its items as one durable write.
    ///
    /// This is the commit point of order placement: implementations must
    /// persist everything or nothing, and report failure as `Persistence`
    /// so the assembler can run its compensation path.
    async fn insert_order(&self, order: NewOrder) -> DomainResult<PlacedOrder>;

    /// The user's purchase history, newest first.
    async fn list_orders_for_user(&self, user_id: UserId) -> DomainResult<Vec<PlacedOrder>>;
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn insert_order(&self, order: NewOrder) -> DomainResult<PlacedOrder> {
        (**self).insert_order(order).await
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> DomainResult<Vec<PlacedOrder>> {
        (**self).list_orders_for_user(user_id).await
    }
}
