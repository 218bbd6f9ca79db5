//! The order assembler.
//!
//! Converts a user's cart into a confirmed order as one logically atomic
//! operation:
//!
//! 1. load the cart (fail `EmptyCart` if empty);
//! 2. validation pass over product snapshots, fixing prices and the order
//!    total; no mutation on failure;
//! 3. reservation pass against the ledger in ascending product-id order,
//!    with compensating releases if any reservation fails part-way;
//! 4. durable order write (the commit point); releases on failure;
//! 5. best-effort cart clear;
//! 6. return the order with its items.
//!
//! The ledger only guarantees atomicity per product; this module makes the
//! whole item set effectively all-or-nothing through compensation. Taken
//! reservations live in a [`ReservationGuard`], so the compensation path
//! also runs when the calling future is dropped mid-protocol (a client
//! disconnect cancels axum handler futures at their next await point).

use storefront_cart::{CartLine, CartStore};
use storefront_core::{DomainError, DomainResult, ProductId, UserId};
use storefront_inventory::{InventoryLedger, ReserveOutcome};

use crate::order::{NewOrder, OrderStore, PlacedOrder};
use crate::pricing;

/// Coordinates cart, ledger, and order storage for order placement.
///
/// Store handles are passed in explicitly (no ambient database client), so
/// tests can substitute doubles for any collaborator.
pub struct OrderAssembler<C, L, O> {
    cart: C,
    ledger: L,
    orders: O,
}

impl<C, L, O> OrderAssembler<C, L, O>
where
    C: CartStore,
    L: InventoryLedger + Clone + 'static,
    O: OrderStore,
{
    pub fn new(cart: C, ledger: L, orders: O) -> Self {
        Self {
            cart,
            ledger,
            orders,
        }
    }

    /// Place an order for everything in the user's cart.
    ///
    /// On any failure before the durable write, the ledger is restored to
    /// its pre-call state and the cart is left untouched; the caller never
    /// observes a half-applied order. This holds even if the returned
    /// future is dropped partway through the reservation pass.
    pub async fn place_order(&self, user_id: UserId) -> DomainResult<PlacedOrder> {
        let lines = self.cart.list_cart(user_id).await?;
        if lines.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        // Validation pass: purely read-only. Catches obviously oversized
        // requests before any stock is touched, and fixes the prices the
        // order will use; price and stock concerns stay independent from
        // here on.
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            if line.product.stock < line.quantity() {
                return Err(DomainError::insufficient_stock(&line.product.name));
            }
            items.push(pricing::snapshot(line));
        }
        let total_price = pricing::order_total(&items)?;

        // Reservation pass in ascending product-id order, so that orders
        // touching overlapping product sets always take reservations in the
        // same sequence.
        let mut plan: Vec<&CartLine> = lines.iter().collect();
        plan.sort_by_key(|l| l.product_id());

        let mut reserved = ReservationGuard::new(self.ledger.clone());
        for line in &plan {
            let outcome = match self
                .ledger
                .check_and_reserve(line.product_id(), line.quantity())
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    reserved.release_all().await;
                    return Err(e);
                }
            };

            match outcome {
                ReserveOutcome::Reserved { .. } => {
                    reserved.take(line.product_id(), line.quantity());
                }
                // A race between validation and reservation: someone else
                // took the stock first. First committer wins; we roll back.
                ReserveOutcome::InsufficientStock { .. } => {
                    reserved.release_all().await;
                    return Err(DomainError::insufficient_stock(&line.product.name));
                }
                ReserveOutcome::ProductNotFound => {
                    reserved.release_all().await;
                    return Err(DomainError::NotFound);
                }
            }
        }

        let draft = NewOrder {
            user_id,
            total_price,
            items,
        };

        // Commit point. A failure here must hand every reservation back
        // before surfacing (compensation, not retry).
        let placed = match self.orders.insert_order(draft).await {
            Ok(placed) => placed,
            Err(e) => {
                reserved.release_all().await;
                return Err(e);
            }
        };
        reserved.disarm();

        // Past the commit point the order stands; cart clearing is
        // best-effort idempotent cleanup.
        if let Err(e) = self.cart.clear_cart(user_id).await {
            tracing::warn!(
                user_id = %user_id,
                order_id = %placed.order.id,
                error = %e,
                "cart clear failed after order commit; order stands"
            );
        }

        Ok(placed)
    }
}

/// Holds the reservations taken so far during one placement.
///
/// Armed until the commit point. Dropping an armed guard with reservations
/// still held (the placement future was cancelled mid-protocol) spawns the
/// compensating releases on the current runtime, so cancellation can never
/// leak decremented stock.
struct ReservationGuard<L>
where
    L: InventoryLedger + Clone + 'static,
{
    ledger: L,
    reserved: Vec<(ProductId, i64)>,
    armed: bool,
}

impl<L> ReservationGuard<L>
where
    L: InventoryLedger + Clone + 'static,
{
    fn new(ledger: L) -> Self {
        Self {
            ledger,
            reserved: Vec::new(),
            armed: true,
        }
    }

    fn take(&mut self, product_id: ProductId, quantity: i64) {
        self.reserved.push((product_id, quantity));
    }

    /// The order committed; the reservations are now spent, not leaked.
    fn disarm(&mut self) {
        self.armed = false;
        self.reserved.clear();
    }

    /// Hand back every reservation taken so far, inline. Release failures
    /// are logged, not propagated: the original failure is what the caller
    /// needs to see, and cleanup must run to completion regardless.
    async fn release_all(&mut self) {
        self.armed = false;
        for (product_id, quantity) in std::mem::take(&mut self.reserved) {
            if let Err(e) = self.ledger.release(product_id, quantity).await {
                tracing::error!(
                    product_id = %product_id,
                    quantity,
                    error = %e,
                    "failed to release reservation during rollback"
                );
            }
        }
    }
}

impl<L> Drop for ReservationGuard<L>
where
    L: InventoryLedger + Clone + 'static,
{
    fn drop(&mut self) {
        if !self.armed || self.reserved.is_empty() {
            return;
        }

        let ledger = self.ledger.clone();
        let reserved = std::mem::take(&mut self.reserved);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    for (product_id, quantity) in reserved {
                        if let Err(e) = ledger.release(product_id, quantity).await {
                            tracing::error!(
                                product_id = %product_id,
                                quantity,
                                error = %e,
                                "failed to release reservation after cancellation"
                            );
                        }
                    }
                });
            }
            Err(_) => {
                tracing::error!(
                    count = reserved.len(),
                    "placement cancelled with reservations held and no runtime to release them on"
                );
            }
        }
    }
}
