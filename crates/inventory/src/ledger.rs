use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ProductId};

/// Result of a reservation attempt.
///
/// These are value-level outcomes rather than errors because the order
/// assembler must branch on them: a failed reservation mid-way through a
/// multi-item order triggers compensating releases, not a bare bail-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReserveOutcome {
    /// Stock was sufficient and has been decremented.
    Reserved { remaining: i64 },
    /// Stock was insufficient; nothing was changed.
    InsufficientStock { available: i64 },
    /// The product does not exist; nothing was changed.
    ProductNotFound,
}

impl ReserveOutcome {
    pub fn is_reserved(&self) -> bool {
        matches!(self, ReserveOutcome::Reserved { .. })
    }
}

/// Authoritative stock ledger.
///
/// # Atomicity
///
/// `check_and_reserve` must verify `stock >= quantity` and decrement in one
/// indivisible step relative to other reservations on the same product. Two
/// concurrent reservations whose combined quantity exceeds available stock
/// must never both succeed. Separate read-then-write steps are not an
/// acceptable implementation.
///
/// Cross-product atomicity is *not* required; the order assembler restores
/// consistency with compensating `release` calls on partial failure.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Atomically reserve `quantity` units, decrementing stock on success.
    ///
    /// `quantity` must be positive; non-positive values are rejected with
    /// `InvalidArgument` before any storage access.
    async fn check_and_reserve(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<ReserveOutcome>;

    /// Increase stock by `amount` (> 0). Returns the new stock count.
    async fn restock(&self, product_id: ProductId, amount: i64) -> DomainResult<i64>;

    /// Compensating increment: hand back a previously taken reservation.
    ///
    /// Used when a multi-item reservation partially succeeds and must be
    /// rolled back. `amount` must be positive.
    async fn release(&self, product_id: ProductId, amount: i64) -> DomainResult<()>;
}

#[async_trait]
impl<L> InventoryLedger for Arc<L>
where
    L: InventoryLedger + ?Sized,
{
    async fn check_and_reserve(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<ReserveOutcome> {
        (**self).check_and_reserve(product_id, quantity).await
    }

    async fn restock(&self, product_id: ProductId, amount: i64) -> DomainResult<i64> {
        (**self).restock(product_id, amount).await
    }

    async fn release(&self, product_id: ProductId, amount: i64) -> DomainResult<()> {
        (**self).release(product_id, amount).await
    }
}

/// Shared guard for ledger amounts: every ledger operation takes a strictly
/// positive count.
pub fn ensure_positive(what: &str, amount: i64) -> DomainResult<()> {
    if amount <= 0 {
        return Err(DomainError::invalid_argument(format!(
            "{what} must be positive, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_amounts_pass_the_guard() {
        assert!(ensure_positive("quantity", 1).is_ok());
        assert!(ensure_positive("quantity", i64::MAX).is_ok());
    }

    #[test]
    fn zero_and_negative_amounts_are_invalid() {
        for bad in [0, -1, i64::MIN] {
            let err = ensure_positive("amount", bad).unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument(_)));
        }
    }

    #[test]
    fn reserved_outcome_reports_itself() {
        assert!(ReserveOutcome::Reserved { remaining: 0 }.is_reserved());
        assert!(!ReserveOutcome::InsufficientStock { available: 3 }.is_reserved());
        assert!(!ReserveOutcome::ProductNotFound.is_reserved());
    }
}
