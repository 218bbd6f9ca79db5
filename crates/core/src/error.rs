//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure a caller can branch on is a distinct variant; callers
/// never have to match on message strings. Validation variants are
/// produced before any mutation; `Conflict` and `Persistence` may be
/// produced mid-protocol and trigger compensation in the order assembler
/// before they surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced resource (product, user, cart item) does not exist.
    #[error("not found")]
    NotFound,

    /// An input failed validation (non-positive quantity, negative price, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested quantity exceeds available stock for the named product.
    #[error("insufficient stock for product \"{product}\"")]
    InsufficientStock { product: String },

    /// The cart had no items to place an order from.
    #[error("cart is empty")]
    EmptyCart,

    /// No valid principal was supplied.
    #[error("authentication required")]
    Unauthenticated,

    /// The principal may not act on another principal's resource.
    #[error("unauthorized")]
    Unauthorized,

    /// A uniqueness or concurrent-update conflict (e.g. reservation race lost).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A durable write or read failed at the storage layer.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn insufficient_stock(product: impl Into<String>) -> Self {
        Self::InsufficientStock {
            product: product.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
