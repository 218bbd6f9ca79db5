//! `storefront-core` — shared domain foundation.
//!
//! Strongly-typed identifiers and the error taxonomy every other crate
//! builds on. No infrastructure concerns live here.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{OrderId, OrderItemId, ProductId, UserId};
