//! `storefront-orders` — order records, pricing snapshots, and the order
//! assembler.
//!
//! The assembler is the one place in the system with a multi-step protocol:
//! it turns a cart into a durable order while keeping the inventory ledger
//! consistent under concurrency, using compensating releases rather than a
//! cross-product transaction.

pub mod assembler;
pub mod order;
pub mod pricing;

pub use assembler::OrderAssembler;
pub use order::{NewOrder, Order, OrderItem, OrderStore, PlacedOrder};
pub use pricing::PriceSnapshot;
