//! `storefront-inventory` — the inventory ledger contract.
//!
//! The ledger is the only component allowed to mutate stock. Its
//! check-and-decrement is atomic per product; that single guarantee is what
//! the order assembler's all-or-nothing protocol is built on.

pub mod ledger;

pub use ledger::{ensure_positive, InventoryLedger, ReserveOutcome};
