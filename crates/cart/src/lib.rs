//! `storefront-cart` — per-user cart items and the cart store contract.

pub mod item;
pub mod store;

pub use item::{CartItem, CartLine};
pub use store::CartStore;
