//! `storefront-catalog` — product records and the catalog collaborator.
//!
//! Catalog operations are thin pass-throughs with field validation only;
//! stock is mutated exclusively through the inventory ledger.

pub mod product;
pub mod store;

pub use product::{NewProduct, Product, ProductPatch};
pub use store::CatalogStore;
