//! `storefront-infra` — storage implementations.
//!
//! Every store trait in the domain crates is implemented twice: once over
//! in-process maps (`InMemoryStore`, for tests and dev) and once over
//! Postgres (`PostgresStore`, for production). Both uphold the same
//! contract; in particular, check-and-reserve is atomic per product in
//! either backend.

pub mod store;

pub use store::{InMemoryStore, PostgresStore};
