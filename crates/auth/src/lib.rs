//! `storefront-auth` — authentication boundary.
//!
//! Account records, password hashing, JWT issuance/verification, and the
//! `Principal` handed to the rest of the system. Decoupled from HTTP and
//! storage: transport hands in bearer tokens, storage implements
//! [`UserStore`].

pub mod claims;
pub mod password;
pub mod principal;
pub mod service;
pub mod token;
pub mod user;

pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use principal::Principal;
pub use service::AccountService;
pub use token::{Hs256TokenCodec, TokenError};
pub use user::{NewUser, User, UserStore};
