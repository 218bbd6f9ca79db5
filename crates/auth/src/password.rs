//! Password hashing (Argon2id, salted).
//!
//! Hashes are stored in PHC string format and never leave the auth/storage
//! boundary.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use storefront_core::{DomainError, DomainResult};

/// Hash a password for storage.
pub fn hash_password(password: &str) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::persistence(format!("password hashing failed: {e}")))
}

/// Check a password attempt against a stored hash.
///
/// Returns `false` for both a wrong password and an unparseable hash;
/// callers must not be able to distinguish the two.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_the_original_password() {
        let hash = hash_password("password123").unwrap();
        assert!(verify_password("password123", &hash));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("password123").unwrap();
        assert!(!verify_password("password124", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("password123").unwrap();
        let b = hash_password("password123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_stored_hash_never_verifies() {
        assert!(!verify_password("password123", "not-a-phc-string"));
    }
}
