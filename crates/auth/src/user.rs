use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, UserId};

/// A registered account.
///
/// `password_hash` is never serialized: account data may cross the API
/// boundary, credentials may not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Input for account creation. The password is already hashed by the time
/// it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Minimum password length, matching the registration rule.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate registration input before any hashing or storage work.
pub fn validate_registration(username: &str, password: &str) -> DomainResult<()> {
    if username.trim().is_empty() {
        return Err(DomainError::invalid_argument("username cannot be empty"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::invalid_argument(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Account storage.
///
/// `insert_user` enforces username uniqueness itself (returning `Conflict`),
/// so the pre-check in the service is a courtesy, not the guarantee.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, input: NewUser) -> DomainResult<User>;

    async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn insert_user(&self, input: NewUser) -> DomainResult<User> {
        (**self).insert_user(input).await
    }

    async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        (**self).find_user_by_username(username).await
    }

    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        (**self).find_user_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_requires_a_username() {
        assert!(validate_registration("", "password123").is_err());
        assert!(validate_registration("   ", "password123").is_err());
    }

    #[test]
    fn registration_requires_six_character_passwords() {
        assert!(validate_registration("alice", "12345").is_err());
        assert!(validate_registration("alice", "123456").is_ok());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: UserId::new(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
