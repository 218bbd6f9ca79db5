use chrono::{Duration, Utc};

use storefront_core::{DomainError, DomainResult};

use crate::password;
use crate::principal::Principal;
use crate::token::Hs256TokenCodec;
use crate::user::{validate_registration, NewUser, UserStore};

/// Token lifetime for issued sessions.
const TOKEN_TTL_HOURS: i64 = 24;

/// Account operations: registration, login, and token verification.
///
/// Login failures are indistinguishable on purpose: unknown username and
/// wrong password both come back as `Unauthenticated`.
pub struct AccountService<U> {
    users: U,
    tokens: Hs256TokenCodec,
}

impl<U> AccountService<U>
where
    U: UserStore,
{
    pub fn new(users: U, tokens: Hs256TokenCodec) -> Self {
        Self { users, tokens }
    }

    /// Register a new account and return a session token.
    ///
    /// Usernames are unique; a taken username is a `Conflict`. The store
    /// enforces this too, so a racing duplicate registration still fails
    /// cleanly at insert time.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> DomainResult<String> {
        validate_registration(username, password)?;

        if self.users.find_user_by_username(username).await?.is_some() {
            return Err(DomainError::conflict("username is already taken"));
        }

        let password_hash = password::hash_password(password)?;
        let user = self
            .users
            .insert_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "account registered");
        self.issue_token(user.id)
    }

    /// Exchange credentials for a session token.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<String> {
        let Some(user) = self.users.find_user_by_username(username).await? else {
            return Err(DomainError::Unauthenticated);
        };

        if !password::verify_password(password, &user.password_hash) {
            return Err(DomainError::Unauthenticated);
        }

        self.issue_token(user.id)
    }

    /// Verify a bearer token and produce the principal it represents.
    pub fn authenticate(&self, token: &str) -> DomainResult<Principal> {
        let claims = self
            .tokens
            .verify(token, Utc::now())
            .map_err(|_| DomainError::Unauthenticated)?;
        Ok(Principal::new(claims.sub))
    }

    fn issue_token(&self, user_id: storefront_core::UserId) -> DomainResult<String> {
        self.tokens
            .issue(user_id, Utc::now(), Duration::hours(TOKEN_TTL_HOURS))
            .map_err(|e| DomainError::persistence(format!("token issuance failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use storefront_core::UserId;

    use crate::user::User;

    #[derive(Default)]
    struct MemoryUsers {
        by_name: Mutex<HashMap<String, User>>,
    }

    #[async_trait]
    impl UserStore for MemoryUsers {
        async fn insert_user(&self, input: NewUser) -> DomainResult<User> {
            let mut map = self.by_name.lock().unwrap();
            if map.contains_key(&input.username) {
                return Err(DomainError::conflict("username is already taken"));
            }
            let user = User {
                id: UserId::new(),
                username: input.username.clone(),
                email: input.email,
                password_hash: input.password_hash,
                created_at: Utc::now(),
            };
            map.insert(input.username, user.clone());
            Ok(user)
        }

        async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
            Ok(self.by_name.lock().unwrap().get(username).cloned())
        }

        async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
            Ok(self
                .by_name
                .lock()
                .unwrap()
                .values()
                .find(|u| u.id == id)
                .cloned())
        }
    }

    fn service() -> AccountService<Arc<MemoryUsers>> {
        AccountService::new(
            Arc::new(MemoryUsers::default()),
            Hs256TokenCodec::new(b"test-secret"),
        )
    }

    #[tokio::test]
    async fn register_issues_a_verifiable_token() {
        let svc = service();
        let token = svc
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        let principal = svc.authenticate(&token).unwrap();
        let user = svc
            .users
            .find_user_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(principal.user_id(), user.id);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let svc = service();
        svc.register("alice", "a@example.com", "password123")
            .await
            .unwrap();

        let err = svc
            .register("alice", "b@example.com", "password456")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn short_password_is_rejected_before_storage() {
        let svc = service();
        let err = svc
            .register("alice", "a@example.com", "12345")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
        assert!(svc
            .users
            .find_user_by_username("alice")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn login_returns_a_token_for_valid_credentials() {
        let svc = service();
        svc.register("alice", "a@example.com", "password123")
            .await
            .unwrap();

        let token = svc.login("alice", "password123").await.unwrap();
        assert!(svc.authenticate(&token).is_ok());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let svc = service();
        svc.register("alice", "a@example.com", "password123")
            .await
            .unwrap();

        let unknown_user = svc.login("bob", "password123").await.unwrap_err();
        let wrong_password = svc.login("alice", "wrong-password").await.unwrap_err();
        assert_eq!(unknown_user, wrong_password);
        assert_eq!(unknown_user, DomainError::Unauthenticated);
    }

    #[tokio::test]
    async fn garbage_tokens_do_not_authenticate() {
        let svc = service();
        assert_eq!(
            svc.authenticate("garbage").unwrap_err(),
            DomainError::Unauthenticated
        );
    }
}
