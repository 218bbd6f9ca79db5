use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use storefront_core::UserId;

use crate::claims::{validate_claims, JwtClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error("invalid token")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// On-the-wire claim layout (standard JWT field names, unix seconds).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// HS256 token codec: issues and verifies bearer tokens for principals.
///
/// The secret comes from process configuration; the codec itself is
/// clock-free — callers pass `now`, which keeps expiry behavior testable.
#[derive(Clone)]
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `user_id`, valid from `now` for `ttl`.
    pub fn issue(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let wire = WireClaims {
            sub: *user_id.as_uuid(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify signature and time window; return the claims on success.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window is checked deterministically below against the
        // caller-supplied `now`, not the library's wall clock.
        validation.validate_exp = false;

        let decoded = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        let claims = JwtClaims {
            sub: UserId::from_uuid(decoded.claims.sub),
            issued_at: DateTime::from_timestamp(decoded.claims.iat, 0).ok_or(TokenError::Invalid)?,
            expires_at: DateTime::from_timestamp(decoded.claims.exp, 0)
                .ok_or(TokenError::Invalid)?,
        };

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new(b"test-secret")
    }

    #[test]
    fn issued_token_verifies_and_carries_the_user_id() {
        let user = UserId::new();
        let now = Utc::now();

        let token = codec().issue(user, now, Duration::hours(24)).unwrap();
        let claims = codec().verify(&token, now).unwrap();

        assert_eq!(claims.sub, user);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let now = Utc::now();
        let token = Hs256TokenCodec::new(b"other-secret")
            .issue(UserId::new(), now, Duration::hours(1))
            .unwrap();

        assert!(matches!(
            codec().verify(&token, now),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let user = UserId::new();
        let issued = Utc::now();
        let token = codec().issue(user, issued, Duration::hours(1)).unwrap();

        let later = issued + Duration::hours(2);
        assert!(matches!(
            codec().verify(&token, later),
            Err(TokenError::Claims(TokenValidationError::Expired))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            codec().verify("not.a.token", Utc::now()),
            Err(TokenError::Invalid)
        ));
    }
}
