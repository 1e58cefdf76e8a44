// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed, time-bounded identity tokens (HS256).
//!
//! Stateless: no server-side session list, no revocation. A token is valid
//! iff its signature checks out against the configured secret and its
//! expiry has not passed. Expired and forged tokens are indistinguishable
//! to callers; both verify to `None`.
use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use moneyminder_common::{Claims, UserId};

/// Token issuing and verification service
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_hours: i64,
}

impl TokenService {
    /// Create a token service.
    ///
    /// The secret's length and non-triviality are enforced by
    /// `Settings::validate()` at startup, not here.
    pub fn new(secret: &str, expiration_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_hours,
        }
    }

    /// Issue a signed token for a user
    pub fn issue(&self, user_id: UserId, username: &str, email: &str) -> Result<String, AppError> {
        self.issue_with_lifetime(user_id, username, email, Duration::hours(self.expiration_hours))
    }

    fn issue_with_lifetime(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
        lifetime: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token encode: {e}")))
    }

    /// Verify a token, returning its claims on success.
    /// Expired, malformed, and forged tokens all collapse to `None`.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims)
    }
}
