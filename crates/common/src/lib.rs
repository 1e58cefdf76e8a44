// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared between the `MoneyMinder` backend and its HTTP clients.
//! This module defines the auth API request/response bodies and token claims.

use serde::{Deserialize, Serialize};

/// User identifier type, matching the database primary key
pub type UserId = i64;

/// Registration request body
/// # Fields
/// * `username` - Desired username (3-50 chars, alphanumeric + underscore)
/// * `email` - User email address
/// * `password` - Plaintext password, validated against the password policy
/// * `base_currency` - Optional 3-letter currency code, defaults to "VND"
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub base_currency: Option<String>,
}

/// Login request body
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public projection of a user record.
/// Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserPublic {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub base_currency: String,
}

/// Successful registration/login response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    /// Human-readable status message
    pub message: String,
    /// Signed bearer token
    pub token: String,
    /// Public user fields
    pub user: UserPublic,
}

/// Signed token claim set.
/// Immutable once issued; `exp`/`iat` are Unix timestamps in seconds.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    /// Subject: the user id
    pub sub: UserId,
    pub username: String,
    pub email: String,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

/// One field-level validation violation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
