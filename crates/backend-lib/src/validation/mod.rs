// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Structural input validation.
//!
//! Password *strength* lives in [`crate::auth::policy`]; this module only
//! checks shape: email format, username format, field length caps matching
//! the database schema.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Field length limits matching the database schema
const MAX_EMAIL_LENGTH: usize = 100;
const MAX_PASSWORD_LENGTH: usize = 255;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,50}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),
}

impl ValidationError {
    /// The request field this error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidEmail(_) => "email",
            ValidationError::InvalidUsername(_) => "username",
            ValidationError::InvalidPassword(_) => "password",
        }
    }

    /// The field-level message without the field prefix
    pub fn message(&self) -> &str {
        match self {
            ValidationError::InvalidEmail(msg)
            | ValidationError::InvalidUsername(msg)
            | ValidationError::InvalidPassword(msg) => msg,
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email is required".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email format".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a username
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.is_empty() {
        return Err(ValidationError::InvalidUsername(
            "Username is required".to_string(),
        ));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(format!(
            "Username must be {MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters, \
             alphanumeric and underscores only"
        )));
    }

    Ok(username)
}

/// Validate password shape (length cap only; strength is policy's job)
pub fn validate_password_length(password: &str) -> ValidationResult<&str> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}
