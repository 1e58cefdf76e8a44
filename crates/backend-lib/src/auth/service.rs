// ============================
// crates/backend-lib/src/auth/service.rs
// ============================
//! Login and registration orchestration.
//!
//! The fixed protocol: a login always checks lockout state before any
//! credential work, so a locked account leaks neither whether the email
//! exists nor whether the password was correct. Unknown-account and
//! wrong-password failures share one generic `INVALID_CREDENTIALS`
//! surface; the true reason goes to the audit log only.

use crate::auth::{password, policy};
use crate::error::AppError;
use crate::metrics::{ACCOUNT_LOCKED, LOGIN_FAILURE, LOGIN_SUCCESS, REGISTRATION};
use crate::store::{NewUser, UserStore};
use crate::validation;
use crate::AppState;
use metrics::counter;
use moneyminder_common::{AuthResponse, FieldViolation, LoginRequest, RegisterRequest, UserPublic};

/// Default base currency for new accounts
const DEFAULT_BASE_CURRENCY: &str = "VND";

/// Register a new user.
///
/// All field violations are collected and returned together; nothing is
/// written to the store unless every check passes.
pub async fn register<S: UserStore>(
    state: &AppState<S>,
    req: RegisterRequest,
    ip: &str,
) -> Result<AuthResponse, AppError> {
    let mut violations = Vec::new();

    if let Err(e) = validation::validate_username(&req.username) {
        violations.push(FieldViolation::new(e.field(), e.message()));
    }
    if let Err(e) = validation::validate_email(&req.email) {
        violations.push(FieldViolation::new(e.field(), e.message()));
    }
    if let Err(e) = validation::validate_password_length(&req.password) {
        violations.push(FieldViolation::new(e.field(), e.message()));
    }

    let policy_result = policy::validate(&req.password, Some(&req.username), Some(&req.email));
    for violation in policy_result.violations {
        violations.push(FieldViolation::new("password", violation));
    }

    if let Some(currency) = &req.base_currency {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            violations.push(FieldViolation::new(
                "base_currency",
                "Currency must be a 3-letter code",
            ));
        }
    }

    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }

    if state.store.exists_by_email(&req.email).await? {
        return Err(AppError::EmailExists);
    }

    let mut plain = req.password;
    let password_hash = password::hash_password_secure(&mut plain)
        .map_err(|e| AppError::Internal(format!("password hash: {e}")))?;

    let base_currency = req
        .base_currency
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());

    let user_id = state
        .store
        .insert(NewUser {
            username: req.username.clone(),
            email: req.email.clone(),
            password_hash,
            base_currency: base_currency.clone(),
        })
        .await?;

    state.audit.log_registration(&req.email, ip, user_id);
    counter!(REGISTRATION).increment(1);

    let token = state.tokens.issue(user_id, &req.username, &req.email)?;

    Ok(AuthResponse {
        message: "Registration successful".to_string(),
        token,
        user: UserPublic {
            user_id,
            username: req.username,
            email: req.email,
            base_currency,
        },
    })
}

/// Authenticate a user.
pub async fn login<S: UserStore>(
    state: &AppState<S>,
    req: LoginRequest,
    ip: &str,
) -> Result<AuthResponse, AppError> {
    let mut violations = Vec::new();
    if req.email.is_empty() {
        violations.push(FieldViolation::new("email", "Email is required"));
    }
    if req.password.is_empty() {
        violations.push(FieldViolation::new("password", "Password is required"));
    }
    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }

    // Lockout is checked once, before any credential work.
    let (locked, retry_after) = state.lockout.is_locked(&req.email);
    if locked {
        state
            .audit
            .log_login_attempt(&req.email, ip, false, None, Some("Account locked"));
        counter!(LOGIN_FAILURE).increment(1);
        return Err(AppError::AccountLocked { retry_after });
    }

    // The lockout lock is not held across the store call.
    let Some(user) = state.store.find_by_email(&req.email).await? else {
        // Identical error surface to a wrong password; the audit log
        // keeps the real reason.
        note_failed_attempt(state, &req.email, ip, "User not found");
        return Err(AppError::InvalidCredentials);
    };

    if !password::verify_password(&user.password_hash, &req.password) {
        // A lockout the caller learns about immediately is one *this*
        // attempt triggered; an already-locked account was rejected above.
        if let Some(retry_after) = note_failed_attempt(state, &req.email, ip, "Invalid password") {
            return Err(AppError::AccountLocked { retry_after });
        }
        return Err(AppError::InvalidCredentials);
    }

    state.lockout.reset(&req.email);
    state
        .audit
        .log_login_attempt(&req.email, ip, true, Some(user.user_id), None);
    counter!(LOGIN_SUCCESS).increment(1);

    let token = state
        .tokens
        .issue(user.user_id, &user.username, &user.email)?;

    Ok(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: user.public(),
    })
}

/// Record a failed attempt and do the shared bookkeeping.
///
/// Returns `Some(retry_after)` when this attempt transitioned the key to
/// LOCKED. The lockout event is written after the failure event so the
/// audit log preserves cause before effect.
fn note_failed_attempt<S>(
    state: &AppState<S>,
    email: &str,
    ip: &str,
    reason: &str,
) -> Option<u64> {
    state.lockout.record_failed_attempt(email, ip);
    state
        .audit
        .log_login_attempt(email, ip, false, None, Some(reason));
    counter!(LOGIN_FAILURE).increment(1);

    let (locked, retry_after) = state.lockout.is_locked(email);
    if locked {
        state.audit.log_account_locked(email, ip, retry_after);
        counter!(ACCOUNT_LOCKED).increment(1);
        Some(retry_after)
    } else {
        None
    }
}
