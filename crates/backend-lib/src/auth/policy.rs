// ============================
// crates/backend-lib/src/auth/policy.rs
// ============================
//! Password policy enforcement.
//!
//! Stateless strength checks plus contextual exclusions (the password must
//! not contain the username or the email local part). All rules are
//! evaluated so a client can fix every violation in one round trip.

use serde::Serialize;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Accepted special characters
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?~`'\"\\/";

/// Email local parts shorter than this are not checked as substrings,
/// short prefixes like "ab@..." would reject too many valid passwords.
const MIN_LOCAL_PART_LENGTH: usize = 3;

/// Outcome of one validation call
#[derive(Debug, Clone)]
pub struct PolicyResult {
    pub is_valid: bool,
    pub violations: Vec<String>,
}

/// Machine-readable policy description, served to clients so signup forms
/// can mirror the server-side rules.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
    pub special_chars: &'static str,
}

/// Describe the active policy
pub fn requirements() -> PolicyRequirements {
    PolicyRequirements {
        min_length: MIN_PASSWORD_LENGTH,
        require_uppercase: true,
        require_lowercase: true,
        require_digit: true,
        require_special: true,
        special_chars: SPECIAL_CHARS,
    }
}

/// Validate a password against the policy.
///
/// An empty password short-circuits to a single "required" violation;
/// every other rule is checked independently and all failures are
/// reported together.
pub fn validate(password: &str, username: Option<&str>, email: Option<&str>) -> PolicyResult {
    if password.is_empty() {
        return PolicyResult {
            is_valid: false,
            violations: vec!["Password is required".to_string()],
        };
    }

    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Password must contain at least one digit".to_string());
    }

    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        violations.push("Password must contain at least one special character".to_string());
    }

    let lowered = password.to_lowercase();

    if let Some(username) = username {
        if !username.is_empty() && lowered.contains(&username.to_lowercase()) {
            violations.push("Password cannot contain username".to_string());
        }
    }

    if let Some(email) = email {
        if let Some(local) = email.split('@').next() {
            if email.contains('@')
                && local.len() >= MIN_LOCAL_PART_LENGTH
                && lowered.contains(&local.to_lowercase())
            {
                violations.push("Password cannot contain email".to_string());
            }
        }
    }

    PolicyResult {
        is_valid: violations.is_empty(),
        violations,
    }
}
