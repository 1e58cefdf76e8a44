// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILURE: &str = "auth.login.failure";
pub const ACCOUNT_LOCKED: &str = "auth.lockout.triggered";
pub const REGISTRATION: &str = "auth.registration";
pub const TOKEN_REJECTED: &str = "auth.token.rejected";
pub const RATE_LIMITED: &str = "http.rate_limited";
pub const AUDIT_EVENT: &str = "audit.event";
pub const AUDIT_WRITE_FAILURE: &str = "audit.write_failure";
