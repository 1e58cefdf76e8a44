// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `MoneyMinder` REST backend:
//! the authentication and account-protection subsystem, its HTTP surface,
//! and the shared application state.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod store;
pub mod validation;

use crate::auth::{AccountLockout, AuditLog, TokenService};
use crate::config::Settings;
use crate::middleware::RateLimitEntry;
use dashmap::DashMap;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// User store backend
    pub store: S,
    /// Settings snapshot
    pub settings: Arc<Settings>,
    /// Token issuing/verification service
    pub tokens: Arc<TokenService>,
    /// Per-account lockout tracker
    pub lockout: Arc<AccountLockout>,
    /// Security audit log
    pub audit: Arc<AuditLog>,
    /// Per-IP request counters for the rate limiter
    pub rate_limits: Arc<DashMap<String, RateLimitEntry>>,
}

impl<S> AppState<S> {
    /// Create the application state, opening the audit sink from settings
    pub fn new(store: S, settings: &Settings) -> Self {
        Self::with_audit(store, settings, AuditLog::new(&settings.audit_log_path))
    }

    /// Create the application state with an explicit audit log.
    /// Tests use this to point the sink at a temp file or disable it.
    pub fn with_audit(store: S, settings: &Settings, audit: AuditLog) -> Self {
        Self {
            store,
            tokens: Arc::new(TokenService::new(
                &settings.jwt_secret,
                settings.token_expiration_hours,
            )),
            lockout: Arc::new(AccountLockout::new(
                settings.lockout.max_attempts,
                settings.lockout.window_minutes,
            )),
            audit: Arc::new(audit),
            rate_limits: Arc::new(DashMap::new()),
            settings: Arc::new(settings.clone()),
        }
    }
}
