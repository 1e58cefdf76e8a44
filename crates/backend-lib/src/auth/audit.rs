// ============================
// crates/backend-lib/src/auth/audit.rs
// ============================
//! Security audit logging.
//!
//! Append-only record of security-relevant events (login outcomes,
//! lockouts, registrations, rejected tokens). One process-wide instance
//! owns the sink; writes are serialized behind a mutex so concurrent
//! requests never interleave lines. Logging is best-effort: a failing
//! sink is reported via `tracing` and metrics, never to the caller.

use crate::metrics::{AUDIT_EVENT, AUDIT_WRITE_FAILURE};
use chrono::{SecondsFormat, Utc};
use metrics::counter;
use moneyminder_common::UserId;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Types of security audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventType {
    LoginSuccess,
    LoginFailure,
    AccountLocked,
    RateLimitExceeded,
    Registration,
    PasswordChange,
    InvalidToken,
}

impl AuditEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditEventType::LoginSuccess => "LOGIN_SUCCESS",
            AuditEventType::LoginFailure => "LOGIN_FAILURE",
            AuditEventType::AccountLocked => "ACCOUNT_LOCKED",
            AuditEventType::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            AuditEventType::Registration => "REGISTRATION",
            AuditEventType::PasswordChange => "PASSWORD_CHANGE",
            AuditEventType::InvalidToken => "INVALID_TOKEN",
        }
    }
}

/// Append-only security event log
pub struct AuditLog {
    sink: Mutex<Option<File>>,
}

impl AuditLog {
    /// Open (or create) the audit log file.
    ///
    /// A sink that cannot be opened does not fail startup: events still
    /// reach the tracing subscriber, only the file copy is lost.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let sink = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "audit log sink unavailable");
                None
            },
        };

        Self {
            sink: Mutex::new(sink),
        }
    }

    /// An audit log without a file sink (events go to tracing only)
    pub fn disabled() -> Self {
        Self {
            sink: Mutex::new(None),
        }
    }

    /// Append one event line: `<iso8601> [EVENT] k=v | k=v`
    pub fn record(&self, event_type: AuditEventType, details: &[(&str, String)]) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let rendered = details
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" | ");
        let line = format!("{timestamp} [{}] {rendered}\n", event_type.as_str());

        counter!(AUDIT_EVENT, "type" => event_type.as_str()).increment(1);
        tracing::info!(target: "security_audit", event = event_type.as_str(), "{rendered}");

        let mut sink = self.sink.lock();
        if let Some(file) = sink.as_mut() {
            if let Err(e) = file.write_all(line.as_bytes()) {
                // Best-effort: never let a sink failure reach the request path
                counter!(AUDIT_WRITE_FAILURE).increment(1);
                tracing::warn!(error = %e, "failed to append audit event");
            }
        }
    }

    /// Log a login attempt, successful or not
    pub fn log_login_attempt(
        &self,
        email: &str,
        ip: &str,
        success: bool,
        user_id: Option<UserId>,
        reason: Option<&str>,
    ) {
        let event_type = if success {
            AuditEventType::LoginSuccess
        } else {
            AuditEventType::LoginFailure
        };

        let mut details = vec![
            ("email", email.to_string()),
            ("ip_address", ip.to_string()),
            ("success", success.to_string()),
        ];
        if let Some(user_id) = user_id {
            details.push(("user_id", user_id.to_string()));
        }
        if let Some(reason) = reason {
            details.push(("reason", reason.to_string()));
        }

        self.record(event_type, &details);
    }

    /// Log an account lockout event
    pub fn log_account_locked(&self, email: &str, ip: &str, duration_secs: u64) {
        self.record(
            AuditEventType::AccountLocked,
            &[
                ("email", email.to_string()),
                ("ip_address", ip.to_string()),
                ("duration_secs", duration_secs.to_string()),
            ],
        );
    }

    /// Log a rate limit exceeded event
    pub fn log_rate_limit(&self, ip: &str, endpoint: &str) {
        self.record(
            AuditEventType::RateLimitExceeded,
            &[
                ("ip_address", ip.to_string()),
                ("endpoint", endpoint.to_string()),
            ],
        );
    }

    /// Log a new user registration
    pub fn log_registration(&self, email: &str, ip: &str, user_id: UserId) {
        self.record(
            AuditEventType::Registration,
            &[
                ("email", email.to_string()),
                ("ip_address", ip.to_string()),
                ("user_id", user_id.to_string()),
            ],
        );
    }
}
