// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `MoneyMinder` backend.

pub mod rate_limit;
pub mod require_auth;

pub use rate_limit::{rate_limit, RateLimitEntry};
pub use require_auth::{require_auth, AuthUser};

use axum::http::HeaderMap;

/// Best-effort client IP from the reverse proxy headers.
/// `X-Forwarded-For` wins (first hop is the originating client),
/// then `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|h| h.to_str().ok()))
        .unwrap_or("unknown")
}
