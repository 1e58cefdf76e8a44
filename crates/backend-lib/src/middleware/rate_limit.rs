// ============================
// crates/backend-lib/src/middleware/rate_limit.rs
// ============================
//! Per-IP fixed-window request rate limiting.
//!
//! Coarse request throttling in front of every route; unrelated to the
//! per-account lockout, which tracks failed credentials per email.

use crate::error::AppError;
use crate::metrics::RATE_LIMITED;
use crate::middleware::client_ip;
use crate::AppState;
use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use dashmap::DashMap;
use metrics::counter;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rate limit entry for a client
#[derive(Debug)]
pub struct RateLimitEntry {
    requests: u32,
    window_start: Instant,
}

/// Rate limiter middleware
pub async fn rate_limit<S: Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(request.headers()).to_string();

    let max_requests = state.settings.rate_limit.max_requests;
    let window = Duration::from_secs(state.settings.rate_limit.window_secs);

    let exceeded = {
        let mut entry = state
            .rate_limits
            .entry(ip.clone())
            .or_insert_with(|| RateLimitEntry {
                requests: 0,
                window_start: Instant::now(),
            });

        if entry.window_start.elapsed() > window {
            entry.requests = 0;
            entry.window_start = Instant::now();
        }

        if entry.requests >= max_requests {
            true
        } else {
            entry.requests += 1;
            false
        }
    };

    if exceeded {
        state.audit.log_rate_limit(&ip, request.uri().path());
        counter!(RATE_LIMITED).increment(1);
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Drop every client whose window has fully elapsed.
///
/// The keys come from client-supplied headers, so the table would grow
/// without bound if stale entries were never removed. Returns the number
/// of entries dropped; meant for a periodic sweep.
pub fn purge_expired(entries: &DashMap<String, RateLimitEntry>, window: Duration) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.window_start.elapsed() <= window);
    before - entries.len()
}
