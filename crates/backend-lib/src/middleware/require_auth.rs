// ============================
// crates/backend-lib/src/middleware/require_auth.rs
// ============================
//! Bearer-token authentication middleware.
//!
//! An explicit, composable wrapper: routes behind it only run once the
//! request carries a verifiable token, and the decoded claims ride along
//! in the request extensions for the [`AuthUser`] extractor.

use crate::auth::AuditEventType;
use crate::error::AppError;
use crate::metrics::TOKEN_REJECTED;
use crate::middleware::client_ip;
use crate::AppState;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use moneyminder_common::Claims;
use std::sync::Arc;

/// Reject requests without a valid bearer token.
///
/// Missing header and unverifiable token are distinct failures
/// (`AUTH_REQUIRED` vs `INVALID_TOKEN`); expired and forged tokens are
/// not distinguished from each other.
pub async fn require_auth<S: Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::AuthRequired)?;

    let Some(claims) = state.tokens.verify(token) else {
        let ip = client_ip(request.headers()).to_string();
        state.audit.record(
            AuditEventType::InvalidToken,
            &[
                ("ip_address", ip),
                ("path", request.uri().path().to_string()),
            ],
        );
        counter!(TOKEN_REJECTED).increment(1);
        return Err(AppError::InvalidToken);
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Extractor for the authenticated user's claims
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::AuthRequired)
    }
}
