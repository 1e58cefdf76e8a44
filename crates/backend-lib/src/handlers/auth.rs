// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Auth route handlers.
//!
//! Thin shims over [`crate::auth::service`]: extract the client IP and
//! body, delegate, shape the response. All policy lives in the service
//! and its collaborators.

use crate::auth::{policy, service};
use crate::error::AppError;
use crate::middleware::{client_ip, AuthUser};
use crate::store::UserStore;
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use moneyminder_common::{AuthResponse, LoginRequest, RegisterRequest};
use std::sync::Arc;

/// POST /api/auth/register
pub async fn register<S: UserStore + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let ip = client_ip(&headers).to_string();
    let response = service::register(&state, req, &ip).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
pub async fn login<S: UserStore + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let ip = client_ip(&headers).to_string();
    let response = service::login(&state, req, &ip).await?;
    Ok(Json(response))
}

/// GET /api/auth/me (requires auth)
pub async fn me<S: UserStore + Send + Sync + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = state
        .store
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(serde_json::json!({ "user": user.public() })))
}

/// GET /api/auth/password-requirements
pub async fn password_requirements() -> Json<policy::PolicyRequirements> {
    Json(policy::requirements())
}
