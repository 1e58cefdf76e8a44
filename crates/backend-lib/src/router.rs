// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router assembly.
use crate::config::Settings;
use crate::handlers;
use crate::middleware::{rate_limit, require_auth};
use crate::store::UserStore;
use crate::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the API router
pub fn create_router<S: UserStore + Clone + Send + Sync + 'static>(
    state: Arc<AppState<S>>,
) -> Router {
    let protected = Router::new()
        .route("/api/auth/me", get(handlers::auth::me::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<S>,
        ));

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::auth::register::<S>))
        .route("/api/auth/login", post(handlers::auth::login::<S>))
        .route(
            "/api/auth/password-requirements",
            get(handlers::auth::password_requirements),
        )
        .merge(protected)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.settings))
        .with_state(state)
}

/// CORS policy for the configured frontend origins
fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
