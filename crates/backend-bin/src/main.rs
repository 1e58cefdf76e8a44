use backend_lib::{config::Settings, middleware, router, store::InMemoryUserStore, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration
    let config = Settings::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    // Refuse to serve with an unsafe configuration (placeholder or short
    // signing secret, zeroed lockout windows, ...)
    config.validate()?;

    // The SQL-backed store is wired in by the deployment; the in-memory
    // store backs local development.
    let store = InMemoryUserStore::new();

    // Create application state
    let state = Arc::new(AppState::new(store, &config));

    // Periodic sweep of expired lockout and rate-limit records
    let sweep_state = Arc::clone(&state);
    tokio::spawn(async move {
        let window = std::time::Duration::from_secs(sweep_state.settings.rate_limit.window_secs);
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            let attempts = sweep_state.lockout.purge_expired();
            let clients =
                middleware::rate_limit::purge_expired(&sweep_state.rate_limits, window);
            if attempts > 0 || clients > 0 {
                tracing::debug!(attempts, clients, "purged expired lockout and rate-limit entries");
            }
        }
    });

    // Create the router and start the server
    let app = router::create_router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
