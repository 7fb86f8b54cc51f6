//! HTTP surface of the review bot.
//!
//! | Route              | Purpose                                   |
//! |--------------------|-------------------------------------------|
//! | `GET /`            | plain-text liveness greeting              |
//! | `GET /health`      | JSON health envelope                      |
//! | `POST /api/webhook`| signed GitHub App deliveries              |

pub mod core;
pub mod error_handler;
pub mod routes;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub use crate::core::app_state::{AppConfig, AppState, ConfigError};
pub use crate::error_handler::{AppError, AppResult};

use crate::routes::{
    github_webhook::github_webhook_route::github_webhook_route,
    health_route::{health_route, root_route},
};

/// Router with all routes bound to `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_route))
        .route("/health", get(health_route))
        .route("/api/webhook", post(github_webhook_route))
        .with_state(state)
}

/// Builds the state from `config`, binds the listener and serves until
/// Ctrl+C.
pub async fn start(config: AppConfig) -> AppResult<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.address)
        .await
        .map_err(|source| AppError::Bind {
            address: config.address.clone(),
            source,
        })?;
    info!(address = %config.address, "listening for GitHub webhooks");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
