//! HTTP server - thin router that delegates to specialized handlers.
//!
//! This module handles:
//! - Route table (`/slack/events`, `/slack/lucidlayer`, `/healthz`)
//! - Binding the listener and serving until a shutdown signal
//! - Draining in-flight background tasks before exit

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tracing::{info, warn};

use super::helpers::HEALTH_TEXT;
use super::state::AppState;
use super::{event_handler, slash_handler};
use crate::errors::BotError;

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/slack/events", post(events_route))
        .route("/slack/lucidlayer", post(command_route))
        .route("/healthz", get(health_route))
        .with_state(state)
}

async fn events_route(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    event_handler::handle_webhook(&state, &body, &headers)
}

async fn command_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    slash_handler::handle_command(&state, &body, &headers)
}

async fn health_route() -> impl IntoResponse {
    HEALTH_TEXT
}

/// Serve until Ctrl-C / SIGTERM, then wait for background tasks to finish.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(state: AppState) -> Result<(), BotError> {
    let addr = state.config.bind_addr();
    let supervisor = state.supervisor.clone();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BotError::GeneralError(format!("Failed to bind {addr}: {e}")))?;
    info!("LucidLayer listening on {}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BotError::GeneralError(format!("HTTP server error: {e}")))?;

    let pending = supervisor.in_flight();
    if pending > 0 {
        info!("Waiting for {} background task(s) to finish", pending);
    }
    supervisor.wait_idle().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
