use super::handlers;
use super::state::AppState;
use super::ws;
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Result<Router> {
    let cors = cors_layer(state.config.service.http.allowed_origin.as_deref())?;

    Ok(Router::new()
        // Client channel
        .route("/ws", get(ws::websocket_handler))
        // Health check
        .route("/health", get(handlers::health_check))
        // Session introspection
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/:session_id", get(handlers::get_session))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Browser origin policy for the handshake; wide open when unconfigured.
fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer> {
    match allowed_origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid allowed_origin: {origin}"))?;
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any))
        }
        None => Ok(CorsLayer::permissive()),
    }
}
