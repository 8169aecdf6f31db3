use super::state::AppState;
use crate::session::SessionStats;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /sessions
/// Stats for every live session, oldest first
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let mut stats: Vec<SessionStats> = sessions.values().map(|c| c.stats()).collect();
    stats.sort_by(|a, b| a.connected_at.cmp(&b.connected_at));

    (StatusCode::OK, Json(stats))
}

/// GET /sessions/:session_id
/// Stats for one session
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(counters) => (StatusCode::OK, Json(counters.stats())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
