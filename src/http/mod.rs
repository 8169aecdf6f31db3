//! HTTP and WebSocket surface
//!
//! This module exposes the relay to browsers and operators:
//! - GET /ws - client channel (audio chunks in, transcript updates out)
//! - GET /health - health check
//! - GET /sessions - statistics for live sessions
//! - GET /sessions/:id - statistics for one session

mod handlers;
mod routes;
mod state;
mod ws;

pub use routes::create_router;
pub use state::AppState;
