//! Relay session management
//!
//! This module binds the pieces of one client connection together:
//! - Client wire protocol (control intents in, readiness/transcript/error out)
//! - The session state machine (idle, streaming, paused, ended)
//! - Audio routing into the upstream recognition session
//! - Transcript accumulation and push-out
//! - Session statistics for the introspection endpoints

mod protocol;
mod session;
mod stats;

pub use protocol::{ClientMessage, ServerMessage};
pub use session::{RelaySession, SessionState};
pub use stats::{SessionCounters, SessionStats};
