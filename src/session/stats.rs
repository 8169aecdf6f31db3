use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::SessionState;

/// Statistics about one relay session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier
    pub session_id: String,

    /// Current lifecycle state
    pub state: SessionState,

    /// When the client connected
    pub connected_at: DateTime<Utc>,

    /// Seconds since the client connected
    pub duration_secs: f64,

    /// Audio chunks received from the client
    pub audio_chunks: usize,

    /// Recognition events applied to the transcript
    pub transcript_events: usize,

    /// How many of those events were final segments
    pub final_segments: usize,
}

/// Live counters for one session, shared with the introspection endpoints.
///
/// The owning session writes, HTTP handlers read; everything is atomic so
/// neither side waits on the other.
#[derive(Debug)]
pub struct SessionCounters {
    session_id: String,
    connected_at: DateTime<Utc>,
    state: AtomicU8,
    audio_chunks: AtomicUsize,
    transcript_events: AtomicUsize,
    final_segments: AtomicUsize,
}

impl SessionCounters {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            connected_at: Utc::now(),
            state: AtomicU8::new(state_to_u8(SessionState::Idle)),
            audio_chunks: AtomicUsize::new(0),
            transcript_events: AtomicUsize::new(0),
            final_segments: AtomicUsize::new(0),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn set_state(&self, state: SessionState) {
        self.state.store(state_to_u8(state), Ordering::SeqCst);
    }

    pub fn record_audio_chunk(&self) {
        self.audio_chunks.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_transcript_event(&self, is_final: bool) {
        self.transcript_events.fetch_add(1, Ordering::SeqCst);
        if is_final {
            self.final_segments.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Snapshot the counters into a serializable report.
    pub fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.connected_at);

        SessionStats {
            session_id: self.session_id.clone(),
            state: state_from_u8(self.state.load(Ordering::SeqCst)),
            connected_at: self.connected_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            audio_chunks: self.audio_chunks.load(Ordering::SeqCst),
            transcript_events: self.transcript_events.load(Ordering::SeqCst),
            final_segments: self.final_segments.load(Ordering::SeqCst),
        }
    }
}

fn state_to_u8(state: SessionState) -> u8 {
    match state {
        SessionState::Idle => 0,
        SessionState::Streaming => 1,
        SessionState::Paused => 2,
        SessionState::Ended => 3,
    }
}

fn state_from_u8(raw: u8) -> SessionState {
    match raw {
        1 => SessionState::Streaming,
        2 => SessionState::Paused,
        3 => SessionState::Ended,
        _ => SessionState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_roundtrip_into_stats() {
        let counters = SessionCounters::new("session-1".to_string());
        counters.set_state(SessionState::Streaming);
        counters.record_audio_chunk();
        counters.record_audio_chunk();
        counters.record_transcript_event(false);
        counters.record_transcript_event(true);

        let stats = counters.stats();
        assert_eq!(stats.session_id, "session-1");
        assert_eq!(stats.state, SessionState::Streaming);
        assert_eq!(stats.audio_chunks, 2);
        assert_eq!(stats.transcript_events, 2);
        assert_eq!(stats.final_segments, 1);
    }
}
