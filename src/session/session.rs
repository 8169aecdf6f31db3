use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::UpstreamConfig;
use crate::transcript::Accumulator;
use crate::translit::Transliterator;
use crate::upstream::{UpstreamConnector, UpstreamEvent, UpstreamSession};

use super::protocol::{ClientMessage, ServerMessage};
use super::stats::SessionCounters;

/// Upstream event queue depth per session.
const EVENT_QUEUE_DEPTH: usize = 64;

/// Lifecycle of one client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Client connected; upstream open is in flight, no start intent yet.
    Idle,
    /// Client is streaming audio.
    Streaming,
    /// Streaming suspended; the upstream session is kept for resume.
    Paused,
    /// Terminal. No audio is forwarded past this point.
    Ended,
}

/// Binds one client connection to exactly one upstream recognition session
/// and one transcript accumulator.
///
/// The connection loop feeds client frames and upstream events in; replies
/// come back as [`ServerMessage`]s for the loop to push. All state lives in
/// this struct and is owned by that single loop, so nothing here locks.
pub struct RelaySession {
    id: String,
    state: SessionState,
    upstream: UpstreamSession,
    accumulator: Accumulator,
    counters: Arc<SessionCounters>,
    torn_down: bool,
}

impl RelaySession {
    /// Create the session and eagerly open its upstream recognition session,
    /// so readiness can be signaled as soon as possible.
    ///
    /// Returns the session plus the upstream event stream the caller must
    /// drain alongside client traffic.
    pub fn open(
        id: String,
        connector: Arc<dyn UpstreamConnector>,
        settings: UpstreamConfig,
        translit: Arc<Transliterator>,
        counters: Arc<SessionCounters>,
    ) -> (Self, mpsc::Receiver<UpstreamEvent>) {
        info!(session_id = %id, "client connected, opening upstream session");

        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let upstream = UpstreamSession::open(connector, settings, event_tx);

        let session = Self {
            id,
            state: SessionState::Idle,
            upstream,
            accumulator: Accumulator::new(translit),
            counters,
            torn_down: false,
        };
        session.counters.set_state(session.state);

        (session, event_rx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Apply one client control intent.
    pub async fn handle_control(&mut self, message: ClientMessage) {
        if self.state == SessionState::Ended {
            debug!(session_id = %self.id, ?message, "ignoring control intent after end");
            return;
        }

        match message {
            ClientMessage::Start => {
                // Resume reuses the upstream session opened at connect time;
                // a second one is never created.
                self.set_state(SessionState::Streaming);
                info!(session_id = %self.id, "streaming started");
            }
            ClientMessage::Pause => {
                self.set_state(SessionState::Paused);
                info!(session_id = %self.id, "streaming paused");
            }
            ClientMessage::Stop => {
                self.set_state(SessionState::Ended);
                info!(session_id = %self.id, "recording stopped by client");
                // Flush the upstream session so trailing finals still arrive.
                self.upstream.finish().await;
            }
        }
    }

    /// Forward one binary audio chunk.
    ///
    /// The upstream handle enforces the open-state gate, so chunks pass
    /// through unconditionally here; only a terminal session refuses them.
    pub fn handle_audio(&mut self, chunk: Vec<u8>) {
        if self.state == SessionState::Ended {
            debug!(session_id = %self.id, "discarding audio chunk after end");
            return;
        }
        self.counters.record_audio_chunk();
        self.upstream.send(chunk);
    }

    /// React to one upstream event; returns the message to push to the
    /// client, if any.
    pub fn handle_upstream_event(&mut self, event: UpstreamEvent) -> Option<ServerMessage> {
        if self.torn_down {
            debug!(session_id = %self.id, "dropping upstream event after teardown");
            return None;
        }

        match event {
            UpstreamEvent::Connected => {
                info!(session_id = %self.id, "upstream session ready");
                Some(ServerMessage::DgReady)
            }
            UpstreamEvent::Transcript(event) => {
                let snapshot = self.accumulator.apply(&event)?;
                self.counters.record_transcript_event(event.is_final);
                Some(ServerMessage::from(snapshot))
            }
            UpstreamEvent::Error(message) => {
                warn!(session_id = %self.id, %message, "upstream error");
                Some(ServerMessage::DgError { message })
            }
            UpstreamEvent::Closed => {
                info!(session_id = %self.id, "upstream session closed");
                None
            }
        }
    }

    /// Tear the session down after the client is gone.
    ///
    /// Runs its steps once no matter how often it is called: mark the session
    /// ended, request a flush-close of the upstream session, and log the
    /// final numbers. The upstream keep-alive stops with its session.
    pub async fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.set_state(SessionState::Ended);
        self.upstream.finish().await;

        let stats = self.counters.stats();
        info!(
            session_id = %self.id,
            audio_chunks = stats.audio_chunks,
            transcript_events = stats.transcript_events,
            final_segments = stats.final_segments,
            "session closed"
        );
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.counters.set_state(state);
    }
}
