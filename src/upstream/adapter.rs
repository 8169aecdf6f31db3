use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

use crate::config::UpstreamConfig;

use super::events::{UpstreamEvent, UpstreamMessage};
use super::transport::UpstreamConnector;

const KEEP_ALIVE_FRAME: &str = r#"{"type":"KeepAlive"}"#;
const CLOSE_STREAM_FRAME: &str = r#"{"type":"CloseStream"}"#;

/// Audio queue depth. At one chunk every 250ms this covers a minute of
/// upstream stall before chunks start getting dropped.
const AUDIO_QUEUE_DEPTH: usize = 256;

/// Observable state of an upstream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

enum Command {
    Audio(Vec<u8>),
    Finish,
}

/// Handle to one streaming recognition session.
///
/// `open` returns immediately; readiness, results, errors and the final close
/// all arrive on the event channel. The handle enforces the open-state gate
/// for audio, so callers forward chunks without checking state themselves.
pub struct UpstreamSession {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ConnectionState>,
}

impl UpstreamSession {
    /// Open a recognition session in the background.
    pub fn open(
        connector: Arc<dyn UpstreamConnector>,
        settings: UpstreamConfig,
        events: mpsc::Sender<UpstreamEvent>,
    ) -> Self {
        let (commands, command_rx) = mpsc::channel(AUDIO_QUEUE_DEPTH);
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);

        tokio::spawn(run(connector, settings, events, command_rx, state_tx));

        Self { commands, state }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Forward one audio chunk.
    ///
    /// Chunks arriving while the session is still connecting or after it
    /// closed are dropped silently; that is expected during startup and
    /// teardown. Returns whether the chunk was accepted.
    pub fn send(&self, chunk: Vec<u8>) -> bool {
        if self.state() != ConnectionState::Open {
            debug!("dropping audio chunk, upstream session not open");
            return false;
        }
        match self.commands.try_send(Command::Audio(chunk)) {
            Ok(()) => true,
            Err(err) => {
                warn!("dropping audio chunk: {}", err);
                false
            }
        }
    }

    /// Request a graceful flush-then-close. No-op once the session is closed.
    pub async fn finish(&self) {
        if self.state() == ConnectionState::Closed {
            return;
        }
        // A send error means the task already exited, i.e. already closed.
        if self.commands.send(Command::Finish).await.is_err() {
            debug!("finish requested on an already-closed upstream session");
        }
    }
}

/// Connection task: dials the service, then pumps frames until either side
/// closes. Emits `Connected`, `Transcript`, `Error` and finally `Closed`.
async fn run(
    connector: Arc<dyn UpstreamConnector>,
    settings: UpstreamConfig,
    events: mpsc::Sender<UpstreamEvent>,
    mut commands: mpsc::Receiver<Command>,
    state: watch::Sender<ConnectionState>,
) {
    let connect_timeout = Duration::from_secs(settings.connect_timeout_secs);
    let connected = tokio::time::timeout(connect_timeout, connector.connect(&settings)).await;

    let mut transport = match connected {
        Ok(Ok(transport)) => transport,
        Ok(Err(err)) => {
            error!("failed to open upstream session: {:#}", err);
            let _ = events
                .send(UpstreamEvent::Error(format!("upstream connect failed: {err:#}")))
                .await;
            let _ = state.send(ConnectionState::Closed);
            let _ = events.send(UpstreamEvent::Closed).await;
            return;
        }
        Err(_) => {
            error!("upstream connect timed out after {:?}", connect_timeout);
            let _ = events
                .send(UpstreamEvent::Error("upstream connect timed out".to_string()))
                .await;
            let _ = state.send(ConnectionState::Closed);
            let _ = events.send(UpstreamEvent::Closed).await;
            return;
        }
    };

    let _ = state.send(ConnectionState::Open);
    if events.send(UpstreamEvent::Connected).await.is_err() {
        // The session is already gone; close out the stream and stop.
        let _ = transport.send_text(CLOSE_STREAM_FRAME).await;
        let _ = state.send(ConnectionState::Closed);
        return;
    }
    info!("upstream session open");

    // First keep-alive fires one period in, not immediately.
    let keep_alive = Duration::from_secs(settings.keep_alive_secs);
    let mut keepalive = interval_at(Instant::now() + keep_alive, keep_alive);

    let mut closing = false;
    let mut commands_open = true;

    loop {
        tokio::select! {
            frame = transport.next_text() => match frame {
                Ok(Some(raw)) => match UpstreamMessage::parse(&raw) {
                    Ok(UpstreamMessage::Results(event)) => {
                        if events.send(UpstreamEvent::Transcript(event)).await.is_err() {
                            break;
                        }
                    }
                    Ok(UpstreamMessage::Other) => {
                        debug!("ignoring non-transcript upstream frame");
                    }
                    Err(err) => debug!("ignoring unparseable upstream frame: {}", err),
                },
                Ok(None) => {
                    info!("upstream session closed by peer");
                    break;
                }
                Err(err) => {
                    error!("upstream read failed: {:#}", err);
                    let _ = events.send(UpstreamEvent::Error(err.to_string())).await;
                    break;
                }
            },
            command = commands.recv(), if commands_open => match command {
                Some(Command::Audio(chunk)) => {
                    if closing {
                        continue;
                    }
                    if let Err(err) = transport.send_audio(chunk).await {
                        error!("upstream audio send failed: {:#}", err);
                        let _ = events.send(UpstreamEvent::Error(err.to_string())).await;
                        break;
                    }
                }
                Some(Command::Finish) => {
                    if !closing {
                        closing = true;
                        debug!("requesting graceful upstream close");
                        if transport.send_text(CLOSE_STREAM_FRAME).await.is_err() {
                            break;
                        }
                    }
                }
                None => {
                    // Every handle dropped: treat as finish.
                    commands_open = false;
                    if !closing {
                        closing = true;
                        if transport.send_text(CLOSE_STREAM_FRAME).await.is_err() {
                            break;
                        }
                    }
                }
            },
            _ = keepalive.tick(), if !closing => {
                if let Err(err) = transport.send_text(KEEP_ALIVE_FRAME).await {
                    error!("upstream keep-alive failed: {:#}", err);
                    let _ = events.send(UpstreamEvent::Error(err.to_string())).await;
                    break;
                }
            }
        }
    }

    // The keep-alive interval is owned by this task, so every exit path above
    // stops it.
    let _ = state.send(ConnectionState::Closed);
    let _ = events.send(UpstreamEvent::Closed).await;
    info!("upstream session finished");
}
