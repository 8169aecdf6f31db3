use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket},
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use super::state::AppState;
use crate::session::{ClientMessage, RelaySession, ServerMessage, SessionCounters};

/// GET /ws
/// Upgrade to the relay's client channel: binary frames carry audio chunks,
/// text frames carry JSON control and transcript messages.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection loop. Everything one session does happens on this task:
/// client frames and upstream events are interleaved here, which gives the
/// in-order guarantees the session relies on for free.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = format!("session-{}", uuid::Uuid::new_v4());
    let counters = Arc::new(SessionCounters::new(session_id.clone()));
    state.register_session(Arc::clone(&counters)).await;

    let (mut session, mut events) = RelaySession::open(
        session_id,
        Arc::clone(&state.connector),
        state.config.upstream.clone(),
        Arc::clone(&state.translit),
        counters,
    );

    let (mut sender, mut receiver) = socket.split();
    let mut events_open = true;

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Binary(chunk))) => session.handle_audio(chunk),
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => session.handle_control(message).await,
                        Err(err) => {
                            debug!(session_id = %session.id(), "ignoring malformed client frame: {}", err);
                        }
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    debug!(session_id = %session.id(), "client sent close frame");
                    break;
                }
                // Pings and pongs are answered by the protocol layer.
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    debug!(session_id = %session.id(), "client read failed: {}", err);
                    break;
                }
                None => break,
            },
            event = events.recv(), if events_open => match event {
                Some(event) => {
                    if let Some(reply) = session.handle_upstream_event(event) {
                        if let Err(err) = push(&mut sender, &reply).await {
                            warn!(session_id = %session.id(), "client push failed: {:#}", err);
                            break;
                        }
                    }
                }
                None => events_open = false,
            },
        }
    }

    session.teardown().await;
    state.remove_session(session.id()).await;
    info!(session_id = %session.id(), "client disconnected");
}

async fn push(
    sender: &mut SplitSink<WebSocket, Message>,
    reply: &ServerMessage,
) -> anyhow::Result<()> {
    let json = serde_json::to_string(reply)?;
    sender.send(Message::Text(json)).await?;
    Ok(())
}
