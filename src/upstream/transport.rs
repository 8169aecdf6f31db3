use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::config::UpstreamConfig;

/// One live duplex connection to the recognition service.
///
/// The adapter drives this without knowing what sits behind it, so tests can
/// substitute a scripted connection.
#[async_trait]
pub trait UpstreamTransport: Send {
    /// Forward one binary audio frame.
    async fn send_audio(&mut self, chunk: Vec<u8>) -> Result<()>;

    /// Send one text control frame (keep-alive, close-stream).
    async fn send_text(&mut self, text: &str) -> Result<()>;

    /// Receive the next inbound text frame. Returns `None` once the peer has
    /// closed the connection.
    async fn next_text(&mut self) -> Result<Option<String>>;
}

/// Opens transports for new sessions.
#[async_trait]
pub trait UpstreamConnector: Send + Sync {
    async fn connect(&self, settings: &UpstreamConfig) -> Result<Box<dyn UpstreamTransport>>;
}

/// Production connector: dials the Deepgram live-transcription endpoint over
/// WebSocket with token authentication.
pub struct DeepgramConnector;

#[async_trait]
impl UpstreamConnector for DeepgramConnector {
    async fn connect(&self, settings: &UpstreamConfig) -> Result<Box<dyn UpstreamTransport>> {
        let api_key = settings
            .api_key
            .as_deref()
            .context("recognition service API key is not configured")?;

        let url = listen_url(settings);
        let mut request = url
            .as_str()
            .into_client_request()
            .context("invalid upstream endpoint URL")?;
        let token = HeaderValue::from_str(&format!("Token {api_key}"))
            .context("API key is not a valid header value")?;
        request.headers_mut().insert(AUTHORIZATION, token);

        let (stream, response) = connect_async(request)
            .await
            .context("recognition service handshake failed")?;
        debug!(status = %response.status(), "upstream websocket connected");

        Ok(Box::new(WsTransport { stream }))
    }
}

/// Live-transcription URL with the session's recognition parameters.
///
/// The boolean switches are a fixed part of the relay's contract; only the
/// model, language and timing thresholds are tunable.
fn listen_url(settings: &UpstreamConfig) -> String {
    format!(
        "{}?model={}&language={}\
         &smart_format=true&punctuate=true&interim_results=true\
         &numerals=true&vad_events=true\
         &endpointing={}&utterance_end_ms={}",
        settings.endpoint,
        settings.model,
        settings.language,
        settings.endpointing_ms,
        settings.utterance_end_ms,
    )
}

struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl UpstreamTransport for WsTransport {
    async fn send_audio(&mut self, chunk: Vec<u8>) -> Result<()> {
        self.stream.send(Message::Binary(chunk)).await?;
        Ok(())
    }

    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Result<Option<String>> {
        while let Some(message) = self.stream.next().await {
            match message? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Close(_) => return Ok(None),
                // Ping/pong are answered by the protocol layer.
                _ => continue,
            }
        }
        Ok(None)
    }
}
