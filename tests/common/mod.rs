// Shared test doubles for the upstream recognition connection.
//
// MockConnector hands out a single scripted transport: tests feed inbound
// frames through an unbounded channel and inspect everything the adapter
// sent. Dropping the inbound sender acts as the peer closing the stream.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use lipi_relay::config::UpstreamConfig;
use lipi_relay::{UpstreamConnector, UpstreamEvent, UpstreamTransport};

pub const KEEP_ALIVE_FRAME: &str = r#"{"type":"KeepAlive"}"#;
pub const CLOSE_STREAM_FRAME: &str = r#"{"type":"CloseStream"}"#;

/// A frame the adapter pushed into the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Audio(Vec<u8>),
    Text(String),
}

pub struct MockTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
    inbound: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl UpstreamTransport for MockTransport {
    async fn send_audio(&mut self, chunk: Vec<u8>) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Audio(chunk));
        Ok(())
    }

    async fn send_text(&mut self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
        Ok(())
    }

    async fn next_text(&mut self) -> Result<Option<String>> {
        Ok(self.inbound.recv().await)
    }
}

/// Scripted connector. Optionally gated so a test can hold the session in
/// its connecting state until it chooses to let the dial complete.
pub struct MockConnector {
    sent: Arc<Mutex<Vec<Sent>>>,
    connects: AtomicUsize,
    gate: Option<Arc<Notify>>,
    inbound: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl MockConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<String>) {
        Self::build(None)
    }

    pub fn gated(gate: Arc<Notify>) -> (Arc<Self>, mpsc::UnboundedSender<String>) {
        Self::build(Some(gate))
    }

    fn build(gate: Option<Arc<Notify>>) -> (Arc<Self>, mpsc::UnboundedSender<String>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            connects: AtomicUsize::new(0),
            gate,
            inbound: Mutex::new(Some(inbound_rx)),
        });
        (connector, inbound_tx)
    }

    /// Snapshot of everything sent through the transport so far.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Yield to the session task until `predicate` holds over the sent log.
    /// Panics after enough polls; single-threaded test runtimes make the
    /// interleaving deterministic.
    pub async fn wait_for_sent(&self, predicate: impl Fn(&[Sent]) -> bool) {
        for _ in 0..1000 {
            if predicate(&self.sent.lock().unwrap()) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "condition never reached; sent = {:?}",
            self.sent.lock().unwrap()
        );
    }
}

#[async_trait]
impl UpstreamConnector for MockConnector {
    async fn connect(&self, _settings: &UpstreamConfig) -> Result<Box<dyn UpstreamTransport>> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.connects.fetch_add(1, Ordering::SeqCst);

        let inbound = self
            .inbound
            .lock()
            .unwrap()
            .take()
            .expect("mock connector only supports one connection");
        Ok(Box::new(MockTransport {
            sent: Arc::clone(&self.sent),
            inbound,
        }))
    }
}

/// Connector that always fails, for the connect-error paths.
pub struct FailingConnector;

#[async_trait]
impl UpstreamConnector for FailingConnector {
    async fn connect(&self, _settings: &UpstreamConfig) -> Result<Box<dyn UpstreamTransport>> {
        anyhow::bail!("no route to recognition service")
    }
}

/// Receive the next upstream event or panic after five seconds.
pub async fn next_event(events: &mut mpsc::Receiver<UpstreamEvent>) -> UpstreamEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for upstream event")
        .expect("event channel closed unexpectedly")
}

/// A Results frame the way the recognition service sends it.
pub fn results_frame(text: &str, is_final: bool) -> String {
    format!(
        r#"{{"type":"Results","is_final":{is_final},"channel":{{"alternatives":[{{"transcript":"{text}","confidence":0.99}}]}}}}"#
    )
}

pub fn close_stream_count(sent: &[Sent]) -> usize {
    sent.iter()
        .filter(|frame| **frame == Sent::Text(CLOSE_STREAM_FRAME.to_string()))
        .count()
}

pub fn keep_alive_count(sent: &[Sent]) -> usize {
    sent.iter()
        .filter(|frame| **frame == Sent::Text(KEEP_ALIVE_FRAME.to_string()))
        .count()
}
