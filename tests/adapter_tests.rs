// Integration tests for the upstream session adapter.
//
// A scripted transport (tests/common) stands in for the recognition service,
// so these cover the adapter's state machine without any network: readiness,
// the audio open-state gate, keep-alive cadence, graceful close and failure
// surfacing.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use lipi_relay::config::UpstreamConfig;
use lipi_relay::{ConnectionState, UpstreamConnector, UpstreamEvent, UpstreamSession};
use tokio::sync::{mpsc, Notify};

#[tokio::test]
async fn test_open_reports_ready_and_transitions_state() {
    let (connector, _inbound) = MockConnector::new();
    let (event_tx, mut events) = mpsc::channel(16);
    let session = UpstreamSession::open(
        Arc::clone(&connector) as Arc<dyn UpstreamConnector>,
        UpstreamConfig::default(),
        event_tx,
    );

    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Connected
    ));
    assert_eq!(session.state(), ConnectionState::Open);
    assert_eq!(connector.connect_count(), 1);
}

#[tokio::test]
async fn test_audio_is_dropped_until_open() {
    let gate = Arc::new(Notify::new());
    let (connector, _inbound) = MockConnector::gated(Arc::clone(&gate));
    let (event_tx, mut events) = mpsc::channel(16);
    let session = UpstreamSession::open(
        Arc::clone(&connector) as Arc<dyn UpstreamConnector>,
        UpstreamConfig::default(),
        event_tx,
    );

    // Still connecting: the chunk must never reach the transport.
    assert_eq!(session.state(), ConnectionState::Connecting);
    assert!(!session.send(vec![1, 2, 3]));

    gate.notify_one();
    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Connected
    ));
    assert!(connector.sent().is_empty());

    // Open: chunks go through.
    assert!(session.send(vec![4, 5, 6]));
    connector
        .wait_for_sent(|sent| sent.contains(&Sent::Audio(vec![4, 5, 6])))
        .await;
    assert!(!connector.sent().contains(&Sent::Audio(vec![1, 2, 3])));
}

#[tokio::test(start_paused = true)]
async fn test_keepalive_starts_one_period_after_open() {
    let (connector, _inbound) = MockConnector::new();
    let (event_tx, mut events) = mpsc::channel(16);
    let session = UpstreamSession::open(
        Arc::clone(&connector) as Arc<dyn UpstreamConnector>,
        UpstreamConfig::default(),
        event_tx,
    );

    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Connected
    ));

    // Nothing is sent right at open.
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert!(connector.sent().is_empty());

    // One keep-alive period later the heartbeat shows up.
    tokio::time::advance(Duration::from_secs(8)).await;
    connector
        .wait_for_sent(|sent| keep_alive_count(sent) == 1)
        .await;

    // After a graceful finish the heartbeat stops, no matter how much time
    // passes.
    session.finish().await;
    connector
        .wait_for_sent(|sent| close_stream_count(sent) == 1)
        .await;
    tokio::time::advance(Duration::from_secs(16)).await;
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert_eq!(keep_alive_count(&connector.sent()), 1);
}

#[tokio::test(start_paused = true)]
async fn test_keepalive_stops_when_peer_closes() {
    let (connector, inbound) = MockConnector::new();
    let (event_tx, mut events) = mpsc::channel(16);
    let session = UpstreamSession::open(
        Arc::clone(&connector) as Arc<dyn UpstreamConnector>,
        UpstreamConfig::default(),
        event_tx,
    );
    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Connected
    ));

    tokio::time::advance(Duration::from_secs(8)).await;
    connector
        .wait_for_sent(|sent| keep_alive_count(sent) == 1)
        .await;

    // Peer closes the stream; the heartbeat dies with the connection task.
    drop(inbound);
    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Closed
    ));
    assert_eq!(session.state(), ConnectionState::Closed);

    tokio::time::advance(Duration::from_secs(16)).await;
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert_eq!(keep_alive_count(&connector.sent()), 1);
}

#[tokio::test]
async fn test_transcript_frames_become_events() {
    let (connector, inbound) = MockConnector::new();
    let (event_tx, mut events) = mpsc::channel(16);
    let _session = UpstreamSession::open(
        Arc::clone(&connector) as Arc<dyn UpstreamConnector>,
        UpstreamConfig::default(),
        event_tx,
    );
    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Connected
    ));

    inbound.send(results_frame("hello", false)).unwrap();
    inbound
        .send(r#"{"type":"UtteranceEnd","last_word_end":1.0}"#.to_string())
        .unwrap();
    inbound.send("not json at all".to_string()).unwrap();
    inbound.send(results_frame("hello world", true)).unwrap();

    match next_event(&mut events).await {
        UpstreamEvent::Transcript(event) => {
            assert!(!event.is_final);
            assert_eq!(event.text(), Some("hello"));
        }
        other => panic!("expected a transcript event, got {other:?}"),
    }

    // The UtteranceEnd and junk frames produce no events; the next one is the
    // second transcript.
    match next_event(&mut events).await {
        UpstreamEvent::Transcript(event) => {
            assert!(event.is_final);
            assert_eq!(event.text(), Some("hello world"));
        }
        other => panic!("expected a transcript event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_finish_sends_exactly_one_close_stream() {
    let (connector, inbound) = MockConnector::new();
    let (event_tx, mut events) = mpsc::channel(16);
    let session = UpstreamSession::open(
        Arc::clone(&connector) as Arc<dyn UpstreamConnector>,
        UpstreamConfig::default(),
        event_tx,
    );
    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Connected
    ));

    session.finish().await;
    session.finish().await;
    connector
        .wait_for_sent(|sent| close_stream_count(sent) == 1)
        .await;

    // Peer closes after flushing; the adapter reports Closed.
    drop(inbound);
    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Closed
    ));
    assert_eq!(session.state(), ConnectionState::Closed);
    assert_eq!(close_stream_count(&connector.sent()), 1);
}

#[tokio::test]
async fn test_connect_failure_surfaces_error_then_closed() {
    let (event_tx, mut events) = mpsc::channel(16);
    let session = UpstreamSession::open(
        Arc::new(FailingConnector),
        UpstreamConfig::default(),
        event_tx,
    );

    match next_event(&mut events).await {
        UpstreamEvent::Error(message) => assert!(message.contains("connect failed")),
        other => panic!("expected an error event, got {other:?}"),
    }
    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Closed
    ));
    assert_eq!(session.state(), ConnectionState::Closed);
    assert!(!session.send(vec![1]));
}

#[tokio::test]
async fn test_peer_close_marks_session_closed() {
    let (connector, inbound) = MockConnector::new();
    let (event_tx, mut events) = mpsc::channel(16);
    let session = UpstreamSession::open(
        Arc::clone(&connector) as Arc<dyn UpstreamConnector>,
        UpstreamConfig::default(),
        event_tx,
    );
    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Connected
    ));

    drop(inbound);
    assert!(matches!(
        next_event(&mut events).await,
        UpstreamEvent::Closed
    ));
    assert_eq!(session.state(), ConnectionState::Closed);

    // Late chunks are dropped without reaching the transport.
    assert!(!session.send(vec![9]));
    assert!(connector.sent().is_empty());
}
