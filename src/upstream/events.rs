//! Messages exchanged with the streaming recognition service.

use serde::Deserialize;

/// Events surfaced by an upstream session to its owner.
///
/// This is the adapter's entire outward contract: the session layer reacts to
/// these four events and never sees the underlying socket.
#[derive(Debug, Clone)]
pub enum UpstreamEvent {
    /// The recognition session is open and accepting audio.
    Connected,
    /// One recognition result, final or interim.
    Transcript(RecognitionEvent),
    /// The service reported an error. Does not imply the session closed.
    Error(String),
    /// The recognition session ended, gracefully or not.
    Closed,
}

/// A single recognition result as sent by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognitionEvent {
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub channel: Channel,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub transcript: String,
}

impl RecognitionEvent {
    pub fn new(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            is_final,
            channel: Channel {
                alternatives: vec![Alternative {
                    transcript: transcript.into(),
                }],
            },
        }
    }

    /// Text of the first alternative, or `None` when absent or empty.
    ///
    /// Only the first alternative is ever consumed.
    pub fn text(&self) -> Option<&str> {
        self.channel
            .alternatives
            .first()
            .map(|alt| alt.transcript.as_str())
            .filter(|text| !text.is_empty())
    }
}

/// Typed view of an inbound service frame.
///
/// The service also sends `Metadata`, `UtteranceEnd` and `SpeechStarted`
/// frames; none of them carry transcript text, so they all collapse into
/// `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum UpstreamMessage {
    Results(RecognitionEvent),
    #[serde(other)]
    Other,
}

impl UpstreamMessage {
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
