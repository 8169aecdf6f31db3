use serde::{Deserialize, Serialize};

use crate::transcript::TranscriptState;

/// Control intents a client sends as JSON text frames.
///
/// Audio travels as binary frames and never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Begin (or resume) streaming audio.
    Start,
    /// Suspend streaming; the upstream session is kept for resume.
    Pause,
    /// End the recording for good.
    Stop,
}

/// Messages the relay pushes to the client as JSON text frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// The recognition pipeline is ready; audio will be consumed from now on.
    DgReady,
    /// Full transcript view, pushed after every applied recognition event.
    /// Field names predate this service and are kept for client
    /// compatibility: `eng_*` carries the Hinglish rendering, `*_results`
    /// the interim text.
    Transcript {
        transcript: String,
        eng_transcript: String,
        interim_results: String,
        eng_interim_results: String,
    },
    /// The recognition pipeline reported a failure.
    DgError { message: String },
}

impl From<TranscriptState> for ServerMessage {
    fn from(state: TranscriptState) -> Self {
        ServerMessage::Transcript {
            transcript: state.final_original,
            eng_transcript: state.final_rendered,
            interim_results: state.interim_original,
            eng_interim_results: state.interim_rendered,
        }
    }
}
