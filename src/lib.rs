pub mod config;
pub mod http;
pub mod session;
pub mod transcript;
pub mod translit;
pub mod upstream;

pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{ClientMessage, RelaySession, ServerMessage, SessionCounters, SessionState, SessionStats};
pub use transcript::{Accumulator, TranscriptState};
pub use translit::{Lexicon, Transliterator};
pub use upstream::{
    ConnectionState, DeepgramConnector, RecognitionEvent, UpstreamConnector, UpstreamEvent,
    UpstreamSession, UpstreamTransport,
};
