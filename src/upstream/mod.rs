//! Upstream streaming recognition session.
//!
//! One `UpstreamSession` owns one live connection to the recognition
//! service: it dials, keeps the session alive during silence, forwards
//! audio, and surfaces service events to its owner.

pub mod adapter;
pub mod events;
pub mod transport;

pub use adapter::{ConnectionState, UpstreamSession};
pub use events::{RecognitionEvent, UpstreamEvent};
pub use transport::{DeepgramConnector, UpstreamConnector, UpstreamTransport};
