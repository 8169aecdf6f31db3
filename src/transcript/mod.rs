//! Per-session transcript state.
//!
//! This module accumulates recognition results into the four-field view the
//! client renders: final and interim text, each in original script and in
//! Hinglish.

mod accumulator;

pub use accumulator::{Accumulator, TranscriptState};
