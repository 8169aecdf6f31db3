use std::sync::Arc;

use crate::translit::Transliterator;
use crate::upstream::events::RecognitionEvent;

/// The complete transcript view for one session.
///
/// `final_*` fields only ever grow; every appended segment is prefixed with a
/// single space, so a non-empty field starts with one. Clients have always
/// received the text in that form, so the leading space is part of the wire
/// contract and must not be trimmed here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptState {
    pub final_original: String,
    pub final_rendered: String,
    pub interim_original: String,
    pub interim_rendered: String,
}

/// Folds recognition events into a [`TranscriptState`].
///
/// One accumulator exists per session and is owned by it exclusively; no
/// locking is involved.
#[derive(Debug)]
pub struct Accumulator {
    translit: Arc<Transliterator>,
    state: TranscriptState,
}

impl Accumulator {
    pub fn new(translit: Arc<Transliterator>) -> Self {
        Self {
            translit,
            state: TranscriptState::default(),
        }
    }

    /// Apply one recognition event.
    ///
    /// Returns the full state snapshot to push to the client, or `None` when
    /// the event carries no text and nothing changed. Final text appends,
    /// interim text replaces, and a final event clears the interim fields.
    pub fn apply(&mut self, event: &RecognitionEvent) -> Option<TranscriptState> {
        let original = event.text()?;
        let rendered = self.translit.render_line(original);

        if event.is_final {
            self.state.final_original.push(' ');
            self.state.final_original.push_str(original);
            self.state.final_rendered.push(' ');
            self.state.final_rendered.push_str(&rendered);
            self.state.interim_original.clear();
            self.state.interim_rendered.clear();
        } else {
            self.state.interim_original = original.to_string();
            self.state.interim_rendered = rendered;
        }

        Some(self.state.clone())
    }

    pub fn state(&self) -> &TranscriptState {
        &self.state
    }
}
