//! Word-level Devanagari-to-Hinglish rendering.
//!
//! A word is rendered by exact lexicon lookup first, then by the generic
//! phonetic converter for Devanagari words the lexicon does not know.
//! Words with no Devanagari content pass through untouched.

pub mod lexicon;
pub mod phonetic;

pub use lexicon::Lexicon;

use tracing::debug;

/// Devanagari Unicode block, including vowel signs, virama and punctuation.
pub fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Characters that belong to a word core rather than surrounding punctuation.
///
/// Combining vowel signs and the virama are not alphanumeric in Unicode terms
/// but are part of the written word, so the Devanagari block is included as a
/// whole.
fn is_core_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || is_devanagari(c)
}

/// Split a token into (prefix, core, suffix): edge punctuation around one
/// contiguous run of word characters.
///
/// Returns `None` when the token has no core, or when the word characters do
/// not form a single run (e.g. `don't`); such tokens are rendered unchanged.
pub fn split_token(token: &str) -> Option<(&str, &str, &str)> {
    let mut start = None;
    let mut end = 0;
    for (idx, c) in token.char_indices() {
        if is_core_char(c) {
            if start.is_none() {
                start = Some(idx);
            }
            end = idx + c.len_utf8();
        }
    }
    let start = start?;
    let core = &token[start..end];
    if !core.chars().all(is_core_char) {
        return None;
    }
    Some((&token[..start], core, &token[end..]))
}

/// Renders recognized text to Hinglish, one whitespace-delimited word at a
/// time.
#[derive(Debug, Clone)]
pub struct Transliterator {
    lexicon: Lexicon,
}

impl Transliterator {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Render a single token, preserving any edge punctuation.
    pub fn render_word(&self, word: &str) -> String {
        if !word.chars().any(is_devanagari) {
            return word.to_string();
        }

        let Some((prefix, core, suffix)) = split_token(word) else {
            debug!(word, "token shape not renderable, passing through");
            return word.to_string();
        };

        if let Some(mapped) = self.lexicon.get(core) {
            return format!("{prefix}{mapped}{suffix}");
        }

        if core.chars().any(is_devanagari) {
            let rendered = phonetic::transliterate(core).to_lowercase();
            return format!("{prefix}{rendered}{suffix}");
        }

        // No Devanagari left in the core: nothing to render.
        word.to_string()
    }

    /// Render a whole line word-by-word.
    ///
    /// Splitting is on single spaces only, so any run of spaces in the input
    /// survives in the output unchanged.
    pub fn render_line(&self, line: &str) -> String {
        line.split(' ')
            .map(|word| self.render_word(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
