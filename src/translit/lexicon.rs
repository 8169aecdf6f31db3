//! Lookup table of canonical Hindi-to-Hinglish spellings.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Built-in word map, compiled into the binary so the service has sensible
/// spellings with zero configuration.
const BUILTIN_LEXICON: &str = include_str!("lexicon.json");

/// Word-level transliteration table keyed by Devanagari spelling.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, String>,
}

impl Lexicon {
    /// Create an empty lexicon (every lookup will miss).
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the lexicon compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_LEXICON).context("built-in lexicon is invalid")
    }

    /// Parse a lexicon from a JSON object of `"देवनागरी": "latin"` pairs.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: HashMap<String, String> =
            serde_json::from_str(json).context("failed to parse lexicon JSON")?;
        Ok(Self { entries })
    }

    /// Load a lexicon from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read lexicon file: {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("failed to parse lexicon file: {}", path.display()))
    }

    /// Look up the canonical spelling for a Devanagari word.
    pub fn get(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
