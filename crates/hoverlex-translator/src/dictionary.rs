use std::collections::HashMap;
use std::path::Path;

use hoverlex_types::Definition;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

/// Source of phonetics and definitions for a single word
pub trait DictionaryLookup: Send + Sync {
    fn lookup(&self, word: &str) -> Option<DictionaryEntry>;
}

/// Canonical dictionary key for a recognized word.
///
/// NFKC folds full-width and compatibility forms, only the first
/// whitespace-separated token is kept, non-letters are stripped from both
/// ends (inner apostrophes and hyphens survive) and the result is lowercased.
pub fn normalize_word(word: &str) -> Option<String> {
    let normalized: String = word.nfkc().collect();
    let token = normalized.split_whitespace().next()?;
    let token = token.trim_matches(|c: char| !c.is_alphabetic());
    if token.is_empty() {
        return None;
    }
    Some(token.to_lowercase())
}

#[derive(Debug, thiserror::Error)]
pub enum DictionaryLoadError {
    #[error("Failed to read dictionary: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dictionary: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory dictionary loaded from a JSON array of entries
#[derive(Debug, Default)]
pub struct WordListDictionary {
    entries: HashMap<String, DictionaryEntry>,
}

impl WordListDictionary {
    pub fn new(entries: impl IntoIterator<Item = DictionaryEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|entry| Some((normalize_word(&entry.word)?, entry)))
            .collect();
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, DictionaryLoadError> {
        let entries: Vec<DictionaryEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn load(path: &Path) -> Result<Self, DictionaryLoadError> {
        let json = std::fs::read_to_string(path)?;
        let dictionary = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} dictionary entries from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DictionaryLookup for WordListDictionary {
    fn lookup(&self, word: &str) -> Option<DictionaryEntry> {
        self.entries.get(&normalize_word(word)?).cloned()
    }
}
