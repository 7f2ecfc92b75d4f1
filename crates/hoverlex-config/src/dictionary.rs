use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_max_translated_definitions() -> usize {
    3
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Attach phonetic and definitions from the dictionary collaborator
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Definitions whose meaning is sent through the on-device translator
    #[serde(default = "default_max_translated_definitions")]
    pub max_translated_definitions: usize,
    /// JSON word list with phonetics and definitions
    pub path: Option<PathBuf>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_translated_definitions: default_max_translated_definitions(),
            path: None,
        }
    }
}
