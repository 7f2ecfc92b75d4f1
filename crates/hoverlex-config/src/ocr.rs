use serde::{Deserialize, Serialize};

fn default_box_similarity_tolerance() -> f64 {
    0.02
}

fn default_hit_tolerance() -> f64 {
    0.01
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    /// Recognizer language hint; falls back to the lookup source language
    pub language: Option<String>,
    /// Sub-range boxes this close to the whole-line box are treated as degraded
    #[serde(default = "default_box_similarity_tolerance")]
    pub box_similarity_tolerance: f64,
    /// Expansion applied to word boxes before hit testing
    #[serde(default = "default_hit_tolerance")]
    pub hit_tolerance: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: None,
            box_similarity_tolerance: default_box_similarity_tolerance(),
            hit_tolerance: default_hit_tolerance(),
        }
    }
}
