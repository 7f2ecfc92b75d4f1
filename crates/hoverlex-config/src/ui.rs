use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UiConfig {
    /// Verbose mode: show the capture region, word boxes, and "no word" feedback
    pub debug_show_region: bool,
}
