use std::time::Duration;

use hoverlex_types::SingleKeyBinding;
use serde::{Deserialize, Serialize};

fn default_release_confirm_ms() -> u64 {
    150
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    pub binding: SingleKeyBinding,
    /// How long a released key must stay up before the release is reported
    #[serde(default = "default_release_confirm_ms")]
    pub release_confirm_ms: u64,
}

impl HotkeyConfig {
    pub fn release_confirm_delay(&self) -> Duration {
        Duration::from_millis(self.release_confirm_ms)
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            binding: SingleKeyBinding::default(),
            release_confirm_ms: default_release_confirm_ms(),
        }
    }
}
