use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_continuous() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    50
}

fn default_movement_threshold() -> f64 {
    5.0
}

fn default_translate_timeout_ms() -> u64 {
    10_000
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "zh-Hans".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LookupConfig {
    /// Re-run lookups on pointer movement while the key stays held
    #[serde(default = "default_continuous")]
    pub continuous: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Minimum displacement on either axis, in UI units
    #[serde(default = "default_movement_threshold")]
    pub movement_threshold: f64,
    /// Wall-clock budget of one translation call
    #[serde(default = "default_translate_timeout_ms")]
    pub translate_timeout_ms: u64,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

impl LookupConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn translate_timeout(&self) -> Duration {
        Duration::from_millis(self.translate_timeout_ms)
    }

    /// Compares language and script. Regions are ignored and a missing script
    /// means the language's usual one, so `zh` equals `zh-Hans` and `en-US`
    /// equals `en`.
    pub fn is_same_language(&self) -> bool {
        LanguageKey::of(&self.source_language) == LanguageKey::of(&self.target_language)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct LanguageKey {
    language: String,
    script: Option<String>,
}

impl LanguageKey {
    fn of(tag: &str) -> Self {
        let mut parts = tag.split(['-', '_']).map(|part| part.to_ascii_lowercase());
        let language = parts.next().unwrap_or_default();
        let rest: Vec<String> = parts.collect();

        let script = rest
            .iter()
            .find(|part| part.len() == 4)
            .cloned()
            .or_else(|| {
                let region = rest.iter().find(|part| part.len() == 2)?;
                implied_script(&language, region).map(str::to_string)
            })
            .filter(|script| Some(script.as_str()) != likely_script(&language));

        Self { language, script }
    }
}

fn likely_script(language: &str) -> Option<&'static str> {
    match language {
        "zh" => Some("hans"),
        "ja" => Some("jpan"),
        "ko" => Some("kore"),
        "ru" | "uk" | "bg" | "sr" => Some("cyrl"),
        "ar" | "fa" => Some("arab"),
        "he" => Some("hebr"),
        "el" => Some("grek"),
        "th" => Some("thai"),
        "hi" => Some("deva"),
        "" => None,
        _ => Some("latn"),
    }
}

fn implied_script(language: &str, region: &str) -> Option<&'static str> {
    match (language, region) {
        ("zh", "tw" | "hk" | "mo") => Some("hant"),
        _ => None,
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            continuous: default_continuous(),
            debounce_ms: default_debounce_ms(),
            movement_threshold: default_movement_threshold(),
            translate_timeout_ms: default_translate_timeout_ms(),
            source_language: default_source_language(),
            target_language: default_target_language(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(source: &str, target: &str) -> LookupConfig {
        LookupConfig {
            source_language: source.to_string(),
            target_language: target.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_language_ignores_region() {
        assert!(pair("en", "en-US").is_same_language());
        assert!(pair("EN_gb", "en").is_same_language());
    }

    #[test]
    fn test_same_language_respects_script() {
        assert!(!pair("zh-Hans", "zh-Hant").is_same_language());
        assert!(pair("zh-Hans", "zh-Hans-CN").is_same_language());
        assert!(!pair("en", "zh-Hans").is_same_language());
    }

    #[test]
    fn test_same_language_fills_in_usual_script() {
        assert!(pair("zh", "zh-Hans").is_same_language());
        assert!(pair("zh-CN", "zh_hans").is_same_language());
        assert!(pair("en-Latn", "en-GB").is_same_language());
        assert!(pair("zh-TW", "zh-Hant").is_same_language());
        assert!(!pair("zh", "zh-TW").is_same_language());
        assert!(!pair("sr", "sr-Latn").is_same_language());
    }
}
