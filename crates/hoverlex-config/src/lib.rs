use std::env;

use hoverlex_types::EngineKind;
use serde::{Deserialize, Serialize};

use self::capture::CaptureConfig;
use self::dictionary::DictionaryConfig;
use self::hotkey::HotkeyConfig;
use self::lookup::LookupConfig;
use self::network::NetworkConfig;
use self::ocr::OcrConfig;
use self::translator::TranslatorConfig;
use self::ui::UiConfig;

pub mod capture;
pub mod dictionary;
pub mod hotkey;
pub mod lookup;
pub mod network;
pub mod ocr;
pub mod translator;
pub mod ui;

pub use translator::{EngineApiConfig, EngineConfigs};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub hotkey: HotkeyConfig,
    pub lookup: LookupConfig,
    pub capture: CaptureConfig,
    pub ocr: OcrConfig,
    pub translator: TranslatorConfig,
    pub network: NetworkConfig,
    pub ui: UiConfig,
    pub dictionary: DictionaryConfig,
}

impl Config {
    pub fn apply_env(&mut self) {
        if let Ok(lang) = env::var("HOVERLEX_SOURCE_LANG") {
            self.lookup.source_language = lang;
        }

        if let Ok(lang) = env::var("HOVERLEX_TARGET_LANG") {
            self.lookup.target_language = lang;
        }

        if let Ok(name) = env::var("HOVERLEX_ENGINE") {
            match EngineKind::parse(&name) {
                Some(kind) => self.translator.engine = kind,
                None => tracing::warn!("Ignoring unknown HOVERLEX_ENGINE value '{name}'"),
            }
        }

        if let Some(continuous) = env::var("HOVERLEX_CONTINUOUS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.lookup.continuous = continuous;
        }

        if let Some(timeout_ms) = env::var("HOVERLEX_TRANSLATE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.lookup.translate_timeout_ms = timeout_ms;
        }
    }

    /// Language hint handed to the recognizer
    pub fn recognition_language(&self) -> &str {
        self.ocr
            .language
            .as_deref()
            .unwrap_or(&self.lookup.source_language)
    }
}
