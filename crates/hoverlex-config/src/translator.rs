use hoverlex_types::EngineKind;
use serde::{Deserialize, Serialize};

fn default_engine() -> EngineKind {
    EngineKind::Google
}

/// Credentials and mode of one backend
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EngineApiConfig {
    /// Prefer the credentialed endpoint over the anonymous one
    pub use_custom_api: bool,
    pub api_key: String,
    pub secret_key: String,
    pub app_id: String,
}

impl EngineApiConfig {
    pub fn custom(api_key: impl Into<String>) -> Self {
        Self {
            use_custom_api: true,
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Custom mode is on and a key was supplied
    pub fn has_custom_key(&self) -> bool {
        self.use_custom_api && !self.api_key.is_empty()
    }
}

/// One config per backend that accepts credentials
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfigs {
    pub google: EngineApiConfig,
    pub bing: EngineApiConfig,
    pub baidu: EngineApiConfig,
    pub youdao: EngineApiConfig,
}

impl EngineConfigs {
    pub fn get(&self, kind: EngineKind) -> EngineApiConfig {
        match kind {
            EngineKind::System => EngineApiConfig::default(),
            EngineKind::Google => self.google.clone(),
            EngineKind::Bing => self.bing.clone(),
            EngineKind::Baidu => self.baidu.clone(),
            EngineKind::Youdao => self.youdao.clone(),
        }
    }

    pub fn set(&mut self, kind: EngineKind, config: EngineApiConfig) {
        match kind {
            EngineKind::System => {}
            EngineKind::Google => self.google = config,
            EngineKind::Bing => self.bing = config,
            EngineKind::Baidu => self.baidu = config,
            EngineKind::Youdao => self.youdao = config,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default = "default_engine")]
    pub engine: EngineKind,
    pub engines: EngineConfigs,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            engines: EngineConfigs::default(),
        }
    }
}

impl TranslatorConfig {
    /// Set when the selected backend has no anonymous endpoint and its
    /// credentials are incomplete
    pub fn credentials_hint(&self) -> Option<String> {
        let kind = self.engine;
        let config = self.engines.get(kind);
        if !kind.requires_api_key() || (!config.app_id.is_empty() && !config.secret_key.is_empty())
        {
            return None;
        }

        Some(match kind.api_key_url() {
            Some(url) => format!("{kind} needs an app id and secret key, get them at {url}"),
            None => format!("{kind} needs an app id and secret key"),
        })
    }
}
