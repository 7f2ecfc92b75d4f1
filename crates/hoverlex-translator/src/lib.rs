use async_trait::async_trait;
use hoverlex_config::EngineApiConfig;
use hoverlex_config::network::NetworkConfig;
use hoverlex_types::{EngineKind, TranslationResult};

pub mod dictionary;
pub mod engines;
mod error;
mod registry;

pub use dictionary::{DictionaryEntry, DictionaryLookup, WordListDictionary, normalize_word};
pub use engines::{
    BaiduEngine, BingEngine, GoogleEngine, OnDeviceTranslator, PairStatus, SystemEngine,
    YoudaoEngine,
};
pub use error::TranslateError;
pub use registry::EngineRegistry;

/// One translation backend behind a uniform contract
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// The credentialed endpoint is in use
    fn uses_custom_api_key(&self) -> bool {
        false
    }

    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<TranslationResult, TranslateError>;

    /// Pronunciation audio for `text`, when the provider has one
    fn audio_url(&self, _text: &str, _language: &str) -> Option<String> {
        None
    }

    async fn supports_pair(&self, _from: &str, _to: &str) -> bool {
        true
    }

    /// Replace this backend's credentials. Calls already in flight keep the
    /// config they started with.
    fn update_config(&self, _config: EngineApiConfig) {}
}

/// HTTP client shared by the network adapters
pub fn http_client(network: &NetworkConfig) -> Result<reqwest::Client, TranslateError> {
    reqwest::Client::builder()
        .timeout(network.request_timeout())
        .user_agent(network.user_agent.clone())
        .build()
        .map_err(|e| TranslateError::NetworkError(e.to_string()))
}
