use std::sync::{Arc, RwLock};

use hoverlex_config::EngineApiConfig;
use reqwest::{Response, Url};
use serde_json::Value;

use crate::TranslateError;

mod baidu;
mod bing;
mod google;
mod system;
mod youdao;

pub use baidu::{BaiduEndpoints, BaiduEngine};
pub use bing::{BingEndpoints, BingEngine};
pub use google::{GoogleEndpoints, GoogleEngine};
pub use system::{OnDeviceTranslator, PairStatus, SystemEngine};
pub use youdao::{YoudaoEndpoints, YoudaoEngine};

/// Engine credentials swapped as a whole
#[derive(Debug, Default)]
pub(crate) struct ConfigCell(RwLock<Arc<EngineApiConfig>>);

impl ConfigCell {
    pub(crate) fn new(config: EngineApiConfig) -> Self {
        Self(RwLock::new(Arc::new(config)))
    }

    pub(crate) fn load(&self) -> Arc<EngineApiConfig> {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn store(&self, config: EngineApiConfig) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(config);
    }
}

pub(crate) fn url_with<'a>(
    base: &str,
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<Url, TranslateError> {
    Url::parse_with_params(base, params)
        .map_err(|e| TranslateError::NetworkError(format!("Invalid URL {base}: {e}")))
}

/// Fails on any non-200 status left after provider-specific checks
pub(crate) fn ensure_ok(engine: &str, response: &Response) -> Result<(), TranslateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    tracing::warn!("[{engine}] HTTP {status}");
    Err(TranslateError::NetworkError(format!("HTTP {status}")))
}

pub(crate) async fn json_body(response: Response) -> Result<Value, TranslateError> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Wraps a phonetic in slashes unless empty
pub(crate) fn phonetic(raw: Option<&str>) -> Option<String> {
    raw.filter(|p| !p.is_empty()).map(|p| format!("/{p}/"))
}
