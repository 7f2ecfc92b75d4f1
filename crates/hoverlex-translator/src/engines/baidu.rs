use async_trait::async_trait;
use hoverlex_config::EngineApiConfig;
use hoverlex_types::{EngineKind, TranslationResult};
use md5::{Digest, Md5};
use serde_json::Value;
use uuid::Uuid;

use super::{ConfigCell, ensure_ok, json_body, url_with};
use crate::{TranslateError, TranslationEngine};

#[derive(Debug, Clone)]
pub struct BaiduEndpoints {
    pub translate: String,
    pub tts: String,
}

impl Default for BaiduEndpoints {
    fn default() -> Self {
        Self {
            translate: "https://fanyi-api.baidu.com/api/trans/vip/translate".to_string(),
            tts: "https://fanyi.baidu.com/gettts".to_string(),
        }
    }
}

/// Baidu Fanyi general translation API. Always credentialed.
pub struct BaiduEngine {
    client: reqwest::Client,
    config: ConfigCell,
    endpoints: BaiduEndpoints,
}

fn language_code(code: &str) -> &str {
    match code {
        "zh-Hans" | "zh-Hant" => "zh",
        "ja" => "jp",
        "ko" => "kor",
        "fr" => "fra",
        "es" => "spa",
        "ar" => "ara",
        "vi" => "vie",
        other => other,
    }
}

/// Five-digit numeric salt
fn salt() -> String {
    (Uuid::new_v4().as_u128() % 90_000 + 10_000).to_string()
}

pub(crate) fn sign(app_id: &str, text: &str, salt: &str, secret_key: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(app_id.as_bytes());
    hasher.update(text.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(secret_key.as_bytes());
    hex::encode(hasher.finalize())
}

fn map_error_code(code: &str) -> TranslateError {
    match code {
        "52001" => TranslateError::Timeout,
        "52002" => TranslateError::NetworkError("Baidu system error".into()),
        "52003" | "54001" => TranslateError::InvalidApiKey,
        "54003" | "54004" | "54005" => TranslateError::RateLimitExceeded,
        other => TranslateError::ParseError(format!("Baidu error code {other}")),
    }
}

fn parse_response(json: &Value, text: &str) -> Result<TranslationResult, TranslateError> {
    // error_code arrives as a string or a number depending on the failure
    let error_code = match &json["error_code"] {
        Value::String(code) => Some(code.clone()),
        Value::Number(code) => Some(code.to_string()),
        _ => None,
    };
    if let Some(code) = error_code.filter(|c| c != "52000") {
        tracing::warn!("[BAIDU] error_code {code}: {}", json["error_msg"]);
        return Err(map_error_code(&code));
    }

    let translation = json["trans_result"][0]["dst"]
        .as_str()
        .ok_or_else(|| TranslateError::ParseError("missing trans_result[0].dst".into()))?;
    Ok(TranslationResult::new(text, translation))
}

impl BaiduEngine {
    pub fn new(client: reqwest::Client, config: EngineApiConfig) -> Self {
        Self {
            client,
            config: ConfigCell::new(config),
            endpoints: BaiduEndpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: BaiduEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

#[async_trait]
impl TranslationEngine for BaiduEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Baidu
    }

    fn uses_custom_api_key(&self) -> bool {
        true
    }

    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<TranslationResult, TranslateError> {
        let config = self.config.load();
        if config.app_id.is_empty() || config.secret_key.is_empty() {
            return Err(TranslateError::ApiKeyRequired);
        }

        let salt = salt();
        let sign = sign(&config.app_id, text, &salt, &config.secret_key);
        let url = url_with(
            &self.endpoints.translate,
            [
                ("q", text),
                ("from", language_code(from)),
                ("to", language_code(to)),
                ("appid", config.app_id.as_str()),
                ("salt", salt.as_str()),
                ("sign", sign.as_str()),
            ],
        )?;

        let response = self.client.get(url).send().await?;
        ensure_ok("BAIDU", &response)?;

        let mut result = parse_response(&json_body(response).await?, text)?;
        result.audio_url = self.audio_url(text, from);
        Ok(result)
    }

    fn audio_url(&self, text: &str, language: &str) -> Option<String> {
        url_with(
            &self.endpoints.tts,
            [
                ("lan", language_code(language)),
                ("text", text),
                ("spd", "3"),
                ("source", "web"),
            ],
        )
        .ok()
        .map(String::from)
    }

    fn update_config(&self, config: EngineApiConfig) {
        self.config.store(config);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_sign_is_md5_of_concatenation() {
        // md5("2015063000000001apple143566028812345678")
        assert_eq!(
            sign("2015063000000001", "apple", "1435660288", "12345678"),
            "f89f9594663708c1605f3d736d01d2d4"
        );
    }

    #[test]
    fn test_salt_is_five_digits() {
        for _ in 0..32 {
            let salt = salt();
            assert_eq!(salt.len(), 5);
            assert!(salt.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_error_codes() {
        let parse = |code: Value| parse_response(&json!({ "error_code": code, "error_msg": "x" }), "w");

        assert_eq!(parse(json!("54003")), Err(TranslateError::RateLimitExceeded));
        assert_eq!(parse(json!(54004)), Err(TranslateError::RateLimitExceeded));
        assert_eq!(parse(json!("52001")), Err(TranslateError::Timeout));
        assert_eq!(parse(json!("52003")), Err(TranslateError::InvalidApiKey));
        assert!(matches!(parse(json!("58000")), Err(TranslateError::ParseError(_))));
    }

    #[test]
    fn test_parse_result() {
        let json = json!({ "from": "en", "to": "zh", "trans_result": [{ "src": "apple", "dst": "苹果" }] });
        assert_eq!(parse_response(&json, "apple").unwrap().translation, "苹果");
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(language_code("zh-Hant"), "zh");
        assert_eq!(language_code("ja"), "jp");
        assert_eq!(language_code("de"), "de");
    }
}
