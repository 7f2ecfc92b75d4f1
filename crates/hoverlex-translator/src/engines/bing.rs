use async_trait::async_trait;
use hoverlex_config::EngineApiConfig;
use hoverlex_types::{EngineKind, TranslationResult};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{Value, json};

use super::{ConfigCell, ensure_ok, json_body, url_with};
use crate::{TranslateError, TranslationEngine};

#[derive(Debug, Clone)]
pub struct BingEndpoints {
    pub auth: String,
    pub translate: String,
}

impl Default for BingEndpoints {
    fn default() -> Self {
        Self {
            auth: "https://edge.microsoft.com/translate/auth".to_string(),
            translate: "https://api.cognitive.microsofttranslator.com/translate".to_string(),
        }
    }
}

/// Microsoft Translator: Edge web token, or an Azure subscription key
pub struct BingEngine {
    client: reqwest::Client,
    config: ConfigCell,
    endpoints: BingEndpoints,
}

impl BingEngine {
    pub fn new(client: reqwest::Client, config: EngineApiConfig) -> Self {
        Self {
            client,
            config: ConfigCell::new(config),
            endpoints: BingEndpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: BingEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    fn translate_request(&self, text: &str, from: &str, to: &str) -> Result<RequestBuilder, TranslateError> {
        let url = url_with(
            &self.endpoints.translate,
            [("api-version", "3.0"), ("from", from), ("to", to)],
        )?;
        Ok(self.client.post(url).json(&json!([{ "Text": text }])))
    }

    async fn fetch_token(&self) -> Result<String, TranslateError> {
        let response = self.client.get(&self.endpoints.auth).send().await?;
        ensure_ok("BING", &response)?;

        let token = response.text().await?;
        if token.trim().is_empty() {
            return Err(TranslateError::EmptyResponse);
        }
        Ok(token.trim().to_string())
    }
}

fn parse_response(json: &Value, text: &str) -> Result<TranslationResult, TranslateError> {
    let translation = json[0]["translations"][0]["text"]
        .as_str()
        .ok_or_else(|| TranslateError::ParseError("missing translations[0].text".into()))?;
    Ok(TranslationResult::new(text, translation))
}

#[async_trait]
impl TranslationEngine for BingEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Bing
    }

    fn uses_custom_api_key(&self) -> bool {
        self.config.load().has_custom_key()
    }

    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<TranslationResult, TranslateError> {
        let config = self.config.load();

        let response = if config.has_custom_key() {
            let response = self
                .translate_request(text, from, to)?
                .header("Ocp-Apim-Subscription-Key", &config.api_key)
                .send()
                .await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(TranslateError::InvalidApiKey);
            }
            response
        } else {
            let token = self.fetch_token().await?;
            let response = self
                .translate_request(text, from, to)?
                .bearer_auth(token)
                .send()
                .await?;
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(TranslateError::RateLimitExceeded);
            }
            response
        };

        ensure_ok("BING", &response)?;
        parse_response(&json_body(response).await?, text)
    }

    fn update_config(&self, config: EngineApiConfig) {
        self.config.store(config);
    }
}
