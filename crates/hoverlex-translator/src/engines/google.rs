use async_trait::async_trait;
use hoverlex_config::EngineApiConfig;
use hoverlex_types::{Definition, EngineKind, TranslationResult};
use reqwest::StatusCode;
use serde_json::{Value, json};

use super::{ConfigCell, ensure_ok, json_body, phonetic, url_with};
use crate::{TranslateError, TranslationEngine};

const MEANINGS_PER_POS: usize = 2;

#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub free: String,
    pub official: String,
    pub tts: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            free: "https://translate.googleapis.com/translate_a/single".to_string(),
            official: "https://translation.googleapis.com/language/translate/v2".to_string(),
            tts: "https://translate.google.com/translate_tts".to_string(),
        }
    }
}

/// Google Translate: anonymous web endpoint, or the v2 API with a key
pub struct GoogleEngine {
    client: reqwest::Client,
    config: ConfigCell,
    endpoints: GoogleEndpoints,
}

fn language_code(code: &str) -> &str {
    match code {
        "zh-Hans" => "zh-CN",
        "zh-Hant" => "zh-TW",
        other => other,
    }
}

impl GoogleEngine {
    pub fn new(client: reqwest::Client, config: EngineApiConfig) -> Self {
        Self {
            client,
            config: ConfigCell::new(config),
            endpoints: GoogleEndpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    async fn translate_free(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<TranslationResult, TranslateError> {
        let url = url_with(
            &self.endpoints.free,
            [
                ("client", "gtx"),
                ("sl", language_code(from)),
                ("tl", language_code(to)),
                ("dt", "t"),
                ("dt", "bd"),
                ("dt", "rm"),
                ("q", text),
            ],
        )?;

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslateError::RateLimitExceeded);
        }
        ensure_ok("GOOGLE", &response)?;

        let mut result = parse_free_response(&json_body(response).await?, text)?;
        result.audio_url = self.audio_url(text, from);
        Ok(result)
    }

    async fn translate_official(
        &self,
        text: &str,
        from: &str,
        to: &str,
        api_key: &str,
    ) -> Result<TranslationResult, TranslateError> {
        let body = json!({
            "q": text,
            "source": language_code(from),
            "target": language_code(to),
            "key": api_key,
        });

        let response = self
            .client
            .post(&self.endpoints.official)
            .json(&body)
            .send()
            .await?;
        if response.status() == StatusCode::FORBIDDEN {
            return Err(TranslateError::InvalidApiKey);
        }
        ensure_ok("GOOGLE", &response)?;

        let json = json_body(response).await?;
        let translation = json["data"]["translations"][0]["translatedText"]
            .as_str()
            .ok_or_else(|| TranslateError::ParseError("missing translatedText".into()))?;

        Ok(TranslationResult::new(text, translation))
    }
}

fn parse_free_response(json: &Value, text: &str) -> Result<TranslationResult, TranslateError> {
    let rows = json
        .as_array()
        .ok_or_else(|| TranslateError::ParseError("expected a JSON array".into()))?;

    let sentences = rows.first().and_then(Value::as_array);
    let translation: String = sentences
        .into_iter()
        .flatten()
        .filter_map(|row| row.get(0).and_then(Value::as_str))
        .collect();

    if translation.is_empty() {
        return Err(TranslateError::EmptyResponse);
    }

    // Transliteration comes either as a top-level string or as the
    // source-transliteration column of the `rm` row
    let transliteration = rows.get(3).and_then(Value::as_str).or_else(|| {
        sentences
            .into_iter()
            .flatten()
            .find_map(|row| row.get(3).and_then(Value::as_str))
    });

    let mut definitions = Vec::new();
    for entry in rows.get(1).and_then(Value::as_array).into_iter().flatten() {
        let Some(pos) = entry.get(0).and_then(Value::as_str) else {
            continue;
        };
        let meanings = entry.get(1).and_then(Value::as_array).into_iter().flatten();
        for meaning in meanings.filter_map(Value::as_str).take(MEANINGS_PER_POS) {
            definitions.push(Definition::new(pos, meaning));
        }
    }

    let mut result = TranslationResult::new(text, translation);
    result.phonetic = phonetic(transliteration);
    result.definitions = definitions;
    Ok(result)
}

#[async_trait]
impl TranslationEngine for GoogleEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Google
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
        if config.has_custom_key() {
            self.translate_official(text, from, to, &config.api_key).await
        } else {
            self.translate_free(text, from, to).await
        }
    }

    fn audio_url(&self, text: &str, language: &str) -> Option<String> {
        url_with(
            &self.endpoints.tts,
            [
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language_code(language)),
                ("q", text),
            ],
        )
        .ok()
        .map(String::from)
    }

    fn update_config(&self, config: EngineApiConfig) {
        self.config.store(config);
    }
}
