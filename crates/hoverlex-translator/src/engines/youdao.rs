use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use hoverlex_config::EngineApiConfig;
use hoverlex_types::{Definition, EngineKind, TranslationResult};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{ConfigCell, ensure_ok, json_body, phonetic, url_with};
use crate::{TranslateError, TranslationEngine};

const FREE_DEFINITIONS: usize = 5;
const OFFICIAL_DEFINITIONS: usize = 3;

#[derive(Debug, Clone)]
pub struct YoudaoEndpoints {
    pub free: String,
    pub official: String,
    pub voice: String,
}

impl Default for YoudaoEndpoints {
    fn default() -> Self {
        Self {
            free: "https://dict.youdao.com/jsonapi_s".to_string(),
            official: "https://openapi.youdao.com/api".to_string(),
            voice: "https://dict.youdao.com/dictvoice".to_string(),
        }
    }
}

/// Youdao: web dictionary endpoint, or the signed open API
pub struct YoudaoEngine {
    client: reqwest::Client,
    config: ConfigCell,
    endpoints: YoudaoEndpoints,
}

fn language_code(code: &str) -> &str {
    match code {
        "zh-Hans" => "zh-CHS",
        "zh-Hant" => "zh-CHT",
        other => other,
    }
}

fn uses_official(config: &EngineApiConfig) -> bool {
    config.has_custom_key() && !config.secret_key.is_empty()
}

/// Text as it enters the v3 signature: long input keeps ten characters at
/// each end around its character count
pub(crate) fn truncate(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 20 {
        return text.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();
    format!("{head}{}{tail}", chars.len())
}

pub(crate) fn sign(app_key: &str, text: &str, salt: &str, curtime: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(app_key.as_bytes());
    hasher.update(truncate(text).as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(curtime.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn parse_free_response(json: &Value, text: &str) -> Result<TranslationResult, TranslateError> {
    if !json.is_object() {
        return Err(TranslateError::ParseError("expected a JSON object".into()));
    }

    let word = &json["ec"]["word"][0];
    let phonetic = phonetic(word["ukphone"].as_str().filter(|p| !p.is_empty()))
        .or_else(|| phonetic(word["usphone"].as_str()));

    let definitions: Vec<Definition> = word["trs"]
        .as_array()
        .into_iter()
        .flatten()
        .take(FREE_DEFINITIONS)
        .filter_map(|tr| {
            let meaning = tr["tran"].as_str()?;
            Some(Definition::new(tr["pos"].as_str().unwrap_or_default(), meaning))
        })
        .collect();

    let translation = json["fanyi"]["tran"]
        .as_str()
        .map(str::to_string)
        .or_else(|| definitions.first().map(|d| d.meaning.clone()))
        .filter(|t| !t.is_empty())
        .or_else(|| json["simple"]["word"][0]["ust"].as_str().map(str::to_string))
        .filter(|t| !t.is_empty())
        .or_else(|| json["web"]["trans"][0]["summary"].as_str().map(str::to_string))
        .filter(|t| !t.is_empty())
        .ok_or(TranslateError::EmptyResponse)?;

    let mut result = TranslationResult::new(text, translation);
    result.phonetic = phonetic;
    result.definitions = definitions;
    Ok(result)
}

fn parse_official_response(json: &Value, text: &str) -> Result<TranslationResult, TranslateError> {
    let error_code = json["errorCode"]
        .as_str()
        .ok_or_else(|| TranslateError::ParseError("missing errorCode".into()))?;

    match error_code {
        "0" => {}
        "108" | "202" => return Err(TranslateError::InvalidApiKey),
        other => {
            tracing::warn!("[YOUDAO] errorCode {other}");
            return Err(TranslateError::ParseError(format!("Youdao error code {other}")));
        }
    }

    let translation = json["translation"][0]
        .as_str()
        .ok_or(TranslateError::EmptyResponse)?;

    let basic = &json["basic"];
    let phonetic = phonetic(basic["uk-phonetic"].as_str().filter(|p| !p.is_empty()))
        .or_else(|| phonetic(basic["us-phonetic"].as_str()));

    // Entries look like "n. 苹果；苹果树"
    let definitions = basic["explains"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .take(OFFICIAL_DEFINITIONS)
        .map(|explain| match explain.split_once(". ") {
            Some((pos, meaning)) => Definition::new(format!("{pos}."), meaning),
            None => Definition::new("", explain),
        })
        .collect();

    let mut result = TranslationResult::new(text, translation);
    result.phonetic = phonetic;
    result.definitions = definitions;
    Ok(result)
}

impl YoudaoEngine {
    pub fn new(client: reqwest::Client, config: EngineApiConfig) -> Self {
        Self {
            client,
            config: ConfigCell::new(config),
            endpoints: YoudaoEndpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: YoudaoEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    async fn translate_free(&self, text: &str) -> Result<TranslationResult, TranslateError> {
        let url = url_with(
            &self.endpoints.free,
            [("doctype", "json"), ("jsonversion", "4"), ("q", text)],
        )?;

        let response = self.client.get(url).send().await?;
        ensure_ok("YOUDAO", &response)?;
        parse_free_response(&json_body(response).await?, text)
    }

    async fn translate_official(
        &self,
        config: &EngineApiConfig,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<TranslationResult, TranslateError> {
        let curtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            .to_string();
        let salt = Uuid::new_v4().to_string();
        let sign = sign(&config.api_key, text, &salt, &curtime, &config.secret_key);

        let url = url_with(
            &self.endpoints.official,
            [
                ("q", text),
                ("from", language_code(from)),
                ("to", language_code(to)),
                ("appKey", config.api_key.as_str()),
                ("salt", salt.as_str()),
                ("sign", sign.as_str()),
                ("signType", "v3"),
                ("curtime", curtime.as_str()),
            ],
        )?;

        let response = self.client.get(url).send().await?;
        ensure_ok("YOUDAO", &response)?;
        parse_official_response(&json_body(response).await?, text)
    }
}

#[async_trait]
impl TranslationEngine for YoudaoEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Youdao
    }

    fn uses_custom_api_key(&self) -> bool {
        uses_official(&self.config.load())
    }

    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<TranslationResult, TranslateError> {
        let config = self.config.load();
        let mut result = if uses_official(&config) {
            self.translate_official(&config, text, from, to).await?
        } else {
            self.translate_free(text).await?
        };
        result.audio_url = self.audio_url(text, from);
        Ok(result)
    }

    fn audio_url(&self, text: &str, _language: &str) -> Option<String> {
        // type=2 is the US voice
        url_with(&self.endpoints.voice, [("audio", text), ("type", "2")])
            .ok()
            .map(String::from)
    }

    fn update_config(&self, config: EngineApiConfig) {
        self.config.store(config);
    }
}
