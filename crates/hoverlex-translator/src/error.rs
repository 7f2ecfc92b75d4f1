/// Failure of one translation call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("Translation engine not available")]
    EngineNotAvailable,

    #[error("API key is required for this service")]
    ApiKeyRequired,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Language pair not supported: {from} -> {to}")]
    UnsupportedLanguagePair { from: String, to: String },

    #[error("Rate limit exceeded, please try again later")]
    RateLimitExceeded,

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Empty response from server")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Timeout
        } else if e.is_decode() {
            TranslateError::ParseError(e.to_string())
        } else {
            TranslateError::NetworkError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(e: serde_json::Error) -> Self {
        TranslateError::ParseError(e.to_string())
    }
}
