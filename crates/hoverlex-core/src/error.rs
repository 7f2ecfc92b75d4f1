use hoverlex_translator::TranslateError;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Screen recording permission is required to read text under the cursor")]
    PermissionDenied,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),

    #[error("No word found under the cursor")]
    NoWordFound,

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error("Lookup cancelled")]
    Cancelled,
}

impl LookupError {
    /// Cancelled lookups end silently
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            LookupError::Cancelled | LookupError::Translate(TranslateError::Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_errors_keep_their_message() {
        let err = LookupError::from(TranslateError::RateLimitExceeded);
        assert_eq!(err.to_string(), TranslateError::RateLimitExceeded.to_string());
        assert!(!err.is_cancelled());
        assert!(LookupError::from(TranslateError::Cancelled).is_cancelled());
    }
}
