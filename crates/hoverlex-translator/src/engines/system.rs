use std::sync::Arc;

use async_trait::async_trait;
use hoverlex_types::{EngineKind, TranslationResult};

use crate::dictionary::DictionaryLookup;
use crate::{TranslateError, TranslationEngine};

/// Availability of an on-device language pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairStatus {
    /// Language pack present, translation can run offline
    Installed,
    /// Pair exists but the pack has not been downloaded
    Supported,
    Unsupported,
}

/// Platform translation service running in-process
#[async_trait]
pub trait OnDeviceTranslator: Send + Sync {
    async fn pair_status(&self, from: &str, to: &str) -> PairStatus;

    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, TranslateError>;
}

/// On-device engine enriched with dictionary phonetics and definitions
pub struct SystemEngine {
    translator: Arc<dyn OnDeviceTranslator>,
    dictionary: Option<Arc<dyn DictionaryLookup>>,
    max_translated_definitions: usize,
}

impl SystemEngine {
    pub fn new(translator: Arc<dyn OnDeviceTranslator>) -> Self {
        Self {
            translator,
            dictionary: None,
            max_translated_definitions: 3,
        }
    }

    pub fn with_dictionary(
        mut self,
        dictionary: Arc<dyn DictionaryLookup>,
        max_translated_definitions: usize,
    ) -> Self {
        self.dictionary = Some(dictionary);
        self.max_translated_definitions = max_translated_definitions;
        self
    }
}

#[async_trait]
impl TranslationEngine for SystemEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::System
    }

    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<TranslationResult, TranslateError> {
        if self.translator.pair_status(from, to).await != PairStatus::Installed {
            return Err(TranslateError::UnsupportedLanguagePair {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let entry = self.dictionary.as_ref().and_then(|d| d.lookup(text));
        let translation = self.translator.translate(text, from, to).await?;

        let mut result = TranslationResult::new(text, translation);
        let Some(entry) = entry else {
            return Ok(result);
        };

        result.phonetic = entry.phonetic;
        result.definitions = entry.definitions;

        // A failed meaning translation keeps the untranslated definition
        for definition in result
            .definitions
            .iter_mut()
            .take(self.max_translated_definitions)
        {
            match self.translator.translate(&definition.meaning, from, to).await {
                Ok(translated) => definition.translation = Some(translated),
                Err(e) => tracing::debug!("[SYSTEM] Definition translation failed: {e}"),
            }
        }

        Ok(result)
    }

    async fn supports_pair(&self, from: &str, to: &str) -> bool {
        matches!(
            self.translator.pair_status(from, to).await,
            PairStatus::Installed | PairStatus::Supported
        )
    }
}
