use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use hoverlex_config::EngineApiConfig;
use hoverlex_config::network::NetworkConfig;
use hoverlex_config::translator::TranslatorConfig;
use hoverlex_types::{EngineKind, TranslationResult};

use crate::engines::{BaiduEngine, BingEngine, GoogleEngine, SystemEngine, YoudaoEngine};
use crate::{TranslateError, TranslationEngine, http_client};

/// One instance per backend plus the current selection.
///
/// Selection and per-engine config can change at any time. A call already in
/// flight keeps the engine instance it started with.
pub struct EngineRegistry {
    engines: HashMap<EngineKind, Arc<dyn TranslationEngine>>,
    selected: RwLock<EngineKind>,
}

impl EngineRegistry {
    pub fn new(selected: EngineKind) -> Self {
        Self {
            engines: HashMap::new(),
            selected: RwLock::new(selected),
        }
    }

    /// The four network backends, configured from `config`. The on-device
    /// engine is only present when the platform provides one.
    pub fn with_network_engines(
        config: &TranslatorConfig,
        network: &NetworkConfig,
        system: Option<SystemEngine>,
    ) -> Result<Self, TranslateError> {
        let client = http_client(network)?;
        let engines = &config.engines;

        let mut registry = Self::new(config.engine);
        registry.register(Arc::new(GoogleEngine::new(client.clone(), engines.google.clone())));
        registry.register(Arc::new(BingEngine::new(client.clone(), engines.bing.clone())));
        registry.register(Arc::new(BaiduEngine::new(client.clone(), engines.baidu.clone())));
        registry.register(Arc::new(YoudaoEngine::new(client, engines.youdao.clone())));
        if let Some(system) = system {
            registry.register(Arc::new(system));
        }

        Ok(registry)
    }

    pub fn register(&mut self, engine: Arc<dyn TranslationEngine>) {
        self.engines.insert(engine.kind(), engine);
    }

    pub fn select(&self, kind: EngineKind) {
        let mut selected = self.selected.write().unwrap_or_else(|e| e.into_inner());
        if *selected != kind {
            tracing::info!("[TRANSLATE] Engine switched to {kind}");
            *selected = kind;
        }
    }

    pub fn selected(&self) -> EngineKind {
        *self.selected.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn engine(&self, kind: EngineKind) -> Option<Arc<dyn TranslationEngine>> {
        self.engines.get(&kind).cloned()
    }

    pub fn current(&self) -> Option<Arc<dyn TranslationEngine>> {
        self.engine(self.selected())
    }

    pub fn available(&self) -> Vec<EngineKind> {
        EngineKind::ALL
            .into_iter()
            .filter(|kind| self.engines.contains_key(kind))
            .collect()
    }

    /// Only touches the named backend
    pub fn update_config(&self, kind: EngineKind, config: EngineApiConfig) {
        if let Some(engine) = self.engines.get(&kind) {
            engine.update_config(config);
        }
    }

    /// Push a reloaded translator section: selection and every backend config
    pub fn apply(&self, config: &TranslatorConfig) {
        for kind in EngineKind::ALL {
            self.update_config(kind, config.engines.get(kind));
        }
        self.select(config.engine);
    }

    pub async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<TranslationResult, TranslateError> {
        let engine = self.current().ok_or(TranslateError::EngineNotAvailable)?;
        tracing::debug!("[TRANSLATE] {} '{text}' {from} -> {to}", engine.kind());
        engine.translate(text, from, to).await
    }

    pub fn audio_url(&self, text: &str, language: &str) -> Option<String> {
        self.current()?.audio_url(text, language)
    }

    pub async fn supports_pair(&self, from: &str, to: &str) -> bool {
        match self.current() {
            Some(engine) => engine.supports_pair(from, to).await,
            None => false,
        }
    }
}
