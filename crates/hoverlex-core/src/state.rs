use std::sync::Arc;

use hoverlex_config::Config;
use tokio::sync::RwLock;

use crate::status::LookupStats;

#[derive(Default)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub stats: Arc<LookupStats>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            stats: Arc::default(),
        }
    }

    /// Copy of the current settings; a lookup keeps the snapshot it started with
    pub async fn snapshot(&self) -> Config {
        self.config.read().await.clone()
    }
}
