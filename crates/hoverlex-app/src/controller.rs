use std::sync::Arc;
use std::time::Duration;

use hoverlex_config::Config;
use hoverlex_config::dictionary::DictionaryConfig;
use hoverlex_config::hotkey::HotkeyConfig;
use hoverlex_core::{AppState, LookupContext, LookupCoordinator};
use hoverlex_translator::{DictionaryLookup, EngineRegistry, WordListDictionary};
use hoverlex_types::AppEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::io::{ProfileWatch, hotkey_loop, log_phases, watch_displays, watch_profile};
use crate::platform::Platform;
use crate::ui::LogPresenter;

const DISPLAY_POLL: Duration = Duration::from_secs(2);

/// Centralized channel management
pub struct ChannelSet {
    pub events: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub hotkey: (AsyncSender<HotkeyConfig>, AsyncReceiver<HotkeyConfig>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            events: kanal::bounded_async(256), // pointer bursts
            hotkey: kanal::bounded_async(4),
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Sender for coordinator events
    pub fn events(&self) -> AsyncSender<AppEvent> {
        self.channels.events.0.clone()
    }

    pub async fn spawn_tasks(
        &self,
        platform: Platform,
        profile: Option<ProfileWatch>,
    ) -> anyhow::Result<JoinSet<anyhow::Result<()>>> {
        let config = self.state.snapshot().await;
        let ctx = lookup_context(&config, &platform)?;

        let mut tasks = JoinSet::new();

        // Coordinator
        let mut coordinator = LookupCoordinator::new(
            ctx,
            self.state.clone(),
            self.channels.events.1.clone(),
            self.cancel_token.child_token(),
        );
        let phases = coordinator.subscribe_phases();
        tasks.spawn(coordinator.run());
        tasks.spawn(log_phases(phases, self.cancel_token.child_token()));

        // Hotkey
        tasks.spawn(hotkey_loop(
            platform.monitor.clone(),
            config.hotkey.clone(),
            self.channels.events.0.clone(),
            self.channels.hotkey.1.clone(),
            self.cancel_token.child_token(),
        ));

        // Displays
        tasks.spawn(watch_displays(
            platform.displays.clone(),
            DISPLAY_POLL,
            self.cancel_token.child_token(),
            self.channels.events.0.clone(),
        ));

        // Profile reload
        if let Some(watch) = profile {
            tasks.spawn(watch_profile(
                self.state.clone(),
                watch,
                self.cancel_token.child_token(),
                self.channels.events.0.clone(),
                self.channels.hotkey.0.clone(),
            ));
        }

        Ok(tasks)
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

fn lookup_context(config: &Config, platform: &Platform) -> anyhow::Result<LookupContext> {
    // No on-device translator on this platform; selecting it fails each lookup
    let registry =
        EngineRegistry::with_network_engines(&config.translator, &config.network, None)?;
    tracing::info!(
        "Engines available: {:?}, selected {}",
        registry.available(),
        registry.selected()
    );

    Ok(LookupContext {
        displays: platform.displays.clone(),
        pointer: platform.pointer.clone(),
        tracker: platform.tracker.clone(),
        capturer: platform.capturer.clone(),
        recognizer: platform.recognizer.clone(),
        registry: Arc::new(registry),
        dictionary: load_dictionary(&config.dictionary),
        permissions: platform.permissions.clone(),
        presenter: Arc::new(LogPresenter::default()),
    })
}

pub fn load_dictionary(config: &DictionaryConfig) -> Option<Arc<dyn DictionaryLookup>> {
    if !config.enabled {
        return None;
    }
    let path = config.path.as_ref()?;

    match WordListDictionary::load(path) {
        Ok(dictionary) => Some(Arc::new(dictionary)),
        Err(e) => {
            tracing::warn!("Dictionary disabled: {e}");
            None
        }
    }
}
