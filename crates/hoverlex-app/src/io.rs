use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hoverlex_config::hotkey::HotkeyConfig;
use hoverlex_core::AppState;
use hoverlex_ocr::{DisplaySource, ModifierMonitor, TriggerDetector};
use hoverlex_types::{AppEvent, LookupPhase};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cli::Overrides;
use crate::profile::Profile;

/// Owns the trigger detector and rebinds it when the hotkey settings change
pub async fn hotkey_loop(
    monitor: Arc<dyn ModifierMonitor>,
    hotkey: HotkeyConfig,
    edges: AsyncSender<AppEvent>,
    rebinds: AsyncReceiver<HotkeyConfig>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut current = hotkey;
    let mut detector =
        TriggerDetector::new(monitor.clone(), current.release_confirm_delay(), edges.clone());
    detector.start(current.binding);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = rebinds.recv() => {
                let Ok(next) = next else { break };
                if next.binding == current.binding && next.release_confirm_ms == current.release_confirm_ms {
                    continue;
                }

                tracing::info!("[HOTKEY] Rebinding to {}", next.binding.title());
                detector.stop();
                detector = TriggerDetector::new(monitor.clone(), next.release_confirm_delay(), edges.clone());
                detector.start(next.binding);
                current = next;
            }
        }
    }

    detector.stop();
    tracing::info!("[HOTKEY] Listener stopping");
    Ok(())
}

/// Polls the display list and reports any change
pub async fn watch_displays(
    displays: Arc<dyn DisplaySource>,
    period: Duration,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut known = displays.displays().unwrap_or_default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let current = match displays.displays() {
            Ok(current) => current,
            Err(e) => {
                tracing::debug!("[DISPLAYS] Enumeration failed: {e:#}");
                continue;
            }
        };

        if current != known {
            tracing::info!("[DISPLAYS] Configuration changed, {} attached", current.len());
            known = current;
            event_tx.send(AppEvent::DisplaysChanged).await?;
        }
    }

    Ok(())
}

/// Time from capture start to a presented result
#[derive(Debug, Default)]
pub struct PhaseTimer {
    started: Option<Instant>,
}

impl PhaseTimer {
    /// Elapsed lookup time once `phase` is [`LookupPhase::Presenting`]
    pub fn observe(&mut self, phase: LookupPhase, now: Instant) -> Option<Duration> {
        match phase {
            LookupPhase::Capturing => {
                self.started = Some(now);
                None
            }
            LookupPhase::Presenting => self.started.take().map(|started| now - started),
            LookupPhase::Idle => {
                self.started = None;
                None
            }
            _ => None,
        }
    }
}

/// Logs how long each presented lookup took
pub async fn log_phases(
    phases: AsyncReceiver<LookupPhase>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut timer = PhaseTimer::default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            phase = phases.recv() => {
                let Ok(phase) = phase else { break };
                if let Some(elapsed) = timer.observe(phase, Instant::now()) {
                    tracing::info!("[PHASE] Result ready in {} ms", elapsed.as_millis());
                }
            }
        }
    }

    Ok(())
}

/// Profile file followed by [`watch_profile`]
#[derive(Debug, Clone)]
pub struct ProfileWatch {
    pub path: PathBuf,
    pub overrides: Overrides,
    pub period: Duration,
}

/// Reloads the profile when its file changes.
///
/// The reloaded config gets environment and command-line overrides applied
/// again before it replaces the shared one. Unreadable edits are skipped.
pub async fn watch_profile(
    state: Arc<AppState>,
    watch: ProfileWatch,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
    hotkey_tx: AsyncSender<HotkeyConfig>,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(watch.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = tokio::fs::read_to_string(&watch.path).await.ok();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let current = tokio::fs::read_to_string(&watch.path).await.ok();
        if current == last {
            continue;
        }
        last = current;
        let Some(data) = last.as_deref() else {
            tracing::warn!("[PROFILE] {} is unreadable, keeping previous settings", watch.path.display());
            continue;
        };

        let mut config = match Profile::parse(data, &watch.path) {
            Ok(profile) => profile.value,
            Err(e) => {
                tracing::warn!("[PROFILE] Keeping previous settings: {e:#}");
                continue;
            }
        };
        config.apply_env();
        watch.overrides.apply(&mut config);

        let hotkey = config.hotkey.clone();
        *state.config.write().await = config;
        tracing::info!("[PROFILE] Reloaded {}", watch.path.display());

        hotkey_tx.send(hotkey).await?;
        event_tx.send(AppEvent::ConfigReloaded).await?;
    }

    Ok(())
}
