use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;

use hoverlex_types::{AppEvent, LookupPhase, OverlayState, Point};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::time::{Sleep, sleep};
use tokio_util::sync::CancellationToken;

use crate::collaborators::LookupContext;
use crate::identity::{IdentityGate, LookupIdentity};
use crate::pipeline::{self, PipelineUpdate, UpdateKind};
use crate::state::AppState;

struct ActiveLookup {
    identity: LookupIdentity,
    cancel: CancellationToken,
    anchor: Point,
    continuous: bool,
    /// A terminal state was published; later updates are ignored
    settled: bool,
}

/// Single owner of lookup state.
///
/// Events and pipeline progress are handled on one task, so overlay state is
/// only ever written here. Every dispatched lookup gets a fresh identity and
/// updates tagged with any other identity are dropped.
pub struct LookupCoordinator {
    ctx: Arc<LookupContext>,
    state: Arc<AppState>,
    events: AsyncReceiver<AppEvent>,
    updates_tx: AsyncSender<PipelineUpdate>,
    updates_rx: AsyncReceiver<PipelineUpdate>,
    gate: IdentityGate,
    current: Option<ActiveLookup>,
    overlay: OverlayState,
    phase: LookupPhase,
    phase_subscribers: Vec<AsyncSender<LookupPhase>>,
    held: bool,
    tracking: bool,
    /// Missing input monitoring was already reported
    tracking_denied: bool,
    last_pointer: Option<Point>,
    last_lookup_at: Option<Point>,
    pending_move: Option<Point>,
    debounce: Option<Pin<Box<Sleep>>>,
    shutdown: CancellationToken,
}

impl LookupCoordinator {
    pub fn new(
        ctx: LookupContext,
        state: Arc<AppState>,
        events: AsyncReceiver<AppEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        let (updates_tx, updates_rx) = kanal::unbounded_async();
        Self {
            ctx: Arc::new(ctx),
            state,
            events,
            updates_tx,
            updates_rx,
            gate: IdentityGate::new(),
            current: None,
            overlay: OverlayState::Idle,
            phase: LookupPhase::Idle,
            phase_subscribers: Vec::new(),
            held: false,
            tracking: false,
            tracking_denied: false,
            last_pointer: None,
            last_lookup_at: None,
            pending_move: None,
            debounce: None,
            shutdown,
        }
    }

    /// Every phase transition of the active lookup, in order. Transitions of
    /// superseded lookups never reach subscribers.
    pub fn subscribe_phases(&mut self) -> AsyncReceiver<LookupPhase> {
        let (tx, rx) = kanal::unbounded_async();
        self.phase_subscribers.push(tx);
        rx
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        tracing::info!("[COORDINATOR] Waiting for events");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                event = self.events.recv() => match event {
                    Ok(AppEvent::Shutdown) | Err(_) => break,
                    Ok(event) => self.handle_event(event).await,
                },
                update = self.updates_rx.recv() => {
                    if let Ok(update) = update {
                        self.apply(update);
                    }
                }
                _ = timer_elapsed(&mut self.debounce) => {
                    self.debounce = None;
                    self.on_pointer_settled().await;
                }
            }
        }

        self.cancel_current();
        self.stop_tracking();
        tracing::info!(
            "[COORDINATOR] Stopped: {}",
            self.state.stats.counts()
        );
        Ok(())
    }

    async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Trigger => self.on_trigger().await,
            AppEvent::Release => self.on_release(),
            AppEvent::PointerMoved(point) => self.on_pointer_moved(point).await,
            AppEvent::Dismiss => self.on_dismiss().await,
            AppEvent::ConfigReloaded => self.on_config_reloaded().await,
            AppEvent::DisplaysChanged => self.on_displays_changed(),
            AppEvent::Shutdown => {}
        }
    }

    async fn on_trigger(&mut self) {
        let continuous = self.state.config.read().await.lookup.continuous;
        self.held = true;

        let Some(pointer) = self.ctx.pointer.position().or(self.last_pointer) else {
            tracing::warn!("[COORDINATOR] Trigger ignored, pointer position unknown");
            return;
        };

        if continuous {
            self.start_tracking();
        }
        self.dispatch(pointer).await;
    }

    fn on_release(&mut self) {
        tracing::debug!("[COORDINATOR] Key released");
        self.held = false;
        self.stop_tracking();
        self.reset();
    }

    async fn on_pointer_moved(&mut self, point: Point) {
        self.last_pointer = Some(point);
        if !(self.held && self.tracking) {
            return;
        }

        // Trailing debounce: every sample pushes the deadline out
        let debounce = self.state.config.read().await.lookup.debounce();
        self.pending_move = Some(point);
        self.debounce = Some(Box::pin(sleep(debounce)));
    }

    async fn on_pointer_settled(&mut self) {
        let Some(point) = self.pending_move.take() else {
            return;
        };
        if !(self.held && self.tracking) {
            return;
        }

        let threshold = self.state.config.read().await.lookup.movement_threshold;
        let moved = self.last_lookup_at.is_none_or(|last| {
            (point.x - last.x).abs() >= threshold || (point.y - last.y).abs() >= threshold
        });

        if moved {
            self.dispatch(point).await;
        } else {
            tracing::trace!("[COORDINATOR] Movement below threshold");
        }
    }

    async fn on_dismiss(&mut self) {
        if self.state.config.read().await.lookup.continuous {
            tracing::debug!("[COORDINATOR] Dismiss ignored in continuous mode");
            return;
        }
        self.reset();
    }

    async fn on_config_reloaded(&mut self) {
        let config = self.state.snapshot().await;
        tracing::info!(
            "[COORDINATOR] Config reloaded: {} -> {} via {}",
            config.lookup.source_language,
            config.lookup.target_language,
            config.translator.engine
        );

        self.ctx.registry.apply(&config.translator);
        if let Some(hint) = config.translator.credentials_hint() {
            tracing::warn!("[COORDINATOR] {hint}");
        }
        self.reset();

        if self.held && config.lookup.continuous {
            self.start_tracking();
        } else {
            self.stop_tracking();
        }
    }

    fn on_displays_changed(&mut self) {
        if self.held {
            tracing::info!("[COORDINATOR] Displays changed mid-lookup, resetting");
            self.reset();
        }
    }

    async fn dispatch(&mut self, pointer: Point) {
        let config = self.state.snapshot().await;

        self.cancel_current();
        let identity = self.gate.mint();
        let cancel = self.shutdown.child_token();
        let guard = self.gate.guard(identity, cancel.clone());

        self.current = Some(ActiveLookup {
            identity,
            cancel,
            anchor: pointer,
            continuous: config.lookup.continuous,
            settled: false,
        });
        self.last_lookup_at = Some(pointer);
        self.state.stats.record_dispatched();
        self.set_phase(LookupPhase::Capturing);

        tracing::info!(
            "[LOOKUP] {identity} dispatched at ({:.0}, {:.0})",
            pointer.x,
            pointer.y
        );
        tokio::spawn(pipeline::run(
            self.ctx.clone(),
            guard,
            pointer,
            config,
            self.updates_tx.clone(),
        ));
    }

    fn apply(&mut self, update: PipelineUpdate) {
        let Some(current) = self.current.as_mut() else {
            tracing::trace!("[COORDINATOR] Dropped update from {}", update.identity);
            return;
        };
        if current.identity != update.identity || current.settled {
            tracing::trace!("[COORDINATOR] Dropped stale update from {}", update.identity);
            return;
        }

        match update.kind {
            UpdateKind::Phase(phase) => self.set_phase(phase),
            UpdateKind::DebugRegion { region, words } => {
                self.ctx.presenter.show_debug_region(region, &words);
            }
            UpdateKind::Overlay(state) => {
                let anchor = current.anchor;
                let continuous = current.continuous;
                if state.is_terminal() {
                    current.settled = true;
                    self.record(&state);
                    self.set_phase(match state {
                        OverlayState::Result(_) => LookupPhase::Presenting,
                        _ => LookupPhase::Idle,
                    });
                }
                self.publish(state, anchor, continuous);
            }
        }
    }

    fn record(&self, state: &OverlayState) {
        let stats = &self.state.stats;
        match state {
            OverlayState::Result(_) => stats.record_completed(),
            OverlayState::Error(_) => stats.record_failed(),
            OverlayState::NoWordFound | OverlayState::Idle => stats.record_empty(),
            OverlayState::Loading(_) => {}
        }
    }

    fn publish(&mut self, state: OverlayState, anchor: Point, continuous: bool) {
        let presenter = &self.ctx.presenter;
        let was_interactive = matches!(self.overlay, OverlayState::Result(_)) && !continuous;

        match &state {
            OverlayState::Idle => presenter.hide(),
            OverlayState::Loading(_) => {
                if was_interactive {
                    presenter.set_interactive(false);
                }
                presenter.show(&state, anchor);
            }
            OverlayState::Result(_) => {
                presenter.show(&state, anchor);
                presenter.set_interactive(!continuous);
            }
            OverlayState::Error(message) => {
                presenter.show(&state, anchor);
                presenter.notify("Lookup failed", message);
            }
            OverlayState::NoWordFound => presenter.show(&state, anchor),
        }

        self.overlay = state;
    }

    /// Cancel whatever is running and hide every surface
    fn reset(&mut self) {
        self.cancel_current();
        self.pending_move = None;
        self.debounce = None;

        let presenter = &self.ctx.presenter;
        if matches!(self.overlay, OverlayState::Result(_)) {
            presenter.set_interactive(false);
        }
        presenter.hide();
        presenter.hide_debug();

        self.overlay = OverlayState::Idle;
        self.set_phase(LookupPhase::Idle);
    }

    fn cancel_current(&mut self) {
        if let Some(lookup) = self.current.take() {
            lookup.cancel.cancel();
            if !lookup.settled {
                tracing::debug!("[LOOKUP] {} superseded", lookup.identity);
                self.state.stats.record_superseded();
            }
        }
        self.gate.retire();
    }

    fn start_tracking(&mut self) {
        if self.tracking {
            return;
        }
        if !self.ctx.permissions.input_monitoring_allowed() {
            if !self.tracking_denied {
                self.tracking_denied = true;
                tracing::warn!("[COORDINATOR] Input monitoring denied, pointer is not followed");
                self.ctx.presenter.notify(
                    "Input monitoring required",
                    "Allow input monitoring to follow the pointer while the key is held.",
                );
            }
            return;
        }

        self.tracking = true;
        self.ctx.tracker.start_tracking();
    }

    fn stop_tracking(&mut self) {
        self.pending_move = None;
        self.debounce = None;
        if self.tracking {
            self.tracking = false;
            self.ctx.tracker.stop_tracking();
        }
    }

    fn set_phase(&mut self, phase: LookupPhase) {
        if self.phase == phase {
            return;
        }
        tracing::debug!("[COORDINATOR] Phase {phase:?}");
        self.phase = phase;
        self.phase_subscribers.retain(|tx| tx.try_send(phase).is_ok());
    }
}

async fn timer_elapsed(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}
