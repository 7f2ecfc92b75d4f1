use std::future::pending;
use std::ops::{BitOr, BitOrAssign};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use hoverlex_types::{AppEvent, SingleKeyBinding};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::time::{Sleep, sleep};
use tokio_util::sync::CancellationToken;

/// Set of modifier flags reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierFlags(u8);

impl ModifierFlags {
    pub const SHIFT: Self = Self(1);
    pub const CONTROL: Self = Self(1 << 1);
    pub const OPTION: Self = Self(1 << 2);
    pub const COMMAND: Self = Self(1 << 3);
    pub const FUNCTION: Self = Self(1 << 4);

    /// Flags that turn a single-key press into a chord
    pub const CHORD: Self = Self(Self::SHIFT.0 | Self::CONTROL.0 | Self::OPTION.0 | Self::COMMAND.0);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersection(&self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn difference(&self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Flag raised while `key` is held
    pub const fn of(key: SingleKeyBinding) -> Self {
        match key {
            SingleKeyBinding::LeftShift | SingleKeyBinding::RightShift => Self::SHIFT,
            SingleKeyBinding::LeftControl | SingleKeyBinding::RightControl => Self::CONTROL,
            SingleKeyBinding::LeftOption | SingleKeyBinding::RightOption => Self::OPTION,
            SingleKeyBinding::LeftCommand | SingleKeyBinding::RightCommand => Self::COMMAND,
            SingleKeyBinding::Function => Self::FUNCTION,
        }
    }
}

impl BitOr for ModifierFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModifierFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

/// One "flags changed" observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierEvent {
    /// Physical key whose state changed, when the monitor can tell
    pub key: Option<SingleKeyBinding>,
    /// All modifier flags present after the change
    pub flags: ModifierFlags,
}

/// Uninstalls the OS monitor when dropped
pub struct MonitorGuard {
    uninstall: Option<Box<dyn FnOnce() + Send>>,
}

impl MonitorGuard {
    pub fn new(uninstall: impl FnOnce() + Send + 'static) -> Self {
        Self {
            uninstall: Some(Box::new(uninstall)),
        }
    }

    pub fn noop() -> Self {
        Self { uninstall: None }
    }
}

impl Drop for MonitorGuard {
    fn drop(&mut self) {
        if let Some(uninstall) = self.uninstall.take() {
            uninstall();
        }
    }
}

/// System-wide source of modifier flag changes
pub trait ModifierMonitor: Send + Sync {
    /// Start delivering events into `sink` until the guard is dropped.
    ///
    /// Called from the OS event context; implementations must only `try_send`.
    fn install(&self, sink: AsyncSender<ModifierEvent>) -> Result<MonitorGuard>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Trigger,
    ArmRelease,
    CancelRelease,
    Ignore,
}

/// Held/idle state of one binding
#[derive(Debug)]
struct KeyTracker {
    binding: SingleKeyBinding,
    held: bool,
    last_flags: ModifierFlags,
}

impl KeyTracker {
    fn new(binding: SingleKeyBinding) -> Self {
        Self {
            binding,
            held: false,
            last_flags: ModifierFlags::empty(),
        }
    }

    fn observe(&mut self, event: &ModifierEvent) -> Transition {
        self.last_flags = event.flags;
        let target = ModifierFlags::of(self.binding);

        if !event.flags.contains(target) {
            return if self.held {
                Transition::ArmRelease
            } else {
                Transition::Ignore
            };
        }

        if self.held {
            return Transition::CancelRelease;
        }

        // Same flag from the other side of the keyboard
        if event.key.is_some_and(|key| key != self.binding) {
            return Transition::Ignore;
        }

        let others = event
            .flags
            .intersection(ModifierFlags::CHORD)
            .difference(target);
        if !others.is_empty() {
            return Transition::Ignore;
        }

        self.held = true;
        Transition::Trigger
    }

    /// Called when the confirmation delay ran out
    fn confirm_release(&mut self) -> bool {
        let target = ModifierFlags::of(self.binding);
        if self.held && !self.last_flags.contains(target) {
            self.held = false;
            return true;
        }
        false
    }
}

struct DetectorSession {
    binding: SingleKeyBinding,
    cancel: CancellationToken,
    _guard: MonitorGuard,
}

/// Turns raw modifier changes into trigger/release edges for one binding.
///
/// Edges are sent to the coordinator as [`AppEvent::Trigger`] and
/// [`AppEvent::Release`]. If the monitor cannot be installed, `start` leaves
/// the detector stopped and no edges are ever produced.
pub struct TriggerDetector {
    monitor: Arc<dyn ModifierMonitor>,
    release_delay: Duration,
    edges: AsyncSender<AppEvent>,
    session: Option<DetectorSession>,
}

impl TriggerDetector {
    pub fn new(
        monitor: Arc<dyn ModifierMonitor>,
        release_delay: Duration,
        edges: AsyncSender<AppEvent>,
    ) -> Self {
        Self {
            monitor,
            release_delay,
            edges,
            session: None,
        }
    }

    /// Must be called inside a tokio runtime
    pub fn start(&mut self, binding: SingleKeyBinding) {
        self.stop();

        let (tx, rx) = kanal::unbounded_async();
        let guard = match self.monitor.install(tx) {
            Ok(guard) => guard,
            Err(e) => {
                tracing::warn!("[TRIGGER] Modifier monitor unavailable: {e:#}");
                return;
            }
        };

        let cancel = CancellationToken::new();
        tokio::spawn(detect_edges(
            rx,
            KeyTracker::new(binding),
            self.release_delay,
            self.edges.clone(),
            cancel.clone(),
        ));

        tracing::info!("[TRIGGER] Listening for {}", binding.title());
        self.session = Some(DetectorSession {
            binding,
            cancel,
            _guard: guard,
        });
    }

    /// Discards any pending release without reporting it
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel.cancel();
            tracing::debug!("[TRIGGER] Stopped listening for {}", session.binding.title());
        }
    }

    pub fn binding(&self) -> Option<SingleKeyBinding> {
        self.session.as_ref().map(|s| s.binding)
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }
}

impl Drop for TriggerDetector {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn timer_elapsed(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}

async fn detect_edges(
    events: AsyncReceiver<ModifierEvent>,
    mut tracker: KeyTracker,
    release_delay: Duration,
    edges: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) {
    let mut pending_release: Option<Pin<Box<Sleep>>> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => {
                let Ok(event) = event else { break };
                match tracker.observe(&event) {
                    Transition::Trigger => {
                        pending_release = None;
                        if edges.send(AppEvent::Trigger).await.is_err() {
                            break;
                        }
                    }
                    // Re-arming replaces the previous timer
                    Transition::ArmRelease => {
                        pending_release = Some(Box::pin(sleep(release_delay)));
                    }
                    Transition::CancelRelease => pending_release = None,
                    Transition::Ignore => {}
                }
            }
            _ = timer_elapsed(&mut pending_release) => {
                pending_release = None;
                if tracker.confirm_release() && edges.send(AppEvent::Release).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn event(key: Option<SingleKeyBinding>, flags: ModifierFlags) -> ModifierEvent {
        ModifierEvent { key, flags }
    }

    #[test]
    fn test_trigger_requires_bound_flag_without_chord() {
        let mut tracker = KeyTracker::new(SingleKeyBinding::RightOption);

        let chord = event(
            Some(SingleKeyBinding::RightOption),
            ModifierFlags::OPTION | ModifierFlags::COMMAND,
        );
        assert_eq!(tracker.observe(&chord), Transition::Ignore);

        let wrong_side = event(Some(SingleKeyBinding::LeftOption), ModifierFlags::OPTION);
        assert_eq!(tracker.observe(&wrong_side), Transition::Ignore);

        let press = event(Some(SingleKeyBinding::RightOption), ModifierFlags::OPTION);
        assert_eq!(tracker.observe(&press), Transition::Trigger);
        // Already held
        assert_eq!(tracker.observe(&press), Transition::CancelRelease);
    }

    #[test]
    fn test_function_flag_does_not_block_other_bindings() {
        let mut tracker = KeyTracker::new(SingleKeyBinding::LeftShift);
        let press = event(None, ModifierFlags::SHIFT | ModifierFlags::FUNCTION);
        assert_eq!(tracker.observe(&press), Transition::Trigger);
    }

    #[test]
    fn test_release_confirms_only_when_flag_stays_up() {
        let mut tracker = KeyTracker::new(SingleKeyBinding::LeftControl);
        tracker.observe(&event(None, ModifierFlags::CONTROL));

        assert_eq!(
            tracker.observe(&event(None, ModifierFlags::empty())),
            Transition::ArmRelease
        );
        assert!(tracker.confirm_release());
        assert!(!tracker.confirm_release());
    }

    /// Hands the installed sink to the test
    #[derive(Default)]
    struct ManualMonitor {
        sink: Mutex<Option<AsyncSender<ModifierEvent>>>,
        fail: bool,
    }

    impl ManualMonitor {
        fn push(&self, key: Option<SingleKeyBinding>, flags: ModifierFlags) {
            let sink = self.sink.lock().unwrap();
            sink.as_ref()
                .expect("monitor not installed")
                .try_send(event(key, flags))
                .unwrap();
        }
    }

    impl ModifierMonitor for ManualMonitor {
        fn install(&self, sink: AsyncSender<ModifierEvent>) -> Result<MonitorGuard> {
            if self.fail {
                anyhow::bail!("input monitoring not permitted");
            }
            *self.sink.lock().unwrap() = Some(sink);
            Ok(MonitorGuard::noop())
        }
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_waits_for_confirmation_delay() {
        let monitor = Arc::new(ManualMonitor::default());
        let (tx, rx) = kanal::unbounded_async();
        let mut detector = TriggerDetector::new(monitor.clone(), Duration::from_millis(150), tx);
        detector.start(SingleKeyBinding::RightShift);

        monitor.push(Some(SingleKeyBinding::RightShift), ModifierFlags::SHIFT);
        settle().await;
        assert!(matches!(rx.try_recv(), Ok(Some(AppEvent::Trigger))));

        monitor.push(Some(SingleKeyBinding::RightShift), ModifierFlags::empty());
        settle().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert!(matches!(rx.try_recv(), Ok(None)));

        tokio::time::advance(Duration::from_millis(60)).await;
        settle().await;
        assert!(matches!(rx.try_recv(), Ok(Some(AppEvent::Release))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flicker_inside_window_cancels_release() {
        let monitor = Arc::new(ManualMonitor::default());
        let (tx, rx) = kanal::unbounded_async();
        let mut detector = TriggerDetector::new(monitor.clone(), Duration::from_millis(150), tx);
        detector.start(SingleKeyBinding::RightShift);

        monitor.push(None, ModifierFlags::SHIFT);
        settle().await;
        assert!(matches!(rx.try_recv(), Ok(Some(AppEvent::Trigger))));

        monitor.push(None, ModifierFlags::empty());
        settle().await;
        tokio::time::advance(Duration::from_millis(50)).await;
        monitor.push(None, ModifierFlags::SHIFT);
        settle().await;
        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;

        // No release and no second trigger
        assert!(matches!(rx.try_recv(), Ok(None)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebinding_discards_pending_release() {
        let monitor = Arc::new(ManualMonitor::default());
        let (tx, rx) = kanal::unbounded_async();
        let mut detector = TriggerDetector::new(monitor.clone(), Duration::from_millis(150), tx);
        detector.start(SingleKeyBinding::LeftCommand);

        monitor.push(None, ModifierFlags::COMMAND);
        settle().await;
        monitor.push(None, ModifierFlags::empty());
        settle().await;
        assert!(matches!(rx.try_recv(), Ok(Some(AppEvent::Trigger))));

        detector.start(SingleKeyBinding::Function);
        assert_eq!(detector.binding(), Some(SingleKeyBinding::Function));
        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;
        assert!(matches!(rx.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_start_is_noop_when_monitor_fails() {
        let monitor = Arc::new(ManualMonitor {
            fail: true,
            ..Default::default()
        });
        let (tx, _rx) = kanal::unbounded_async();
        let mut detector = TriggerDetector::new(monitor, Duration::from_millis(150), tx);
        detector.start(SingleKeyBinding::RightOption);
        assert!(!detector.is_running());
    }
}
