use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, bail};
use hoverlex_types::{AppEvent, Point, SingleKeyBinding};
use kanal::AsyncSender;
use rdev::{Event, EventType, Key};

use crate::capture::PointerSource;
use crate::hotkey::{ModifierEvent, ModifierFlags, ModifierMonitor, MonitorGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn binding_for(key: Key) -> Option<SingleKeyBinding> {
    match key {
        Key::ShiftLeft => Some(SingleKeyBinding::LeftShift),
        Key::ShiftRight => Some(SingleKeyBinding::RightShift),
        Key::ControlLeft => Some(SingleKeyBinding::LeftControl),
        Key::ControlRight => Some(SingleKeyBinding::RightControl),
        Key::Alt => Some(SingleKeyBinding::LeftOption),
        Key::AltGr => Some(SingleKeyBinding::RightOption),
        Key::MetaLeft => Some(SingleKeyBinding::LeftCommand),
        Key::MetaRight => Some(SingleKeyBinding::RightCommand),
        Key::Function => Some(SingleKeyBinding::Function),
        _ => None,
    }
}

#[derive(Default)]
struct Shared {
    modifier_sink: Mutex<Option<AsyncSender<ModifierEvent>>>,
    pointer_sink: Mutex<Option<AsyncSender<AppEvent>>>,
    dismiss_sink: Mutex<Option<AsyncSender<AppEvent>>>,
    held: Mutex<HashSet<SingleKeyBinding>>,
    position: Mutex<Option<Point>>,
    failed: AtomicBool,
}

impl Shared {
    fn on_key(&self, key: Key, pressed: bool) {
        let Some(binding) = binding_for(key) else {
            return;
        };

        let flags = {
            let mut held = lock(&self.held);
            let changed = if pressed {
                held.insert(binding)
            } else {
                held.remove(&binding)
            };
            // Auto-repeat
            if !changed {
                return;
            }
            held.iter()
                .fold(ModifierFlags::empty(), |acc, k| acc | ModifierFlags::of(*k))
        };

        if let Some(sink) = lock(&self.modifier_sink).as_ref() {
            let _ = sink.try_send(ModifierEvent {
                key: Some(binding),
                flags,
            });
        }
    }

    fn on_pointer(&self, x: f64, y: f64) {
        let point = Point::new(x, y);
        *lock(&self.position) = Some(point);

        if let Some(sink) = lock(&self.pointer_sink).as_ref() {
            let _ = sink.try_send(AppEvent::PointerMoved(point));
        }
    }

    fn on_escape(&self) {
        if let Some(sink) = lock(&self.dismiss_sink).as_ref() {
            let _ = sink.try_send(AppEvent::Dismiss);
        }
    }

    fn handle(&self, event: Event) {
        match event.event_type {
            EventType::KeyPress(Key::Escape) => self.on_escape(),
            EventType::KeyPress(key) => self.on_key(key, true),
            EventType::KeyRelease(key) => self.on_key(key, false),
            EventType::MouseMove { x, y } => self.on_pointer(x, y),
            _ => {}
        }
    }
}

/// Global keyboard and pointer hook built on `rdev`.
///
/// `rdev::listen` cannot be stopped once running, so one listener thread
/// lives for the whole process and sinks are attached and detached instead.
#[derive(Default)]
pub struct RdevInput {
    shared: Arc<Shared>,
    started: AtomicBool,
}

impl RdevInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the listener thread on first call
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let shared = self.shared.clone();
        let spawned = std::thread::Builder::new()
            .name("hoverlex-input".into())
            .spawn(move || {
                let callback_shared = shared.clone();
                if let Err(e) = rdev::listen(move |event| callback_shared.handle(event)) {
                    tracing::error!("[INPUT] Global input hook failed: {e:?}");
                    shared.failed.store(true, Ordering::SeqCst);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("[INPUT] Failed to spawn input thread: {e}");
            self.shared.failed.store(true, Ordering::SeqCst);
        }
    }

    /// False once the OS refused the hook
    pub fn is_available(&self) -> bool {
        !self.shared.failed.load(Ordering::SeqCst)
    }

    /// Forward pointer movement as [`AppEvent::PointerMoved`]
    pub fn track_pointer(&self, sink: AsyncSender<AppEvent>) {
        self.start();
        *lock(&self.shared.pointer_sink) = Some(sink);
    }

    pub fn stop_pointer(&self) {
        lock(&self.shared.pointer_sink).take();
    }

    /// Escape sends [`AppEvent::Dismiss`]
    pub fn dismiss_on_escape(&self, sink: AsyncSender<AppEvent>) {
        self.start();
        *lock(&self.shared.dismiss_sink) = Some(sink);
    }
}

impl ModifierMonitor for RdevInput {
    fn install(&self, sink: AsyncSender<ModifierEvent>) -> Result<MonitorGuard> {
        self.start();
        if !self.is_available() {
            bail!("global input hook is not available");
        }

        *lock(&self.shared.modifier_sink) = Some(sink);

        let shared = self.shared.clone();
        Ok(MonitorGuard::new(move || {
            lock(&shared.modifier_sink).take();
        }))
    }
}

impl PointerSource for RdevInput {
    fn position(&self) -> Option<Point> {
        *lock(&self.shared.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_physical_keys() {
        let shared = Shared::default();
        let (tx, rx) = kanal::unbounded_async();
        *lock(&shared.modifier_sink) = Some(tx);

        shared.on_key(Key::ShiftLeft, true);
        shared.on_key(Key::ShiftLeft, true);
        shared.on_key(Key::ShiftRight, true);
        shared.on_key(Key::ShiftLeft, false);
        shared.on_key(Key::KeyA, true);

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok().flatten()).collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].key, Some(SingleKeyBinding::LeftShift));
        // Right shift still holds the flag
        assert_eq!(events[2].flags, ModifierFlags::SHIFT);
    }

    #[test]
    fn test_escape_dismisses() {
        let shared = Shared::default();
        shared.on_escape();

        let (tx, rx) = kanal::unbounded_async();
        *lock(&shared.dismiss_sink) = Some(tx);
        shared.on_escape();

        assert!(matches!(rx.try_recv(), Ok(Some(AppEvent::Dismiss))));
        assert!(matches!(rx.try_recv(), Ok(None)));
    }

    #[test]
    fn test_pointer_position_is_remembered() {
        let shared = Shared::default();
        shared.on_pointer(12.0, 34.0);
        assert_eq!(*lock(&shared.position), Some(Point::new(12.0, 34.0)));
    }
}
