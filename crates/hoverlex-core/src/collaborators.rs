use std::sync::Arc;

use hoverlex_ocr::{DisplaySource, PointerSource, ScreenCapturer, TextRecognizer};
use hoverlex_translator::{DictionaryLookup, EngineRegistry};
use hoverlex_types::{OverlayState, Point, Rect};

/// Platform permission probes. Checked before every capture.
pub trait PermissionStatus: Send + Sync {
    fn screen_capture_allowed(&self) -> bool;

    fn input_monitoring_allowed(&self) -> bool {
        true
    }
}

/// Presentation surface driven by the coordinator. Every call comes from the
/// coordinator task, in publication order.
pub trait OverlayPresenter: Send + Sync {
    /// Show `state` near `anchor`, in global UI space
    fn show(&self, state: &OverlayState, anchor: Point);

    fn hide(&self);

    /// A static result accepts clicks; anything else passes them through
    fn set_interactive(&self, interactive: bool);

    /// User-visible notification, used for every failed lookup
    fn notify(&self, title: &str, message: &str);

    /// Verbose mode only: the captured region and the word boxes found in it
    fn show_debug_region(&self, region: Rect, words: &[Rect]);

    fn hide_debug(&self);
}

/// Starts and stops pointer sampling for continuous lookups
pub trait PointerTracker: Send + Sync {
    fn start_tracking(&self);

    fn stop_tracking(&self);
}

/// Everything a lookup needs from the outside world
#[derive(Clone)]
pub struct LookupContext {
    pub displays: Arc<dyn DisplaySource>,
    pub pointer: Arc<dyn PointerSource>,
    pub tracker: Arc<dyn PointerTracker>,
    pub capturer: Arc<dyn ScreenCapturer>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub registry: Arc<EngineRegistry>,
    pub dictionary: Option<Arc<dyn DictionaryLookup>>,
    pub permissions: Arc<dyn PermissionStatus>,
    pub presenter: Arc<dyn OverlayPresenter>,
}
