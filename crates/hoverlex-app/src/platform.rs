use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use hoverlex_core::{PermissionStatus, PointerTracker};
use hoverlex_ocr::{
    DisplaySource, ModifierEvent, ModifierMonitor, MonitorGuard, PointerSource, ScreenCapturer,
    TextRecognizer,
};
use hoverlex_types::{AppEvent, CaptureRegion, Display, Point, RecognizedLine};
use image::RgbaImage;
use kanal::AsyncSender;

/// OS-facing collaborators. Backends that were not compiled in are replaced
/// by inert stand-ins: no key edges, no displays, capture refused.
#[derive(Clone)]
pub struct Platform {
    pub monitor: Arc<dyn ModifierMonitor>,
    pub pointer: Arc<dyn PointerSource>,
    pub tracker: Arc<dyn PointerTracker>,
    pub displays: Arc<dyn DisplaySource>,
    pub capturer: Arc<dyn ScreenCapturer>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub permissions: Arc<dyn PermissionStatus>,
}

impl Platform {
    /// Everything inert
    pub fn inert() -> Self {
        Self {
            monitor: Arc::new(NoInput),
            pointer: Arc::new(NoInput),
            tracker: Arc::new(NoInput),
            displays: Arc::new(NoScreen),
            capturer: Arc::new(NoScreen),
            recognizer: Arc::new(NoRecognizer),
            permissions: Arc::new(StaticPermissions {
                capture: false,
                input: false,
            }),
        }
    }

    /// Compiled-in backends; pointer samples are sent to `events`
    #[allow(unused_mut, unused_variables)]
    pub fn detect(events: AsyncSender<AppEvent>) -> Self {
        let mut platform = Self::inert();

        #[cfg(feature = "rdev")]
        {
            let input = Arc::new(hoverlex_ocr::RdevInput::new());
            input.dismiss_on_escape(events.clone());
            platform.monitor = input.clone();
            platform.pointer = input.clone();
            platform.tracker = Arc::new(RdevTracker {
                input,
                sink: events,
            });
        }
        #[cfg(not(feature = "rdev"))]
        tracing::warn!("Built without input monitoring, the hotkey will never fire");

        #[cfg(feature = "xcap")]
        {
            platform.displays = Arc::new(hoverlex_ocr::XcapScreen);
            platform.capturer = Arc::new(hoverlex_ocr::XcapScreen);
        }

        #[cfg(all(windows, feature = "windows-ocr"))]
        {
            platform.recognizer = Arc::new(hoverlex_ocr::WindowsOcrRecognizer);
        }
        #[cfg(not(all(windows, feature = "windows-ocr")))]
        tracing::warn!("Built without a text recognizer, lookups will find no words");

        platform.permissions = Arc::new(StaticPermissions {
            capture: cfg!(feature = "xcap"),
            input: cfg!(feature = "rdev"),
        });
        platform
    }
}

#[cfg(feature = "rdev")]
struct RdevTracker {
    input: Arc<hoverlex_ocr::RdevInput>,
    sink: AsyncSender<AppEvent>,
}

#[cfg(feature = "rdev")]
impl PointerTracker for RdevTracker {
    fn start_tracking(&self) {
        self.input.track_pointer(self.sink.clone());
    }

    fn stop_tracking(&self) {
        self.input.stop_pointer();
    }
}

struct NoInput;

impl ModifierMonitor for NoInput {
    fn install(&self, _sink: AsyncSender<ModifierEvent>) -> anyhow::Result<MonitorGuard> {
        bail!("input monitoring is not available in this build")
    }
}

impl PointerSource for NoInput {
    fn position(&self) -> Option<Point> {
        None
    }
}

impl PointerTracker for NoInput {
    fn start_tracking(&self) {}

    fn stop_tracking(&self) {}
}

struct NoScreen;

impl DisplaySource for NoScreen {
    fn displays(&self) -> anyhow::Result<Vec<Display>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl ScreenCapturer for NoScreen {
    async fn capture(&self, _region: &CaptureRegion) -> anyhow::Result<RgbaImage> {
        bail!("screen capture is not available in this build")
    }
}

struct NoRecognizer;

impl TextRecognizer for NoRecognizer {
    fn recognize(&self, _image: &RgbaImage, _language: &str) -> anyhow::Result<Vec<RecognizedLine>> {
        Ok(Vec::new())
    }
}

struct StaticPermissions {
    capture: bool,
    input: bool,
}

impl PermissionStatus for StaticPermissions {
    fn screen_capture_allowed(&self) -> bool {
        self.capture
    }

    fn input_monitoring_allowed(&self) -> bool {
        self.input
    }
}
