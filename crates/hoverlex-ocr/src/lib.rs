mod capture;
#[cfg(all(windows, feature = "windows-ocr"))]
mod com;
mod hotkey;
#[cfg(feature = "rdev")]
mod monitor;
mod ocr;
mod segment;
mod select;

pub use capture::{
    CaptureRegionPlanner, DisplaySource, PointerSource, ScreenCapturer, normalized_point,
    to_screen,
};
#[cfg(feature = "xcap")]
pub use capture::XcapScreen;
pub use hotkey::{ModifierEvent, ModifierFlags, ModifierMonitor, MonitorGuard, TriggerDetector};
#[cfg(feature = "rdev")]
pub use monitor::RdevInput;
#[cfg(all(windows, feature = "windows-ocr"))]
pub use ocr::WindowsOcrRecognizer;
pub use ocr::{RecognizedLine, TextRecognizer, locate_segments};
pub use segment::{WordSegmenter, token_ranges};
pub use select::WordSelector;
