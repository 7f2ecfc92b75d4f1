use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Physical modifier key that can serve as the lookup trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SingleKeyBinding {
    LeftShift,
    LeftControl,
    LeftOption,
    LeftCommand,
    RightShift,
    RightControl,
    #[default]
    RightOption,
    RightCommand,
    Function,
}

impl SingleKeyBinding {
    pub const ALL: [SingleKeyBinding; 9] = [
        SingleKeyBinding::LeftShift,
        SingleKeyBinding::LeftControl,
        SingleKeyBinding::LeftOption,
        SingleKeyBinding::LeftCommand,
        SingleKeyBinding::RightShift,
        SingleKeyBinding::RightControl,
        SingleKeyBinding::RightOption,
        SingleKeyBinding::RightCommand,
        SingleKeyBinding::Function,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SingleKeyBinding::LeftShift => "Left Shift",
            SingleKeyBinding::LeftControl => "Left Ctrl",
            SingleKeyBinding::LeftOption => "Left Opt",
            SingleKeyBinding::LeftCommand => "Left Cmd",
            SingleKeyBinding::RightShift => "Right Shift",
            SingleKeyBinding::RightControl => "Right Ctrl",
            SingleKeyBinding::RightOption => "Right Opt",
            SingleKeyBinding::RightCommand => "Right Cmd",
            SingleKeyBinding::Function => "Fn",
        }
    }
}

/// Known translation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    System,
    Google,
    Bing,
    Baidu,
    Youdao,
}

impl EngineKind {
    pub const ALL: [EngineKind; 5] = [
        EngineKind::System,
        EngineKind::Google,
        EngineKind::Bing,
        EngineKind::Baidu,
        EngineKind::Youdao,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            EngineKind::System => "System (On-device)",
            EngineKind::Google => "Google Translate",
            EngineKind::Bing => "Bing Translator",
            EngineKind::Baidu => "Baidu Translate",
            EngineKind::Youdao => "Youdao Dictionary",
        }
    }

    /// Backends without any anonymous endpoint
    pub fn requires_api_key(&self) -> bool {
        matches!(self, EngineKind::Baidu)
    }

    /// Where a user obtains credentials for the backend
    pub fn api_key_url(&self) -> Option<&'static str> {
        match self {
            EngineKind::System => None,
            EngineKind::Google => Some("https://console.cloud.google.com/apis/credentials"),
            EngineKind::Bing => Some(
                "https://portal.azure.com/#create/Microsoft.CognitiveServicesTextTranslation",
            ),
            EngineKind::Baidu => Some("https://fanyi-api.baidu.com/manage/developer"),
            EngineKind::Youdao => Some("https://ai.youdao.com/console/"),
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "system" | "apple" => Some(EngineKind::System),
            "google" => Some(EngineKind::Google),
            "bing" => Some(EngineKind::Bing),
            "baidu" => Some(EngineKind::Baidu),
            "youdao" => Some(EngineKind::Youdao),
            _ => None,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Vertical origin of a coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalOrigin {
    #[default]
    TopLeft,
    BottomLeft,
}

/// One attached display, in global UI coordinates (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub id: u32,
    pub frame: Rect,
    pub scale_factor: f64,
}

/// Area grabbed for one lookup attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRegion {
    /// Global UI-space rectangle, used for overlay placement and debug drawing
    pub rect: Rect,
    pub display_id: u32,
    pub scale_factor: f64,
    /// Display-local device-pixel rectangle in the capture collaborator's convention
    pub pixel_rect: Rect,
}

/// Sub-span of a recognized line for which the recognizer reported its own box
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    /// Character offsets into the line text
    pub range: Range<usize>,
    pub bounding_box: Rect,
}

/// One text line as reported by the recognizer.
///
/// Boxes are normalized to the captured image: `[0, 1]` on both axes, origin
/// top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedLine {
    pub text: String,
    pub bounding_box: Rect,
    pub segments: Vec<LineSegment>,
}

impl RecognizedLine {
    pub fn new(text: impl Into<String>, bounding_box: Rect) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            segments: Vec::new(),
        }
    }

    pub fn with_segments(mut self, segments: Vec<LineSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// Box of an arbitrary character range, as far as the recognizer knows it.
    ///
    /// A range that exactly covers one or more reported segments yields their
    /// union. A range inside a single segment is sliced out of that segment.
    /// Anything else is unknown.
    pub fn box_for_range(&self, range: &Range<usize>) -> Option<Rect> {
        if range.is_empty() {
            return None;
        }

        let touching: Vec<&LineSegment> = self
            .segments
            .iter()
            .filter(|s| s.range.start < range.end && range.start < s.range.end)
            .collect();

        let first = touching.first()?;
        let last = touching.last()?;

        if first.range.start == range.start && last.range.end == range.end {
            return touching
                .iter()
                .map(|s| s.bounding_box)
                .reduce(|acc, b| acc.union(&b));
        }

        if touching.len() == 1 && first.range.start <= range.start && range.end <= first.range.end
        {
            let len = (first.range.end - first.range.start) as f64;
            let start = (range.start - first.range.start) as f64 / len;
            let end = (range.end - first.range.start) as f64 / len;
            return Some(first.bounding_box.horizontal_slice(start, end));
        }

        None
    }
}

/// Lookup unit: a letter run cut out of a recognized line
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    /// Normalized to the captured image, origin top-left
    pub bounding_box: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub part_of_speech: String,
    pub meaning: String,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl Definition {
    pub fn new(part_of_speech: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            part_of_speech: part_of_speech.into(),
            meaning: meaning.into(),
            translation: None,
            examples: Vec::new(),
        }
    }
}

/// Engine-agnostic payload of a successful lookup
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub word: String,
    pub phonetic: Option<String>,
    pub translation: String,
    pub definitions: Vec<Definition>,
    pub audio_url: Option<String>,
}

impl TranslationResult {
    pub fn new(word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            phonetic: None,
            translation: translation.into(),
            definitions: Vec::new(),
            audio_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayContent {
    pub word: String,
    pub phonetic: Option<String>,
    pub translation: String,
    pub definitions: Vec<Definition>,
    pub audio_url: Option<String>,
}

impl From<TranslationResult> for OverlayContent {
    fn from(result: TranslationResult) -> Self {
        Self {
            word: result.word,
            phonetic: result.phonetic,
            translation: result.translation,
            definitions: result.definitions,
            audio_url: result.audio_url,
        }
    }
}

/// What the overlay shows. Exactly one value is live at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OverlayState {
    #[default]
    Idle,
    Loading(Option<String>),
    Result(OverlayContent),
    Error(String),
    NoWordFound,
}

impl OverlayState {
    /// Idle counts as terminal: a lookup that found nothing in quiet mode ends there
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OverlayState::Loading(_))
    }
}

/// Stage of the lookup pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPhase {
    #[default]
    Idle,
    Capturing,
    Recognizing,
    Selecting,
    Translating,
    Presenting,
}

/// Messages delivered to the lookup coordinator
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Bound key became held
    Trigger,
    /// Bound key confirmed released
    Release,
    /// Raw pointer sample in global UI space
    PointerMoved(Point),
    /// Close a static result without releasing the key
    Dismiss,
    /// Languages or other lookup settings changed
    ConfigReloaded,
    /// Monitors were attached, removed, or rearranged
    DisplaysChanged,
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with_segments() -> RecognizedLine {
        // "hello worldWide"
        RecognizedLine::new("hello worldWide", Rect::new(0.0, 0.0, 1.0, 0.1)).with_segments(vec![
            LineSegment {
                range: 0..5,
                bounding_box: Rect::new(0.0, 0.0, 0.3, 0.1),
            },
            LineSegment {
                range: 6..15,
                bounding_box: Rect::new(0.4, 0.0, 0.6, 0.1),
            },
        ])
    }

    #[test]
    fn test_box_for_exact_segment() {
        let line = line_with_segments();
        assert_eq!(line.box_for_range(&(0..5)), Some(Rect::new(0.0, 0.0, 0.3, 0.1)));
    }

    #[test]
    fn test_box_for_range_inside_segment_is_sliced() {
        let line = line_with_segments();
        let b = line.box_for_range(&(11..15)).unwrap();
        assert!((b.x - (0.4 + 0.6 * 5.0 / 9.0)).abs() < 1e-9);
        assert!((b.width - 0.6 * 4.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_box_for_range_spanning_partial_segments_is_unknown() {
        let line = line_with_segments();
        assert_eq!(line.box_for_range(&(3..8)), None);
        assert_eq!(RecognizedLine::new("abc", Rect::default()).box_for_range(&(0..3)), None);
    }

    #[test]
    fn test_engine_kind_parse() {
        assert_eq!(EngineKind::parse(" Google "), Some(EngineKind::Google));
        assert_eq!(EngineKind::parse("apple"), Some(EngineKind::System));
        assert_eq!(EngineKind::parse("deepl"), None);
    }
}
