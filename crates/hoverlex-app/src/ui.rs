use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use hoverlex_core::OverlayPresenter;
use hoverlex_types::{OverlayContent, OverlayState, Point, Rect};

/// Presenter that writes the overlay to the log
#[derive(Debug, Default)]
pub struct LogPresenter {
    visible: AtomicBool,
}

impl OverlayPresenter for LogPresenter {
    fn show(&self, state: &OverlayState, anchor: Point) {
        self.visible.store(true, Ordering::Relaxed);
        let (x, y) = (anchor.x, anchor.y);
        match state {
            OverlayState::Idle => {}
            OverlayState::Loading(None) => tracing::debug!("[OVERLAY] ({x:.0}, {y:.0}) Reading..."),
            OverlayState::Loading(Some(word)) => {
                tracing::info!("[OVERLAY] ({x:.0}, {y:.0}) Looking up '{word}'")
            }
            OverlayState::Result(content) => tracing::info!("[OVERLAY] {}", render(content)),
            OverlayState::Error(message) => tracing::warn!("[OVERLAY] {message}"),
            OverlayState::NoWordFound => tracing::info!("[OVERLAY] No word found"),
        }
    }

    fn hide(&self) {
        if self.visible.swap(false, Ordering::Relaxed) {
            tracing::debug!("[OVERLAY] Hidden");
        }
    }

    fn set_interactive(&self, interactive: bool) {
        tracing::debug!("[OVERLAY] Interactive: {interactive}");
    }

    fn notify(&self, title: &str, message: &str) {
        tracing::warn!("[NOTIFY] {title}: {message}");
    }

    fn show_debug_region(&self, region: Rect, words: &[Rect]) {
        tracing::info!(
            "[DEBUG] Region ({:.0}, {:.0}) {:.0}x{:.0}, {} word boxes",
            region.x,
            region.y,
            region.width,
            region.height,
            words.len()
        );
    }

    fn hide_debug(&self) {}
}

/// One-line-per-definition text form of a result card
pub fn render(content: &OverlayContent) -> String {
    let mut out = content.word.clone();
    if let Some(phonetic) = &content.phonetic {
        let _ = write!(out, " {phonetic}");
    }
    let _ = write!(out, " -> {}", content.translation);

    for definition in &content.definitions {
        out.push_str("\n  ");
        if !definition.part_of_speech.is_empty() {
            let _ = write!(out, "{}: ", definition.part_of_speech);
        }
        out.push_str(&definition.meaning);
        if let Some(translation) = &definition.translation {
            let _ = write!(out, " ({translation})");
        }
    }
    out
}
