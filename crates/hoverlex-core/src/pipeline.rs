use std::sync::Arc;

use hoverlex_config::Config;
use hoverlex_ocr::{
    CaptureRegionPlanner, WordSegmenter, WordSelector, normalized_point, to_screen,
};
use hoverlex_translator::TranslateError;
use hoverlex_types::{LookupPhase, OverlayState, Point, Rect, TranslationResult, Word};
use kanal::AsyncSender;

use crate::collaborators::LookupContext;
use crate::error::LookupError;
use crate::identity::{LookupGuard, LookupIdentity};

/// Progress reported by a pipeline run, tagged with the run's identity
#[derive(Debug, Clone)]
pub(crate) struct PipelineUpdate {
    pub identity: LookupIdentity,
    pub kind: UpdateKind,
}

#[derive(Debug, Clone)]
pub(crate) enum UpdateKind {
    Phase(LookupPhase),
    DebugRegion { region: Rect, words: Vec<Rect> },
    Overlay(OverlayState),
}

struct Reporter<'a> {
    identity: LookupIdentity,
    updates: &'a AsyncSender<PipelineUpdate>,
}

impl Reporter<'_> {
    async fn send(&self, kind: UpdateKind) {
        let update = PipelineUpdate {
            identity: self.identity,
            kind,
        };
        // Coordinator gone means shutdown
        let _ = self.updates.send(update).await;
    }

    async fn phase(&self, phase: LookupPhase) {
        self.send(UpdateKind::Phase(phase)).await;
    }
}

/// One lookup from capture to terminal overlay state. Nothing is sent after
/// the guard reports the lookup superseded.
pub(crate) async fn run(
    ctx: Arc<LookupContext>,
    guard: LookupGuard,
    pointer: Point,
    config: Config,
    updates: AsyncSender<PipelineUpdate>,
) {
    let reporter = Reporter {
        identity: guard.identity(),
        updates: &updates,
    };
    let verbose = config.ui.debug_show_region;

    let terminal = match lookup(&ctx, &guard, pointer, &config, &reporter).await {
        Ok(result) => OverlayState::Result(result.into()),
        Err(e) if e.is_cancelled() => {
            tracing::debug!("[LOOKUP] {} cancelled", guard.identity());
            return;
        }
        Err(LookupError::NoWordFound) if verbose => OverlayState::NoWordFound,
        Err(LookupError::NoWordFound) => OverlayState::Idle,
        Err(e) => {
            tracing::warn!("[LOOKUP] {} failed: {e}", guard.identity());
            OverlayState::Error(e.to_string())
        }
    };

    if guard.is_current() {
        reporter.send(UpdateKind::Overlay(terminal)).await;
    }
}

async fn lookup(
    ctx: &LookupContext,
    guard: &LookupGuard,
    pointer: Point,
    config: &Config,
    reporter: &Reporter<'_>,
) -> Result<TranslationResult, LookupError> {
    let verbose = config.ui.debug_show_region;

    if !ctx.permissions.screen_capture_allowed() {
        return Err(LookupError::PermissionDenied);
    }

    if verbose {
        reporter.send(UpdateKind::Overlay(OverlayState::Loading(None))).await;
    }

    reporter.phase(LookupPhase::Capturing).await;
    let displays = ctx
        .displays
        .displays()
        .map_err(|e| LookupError::CaptureFailed(e.to_string()))?;
    let region = CaptureRegionPlanner::from_config(&config.capture)
        .plan(pointer, &displays)
        .ok_or_else(|| LookupError::CaptureFailed("Pointer is not on any display".to_string()))?;

    if verbose {
        reporter
            .send(UpdateKind::DebugRegion {
                region: region.rect,
                words: Vec::new(),
            })
            .await;
    }

    let image = guard
        .run(ctx.capturer.capture(&region))
        .await?
        .map_err(|e| LookupError::CaptureFailed(e.to_string()))?;
    tracing::debug!(
        "[LOOKUP] {} captured {}x{} px on display {}",
        guard.identity(),
        image.width(),
        image.height(),
        region.display_id
    );

    reporter.phase(LookupPhase::Recognizing).await;
    let recognizer = ctx.recognizer.clone();
    let language = config.recognition_language().to_string();
    let recognized = guard
        .run(tokio::task::spawn_blocking(move || {
            recognizer.recognize(&image, &language)
        }))
        .await?;

    // Recognizer failures degrade to "no text"
    let lines = match recognized {
        Ok(Ok(lines)) => lines,
        Ok(Err(e)) => {
            tracing::warn!("[OCR] Recognition failed: {e:#}");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("[OCR] Recognition task failed: {e}");
            Vec::new()
        }
    };
    guard.check()?;

    reporter.phase(LookupPhase::Selecting).await;
    let words = WordSegmenter::new(config.ocr.box_similarity_tolerance).segment(&lines);
    if verbose {
        let boxes = words
            .iter()
            .map(|w| to_screen(&region, &w.bounding_box))
            .collect();
        reporter
            .send(UpdateKind::DebugRegion {
                region: region.rect,
                words: boxes,
            })
            .await;
    }

    let point = normalized_point(&region, pointer);
    let word = WordSelector::new(config.ocr.hit_tolerance)
        .select(&words, point)
        .cloned()
        .ok_or(LookupError::NoWordFound)?;
    tracing::info!(
        "[LOOKUP] {} selected '{}' out of {} words",
        guard.identity(),
        word.text,
        words.len()
    );

    guard.check()?;
    reporter
        .send(UpdateKind::Overlay(OverlayState::Loading(Some(word.text.clone()))))
        .await;

    reporter.phase(LookupPhase::Translating).await;
    let mut result = if config.lookup.is_same_language() {
        echo(ctx, &word, config)
    } else {
        translate(ctx, guard, &word, config).await?
    };
    guard.check()?;

    if result.audio_url.is_none() {
        result.audio_url = ctx
            .registry
            .audio_url(&word.text, &config.lookup.source_language);
    }

    reporter.phase(LookupPhase::Presenting).await;
    Ok(result)
}

/// Source and target match: the word itself, plus dictionary data
fn echo(ctx: &LookupContext, word: &Word, config: &Config) -> TranslationResult {
    let mut result = TranslationResult::new(&word.text, &word.text);
    if !config.dictionary.enabled {
        return result;
    }

    if let Some(entry) = ctx.dictionary.as_ref().and_then(|d| d.lookup(&word.text)) {
        result.phonetic = entry.phonetic;
        result.definitions = entry.definitions;
    }
    result
}

async fn translate(
    ctx: &LookupContext,
    guard: &LookupGuard,
    word: &Word,
    config: &Config,
) -> Result<TranslationResult, LookupError> {
    let call = ctx.registry.translate(
        &word.text,
        &config.lookup.source_language,
        &config.lookup.target_language,
    );

    match guard
        .run(tokio::time::timeout(config.lookup.translate_timeout(), call))
        .await?
    {
        Ok(result) => Ok(result?),
        Err(_) => Err(TranslateError::Timeout.into()),
    }
}
