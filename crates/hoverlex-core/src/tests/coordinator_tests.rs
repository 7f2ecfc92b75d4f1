use std::sync::atomic::Ordering;
use std::time::Duration;

use hoverlex_translator::TranslateError;
use hoverlex_types::{AppEvent, LookupPhase, OverlayState};

use super::fakes::*;

#[tokio::test]
async fn test_lookup_shows_loading_then_result() {
    let harness = HarnessBuilder::new(&["apple"]).start();
    harness.send(AppEvent::Trigger).await;

    assert_eq!(
        harness.next().await,
        Shown::Show(OverlayState::Loading(Some("apple".into())))
    );
    let Shown::Show(OverlayState::Result(content)) = harness.next().await else {
        panic!("expected a result");
    };
    assert_eq!(content.word, "apple");
    assert_eq!(content.translation, "apple-de");
    assert_eq!(content.audio_url.as_deref(), Some("audio://apple"));
    // Continuous results let clicks through
    assert_eq!(harness.next().await, Shown::Interactive(false));

    let counts = harness.state.stats.counts();
    assert_eq!(counts.dispatched, 1);
    assert_eq!(counts.completed, 1);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_superseded_lookup_never_publishes() {
    let harness = HarnessBuilder::new(&["alpha", "beta"])
        .engine(ScriptedEngine::new().gated())
        .start();

    harness.send(AppEvent::Trigger).await;
    assert_eq!(harness.engine.wait_entered().await, "alpha");

    harness.send(AppEvent::PointerMoved(point(600.0, 500.0))).await;
    assert_eq!(harness.engine.wait_entered().await, "beta");

    harness.engine.release(2);
    let seen = harness.until(is_result).await;
    assert_eq!(result_word(seen.last().unwrap()), Some("beta"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    let late = harness.drain();
    assert!(
        seen.iter().chain(late.iter()).all(|call| result_word(call) != Some("alpha")),
        "stale result leaked: {seen:?} {late:?}"
    );
    assert_eq!(harness.state.stats.counts().superseded, 1);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_movement_inside_debounce_window_coalesces() {
    let harness = HarnessBuilder::new(&["alpha", "beta", "gamma"]).start();
    harness.send(AppEvent::Trigger).await;
    harness.until(is_result).await;
    assert_eq!(harness.captures(), 1);

    harness.send(AppEvent::PointerMoved(point(503.0, 500.0))).await;
    harness.send(AppEvent::PointerMoved(point(508.0, 500.0))).await;

    let seen = harness.until(is_result).await;
    assert_eq!(result_word(seen.last().unwrap()), Some("beta"));
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(harness.captures(), 2);

    // Below the threshold on both axes
    harness.send(AppEvent::PointerMoved(point(510.0, 502.0))).await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(harness.captures(), 2);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_rate_limit_fails_once_and_notifies() {
    let harness = HarnessBuilder::new(&["apple"])
        .engine(ScriptedEngine::new().failing(TranslateError::RateLimitExceeded))
        .start();
    harness.send(AppEvent::Trigger).await;

    let message = TranslateError::RateLimitExceeded.to_string();
    let seen = harness.until(|call| matches!(call, Shown::Notify(_))).await;
    assert_eq!(
        &seen[seen.len() - 2..],
        &[
            Shown::Show(OverlayState::Error(message.clone())),
            Shown::Notify(message)
        ]
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.engine.calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.state.stats.counts().failed, 1);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_release_cancels_and_hides() {
    let harness = HarnessBuilder::new(&["apple"])
        .engine(ScriptedEngine::new().gated())
        .start();
    harness.send(AppEvent::Trigger).await;
    harness.engine.wait_entered().await;
    assert_eq!(harness.tracker.started.load(Ordering::SeqCst), 1);

    harness.send(AppEvent::Release).await;
    let seen = harness.until(|call| *call == Shown::HideDebug).await;
    assert_eq!(&seen[seen.len() - 2..], &[Shown::Hide, Shown::HideDebug]);
    assert_eq!(harness.tracker.stopped.load(Ordering::SeqCst), 1);

    harness.engine.release(1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(harness.drain().is_empty());
    assert_eq!(harness.state.stats.counts().superseded, 1);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_movement_after_release_is_ignored() {
    let harness = HarnessBuilder::new(&["alpha", "beta"]).start();
    harness.send(AppEvent::Trigger).await;
    harness.until(is_result).await;

    harness.send(AppEvent::Release).await;
    harness.send(AppEvent::PointerMoved(point(700.0, 700.0))).await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(harness.captures(), 1);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_static_result_is_interactive_and_dismissable() {
    let harness = HarnessBuilder::new(&["apple"])
        .config(|c| c.lookup.continuous = false)
        .start();
    harness.send(AppEvent::Trigger).await;
    harness.until(is_result).await;
    assert_eq!(harness.next().await, Shown::Interactive(true));
    assert_eq!(harness.tracker.started.load(Ordering::SeqCst), 0);

    harness.send(AppEvent::Dismiss).await;
    assert_eq!(harness.next().await, Shown::Interactive(false));
    assert_eq!(harness.next().await, Shown::Hide);
    assert_eq!(harness.next().await, Shown::HideDebug);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_dismiss_is_ignored_in_continuous_mode() {
    let harness = HarnessBuilder::new(&["apple"]).start();
    harness.send(AppEvent::Trigger).await;
    harness.until(|call| *call == Shown::Interactive(false)).await;

    harness.send(AppEvent::Dismiss).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(harness.drain().is_empty());
    harness.shutdown().await;
}

#[tokio::test]
async fn test_same_language_skips_the_engine() {
    let harness = HarnessBuilder::new(&["apple"])
        .config(|c| c.lookup.target_language = "en-US".into())
        .dictionary(dictionary(r#"[{ "word": "apple", "phonetic": "/ˈæpl/" }]"#))
        .start();
    harness.send(AppEvent::Trigger).await;

    let seen = harness.until(is_result).await;
    let Some(Shown::Show(OverlayState::Result(content))) = seen.last() else {
        unreachable!();
    };
    assert_eq!(content.translation, "apple");
    assert_eq!(content.phonetic.as_deref(), Some("/ˈæpl/"));
    assert_eq!(content.audio_url.as_deref(), Some("audio://apple"));
    assert_eq!(harness.engine.calls.load(Ordering::SeqCst), 0);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_no_word_is_quiet_by_default() {
    let harness = HarnessBuilder::new(&[""]).start();
    harness.send(AppEvent::Trigger).await;

    assert_eq!(harness.next().await, Shown::Hide);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.drain().is_empty());
    assert_eq!(harness.state.stats.counts().empty, 1);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_no_word_is_reported_in_debug_mode() {
    let harness = HarnessBuilder::new(&[""])
        .config(|c| c.ui.debug_show_region = true)
        .start();
    harness.send(AppEvent::Trigger).await;

    let seen = harness
        .until(|call| *call == Shown::Show(OverlayState::NoWordFound))
        .await;
    assert_eq!(seen[0], Shown::Show(OverlayState::Loading(None)));
    assert!(seen.contains(&Shown::DebugRegion(0)));
    harness.shutdown().await;
}

#[tokio::test]
async fn test_debug_mode_draws_word_boxes() {
    let harness = HarnessBuilder::new(&["apple"])
        .config(|c| c.ui.debug_show_region = true)
        .start();
    harness.send(AppEvent::Trigger).await;

    let seen = harness.until(is_result).await;
    assert!(seen.contains(&Shown::DebugRegion(1)));
    harness.shutdown().await;
}

#[tokio::test]
async fn test_missing_permission_fails_before_capture() {
    let harness = HarnessBuilder::new(&["apple"]).without_permission().start();
    harness.send(AppEvent::Trigger).await;

    let seen = harness.until(|call| matches!(call, Shown::Notify(_))).await;
    assert!(matches!(seen[0], Shown::Show(OverlayState::Error(_))));
    assert_eq!(harness.captures(), 0);
    harness.shutdown().await;
}

#[tokio::test]
async fn test_slow_translation_times_out() {
    let harness = HarnessBuilder::new(&["apple"])
        .config(|c| c.lookup.translate_timeout_ms = 50)
        .engine(ScriptedEngine::new().slow(Duration::from_millis(500)))
        .start();
    harness.send(AppEvent::Trigger).await;

    let seen = harness.until(|call| matches!(call, Shown::Notify(_))).await;
    assert_eq!(
        seen.last(),
        Some(&Shown::Notify(TranslateError::Timeout.to_string()))
    );
    harness.shutdown().await;
}

#[tokio::test]
async fn test_display_change_while_held_resets() {
    let harness = HarnessBuilder::new(&["apple"])
        .engine(ScriptedEngine::new().gated())
        .start();
    harness.send(AppEvent::DisplaysChanged).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.drain().is_empty());

    harness.send(AppEvent::Trigger).await;
    harness.engine.wait_entered().await;
    harness.send(AppEvent::DisplaysChanged).await;
    let seen = harness.until(|call| *call == Shown::HideDebug).await;
    assert!(seen.contains(&Shown::Hide));

    harness.engine.release(1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(harness.drain().iter().all(|call| !is_result(call)));
    harness.shutdown().await;
}

#[tokio::test]
async fn test_config_reload_cancels_and_stops_tracking() {
    let harness = HarnessBuilder::new(&["apple"])
        .engine(ScriptedEngine::new().gated())
        .start();
    harness.send(AppEvent::Trigger).await;
    harness.engine.wait_entered().await;

    harness.state.config.write().await.lookup.continuous = false;
    harness.send(AppEvent::ConfigReloaded).await;
    harness.until(|call| *call == Shown::HideDebug).await;
    assert_eq!(harness.tracker.stopped.load(Ordering::SeqCst), 1);

    harness.engine.release(1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(harness.drain().iter().all(|call| !is_result(call)));
    harness.shutdown().await;
}

#[tokio::test]
async fn test_phases_follow_one_lookup() {
    let harness = HarnessBuilder::new(&["apple"]).start();
    harness.send(AppEvent::Trigger).await;
    harness.until(is_result).await;

    harness.send(AppEvent::Release).await;
    harness.until(|call| *call == Shown::HideDebug).await;

    assert_eq!(
        harness.phases(),
        vec![
            LookupPhase::Capturing,
            LookupPhase::Recognizing,
            LookupPhase::Selecting,
            LookupPhase::Translating,
            LookupPhase::Presenting,
            LookupPhase::Idle,
        ]
    );
    harness.shutdown().await;
}

#[tokio::test]
async fn test_superseded_lookup_phases_are_dropped() {
    let harness = HarnessBuilder::new(&["alpha", "beta"])
        .engine(ScriptedEngine::new().gated())
        .start();

    harness.send(AppEvent::Trigger).await;
    assert_eq!(harness.engine.wait_entered().await, "alpha");
    harness.send(AppEvent::PointerMoved(point(600.0, 500.0))).await;
    assert_eq!(harness.engine.wait_entered().await, "beta");

    harness.engine.release(2);
    harness.until(is_result).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    use LookupPhase::*;
    assert_eq!(
        harness.phases(),
        vec![
            Capturing, Recognizing, Selecting, Translating,
            Capturing, Recognizing, Selecting, Translating, Presenting,
        ]
    );
    harness.shutdown().await;
}

#[tokio::test]
async fn test_missing_input_monitoring_keeps_pointer_still() {
    let harness = HarnessBuilder::new(&["apple"])
        .without_input_monitoring()
        .start();
    harness.send(AppEvent::Trigger).await;

    assert!(matches!(harness.next().await, Shown::Notify(_)));
    harness.until(is_result).await;
    assert_eq!(harness.tracker.started.load(Ordering::SeqCst), 0);

    // Movement is not followed without tracking
    harness.send(AppEvent::PointerMoved(point(700.0, 500.0))).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.captures(), 1);

    // Reported once per run
    harness.send(AppEvent::Release).await;
    harness.send(AppEvent::Trigger).await;
    let seen = harness.until(is_result).await;
    assert!(seen.iter().all(|call| !matches!(call, Shown::Notify(_))), "{seen:?}");
    harness.shutdown().await;
}
