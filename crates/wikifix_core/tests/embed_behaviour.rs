use std::sync::Once;
use std::time::Duration;

use wikifix_core::{Effect, EmbedSignal, EmbedWidget, LoadState, EXTERNAL_DEADLINE};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

const EXTERNAL: &str = "https://en.wikipedia.org/wiki/CRISPR";
const LOCAL: &str = "/api/wiki/CRISPR";

#[test]
fn navigation_enters_loading_and_starts_timers() {
    init_logging();
    let mut widget = EmbedWidget::new();
    assert_eq!(widget.state(), LoadState::Initial);

    let effects = widget.navigate(EXTERNAL.to_string(), None);

    assert_eq!(widget.state(), LoadState::Loading);
    assert_eq!(
        effects,
        vec![Effect::StartEmbedAttempt {
            attempt: 1,
            url: EXTERNAL.to_string(),
            probe_interval: Duration::from_millis(500),
            deadline: EXTERNAL_DEADLINE,
        }]
    );
}

#[test]
fn local_documents_get_an_immediate_deadline() {
    init_logging();
    let mut widget = EmbedWidget::new();
    let effects = widget.navigate(LOCAL.to_string(), None);

    match &effects[0] {
        Effect::StartEmbedAttempt { deadline, .. } => assert_eq!(*deadline, Duration::ZERO),
        other => panic!("unexpected effect {other:?}"),
    }
}

#[test]
fn first_signal_wins_and_cancels_the_rest() {
    init_logging();
    let mut widget = EmbedWidget::new();
    widget.navigate(EXTERNAL.to_string(), None);

    let effects = widget.apply_signal(1, EmbedSignal::FrameLoaded);
    assert_eq!(widget.state(), LoadState::Ready);
    assert_eq!(effects, vec![Effect::CancelEmbedAttempt { attempt: 1 }]);

    // Terminal exactly once: later signals for the same attempt are inert.
    let late = widget.apply_signal(1, EmbedSignal::DeadlineElapsed);
    assert!(late.is_empty());
    assert_eq!(widget.state(), LoadState::Ready);
    let late = widget.apply_signal(1, EmbedSignal::FrameFailed);
    assert!(late.is_empty());
    assert_eq!(widget.state(), LoadState::Ready);
}

#[test]
fn native_error_is_terminal_regardless_of_deadline() {
    init_logging();
    let mut widget = EmbedWidget::new();
    widget.navigate(EXTERNAL.to_string(), None);

    widget.apply_signal(1, EmbedSignal::FrameFailed);
    assert_eq!(widget.state(), LoadState::Error);

    // The 8s fallback firing later must not flip the attempt to Ready.
    widget.apply_signal(1, EmbedSignal::DeadlineElapsed);
    assert_eq!(widget.state(), LoadState::Error);
}

#[test]
fn deadline_is_an_optimistic_ready() {
    init_logging();
    let mut widget = EmbedWidget::new();
    widget.navigate(EXTERNAL.to_string(), None);

    widget.apply_signal(1, EmbedSignal::DeadlineElapsed);
    assert_eq!(widget.state(), LoadState::Ready);
}

#[test]
fn url_change_restarts_loading_under_a_new_attempt() {
    init_logging();
    let mut widget = EmbedWidget::new();
    widget.navigate(EXTERNAL.to_string(), None);
    let effects = widget.navigate(LOCAL.to_string(), None);

    assert_eq!(widget.state(), LoadState::Loading);
    assert_eq!(widget.attempt(), 2);
    assert_eq!(effects[0], Effect::CancelEmbedAttempt { attempt: 1 });
    assert!(matches!(
        effects[1],
        Effect::StartEmbedAttempt { attempt: 2, .. }
    ));
}

#[test]
fn stale_attempt_timers_cannot_touch_a_newer_attempt() {
    init_logging();
    let mut widget = EmbedWidget::new();
    widget.navigate(EXTERNAL.to_string(), None);
    widget.navigate(LOCAL.to_string(), None);

    // The first attempt's deadline fires late; the second is still loading.
    let effects = widget.apply_signal(1, EmbedSignal::DeadlineElapsed);
    assert!(effects.is_empty());
    assert_eq!(widget.state(), LoadState::Loading);
    assert_eq!(widget.attempt(), 2);
}

#[test]
fn ready_message_requires_the_document_origin() {
    init_logging();
    let mut widget = EmbedWidget::new();
    widget.navigate(EXTERNAL.to_string(), None);

    let effects = widget.apply_signal(
        1,
        EmbedSignal::ReadyMessage {
            origin: "https://evil.example.com".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(widget.state(), LoadState::Loading);

    widget.apply_signal(
        1,
        EmbedSignal::ReadyMessage {
            origin: "https://en.wikipedia.org".to_string(),
        },
    );
    assert_eq!(widget.state(), LoadState::Ready);
}

#[test]
fn relative_local_documents_ignore_ready_messages() {
    init_logging();
    let mut widget = EmbedWidget::new();
    widget.navigate(LOCAL.to_string(), None);

    // A bare proxy path has no origin of its own to match against.
    let effects = widget.apply_signal(
        1,
        EmbedSignal::ReadyMessage {
            origin: "https://en.wikipedia.org".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(widget.state(), LoadState::Loading);
}

#[test]
fn clear_cancels_the_active_attempt() {
    init_logging();
    let mut widget = EmbedWidget::new();
    widget.navigate(EXTERNAL.to_string(), None);

    let effects = widget.clear();
    assert_eq!(effects, vec![Effect::CancelEmbedAttempt { attempt: 1 }]);
    assert_eq!(widget.state(), LoadState::Initial);
    assert!(widget.source().is_none());
    assert!(widget.frame_url().is_none());
}

#[test]
fn error_still_offers_the_external_document() {
    init_logging();
    let mut widget = EmbedWidget::new();
    widget.navigate(LOCAL.to_string(), Some("a b".to_string()));
    widget.apply_signal(1, EmbedSignal::FrameFailed);

    assert_eq!(widget.state(), LoadState::Error);
    assert_eq!(
        widget.fallback_url().as_deref(),
        Some("https://en.wikipedia.org/wiki/CRISPR#:~:text=a%20b")
    );
}
