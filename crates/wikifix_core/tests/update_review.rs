use std::sync::Once;

use pretty_assertions::assert_eq;
use wikifix_core::{
    update, ApiFailure, ApiFailureKind, ApiRequest, AppState, AuthUser, Difficulty, Effect,
    EmbedSignal, LoadState, Msg, PageView, Route, Session, TaskDetail, Verdict,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn signed_in() -> AppState {
    AppState::with_session(Session {
        user: Some(AuthUser {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            token: "tok".to_string(),
            name: Some("Ada Lovelace".to_string()),
            picture: None,
            needs_onboarding: None,
        }),
        ..Session::default()
    })
}

fn sample_task(id: &str) -> TaskDetail {
    TaskDetail {
        id: id.to_string(),
        claim: "The bridge opened in 1937.".to_string(),
        claim_text_span: Some("opened in 1937".to_string()),
        claim_url: Some("https://en.wikipedia.org/wiki/Golden_Gate_Bridge".to_string()),
        context: "History section".to_string(),
        report: None,
        report_urls: None,
        topic: "Wikipedia Fact Check".to_string(),
        difficulty: Difficulty::Medium,
        status: "open".to_string(),
        xp: Some(25),
        analysis: Some("The cited source gives 1936.".to_string()),
        references: vec!["https://en.wikipedia.org/wiki/Golden_Gate_Bridge".to_string()],
    }
}

fn review_view(state: &AppState) -> wikifix_core::ReviewView {
    match state.view().page {
        PageView::Review(review) => review,
        other => panic!("expected review page, got {other:?}"),
    }
}

fn load_task(state: AppState, id: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::RouteChanged(Route::TaskDetail(id.to_string())));
    update(
        state,
        Msg::TaskLoaded {
            task_id: id.to_string(),
            result: Ok(sample_task(id)),
        },
    )
}

#[test]
fn tasks_entry_requires_login() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RouteChanged(Route::Tasks));

    assert!(effects.is_empty());
    assert_eq!(
        review_view(&state).error.as_deref(),
        Some("Please log in to access tasks")
    );
}

#[test]
fn tasks_entry_fetches_a_random_task() {
    init_logging();
    let (state, effects) = update(signed_in(), Msg::RouteChanged(Route::Tasks));

    assert!(review_view(&state).loading);
    assert!(effects.contains(&Effect::Api(ApiRequest::RandomTask {
        token: "tok".to_string(),
    })));
}

#[test]
fn random_task_navigates_to_its_review_page() {
    init_logging();
    let (state, _) = update(signed_in(), Msg::RouteChanged(Route::Tasks));
    let (state, effects) = update(state, Msg::RandomTaskLoaded(Ok(sample_task("t1"))));

    assert_eq!(state.route(), &Route::TaskDetail("t1".to_string()));
    assert_eq!(
        effects,
        vec![Effect::Api(ApiRequest::Task {
            task_id: "t1".to_string(),
            token: "tok".to_string(),
        })]
    );
}

#[test]
fn loaded_task_points_the_viewer_at_the_claim() {
    init_logging();
    let (state, effects) = load_task(signed_in(), "t1");

    let view = review_view(&state);
    assert_eq!(view.task.as_ref().map(|task| task.id.as_str()), Some("t1"));
    assert_eq!(view.embed.state, LoadState::Loading);
    assert_eq!(
        view.embed.frame_url.as_deref(),
        Some("https://en.wikipedia.org/wiki/Golden_Gate_Bridge#:~:text=opened%20in%201937")
    );
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::StartEmbedAttempt { attempt: 1, .. })));
}

#[test]
fn responses_for_an_abandoned_page_are_dropped() {
    init_logging();
    let (mut state, _) = update(
        signed_in(),
        Msg::RouteChanged(Route::TaskDetail("t2".to_string())),
    );
    assert!(state.consume_dirty());
    let (mut state, effects) = update(
        state,
        Msg::TaskLoaded {
            task_id: "t1".to_string(),
            result: Ok(sample_task("t1")),
        },
    );

    assert!(effects.is_empty());
    assert!(review_view(&state).loading);
    assert!(review_view(&state).task.is_none());
    assert!(!state.consume_dirty());
}

#[test]
fn submit_without_a_verdict_shows_a_prompt() {
    init_logging();
    let (state, _) = load_task(signed_in(), "t1");
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    let view = review_view(&state);
    assert!(!view.can_submit);
    assert_eq!(
        view.error.as_deref(),
        Some("Please select whether you agree or disagree")
    );
}

#[test]
fn clicking_the_active_verdict_clears_it() {
    init_logging();
    let (state, _) = load_task(signed_in(), "t1");
    let (state, _) = update(state, Msg::VerdictToggled(Verdict::Agree));
    assert_eq!(review_view(&state).verdict, Some(Verdict::Agree));

    let (state, _) = update(state, Msg::VerdictToggled(Verdict::Agree));
    assert_eq!(review_view(&state).verdict, None);
}

#[test]
fn submit_sends_the_judgment_and_explanation() {
    init_logging();
    let (state, _) = load_task(signed_in(), "t1");
    let (state, _) = update(state, Msg::VerdictToggled(Verdict::Disagree));
    let (state, _) = update(
        state,
        Msg::ExplanationChanged("The source says 1936.".to_string()),
    );
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert!(review_view(&state).submitting);
    assert!(effects.contains(&Effect::Api(ApiRequest::SubmitTask {
        task_id: "t1".to_string(),
        agrees_with_claim: false,
        user_analysis: "The source says 1936.".to_string(),
        token: "tok".to_string(),
    })));

    // A second click while in flight is a no-op.
    let (_state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
}

#[test]
fn successful_submit_refreshes_count_and_fetches_the_next_task() {
    init_logging();
    let (state, _) = load_task(signed_in(), "t1");
    let (state, _) = update(state, Msg::VerdictToggled(Verdict::Agree));
    let (state, _) = update(state, Msg::SubmitClicked);
    let (_state, effects) = update(
        state,
        Msg::SubmitCompleted {
            task_id: "t1".to_string(),
            result: Ok(()),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::Api(ApiRequest::CompletedCount {
                user_id: "u1".to_string(),
                token: "tok".to_string(),
            }),
            Effect::Api(ApiRequest::RandomTask {
                token: "tok".to_string(),
            }),
        ]
    );
}

#[test]
fn exhausted_pool_is_reported_not_fatal() {
    init_logging();
    let (state, _) = load_task(signed_in(), "t1");
    let (state, _) = update(state, Msg::VerdictToggled(Verdict::Agree));
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = update(
        state,
        Msg::SubmitCompleted {
            task_id: "t1".to_string(),
            result: Ok(()),
        },
    );
    let (state, effects) = update(
        state,
        Msg::RandomTaskLoaded(Err(ApiFailure::new(
            ApiFailureKind::HttpStatus(404),
            "not found",
        ))),
    );

    assert!(effects.is_empty());
    let view = review_view(&state);
    assert!(view.exhausted);
    assert!(!view.submitting);
    assert_eq!(view.error.as_deref(), Some("No more tasks available. Great job!"));
}

#[test]
fn failed_submit_sets_an_inline_error() {
    init_logging();
    let (state, _) = load_task(signed_in(), "t1");
    let (state, _) = update(state, Msg::VerdictToggled(Verdict::Agree));
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = update(
        state,
        Msg::SubmitCompleted {
            task_id: "t1".to_string(),
            result: Err(ApiFailure::new(ApiFailureKind::HttpStatus(500), "boom")),
        },
    );

    let view = review_view(&state);
    assert!(!view.submitting);
    assert_eq!(
        view.error.as_deref(),
        Some("Failed to submit task. Please try again.")
    );
}

#[test]
fn selecting_a_reference_restarts_the_viewer() {
    init_logging();
    let (state, _) = load_task(signed_in(), "t1");
    let (state, effects) = update(
        state,
        Msg::ReferenceSelected {
            url: "/api/wiki/Golden_Gate_Bridge".to_string(),
        },
    );

    assert_eq!(effects[0], Effect::CancelEmbedAttempt { attempt: 1 });
    assert!(matches!(
        effects[1],
        Effect::StartEmbedAttempt { attempt: 2, .. }
    ));
    assert_eq!(review_view(&state).embed.state, LoadState::Loading);
}

#[test]
fn stale_embed_timers_do_not_leak_across_navigations() {
    init_logging();
    let (state, _) = load_task(signed_in(), "t1");
    let (state, _) = update(
        state,
        Msg::ReferenceSelected {
            url: "/api/wiki/Golden_Gate_Bridge".to_string(),
        },
    );

    // The first attempt's deadline fires after the viewer moved on.
    let (state, effects) = update(
        state,
        Msg::EmbedSignalled {
            attempt: 1,
            signal: EmbedSignal::DeadlineElapsed,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(review_view(&state).embed.state, LoadState::Loading);
}

#[test]
fn embed_error_offers_the_external_document() {
    init_logging();
    let (state, _) = load_task(signed_in(), "t1");
    let (state, _) = update(
        state,
        Msg::EmbedSignalled {
            attempt: 1,
            signal: EmbedSignal::FrameFailed,
        },
    );

    let view = review_view(&state);
    assert_eq!(view.embed.state, LoadState::Error);
    assert!(view.embed.show_fallback);
    let fallback = view.embed.open_external_url.expect("fallback url");
    assert!(fallback.starts_with("https://en.wikipedia.org/wiki/"));
}

#[test]
fn completed_count_updates_navbar_and_persists() {
    init_logging();
    let (mut state, effects) = update(signed_in(), Msg::CompletedCountLoaded(Ok(7)));

    assert_eq!(state.view().completed_tasks, 7);
    assert!(state.consume_dirty());
    match &effects[0] {
        Effect::PersistSession(session) => assert_eq!(session.completed_tasks, 7),
        other => panic!("unexpected effect {other:?}"),
    }
}
