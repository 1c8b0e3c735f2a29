use std::sync::Once;

use wikifix_core::{
    update, ApiFailure, ApiFailureKind, ApiRequest, AppState, AuthUser, Effect, Msg,
    OnboardingStep, PageView, Route, Session, UsernameValidation,
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
            name: None,
            picture: None,
            needs_onboarding: Some(true),
        }),
        ..Session::default()
    })
}

fn onboarding_view(state: &AppState) -> wikifix_core::OnboardingView {
    match state.view().page {
        PageView::Onboarding(view) => view,
        other => panic!("expected onboarding page, got {other:?}"),
    }
}

fn persisted_session(effects: &[Effect]) -> &Session {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::PersistSession(session) => Some(session),
            _ => None,
        })
        .expect("persist effect")
}

#[test]
fn topic_toggle_is_mirrored_to_storage() {
    init_logging();
    let state = signed_in();
    let (state, effects) = update(state, Msg::TopicToggled("science".to_string()));
    assert_eq!(persisted_session(&effects).topics, vec!["science".to_string()]);

    let (_state, effects) = update(state, Msg::TopicToggled("science".to_string()));
    assert!(persisted_session(&effects).topics.is_empty());
}

#[test]
fn custom_topics_are_trimmed_and_deduplicated() {
    init_logging();
    let state = signed_in();
    let (state, _) = update(state, Msg::TopicToggled("science".to_string()));
    let (state, effects) = update(state, Msg::CustomTopicAdded("  volcanology ".to_string()));
    assert_eq!(
        persisted_session(&effects).topics,
        vec!["science".to_string(), "volcanology".to_string()]
    );

    let (state, effects) = update(state, Msg::CustomTopicAdded("volcanology".to_string()));
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::CustomTopicAdded("   ".to_string()));
    assert!(effects.is_empty());

    let (_state, effects) = update(state, Msg::CustomTopicRemoved("volcanology".to_string()));
    assert_eq!(persisted_session(&effects).topics, vec!["science".to_string()]);
}

#[test]
fn stored_topics_split_back_into_cards_and_custom() {
    init_logging();
    let state = AppState::with_session(Session {
        topics: vec!["science".to_string(), "volcanology".to_string()],
        ..Session::default()
    });
    let view = onboarding_view(&{
        let (state, _) = update(state, Msg::RouteChanged(Route::Onboarding(OnboardingStep::Topics)));
        state
    });
    assert_eq!(view.state.selected_topics, vec!["science".to_string()]);
    assert_eq!(view.state.custom_topics, vec!["volcanology".to_string()]);
}

#[test]
fn language_toggle_is_mirrored_to_storage() {
    init_logging();
    let (_state, effects) = update(signed_in(), Msg::LanguageToggled("en".to_string()));
    assert_eq!(persisted_session(&effects).languages, vec!["en".to_string()]);
}

#[test]
fn username_edits_debounce_into_a_validation_request() {
    init_logging();
    let (state, effects) = update(signed_in(), Msg::UsernameChanged("Jimbo".to_string()));

    assert!(onboarding_view(&state).state.validating);
    assert!(effects.contains(&Effect::Api(ApiRequest::ValidateUsername {
        username: "Jimbo".to_string(),
    })));

    // Clearing the field stops the pending validation.
    let (state, effects) = update(state, Msg::UsernameChanged(String::new()));
    assert!(effects.is_empty());
    assert!(!onboarding_view(&state).state.validating);
}

#[test]
fn stale_validation_results_are_ignored() {
    init_logging();
    let (state, _) = update(signed_in(), Msg::UsernameChanged("Jimbo".to_string()));
    let (state, _) = update(state, Msg::UsernameChanged("Jimb".to_string()));

    let (state, effects) = update(
        state,
        Msg::UsernameValidated {
            username: "Jimbo".to_string(),
            result: Ok(UsernameValidation {
                valid: true,
                exists: true,
                message: "✓ Account verified".to_string(),
            }),
        },
    );

    assert!(effects.is_empty());
    let view = onboarding_view(&state);
    assert!(view.state.validating);
    assert!(view.state.validation.is_none());
}

#[test]
fn validation_errors_suggest_skipping() {
    init_logging();
    let (state, _) = update(signed_in(), Msg::UsernameChanged("Jimbo".to_string()));
    let (state, _) = update(
        state,
        Msg::UsernameValidated {
            username: "Jimbo".to_string(),
            result: Err(ApiFailure::new(ApiFailureKind::Network, "offline")),
        },
    );

    let validation = onboarding_view(&state).state.validation.expect("validation");
    assert!(!validation.valid);
    assert_eq!(
        validation.message,
        "Error checking username. You can skip this step if needed."
    );
}

#[test]
fn enabling_skip_clears_the_username() {
    init_logging();
    let (state, _) = update(signed_in(), Msg::UsernameChanged("Jimbo".to_string()));
    let (state, _) = update(state, Msg::SkipWikipediaToggled);

    let view = onboarding_view(&state);
    assert!(view.state.skip_wikipedia);
    assert!(view.state.username.is_empty());
    assert!(view.state.validation.is_none());
}

#[test]
fn finishing_saves_interests_and_clears_scratch() {
    init_logging();
    let state = signed_in();
    let (state, _) = update(state, Msg::RouteChanged(Route::Onboarding(OnboardingStep::Topics)));
    let (state, _) = update(state, Msg::TopicToggled("history".to_string()));
    let (state, _) = update(state, Msg::OnboardingNext);
    let (state, _) = update(state, Msg::LanguageToggled("en".to_string()));
    let (state, _) = update(state, Msg::OnboardingNext);
    let (state, _) = update(state, Msg::UsernameChanged("Jimbo".to_string()));
    let (state, _) = update(
        state,
        Msg::UsernameValidated {
            username: "Jimbo".to_string(),
            result: Ok(UsernameValidation {
                valid: true,
                exists: true,
                message: "✓ Account verified".to_string(),
            }),
        },
    );

    // Next from the username step persists the verified name and lands on
    // Finish, which kicks off the save.
    let (state, effects) = update(state, Msg::OnboardingNext);
    assert_eq!(
        state.route(),
        &Route::Onboarding(OnboardingStep::Finish)
    );
    assert_eq!(
        persisted_session(&effects).wikipedia_username.as_deref(),
        Some("Jimbo")
    );
    assert!(effects.contains(&Effect::Api(ApiRequest::SaveInterests {
        user_id: "u1".to_string(),
        token: "tok".to_string(),
        topics: vec!["history".to_string()],
        languages: vec!["en".to_string()],
    })));
    assert!(onboarding_view(&state).state.saving);

    let (state, effects) = update(state, Msg::InterestsSaved(Ok(())));
    let view = onboarding_view(&state);
    assert!(view.state.saved);
    assert!(!view.state.saving);
    assert!(effects.contains(&Effect::ClearOnboardingScratch));
    assert!(state.session().topics.is_empty());
    assert!(state.session().languages.is_empty());
}

#[test]
fn failed_interest_save_is_reported_inline() {
    init_logging();
    let state = signed_in();
    let (state, _) = update(state, Msg::RouteChanged(Route::Onboarding(OnboardingStep::Finish)));
    let (state, _) = update(
        state,
        Msg::InterestsSaved(Err(ApiFailure::new(ApiFailureKind::HttpStatus(500), "boom"))),
    );

    let view = onboarding_view(&state);
    assert!(!view.state.saving);
    assert_eq!(view.state.error.as_deref(), Some("Failed to save interests"));
}

#[test]
fn finish_requires_a_signed_in_user() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::RouteChanged(Route::Onboarding(OnboardingStep::Finish)),
    );

    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::Api(ApiRequest::SaveInterests { .. }))));
    assert_eq!(
        onboarding_view(&state).state.error.as_deref(),
        Some("User not logged in")
    );
}

#[test]
fn back_steps_through_the_wizard() {
    init_logging();
    let state = signed_in();
    let (state, _) = update(
        state,
        Msg::RouteChanged(Route::Onboarding(OnboardingStep::Username)),
    );
    let (state, _) = update(state, Msg::OnboardingBack);
    assert_eq!(state.route(), &Route::Onboarding(OnboardingStep::Language));

    let (state, _) = update(state, Msg::OnboardingBack);
    assert_eq!(state.route(), &Route::Onboarding(OnboardingStep::Topics));
}
