use std::sync::Once;

use wikifix_core::{
    update, ApiRequest, AppState, AuthUser, Effect, LoginFailure, Msg, OnboardingStep, Route,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn returning_user() -> AuthUser {
    AuthUser {
        id: "u1".to_string(),
        email: "ada@example.com".to_string(),
        token: "tok".to_string(),
        name: Some("Ada Lovelace".to_string()),
        picture: Some("https://example.com/ada.png".to_string()),
        needs_onboarding: Some(false),
    }
}

#[test]
fn login_click_starts_the_handshake() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::LoginClicked);
    assert!(effects.contains(&Effect::BeginLogin));
}

#[test]
fn login_stores_the_user_and_refreshes_the_navbar() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::LoginCompleted(Ok(returning_user())),
    );

    let view = state.view();
    assert!(view.signed_in);
    assert_eq!(view.user_first_name.as_deref(), Some("Ada"));
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::PersistSession(session) if session.user.is_some()
    )));
    assert!(effects.contains(&Effect::Api(ApiRequest::CompletedCount {
        user_id: "u1".to_string(),
        token: "tok".to_string(),
    })));
    assert!(effects.contains(&Effect::Api(ApiRequest::UserStats {
        user_id: "u1".to_string(),
        token: "tok".to_string(),
    })));
    assert_eq!(state.route(), &Route::Home);
}

#[test]
fn first_login_routes_into_onboarding() {
    init_logging();
    let mut user = returning_user();
    user.needs_onboarding = Some(true);
    let (state, _effects) = update(AppState::new(), Msg::LoginCompleted(Ok(user)));

    assert_eq!(state.route(), &Route::Onboarding(OnboardingStep::Topics));
}

#[test]
fn cancelled_login_is_silent() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::LoginCompleted(Err(LoginFailure::Cancelled)),
    );

    assert!(effects.is_empty());
    assert!(state.view().auth_error.is_none());
}

#[test]
fn failed_login_shows_an_error() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::LoginCompleted(Err(LoginFailure::Provider("denied".to_string()))),
    );
    assert_eq!(
        state.view().auth_error.as_deref(),
        Some("Login failed. Please try again.")
    );

    let (state, _) = update(state, Msg::LoginCompleted(Err(LoginFailure::TimedOut)));
    assert_eq!(
        state.view().auth_error.as_deref(),
        Some("Login failed. Please try again.")
    );
}

#[test]
fn logout_clears_local_state_before_the_server_answers() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::LoginCompleted(Ok(returning_user())));
    let (state, _) = update(state, Msg::CompletedCountLoaded(Ok(12)));

    let (state, effects) = update(state, Msg::LogoutClicked);

    let view = state.view();
    assert!(!view.signed_in);
    assert_eq!(view.completed_tasks, 0);
    assert_eq!(view.rank, None);
    assert_eq!(
        effects[0],
        Effect::Logout {
            token: "tok".to_string(),
        }
    );
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::PersistSession(session) if session.user.is_none()
    )));
}

#[test]
fn logout_without_a_session_skips_the_server_call() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::LogoutClicked);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::Logout { .. })));
}
