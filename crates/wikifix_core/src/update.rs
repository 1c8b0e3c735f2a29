use crate::effect::{AnalyticsEvent, ApiRequest, Effect};
use crate::msg::{LoginFailure, Msg};
use crate::session::AuthUser;
use crate::state::{AppState, OnboardingStep, ReviewState, Route};
use crate::types::UsernameValidation;

const LOGIN_PROMPT: &str = "Please log in to access tasks";
const SELECT_PROMPT: &str = "Please select whether you agree or disagree";
const SUBMIT_FAILED: &str = "Failed to submit task. Please try again.";
const TASK_LOAD_FAILED: &str = "Failed to load task details. Please try again later.";
const RANDOM_TASK_FAILED: &str = "Failed to load task. Please try again later.";
const TASKS_EXHAUSTED: &str = "No more tasks available. Great job!";
const STATS_FAILED: &str = "Failed to load platform stats.";
const LEADERBOARD_FAILED: &str = "Failed to load leaderboard.";
const PROFILE_FAILED: &str = "Failed to load profile data.";
const TASK_LIST_FAILED: &str = "Failed to load tasks.";
const LOGIN_FAILED: &str = "Login failed. Please try again.";
const USERNAME_CHECK_FAILED: &str = "Error checking username. You can skip this step if needed.";
const INTERESTS_FAILED: &str = "Failed to save interests";
const NOT_LOGGED_IN: &str = "User not logged in";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RouteChanged(route) => enter_route(&mut state, route),
        Msg::LoginClicked => {
            state.navbar.auth_error = None;
            state.mark_dirty();
            vec![
                Effect::BeginLogin,
                Effect::Track(AnalyticsEvent::ButtonClick {
                    name: "login".into(),
                }),
            ]
        }
        Msg::LoginCompleted(Ok(user)) => apply_login(&mut state, user),
        Msg::LoginCompleted(Err(failure)) => {
            state.mark_dirty();
            match failure {
                // Closing the window is a choice, not a failure to surface.
                LoginFailure::Cancelled => {}
                LoginFailure::TimedOut | LoginFailure::Provider(_) => {
                    state.navbar.auth_error = Some(LOGIN_FAILED.to_string());
                }
            }
            Vec::new()
        }
        Msg::LogoutClicked => {
            let token = state.session.token().map(ToOwned::to_owned);
            state.session.user = None;
            state.navbar.completed_tasks = 0;
            state.navbar.rank = None;
            state.session.completed_tasks = 0;
            state.mark_dirty();
            let mut effects = Vec::new();
            if let Some(token) = token {
                // Local state is already cleared; the server call is best-effort.
                effects.push(Effect::Logout { token });
            }
            effects.push(Effect::PersistSession(state.session.clone()));
            effects
        }
        Msg::PlatformStatsLoaded(result) => {
            state.home.loading = false;
            match result {
                Ok(stats) => state.home.stats = Some(stats),
                Err(_) => state.home.error = Some(STATS_FAILED.to_string()),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::CompletedCountLoaded(result) => {
            match result {
                Ok(count) => {
                    state.navbar.completed_tasks = count;
                    state.session.completed_tasks = count;
                    state.mark_dirty();
                    vec![Effect::PersistSession(state.session.clone())]
                }
                // The progress bar keeps its last value on a failed refresh.
                Err(_) => Vec::new(),
            }
        }
        Msg::UserStatsLoaded(result) => {
            match result {
                Ok(stats) => {
                    state.navbar.rank = Some(stats.rank);
                    state.profile.stats = Some(stats);
                }
                Err(_) => state.profile.error = Some(PROFILE_FAILED.to_string()),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::RandomTaskLoaded(result) => match result {
            Ok(task) => {
                state.review = ReviewState {
                    task_id: Some(task.id.clone()),
                    loading: true,
                    ..ReviewState::default()
                };
                state.route = Route::TaskDetail(task.id.clone());
                state.mark_dirty();
                match state.session.token() {
                    Some(token) => vec![Effect::Api(ApiRequest::Task {
                        task_id: task.id,
                        token: token.to_string(),
                    })],
                    None => Vec::new(),
                }
            }
            Err(failure) => {
                state.review.loading = false;
                state.review.submitting = false;
                if failure.is_status(404) {
                    state.review.exhausted = true;
                    state.review.error = Some(TASKS_EXHAUSTED.to_string());
                } else {
                    state.review.error = Some(RANDOM_TASK_FAILED.to_string());
                }
                state.mark_dirty();
                Vec::new()
            }
        },
        Msg::TaskLoaded { task_id, result } => {
            if state.review.task_id.as_deref() != Some(task_id.as_str()) {
                // Response for a page the user already left.
                return (state, Vec::new());
            }
            state.review.loading = false;
            state.mark_dirty();
            match result {
                Ok(task) => {
                    state.review.error = None;
                    state.review.verdict = None;
                    state.review.explanation.clear();
                    state.review.submitting = false;
                    let mut effects = vec![Effect::Track(AnalyticsEvent::TaskLoad {
                        task_id: task.id.clone(),
                    })];
                    if let Some(url) = task.claim_url.clone() {
                        effects.extend(
                            state
                                .embed
                                .navigate(url, task.claim_text_span.clone()),
                        );
                    }
                    state.review.task = Some(task);
                    effects
                }
                Err(_) => {
                    state.review.error = Some(TASK_LOAD_FAILED.to_string());
                    Vec::new()
                }
            }
        }
        Msg::TaskListLoaded(result) => {
            state.task_list.loading = false;
            match result {
                Ok(rows) => state.task_list.rows = rows,
                Err(_) => state.task_list.error = Some(TASK_LIST_FAILED.to_string()),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::VerdictToggled(verdict) => {
            state.review.verdict = if state.review.verdict == Some(verdict) {
                None
            } else {
                Some(verdict)
            };
            state.review.error = None;
            state.mark_dirty();
            vec![Effect::Track(AnalyticsEvent::OptionSelect {
                option_type: "verdict".into(),
                value: match state.review.verdict {
                    Some(v) => format!("{v:?}").to_lowercase(),
                    None => "cleared".into(),
                },
            })]
        }
        Msg::ExplanationChanged(text) => {
            let length = text.len();
            state.review.explanation = text;
            state.mark_dirty();
            vec![Effect::Track(AnalyticsEvent::TextInput {
                name: "explanation".into(),
                length,
            })]
        }
        Msg::SubmitClicked => submit_clicked(&mut state),
        Msg::SubmitCompleted { task_id, result } => {
            if state.review.task_id.as_deref() != Some(task_id.as_str()) {
                return (state, Vec::new());
            }
            state.mark_dirty();
            match result {
                Ok(()) => {
                    state.review.error = None;
                    // Submitting stays set until the next task arrives, so the
                    // control cannot double-fire during the transition.
                    match (state.session.user_id(), state.session.token()) {
                        (Some(user_id), Some(token)) => vec![
                            Effect::Api(ApiRequest::CompletedCount {
                                user_id: user_id.to_string(),
                                token: token.to_string(),
                            }),
                            Effect::Api(ApiRequest::RandomTask {
                                token: token.to_string(),
                            }),
                        ],
                        _ => Vec::new(),
                    }
                }
                Err(_) => {
                    state.review.submitting = false;
                    state.review.error = Some(SUBMIT_FAILED.to_string());
                    Vec::new()
                }
            }
        }
        Msg::ReferenceSelected { url } => {
            let span = state
                .review
                .task
                .as_ref()
                .and_then(|task| task.claim_text_span.clone());
            state.mark_dirty();
            state.embed.navigate(url, span)
        }
        Msg::EmbedSignalled { attempt, signal } => {
            let effects = state.embed.apply_signal(attempt, signal);
            if !effects.is_empty() {
                state.mark_dirty();
            }
            effects
        }
        Msg::OpenArticleClicked => match state.embed.fallback_url() {
            Some(url) => vec![
                Effect::OpenExternal { url },
                Effect::Track(AnalyticsEvent::ButtonClick {
                    name: "open_article".into(),
                }),
            ],
            None => Vec::new(),
        },
        Msg::TopicToggled(key) => {
            let topics = &mut state.onboarding.selected_topics;
            match topics.iter().position(|topic| *topic == key) {
                Some(idx) => {
                    topics.remove(idx);
                }
                None => topics.push(key.clone()),
            }
            persist_scratch(&mut state, AnalyticsEvent::OptionSelect {
                option_type: "topic".into(),
                value: key,
            })
        }
        Msg::CustomTopicAdded(topic) => {
            let topic = topic.trim().to_string();
            if topic.is_empty() || state.onboarding.custom_topics.contains(&topic) {
                return (state, Vec::new());
            }
            state.onboarding.custom_topics.push(topic.clone());
            persist_scratch(&mut state, AnalyticsEvent::OptionSelect {
                option_type: "custom_topic".into(),
                value: topic,
            })
        }
        Msg::CustomTopicRemoved(topic) => {
            state.onboarding.custom_topics.retain(|t| *t != topic);
            persist_scratch(&mut state, AnalyticsEvent::OptionSelect {
                option_type: "custom_topic_removed".into(),
                value: topic,
            })
        }
        Msg::LanguageToggled(code) => {
            let languages = &mut state.onboarding.languages;
            match languages.iter().position(|lang| *lang == code) {
                Some(idx) => {
                    languages.remove(idx);
                }
                None => languages.push(code.clone()),
            }
            persist_scratch(&mut state, AnalyticsEvent::OptionSelect {
                option_type: "language".into(),
                value: code,
            })
        }
        Msg::UsernameChanged(value) => {
            let length = value.len();
            state.onboarding.username = value.clone();
            state.onboarding.validation = None;
            state.mark_dirty();
            if value.trim().is_empty() {
                state.onboarding.validating = false;
                Vec::new()
            } else {
                state.onboarding.validating = true;
                vec![
                    Effect::Api(ApiRequest::ValidateUsername { username: value }),
                    Effect::Track(AnalyticsEvent::TextInput {
                        name: "wikipedia_username_input".into(),
                        length,
                    }),
                ]
            }
        }
        Msg::UsernameValidated { username, result } => {
            if username != state.onboarding.username {
                // A keystroke superseded this check.
                return (state, Vec::new());
            }
            state.onboarding.validating = false;
            let validation = match result {
                Ok(validation) => validation,
                Err(_) => UsernameValidation {
                    valid: false,
                    exists: false,
                    message: USERNAME_CHECK_FAILED.to_string(),
                },
            };
            let details = vec![
                ("username_length".to_string(), username.len().to_string()),
                (
                    "validation_result".to_string(),
                    if validation.valid { "valid" } else { "invalid" }.to_string(),
                ),
            ];
            state.onboarding.validation = Some(validation);
            state.mark_dirty();
            vec![Effect::Track(AnalyticsEvent::UserAction {
                action: "username_validation".into(),
                details,
            })]
        }
        Msg::SkipWikipediaToggled => {
            state.onboarding.skip_wikipedia = !state.onboarding.skip_wikipedia;
            if state.onboarding.skip_wikipedia {
                state.onboarding.username.clear();
                state.onboarding.validation = None;
                state.onboarding.validating = false;
            }
            state.mark_dirty();
            vec![Effect::Track(AnalyticsEvent::UserAction {
                action: "skip_wikipedia_username".into(),
                details: vec![(
                    "enabled".to_string(),
                    state.onboarding.skip_wikipedia.to_string(),
                )],
            })]
        }
        Msg::OnboardingBack => match state.route.clone() {
            Route::Onboarding(step) => {
                let previous = match step {
                    OnboardingStep::Topics => OnboardingStep::Topics,
                    OnboardingStep::Language => OnboardingStep::Topics,
                    OnboardingStep::Username => OnboardingStep::Language,
                    OnboardingStep::Finish => OnboardingStep::Username,
                };
                enter_route(&mut state, Route::Onboarding(previous))
            }
            _ => Vec::new(),
        },
        Msg::OnboardingNext => onboarding_next(&mut state),
        Msg::InterestsSaved(result) => {
            state.onboarding.saving = false;
            state.mark_dirty();
            match result {
                Ok(()) => {
                    state.onboarding.saved = true;
                    state.session.topics.clear();
                    state.session.languages.clear();
                    vec![
                        Effect::ClearOnboardingScratch,
                        Effect::Track(AnalyticsEvent::UserAction {
                            action: "onboarding_completed".into(),
                            details: Vec::new(),
                        }),
                    ]
                }
                Err(_) => {
                    state.onboarding.error = Some(INTERESTS_FAILED.to_string());
                    Vec::new()
                }
            }
        }
        Msg::LeaderboardLoaded(result) => {
            state.leaderboard.loading = false;
            match result {
                Ok(board) => state.leaderboard.board = Some(board),
                Err(_) => state.leaderboard.error = Some(LEADERBOARD_FAILED.to_string()),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::CompletedListLoaded(result) => {
            match result {
                Ok(rows) => state.profile.completed = Some(rows),
                Err(_) => state.profile.error = Some(PROFILE_FAILED.to_string()),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::ReferralLoaded(result) => {
            if let Ok(referral) = result {
                state.profile.referral = Some(referral);
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::InterestsLoaded(result) => {
            if let Ok(interests) = result {
                state.profile.interests = Some(interests);
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn enter_route(state: &mut AppState, route: Route) -> Vec<Effect> {
    state.route = route.clone();
    state.mark_dirty();
    match route {
        Route::Home => {
            state.home.loading = true;
            state.home.error = None;
            vec![
                Effect::Api(ApiRequest::PlatformStats),
                Effect::Track(AnalyticsEvent::PageView {
                    page: "home".into(),
                }),
            ]
        }
        Route::Tasks => match state.session.token() {
            Some(token) => {
                state.review = ReviewState {
                    loading: true,
                    ..ReviewState::default()
                };
                vec![
                    Effect::Api(ApiRequest::RandomTask {
                        token: token.to_string(),
                    }),
                    Effect::Track(AnalyticsEvent::PageView {
                        page: "tasks".into(),
                    }),
                ]
            }
            None => {
                state.review = ReviewState {
                    error: Some(LOGIN_PROMPT.to_string()),
                    ..ReviewState::default()
                };
                Vec::new()
            }
        },
        Route::TaskDetail(task_id) => match state.session.token() {
            Some(token) => {
                state.review = ReviewState {
                    task_id: Some(task_id.clone()),
                    loading: true,
                    ..ReviewState::default()
                };
                vec![Effect::Api(ApiRequest::Task {
                    task_id,
                    token: token.to_string(),
                })]
            }
            None => {
                state.review = ReviewState {
                    error: Some(LOGIN_PROMPT.to_string()),
                    ..ReviewState::default()
                };
                Vec::new()
            }
        },
        Route::AllTasks => match state.session.token() {
            Some(token) => {
                state.task_list.loading = true;
                state.task_list.error = None;
                vec![Effect::Api(ApiRequest::TaskList {
                    token: token.to_string(),
                })]
            }
            None => {
                state.task_list.error = Some(LOGIN_PROMPT.to_string());
                Vec::new()
            }
        },
        Route::Leaderboard => match state.session.token() {
            Some(token) => {
                state.leaderboard.loading = true;
                state.leaderboard.error = None;
                vec![
                    Effect::Api(ApiRequest::UserStats {
                        user_id: state.session.user_id().unwrap_or_default().to_string(),
                        token: token.to_string(),
                    }),
                    Effect::Api(ApiRequest::Leaderboard {
                        token: token.to_string(),
                        limit: 10,
                        offset: 0,
                    }),
                ]
            }
            None => {
                state.leaderboard.error = Some(LOGIN_PROMPT.to_string());
                Vec::new()
            }
        },
        Route::Profile => match (state.session.user_id(), state.session.token()) {
            (Some(user_id), Some(token)) => {
                let user_id = user_id.to_string();
                let token = token.to_string();
                state.profile.error = None;
                vec![
                    Effect::Api(ApiRequest::UserStats {
                        user_id: user_id.clone(),
                        token: token.clone(),
                    }),
                    Effect::Api(ApiRequest::CompletedList {
                        user_id: user_id.clone(),
                        token: token.clone(),
                    }),
                    Effect::Api(ApiRequest::Referral {
                        user_id: user_id.clone(),
                        token: token.clone(),
                    }),
                    Effect::Api(ApiRequest::Interests { user_id, token }),
                    Effect::Api(ApiRequest::PlatformStats),
                    Effect::Track(AnalyticsEvent::PageView {
                        page: "profile".into(),
                    }),
                ]
            }
            _ => {
                state.profile.error = Some(NOT_LOGGED_IN.to_string());
                Vec::new()
            }
        },
        Route::About => vec![Effect::Track(AnalyticsEvent::PageView {
            page: "about".into(),
        })],
        Route::Onboarding(step) => {
            let mut effects = vec![Effect::Track(AnalyticsEvent::PageView {
                page: format!("onboarding/{}", step_slug(step)),
            })];
            if step == OnboardingStep::Finish {
                effects.extend(begin_interests_save(state));
            }
            effects
        }
    }
}

fn step_slug(step: OnboardingStep) -> &'static str {
    match step {
        OnboardingStep::Topics => "topics",
        OnboardingStep::Language => "language",
        OnboardingStep::Username => "username",
        OnboardingStep::Finish => "finish",
    }
}

fn apply_login(state: &mut AppState, user: AuthUser) -> Vec<Effect> {
    let needs_onboarding = user.needs_onboarding == Some(true);
    state.navbar.auth_error = None;
    state.session.user = Some(user);
    state.mark_dirty();

    let user_id = state.session.user_id().unwrap_or_default().to_string();
    let token = state.session.token().unwrap_or_default().to_string();
    let mut effects = vec![
        Effect::PersistSession(state.session.clone()),
        Effect::Api(ApiRequest::CompletedCount {
            user_id: user_id.clone(),
            token: token.clone(),
        }),
        Effect::Api(ApiRequest::UserStats { user_id, token }),
    ];
    if needs_onboarding {
        effects.extend(enter_route(state, Route::Onboarding(OnboardingStep::Topics)));
    }
    effects
}

fn submit_clicked(state: &mut AppState) -> Vec<Effect> {
    if state.review.submitting {
        return Vec::new();
    }
    let Some(task) = state.review.task.as_ref() else {
        return Vec::new();
    };
    let Some(verdict) = state.review.verdict else {
        state.review.error = Some(SELECT_PROMPT.to_string());
        state.mark_dirty();
        return Vec::new();
    };
    let token = match state.session.token() {
        Some(token) => token.to_string(),
        None => {
            state.review.error = Some(LOGIN_PROMPT.to_string());
            state.mark_dirty();
            return Vec::new();
        }
    };

    let agrees = verdict == crate::types::Verdict::Agree;
    let task_id = task.id.clone();
    let explanation = state.review.explanation.clone();
    state.review.submitting = true;
    state.review.error = None;
    state.mark_dirty();
    vec![
        Effect::Api(ApiRequest::SubmitTask {
            task_id: task_id.clone(),
            agrees_with_claim: agrees,
            user_analysis: explanation.clone(),
            token,
        }),
        Effect::Track(AnalyticsEvent::TaskSubmit {
            task_id,
            agrees_with_claim: agrees,
            explanation_length: explanation.len(),
        }),
    ]
}

fn onboarding_next(state: &mut AppState) -> Vec<Effect> {
    let Route::Onboarding(step) = state.route.clone() else {
        return Vec::new();
    };
    match step {
        OnboardingStep::Topics => enter_route(state, Route::Onboarding(OnboardingStep::Language)),
        OnboardingStep::Language => {
            enter_route(state, Route::Onboarding(OnboardingStep::Username))
        }
        OnboardingStep::Username => {
            let keep = !state.onboarding.skip_wikipedia
                && state
                    .onboarding
                    .validation
                    .as_ref()
                    .is_some_and(|validation| validation.valid);
            state.session.wikipedia_username = keep.then(|| state.onboarding.username.clone());
            let mut effects = vec![Effect::PersistSession(state.session.clone())];
            effects.extend(enter_route(state, Route::Onboarding(OnboardingStep::Finish)));
            effects
        }
        OnboardingStep::Finish => Vec::new(),
    }
}

fn begin_interests_save(state: &mut AppState) -> Vec<Effect> {
    let (Some(user_id), Some(token)) = (state.session.user_id(), state.session.token()) else {
        state.onboarding.error = Some(NOT_LOGGED_IN.to_string());
        return Vec::new();
    };
    let user_id = user_id.to_string();
    let token = token.to_string();
    state.onboarding.saving = true;
    state.onboarding.saved = false;
    state.onboarding.error = None;
    vec![
        Effect::Api(ApiRequest::SaveInterests {
            user_id,
            token,
            topics: state.onboarding.all_topics(),
            languages: state.onboarding.languages.clone(),
        }),
        Effect::Track(AnalyticsEvent::UserAction {
            action: "onboarding_save_attempt".into(),
            details: vec![
                (
                    "total_topics".to_string(),
                    state.onboarding.all_topics().len().to_string(),
                ),
                (
                    "total_languages".to_string(),
                    state.onboarding.languages.len().to_string(),
                ),
            ],
        }),
    ]
}

fn persist_scratch(state: &mut AppState, event: AnalyticsEvent) -> Vec<Effect> {
    state.sync_scratch_to_session();
    state.mark_dirty();
    vec![
        Effect::PersistSession(state.session.clone()),
        Effect::Track(event),
    ]
}
