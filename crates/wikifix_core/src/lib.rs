//! WikiFix core: pure page state machines and view-model helpers.
mod effect;
mod embed;
mod highlight;
mod msg;
mod session;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::{AnalyticsEvent, ApiRequest, Effect};
pub use embed::{
    AttemptId, EmbedSignal, EmbedSource, EmbedWidget, LoadState, EXTERNAL_DEADLINE, PROBE_INTERVAL,
};
pub use highlight::{compose, external_url, is_proxy_url, origin_of, page_url, PROXY_PREFIX};
pub use msg::{LoginFailure, Msg};
pub use session::{keys, AuthUser, SchemaViolation, Session, SessionStore};
pub use state::{
    AppState, HomeState, LeaderboardState, NavbarState, OnboardingState, OnboardingStep,
    ProfileState, ReviewState, Route, TaskListState, LANGUAGE_CODES, PREDEFINED_TOPICS,
};
pub use types::{
    xp_for, ApiFailure, ApiFailureKind, CompletedTask, Difficulty, Interests, Leaderboard,
    LeaderboardRow, PlatformStats, ReferralInfo, TaskDetail, TaskSummary, UserStats,
    UsernameValidation, Verdict,
};
pub use update::update;
pub use view_model::{
    AppViewModel, EmbedView, HomeView, LeaderboardView, OnboardingView, PageView, ProfileView,
    ReviewView, TaskListView,
};
