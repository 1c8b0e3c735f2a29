use crate::embed::{AttemptId, EmbedSignal};
use crate::session::AuthUser;
use crate::state::Route;
use crate::types::{
    ApiFailure, CompletedTask, Interests, Leaderboard, PlatformStats, ReferralInfo, TaskDetail,
    TaskSummary, UserStats, UsernameValidation, Verdict,
};

/// Why a login attempt ended without a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFailure {
    /// The user closed the provider window.
    Cancelled,
    /// No result within the handshake deadline.
    TimedOut,
    /// The provider reported an error.
    Provider(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User navigated to a page.
    RouteChanged(Route),
    /// User clicked Join/Log in.
    LoginClicked,
    /// The auth handshake finished.
    LoginCompleted(Result<AuthUser, LoginFailure>),
    /// User clicked Log out.
    LogoutClicked,
    PlatformStatsLoaded(Result<PlatformStats, ApiFailure>),
    /// Completed-task count for the navbar progress bar.
    CompletedCountLoaded(Result<u64, ApiFailure>),
    UserStatsLoaded(Result<UserStats, ApiFailure>),
    /// Random-task fetch, either from the tasks entry point or after submit.
    RandomTaskLoaded(Result<TaskDetail, ApiFailure>),
    TaskLoaded {
        task_id: String,
        result: Result<TaskDetail, ApiFailure>,
    },
    TaskListLoaded(Result<Vec<TaskSummary>, ApiFailure>),
    /// Agree/disagree button; clicking the active one clears it.
    VerdictToggled(Verdict),
    ExplanationChanged(String),
    SubmitClicked,
    SubmitCompleted {
        task_id: String,
        result: Result<(), ApiFailure>,
    },
    /// User clicked a claim/analysis/reference card; points the viewer at it.
    ReferenceSelected {
        url: String,
    },
    /// A detection signal for an embed attempt.
    EmbedSignalled {
        attempt: AttemptId,
        signal: EmbedSignal,
    },
    /// The "open on Wikipedia" affordance.
    OpenArticleClicked,
    TopicToggled(String),
    CustomTopicAdded(String),
    CustomTopicRemoved(String),
    LanguageToggled(String),
    UsernameChanged(String),
    UsernameValidated {
        username: String,
        result: Result<UsernameValidation, ApiFailure>,
    },
    SkipWikipediaToggled,
    OnboardingBack,
    OnboardingNext,
    InterestsSaved(Result<(), ApiFailure>),
    LeaderboardLoaded(Result<Leaderboard, ApiFailure>),
    CompletedListLoaded(Result<Vec<CompletedTask>, ApiFailure>),
    ReferralLoaded(Result<ReferralInfo, ApiFailure>),
    InterestsLoaded(Result<Interests, ApiFailure>),
    /// Fallback for placeholder wiring.
    NoOp,
}
