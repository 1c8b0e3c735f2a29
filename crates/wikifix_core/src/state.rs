use crate::embed::EmbedWidget;
use crate::session::Session;
use crate::types::{
    CompletedTask, Interests, Leaderboard, PlatformStats, ReferralInfo, TaskDetail, TaskSummary,
    UserStats, UsernameValidation, Verdict,
};

/// Topic cards offered during onboarding; anything else is a custom topic.
pub const PREDEFINED_TOPICS: [&str; 8] = [
    "science",
    "history",
    "sports",
    "technology",
    "art",
    "music",
    "literature",
    "geography",
];

/// Language cards offered during onboarding.
pub const LANGUAGE_CODES: [&str; 14] = [
    "en", "es", "fr", "ja", "de", "ko", "it", "zh", "hi", "ru", "ar", "pt", "tr", "nl",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    /// Entry point that fetches a random open task and forwards to it.
    Tasks,
    TaskDetail(String),
    AllTasks,
    Leaderboard,
    Profile,
    About,
    Onboarding(OnboardingStep),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Topics,
    Language,
    Username,
    Finish,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeState {
    pub stats: Option<PlatformStats>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReviewState {
    /// Task id this page is bound to; responses for any other id are stale.
    pub task_id: Option<String>,
    pub task: Option<TaskDetail>,
    pub loading: bool,
    pub error: Option<String>,
    pub verdict: Option<Verdict>,
    pub explanation: String,
    pub submitting: bool,
    /// The random endpoint returned 404: no open tasks remain.
    pub exhausted: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskListState {
    pub rows: Vec<TaskSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OnboardingState {
    pub selected_topics: Vec<String>,
    pub custom_topics: Vec<String>,
    pub languages: Vec<String>,
    pub username: String,
    pub validating: bool,
    pub validation: Option<UsernameValidation>,
    pub skip_wikipedia: bool,
    pub saving: bool,
    pub saved: bool,
    pub error: Option<String>,
}

impl OnboardingState {
    /// Selected plus custom topics, the shape the API and storage take.
    pub fn all_topics(&self) -> Vec<String> {
        self.selected_topics
            .iter()
            .chain(self.custom_topics.iter())
            .cloned()
            .collect()
    }

    /// Split a stored topic list back into cards and custom entries.
    pub fn restore_topics(&mut self, topics: &[String]) {
        self.selected_topics = topics
            .iter()
            .filter(|topic| PREDEFINED_TOPICS.contains(&topic.as_str()))
            .cloned()
            .collect();
        self.custom_topics = topics
            .iter()
            .filter(|topic| !PREDEFINED_TOPICS.contains(&topic.as_str()))
            .cloned()
            .collect();
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeaderboardState {
    pub board: Option<Leaderboard>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileState {
    pub stats: Option<UserStats>,
    pub completed: Option<Vec<CompletedTask>>,
    pub referral: Option<ReferralInfo>,
    pub interests: Option<Interests>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavbarState {
    pub completed_tasks: u64,
    pub rank: Option<u32>,
    pub auth_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(crate) route: Route,
    pub(crate) session: Session,
    pub(crate) home: HomeState,
    pub(crate) review: ReviewState,
    pub(crate) task_list: TaskListState,
    pub(crate) onboarding: OnboardingState,
    pub(crate) leaderboard: LeaderboardState,
    pub(crate) profile: ProfileState,
    pub(crate) navbar: NavbarState,
    pub(crate) embed: EmbedWidget,
    pub(crate) dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_session(Session::default())
    }

    /// Start from a session restored by the shell.
    pub fn with_session(session: Session) -> Self {
        let mut onboarding = OnboardingState::default();
        onboarding.restore_topics(&session.topics);
        onboarding.languages = session.languages.clone();
        let navbar = NavbarState {
            completed_tasks: session.completed_tasks,
            ..NavbarState::default()
        };
        Self {
            route: Route::Home,
            session,
            home: HomeState::default(),
            review: ReviewState::default(),
            task_list: TaskListState::default(),
            onboarding,
            leaderboard: LeaderboardState::default(),
            profile: ProfileState::default(),
            navbar,
            embed: EmbedWidget::new(),
            dirty: false,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True once since the last call if anything visible changed.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Refresh the session mirror of the onboarding scratch state.
    pub(crate) fn sync_scratch_to_session(&mut self) {
        self.session.topics = self.onboarding.all_topics();
        self.session.languages = self.onboarding.languages.clone();
    }
}
