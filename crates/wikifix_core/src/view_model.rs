use crate::embed::LoadState;
use crate::state::{
    AppState, HomeState, LeaderboardState, OnboardingState, ProfileState, Route, TaskListState,
};
use crate::types::{TaskDetail, Verdict};

/// Snapshot of everything the shell needs to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub route: Route,
    pub signed_in: bool,
    pub user_first_name: Option<String>,
    pub completed_tasks: u64,
    pub rank: Option<u32>,
    pub auth_error: Option<String>,
    pub page: PageView,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageView {
    Home(HomeView),
    Review(ReviewView),
    AllTasks(TaskListView),
    Leaderboard(LeaderboardView),
    Profile(ProfileView),
    Onboarding(OnboardingView),
    About,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    pub state: HomeState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewView {
    pub task: Option<TaskDetail>,
    pub loading: bool,
    pub error: Option<String>,
    pub verdict: Option<Verdict>,
    pub explanation: String,
    pub submitting: bool,
    pub exhausted: bool,
    /// Submit control is enabled only with a verdict and no in-flight call.
    pub can_submit: bool,
    pub embed: EmbedView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedView {
    pub state: LoadState,
    pub frame_url: Option<String>,
    /// "Open in new tab" target; always the external document.
    pub open_external_url: Option<String>,
    /// Render the open-externally affordance instead of the frame.
    pub show_fallback: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskListView {
    pub state: TaskListState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardView {
    pub state: LeaderboardState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub state: ProfileState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingView {
    pub state: OnboardingState,
}

impl AppState {
    pub fn view(&self) -> AppViewModel {
        let page = match &self.route {
            Route::Home => PageView::Home(HomeView {
                state: self.home.clone(),
            }),
            Route::Tasks | Route::TaskDetail(_) => PageView::Review(ReviewView {
                task: self.review.task.clone(),
                loading: self.review.loading,
                error: self.review.error.clone(),
                verdict: self.review.verdict,
                explanation: self.review.explanation.clone(),
                submitting: self.review.submitting,
                exhausted: self.review.exhausted,
                can_submit: self.review.verdict.is_some() && !self.review.submitting,
                embed: EmbedView {
                    state: self.embed.state(),
                    frame_url: self.embed.frame_url(),
                    open_external_url: self.embed.fallback_url(),
                    show_fallback: self.embed.state() == LoadState::Error,
                },
            }),
            Route::AllTasks => PageView::AllTasks(TaskListView {
                state: self.task_list.clone(),
            }),
            Route::Leaderboard => PageView::Leaderboard(LeaderboardView {
                state: self.leaderboard.clone(),
            }),
            Route::Profile => PageView::Profile(ProfileView {
                state: self.profile.clone(),
            }),
            Route::About => PageView::About,
            Route::Onboarding(_) => PageView::Onboarding(OnboardingView {
                state: self.onboarding.clone(),
            }),
        };

        AppViewModel {
            route: self.route.clone(),
            signed_in: self.session.is_logged_in(),
            user_first_name: self
                .session
                .user
                .as_ref()
                .and_then(|user| user.first_name().map(ToOwned::to_owned)),
            completed_tasks: self.navbar.completed_tasks,
            rank: self.navbar.rank,
            auth_error: self.navbar.auth_error.clone(),
            page,
        }
    }
}
