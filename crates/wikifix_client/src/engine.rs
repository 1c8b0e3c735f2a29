use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use client_logging::client_warn;
use tokio::task::AbortHandle;
use url::Url;
use wikifix_core::{
    AnalyticsEvent, ApiRequest, AttemptId, AuthUser, CompletedTask, EmbedSignal, Interests,
    Leaderboard, PlatformStats, ReferralInfo, TaskDetail, TaskSummary, UserStats,
    UsernameValidation,
};

use crate::analytics::{event_name, event_payload, AnalyticsSink, TEXT_INPUT_DEBOUNCE};
use crate::api::{ApiClient, ApiSettings, HttpApiClient};
use crate::auth::{AuthError, AuthFlow, PopupAuthFlow, PopupOpener};
use crate::embed_driver::EmbedDriver;
use crate::types::ApiError;

/// Keystrokes in the username field are validated only after a pause.
pub const USERNAME_DEBOUNCE: Duration = Duration::from_millis(800);

/// Everything the shell may ask the engine to do.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Api(ApiRequest),
    BeginLogin,
    Logout { token: String },
    Track(AnalyticsEvent),
    StartEmbedAttempt {
        attempt: AttemptId,
        url: String,
        probe_interval: Duration,
        deadline: Duration,
    },
    CancelEmbedAttempt { attempt: AttemptId },
}

/// Typed responses flowing back to the shell.
#[derive(Debug)]
pub enum EngineEvent {
    PlatformStats(Result<PlatformStats, ApiError>),
    Task {
        task_id: String,
        result: Result<TaskDetail, ApiError>,
    },
    RandomTask(Result<TaskDetail, ApiError>),
    TaskList(Result<Vec<TaskSummary>, ApiError>),
    Submitted {
        task_id: String,
        result: Result<(), ApiError>,
    },
    CompletedCount(Result<u64, ApiError>),
    UserStats(Result<UserStats, ApiError>),
    CompletedList(Result<Vec<CompletedTask>, ApiError>),
    Referral(Result<ReferralInfo, ApiError>),
    Interests(Result<Interests, ApiError>),
    InterestsSaved(Result<(), ApiError>),
    Leaderboard(Result<Leaderboard, ApiError>),
    UsernameValidated {
        username: String,
        result: Result<UsernameValidation, ApiError>,
    },
    LoginFinished(Result<AuthUser, AuthError>),
    EmbedSignal {
        attempt: AttemptId,
        signal: EmbedSignal,
    },
}

pub struct EngineConfig {
    pub base_url: Url,
    pub api: Arc<dyn ApiClient>,
    pub auth: Arc<dyn AuthFlow>,
    pub analytics: Arc<dyn AnalyticsSink>,
}

impl EngineConfig {
    /// Production wiring: HTTP API client plus the popup login flow.
    pub fn http(
        settings: ApiSettings,
        opener: Box<dyn PopupOpener>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Result<Self, ApiError> {
        let base_url = settings.base_url.clone();
        let api = HttpApiClient::new(settings)?;
        let auth = PopupAuthFlow::new(opener, &base_url);
        Ok(Self {
            base_url,
            api: Arc::new(api),
            auth: Arc::new(auth),
            analytics,
        })
    }
}

/// Bridge between the synchronous shell and the async IO layer: commands go
/// in over a channel, events come back over another.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    client_warn!("engine runtime failed to start: {err}");
                    return;
                }
            };
            let mut worker = Worker::new(config, event_tx);
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(&runtime, command);
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

struct Worker {
    api: Arc<dyn ApiClient>,
    auth: Arc<dyn AuthFlow>,
    analytics: Arc<dyn AnalyticsSink>,
    event_tx: mpsc::Sender<EngineEvent>,
    embed: EmbedDriver,
    pending_validation: Option<AbortHandle>,
    pending_text_input: Option<AbortHandle>,
}

impl Worker {
    fn new(config: EngineConfig, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        // Embed signals arrive on their own channel; forward them as events.
        let (signal_tx, signal_rx) = mpsc::channel::<(AttemptId, EmbedSignal)>();
        let forward_tx = event_tx.clone();
        thread::spawn(move || {
            while let Ok((attempt, signal)) = signal_rx.recv() {
                let _ = forward_tx.send(EngineEvent::EmbedSignal { attempt, signal });
            }
        });

        let embed = EmbedDriver::new(config.base_url, reqwest::Client::new(), signal_tx);

        Self {
            api: config.api,
            auth: config.auth,
            analytics: config.analytics,
            event_tx,
            embed,
            pending_validation: None,
            pending_text_input: None,
        }
    }

    fn handle(&mut self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        match command {
            EngineCommand::Api(request) => self.dispatch_api(runtime, request),
            EngineCommand::BeginLogin => {
                let auth = self.auth.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let result = auth.login().await;
                    let _ = event_tx.send(EngineEvent::LoginFinished(result));
                });
            }
            EngineCommand::Logout { token } => {
                let api = self.api.clone();
                runtime.spawn(async move {
                    if let Err(err) = api.logout(&token).await {
                        client_warn!("logout request failed: {err}");
                    }
                });
            }
            EngineCommand::Track(event) => self.track(runtime, event),
            EngineCommand::StartEmbedAttempt {
                attempt,
                url,
                probe_interval,
                deadline,
            } => {
                let _guard = runtime.enter();
                self.embed.start(attempt, &url, probe_interval, deadline);
            }
            EngineCommand::CancelEmbedAttempt { attempt } => {
                self.embed.cancel(attempt);
            }
        }
    }

    fn track(&mut self, runtime: &tokio::runtime::Runtime, event: AnalyticsEvent) {
        let analytics = self.analytics.clone();
        match &event {
            AnalyticsEvent::TextInput { .. } => {
                // Coalesce typing: only the state after a quiet second goes out.
                if let Some(pending) = self.pending_text_input.take() {
                    pending.abort();
                }
                let handle = runtime.spawn(async move {
                    tokio::time::sleep(TEXT_INPUT_DEBOUNCE).await;
                    analytics
                        .track(event_name(&event), event_payload(&event))
                        .await;
                });
                self.pending_text_input = Some(handle.abort_handle());
            }
            _ => {
                runtime.spawn(async move {
                    analytics
                        .track(event_name(&event), event_payload(&event))
                        .await;
                });
            }
        }
    }

    fn dispatch_api(&mut self, runtime: &tokio::runtime::Runtime, request: ApiRequest) {
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();
        match request {
            ApiRequest::PlatformStats => {
                runtime.spawn(async move {
                    let result = api.platform_stats().await;
                    let _ = event_tx.send(EngineEvent::PlatformStats(result));
                });
            }
            ApiRequest::Task { task_id, token } => {
                runtime.spawn(async move {
                    let result = api.task(&task_id, &token).await;
                    let _ = event_tx.send(EngineEvent::Task { task_id, result });
                });
            }
            ApiRequest::RandomTask { token } => {
                runtime.spawn(async move {
                    let result = api.random_task(&token).await;
                    let _ = event_tx.send(EngineEvent::RandomTask(result));
                });
            }
            ApiRequest::TaskList { token } => {
                runtime.spawn(async move {
                    let result = api.tasks(&token).await;
                    let _ = event_tx.send(EngineEvent::TaskList(result));
                });
            }
            ApiRequest::SubmitTask {
                task_id,
                agrees_with_claim,
                user_analysis,
                token,
            } => {
                runtime.spawn(async move {
                    let result = api
                        .submit_task(&task_id, agrees_with_claim, &user_analysis, &token)
                        .await;
                    let _ = event_tx.send(EngineEvent::Submitted { task_id, result });
                });
            }
            ApiRequest::CompletedCount { user_id, token } => {
                runtime.spawn(async move {
                    let result = api.completed_count(&user_id, &token).await;
                    let _ = event_tx.send(EngineEvent::CompletedCount(result));
                });
            }
            ApiRequest::UserStats { user_id, token } => {
                runtime.spawn(async move {
                    let result = api.user_stats(&user_id, &token).await;
                    let _ = event_tx.send(EngineEvent::UserStats(result));
                });
            }
            ApiRequest::CompletedList { user_id, token } => {
                runtime.spawn(async move {
                    let result = api.completed_list(&user_id, &token).await;
                    let _ = event_tx.send(EngineEvent::CompletedList(result));
                });
            }
            ApiRequest::Referral { user_id, token } => {
                runtime.spawn(async move {
                    let result = api.referral(&user_id, &token).await;
                    let _ = event_tx.send(EngineEvent::Referral(result));
                });
            }
            ApiRequest::Leaderboard {
                token,
                limit,
                offset,
            } => {
                runtime.spawn(async move {
                    let result = api.leaderboard(&token, limit, offset).await;
                    let _ = event_tx.send(EngineEvent::Leaderboard(result));
                });
            }
            ApiRequest::Interests { user_id, token } => {
                runtime.spawn(async move {
                    let result = api.interests(&user_id, &token).await;
                    let _ = event_tx.send(EngineEvent::Interests(result));
                });
            }
            ApiRequest::SaveInterests {
                user_id,
                token,
                topics,
                languages,
            } => {
                runtime.spawn(async move {
                    let interests = Interests { topics, languages };
                    let result = api.save_interests(&user_id, &interests, &token).await;
                    let _ = event_tx.send(EngineEvent::InterestsSaved(result));
                });
            }
            ApiRequest::ValidateUsername { username } => {
                // A newer keystroke supersedes any check still waiting out
                // its debounce.
                if let Some(pending) = self.pending_validation.take() {
                    pending.abort();
                }
                let handle = runtime.spawn(async move {
                    tokio::time::sleep(USERNAME_DEBOUNCE).await;
                    let result = api.validate_username(&username).await;
                    let _ = event_tx.send(EngineEvent::UsernameValidated { username, result });
                });
                self.pending_validation = Some(handle.abort_handle());
            }
        }
    }
}
