use std::time::Duration;

use crate::embed::AttemptId;
use crate::session::Session;

/// Side effects requested by the update function. The shell executes these;
/// the core never performs IO itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call the remote API.
    Api(ApiRequest),
    /// Run the external auth handshake (popup + message race).
    BeginLogin,
    /// Fire-and-forget logout request; local state is already cleared.
    Logout { token: String },
    /// Start the detection timers for a new embed attempt.
    StartEmbedAttempt {
        attempt: AttemptId,
        url: String,
        probe_interval: Duration,
        deadline: Duration,
    },
    /// Cancel every pending timer of an attempt.
    CancelEmbedAttempt { attempt: AttemptId },
    /// Open a document in the system browser.
    OpenExternal { url: String },
    /// Emit a telemetry event. Best-effort, never awaited on.
    Track(AnalyticsEvent),
    /// Write the session back through its store.
    PersistSession(Session),
    /// Drop onboarding scratch keys after interests were accepted.
    ClearOnboardingScratch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    PlatformStats,
    Task {
        task_id: String,
        token: String,
    },
    RandomTask {
        token: String,
    },
    TaskList {
        token: String,
    },
    SubmitTask {
        task_id: String,
        agrees_with_claim: bool,
        user_analysis: String,
        token: String,
    },
    CompletedCount {
        user_id: String,
        token: String,
    },
    UserStats {
        user_id: String,
        token: String,
    },
    CompletedList {
        user_id: String,
        token: String,
    },
    Referral {
        user_id: String,
        token: String,
    },
    Leaderboard {
        token: String,
        limit: u32,
        offset: u32,
    },
    Interests {
        user_id: String,
        token: String,
    },
    SaveInterests {
        user_id: String,
        token: String,
        topics: Vec<String>,
        languages: Vec<String>,
    },
    /// Check a username against the Wikipedia users API. Debounced by the
    /// executor; only the latest pending check runs.
    ValidateUsername {
        username: String,
    },
}

/// Telemetry events, mirrored one-to-one onto the ingest payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    ButtonClick {
        name: String,
    },
    OptionSelect {
        option_type: String,
        value: String,
    },
    /// Length only; the text itself never leaves the client.
    TextInput {
        name: String,
        length: usize,
    },
    TaskLoad {
        task_id: String,
    },
    TaskSubmit {
        task_id: String,
        agrees_with_claim: bool,
        explanation_length: usize,
    },
    TaskSkip {
        task_id: String,
    },
    PageView {
        page: String,
    },
    UserAction {
        action: String,
        details: Vec<(String, String)>,
    },
}
