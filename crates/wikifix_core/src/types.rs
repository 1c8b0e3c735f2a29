use serde::{Deserialize, Serialize};
use std::fmt;

/// Task difficulty as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Points awarded for completing a task of the given difficulty.
pub fn xp_for(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 10,
        Difficulty::Medium => 25,
        Difficulty::Hard => 50,
    }
}

/// A reviewer's judgment on a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Agree,
    Disagree,
}

/// Full task payload used by the review page.
///
/// This is the final task schema; earlier flat revisions without
/// `claim_text_span`/`claim_url` are not supported.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskDetail {
    pub id: String,
    pub claim: String,
    #[serde(default)]
    pub claim_text_span: Option<String>,
    #[serde(default)]
    pub claim_url: Option<String>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub report: Option<String>,
    #[serde(default)]
    pub report_urls: Option<String>,
    pub topic: String,
    pub difficulty: Difficulty,
    pub status: String,
    #[serde(default)]
    pub xp: Option<u32>,
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

/// Row in the open-task listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    pub text: String,
    pub topic: String,
    pub difficulty: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserStats {
    pub points: u64,
    pub completed_tasks: u64,
    pub badges: u32,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletedTask {
    pub id: String,
    pub text: String,
    pub agrees_with_claim: bool,
    #[serde(default)]
    pub analysis: Option<String>,
    pub completed_at: String,
    pub points_earned: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeaderboardRow {
    pub id: String,
    pub name: String,
    pub points: u64,
    pub completed_tasks: u64,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Leaderboard {
    pub total_users: u64,
    pub user_rank: u32,
    pub users: Vec<LeaderboardRow>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_completed_tasks: u64,
    pub total_points_awarded: u64,
    pub average_points_per_user: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferralInfo {
    pub referral_code: String,
    pub referral_count: u64,
    pub referral_link: String,
}

/// Topics and languages a user signed up with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interests {
    pub topics: Vec<String>,
    pub languages: Vec<String>,
}

/// Outcome of checking a username against the Wikipedia users API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameValidation {
    pub valid: bool,
    pub exists: bool,
    pub message: String,
}

/// Why an API call failed, as far as the pages care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub kind: ApiFailureKind,
    pub message: String,
}

impl ApiFailure {
    pub fn new(kind: ApiFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_status(&self, status: u16) -> bool {
        self.kind == ApiFailureKind::HttpStatus(status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFailureKind {
    Network,
    Timeout,
    HttpStatus(u16),
    Decode,
}

impl fmt::Display for ApiFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailureKind::Network => write!(f, "network error"),
            ApiFailureKind::Timeout => write!(f, "timeout"),
            ApiFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            ApiFailureKind::Decode => write!(f, "decode error"),
        }
    }
}
