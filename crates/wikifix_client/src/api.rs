use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;
use wikifix_core::{
    CompletedTask, Interests, Leaderboard, PlatformStats, ReferralInfo, TaskDetail, TaskSummary,
    UserStats, UsernameValidation,
};

use crate::types::ApiError;

/// The Wikipedia users API used to verify usernames during onboarding.
pub const USERNAME_API: &str = "https://en.wikipedia.org/w/api.php";

const MSG_VERIFIED: &str = "✓ Account verified";
const MSG_MISSING: &str = "This username doesn't exist on Wikipedia";
const MSG_INVALID: &str = "This is not a valid Wikipedia username format";
const MSG_UNKNOWN: &str = "Unable to verify this username";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8001").expect("static url"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Typed access to the remote API. Every authenticated call carries a bearer
/// token; nothing here retries.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn platform_stats(&self) -> Result<PlatformStats, ApiError>;
    async fn task(&self, task_id: &str, token: &str) -> Result<TaskDetail, ApiError>;
    /// 404 means the open-task pool is exhausted.
    async fn random_task(&self, token: &str) -> Result<TaskDetail, ApiError>;
    async fn tasks(&self, token: &str) -> Result<Vec<TaskSummary>, ApiError>;
    async fn submit_task(
        &self,
        task_id: &str,
        agrees_with_claim: bool,
        user_analysis: &str,
        token: &str,
    ) -> Result<(), ApiError>;
    async fn completed_count(&self, user_id: &str, token: &str) -> Result<u64, ApiError>;
    async fn user_stats(&self, user_id: &str, token: &str) -> Result<UserStats, ApiError>;
    async fn completed_list(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<Vec<CompletedTask>, ApiError>;
    async fn referral(&self, user_id: &str, token: &str) -> Result<ReferralInfo, ApiError>;
    async fn interests(&self, user_id: &str, token: &str) -> Result<Interests, ApiError>;
    async fn save_interests(
        &self,
        user_id: &str,
        interests: &Interests,
        token: &str,
    ) -> Result<(), ApiError>;
    async fn leaderboard(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Leaderboard, ApiError>;
    async fn logout(&self, token: &str) -> Result<(), ApiError>;
    async fn validate_username(&self, username: &str) -> Result<UsernameValidation, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: Url,
    username_api: Url,
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            base_url: settings.base_url,
            username_api: Url::parse(USERNAME_API).expect("static url"),
            client,
        })
    }

    /// Point username validation somewhere else, for tests.
    pub fn with_username_api(mut self, url: Url) -> Self {
        self.username_api = url;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut request = self.client.get(self.endpoint(path)?);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(ApiError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        token: &str,
    ) -> Result<(), ApiError> {
        let mut request = self.client.post(self.endpoint(path)?).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(ApiError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ApiClient for HttpApiClient {
    async fn platform_stats(&self) -> Result<PlatformStats, ApiError> {
        self.get_json("/api/stats/platform", None).await
    }

    async fn task(&self, task_id: &str, token: &str) -> Result<TaskDetail, ApiError> {
        self.get_json(&format!("/api/tasks/{task_id}"), Some(token))
            .await
    }

    async fn random_task(&self, token: &str) -> Result<TaskDetail, ApiError> {
        self.get_json("/api/tasks/rand", Some(token)).await
    }

    async fn tasks(&self, token: &str) -> Result<Vec<TaskSummary>, ApiError> {
        self.get_json("/api/tasks", Some(token)).await
    }

    async fn submit_task(
        &self,
        task_id: &str,
        agrees_with_claim: bool,
        user_analysis: &str,
        token: &str,
    ) -> Result<(), ApiError> {
        let body = TaskSubmission {
            agrees_with_claim,
            user_analysis,
        };
        self.post_json(&format!("/api/tasks/{task_id}/submit"), Some(&body), token)
            .await
    }

    async fn completed_count(&self, user_id: &str, token: &str) -> Result<u64, ApiError> {
        let response: CompletedCountResponse = self
            .get_json(&format!("/api/users/{user_id}/completed-tasks"), Some(token))
            .await?;
        Ok(response.total_completed)
    }

    async fn user_stats(&self, user_id: &str, token: &str) -> Result<UserStats, ApiError> {
        self.get_json(&format!("/api/users/{user_id}/stats"), Some(token))
            .await
    }

    async fn completed_list(
        &self,
        user_id: &str,
        token: &str,
    ) -> Result<Vec<CompletedTask>, ApiError> {
        self.get_json(
            &format!("/api/users/{user_id}/completed-tasks/list"),
            Some(token),
        )
        .await
    }

    async fn referral(&self, user_id: &str, token: &str) -> Result<ReferralInfo, ApiError> {
        self.get_json(&format!("/api/users/{user_id}/referral"), Some(token))
            .await
    }

    async fn interests(&self, user_id: &str, token: &str) -> Result<Interests, ApiError> {
        self.get_json(&format!("/api/users/{user_id}/interests"), Some(token))
            .await
    }

    async fn save_interests(
        &self,
        user_id: &str,
        interests: &Interests,
        token: &str,
    ) -> Result<(), ApiError> {
        self.post_json(
            &format!("/api/users/{user_id}/interests"),
            Some(interests),
            token,
        )
        .await
    }

    async fn leaderboard(
        &self,
        token: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Leaderboard, ApiError> {
        self.get_json(
            &format!("/api/leaderboard?limit={limit}&offset={offset}"),
            Some(token),
        )
        .await
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.post_json::<()>("/auth/logout", None, token).await
    }

    async fn validate_username(&self, username: &str) -> Result<UsernameValidation, ApiError> {
        let response = self
            .client
            .get(self.username_api.clone())
            .query(&[
                ("action", "query"),
                ("list", "users"),
                ("ususers", username),
                ("format", "json"),
                ("origin", "*"),
            ])
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let body: WikiUsersResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(interpret_wiki_user(body))
    }
}

fn interpret_wiki_user(body: WikiUsersResponse) -> UsernameValidation {
    let user = body
        .query
        .and_then(|query| query.users.into_iter().next());
    match user {
        Some(user) if user.missing.is_some() => UsernameValidation {
            valid: false,
            exists: false,
            message: MSG_MISSING.to_string(),
        },
        Some(user) if user.invalid.is_some() => UsernameValidation {
            valid: false,
            exists: false,
            message: MSG_INVALID.to_string(),
        },
        Some(user) if user.userid.is_some() => UsernameValidation {
            valid: true,
            exists: true,
            message: MSG_VERIFIED.to_string(),
        },
        _ => UsernameValidation {
            valid: false,
            exists: false,
            message: MSG_UNKNOWN.to_string(),
        },
    }
}

#[derive(Debug, Serialize)]
struct TaskSubmission<'a> {
    agrees_with_claim: bool,
    user_analysis: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletedCountResponse {
    total_completed: u64,
}

#[derive(Debug, Deserialize)]
struct WikiUsersResponse {
    #[serde(default)]
    query: Option<WikiUsersQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiUsersQuery {
    #[serde(default)]
    users: Vec<WikiUser>,
}

#[derive(Debug, Deserialize)]
struct WikiUser {
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    invalid: Option<serde_json::Value>,
    #[serde(default)]
    userid: Option<u64>,
}
