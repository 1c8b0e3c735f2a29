//! External auth handshake.
//!
//! Login happens in a separate provider window; the result comes back as a
//! message carrying the signed-in user. The flow races four outcomes: a
//! trusted message, a provider error, the user closing the window, and a
//! bounded timeout. First to land wins; messages from any origin other than
//! the API's are ignored outright.

use std::time::Duration;

use client_logging::{client_debug, client_info};
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;
use wikifix_core::AuthUser;

/// Provider login path on the API host.
pub const LOGIN_PATH: &str = "/auth/google/login";

/// How long the whole handshake may take.
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// How often the flow checks whether the window was closed.
pub const POPUP_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login window could not be opened")]
    PopupBlocked,
    #[error("login was cancelled")]
    Cancelled,
    #[error("login timed out")]
    TimedOut,
    #[error("provider error: {0}")]
    Provider(String),
}

/// One message posted back from the provider window.
#[derive(Debug, Clone)]
pub struct AuthMessage {
    pub origin: String,
    pub payload: serde_json::Value,
}

/// The opened provider window, as far as the flow can observe it.
pub trait PopupHandle: Send + Sync {
    fn is_closed(&self) -> bool;
    fn close(&self);
}

/// Opens the provider window and hands back its message channel.
pub trait PopupOpener: Send + Sync {
    fn open(&self, url: &str)
        -> Result<(Box<dyn PopupHandle>, mpsc::Receiver<AuthMessage>), AuthError>;
}

/// Asynchronous login capability the engine drives.
#[async_trait::async_trait]
pub trait AuthFlow: Send + Sync {
    async fn login(&self) -> Result<AuthUser, AuthError>;
}

pub struct PopupAuthFlow {
    opener: Box<dyn PopupOpener>,
    login_url: String,
    expected_origin: String,
    timeout: Duration,
}

impl PopupAuthFlow {
    pub fn new(opener: Box<dyn PopupOpener>, api_base: &Url) -> Self {
        let login_url = api_base
            .join(LOGIN_PATH)
            .map(String::from)
            .unwrap_or_else(|_| format!("{api_base}{LOGIN_PATH}"));
        Self {
            opener,
            login_url,
            expected_origin: api_base.origin().ascii_serialization(),
            timeout: LOGIN_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl AuthFlow for PopupAuthFlow {
    async fn login(&self) -> Result<AuthUser, AuthError> {
        let (popup, mut messages) = self.opener.open(&self.login_url)?;
        let result = run_login_flow(
            popup.as_ref(),
            &mut messages,
            &self.expected_origin,
            self.timeout,
        )
        .await;
        popup.close();
        result
    }
}

/// Race the handshake outcomes until one resolves.
pub async fn run_login_flow(
    popup: &dyn PopupHandle,
    messages: &mut mpsc::Receiver<AuthMessage>,
    expected_origin: &str,
    deadline: Duration,
) -> Result<AuthUser, AuthError> {
    let timeout = tokio::time::sleep(deadline);
    tokio::pin!(timeout);
    let mut poll = tokio::time::interval(POPUP_POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = &mut timeout => {
                client_info!("login handshake timed out after {deadline:?}");
                return Err(AuthError::TimedOut);
            }
            _ = poll.tick() => {
                if popup.is_closed() {
                    return Err(AuthError::Cancelled);
                }
            }
            message = messages.recv() => {
                let Some(message) = message else {
                    return Err(AuthError::Cancelled);
                };
                if message.origin != expected_origin {
                    client_debug!("ignoring message from unexpected origin {}", message.origin);
                    continue;
                }
                if let Some(error) = message.payload.get("error").and_then(|v| v.as_str()) {
                    return Err(AuthError::Provider(error.to_string()));
                }
                if let Some(user) = parse_login_payload(&message.payload) {
                    return Ok(user);
                }
                // A trusted but incomplete payload is dropped like a foreign one.
                client_debug!("ignoring login message without id/email/token");
            }
        }
    }
}

/// A payload is only trusted once id, email and token are all present.
pub fn parse_login_payload(payload: &serde_json::Value) -> Option<AuthUser> {
    serde_json::from_value::<AuthUser>(payload.clone())
        .ok()
        .filter(|user| !user.id.is_empty() && !user.email.is_empty() && !user.token.is_empty())
}
