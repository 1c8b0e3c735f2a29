//! WikiFix client engine: HTTP API access and effect execution.
mod analytics;
mod api;
mod auth;
mod embed_driver;
mod engine;
mod storage;
mod types;

pub use analytics::{
    event_name, event_payload, AnalyticsSink, HttpAnalyticsSink, NoopAnalyticsSink,
    TEXT_INPUT_DEBOUNCE,
};
pub use api::{ApiClient, ApiSettings, HttpApiClient, USERNAME_API};
pub use auth::{
    parse_login_payload, run_login_flow, AuthError, AuthFlow, AuthMessage, PopupAuthFlow,
    PopupHandle, PopupOpener, LOGIN_PATH, LOGIN_TIMEOUT, POPUP_POLL_INTERVAL,
};
pub use embed_driver::EmbedDriver;
pub use engine::{EngineCommand, EngineConfig, EngineEvent, EngineHandle, USERNAME_DEBOUNCE};
pub use storage::{FileStore, StorageError, STORE_FILENAME};
pub use types::ApiError;
