//! Fire-and-forget telemetry.
//!
//! Events mirror the ingest payloads one-to-one and carry an RFC 3339
//! timestamp. Delivery failures are logged at debug level and never surfaced
//! to the pages.

use std::time::Duration;

use client_logging::client_debug;
use serde_json::{json, Value};
use url::Url;
use wikifix_core::AnalyticsEvent;

use crate::types::ApiError;

/// Keystroke events are coalesced: only the state after a quiet second is
/// reported.
pub const TEXT_INPUT_DEBOUNCE: Duration = Duration::from_secs(1);

#[async_trait::async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn track(&self, name: &str, payload: Value);
}

/// Posts events to an ingest endpoint. Best-effort only.
pub struct HttpAnalyticsSink {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpAnalyticsSink {
    pub fn new(endpoint: Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { endpoint, client })
    }
}

#[async_trait::async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    async fn track(&self, name: &str, payload: Value) {
        let body = json!({ "name": name, "payload": payload });
        if let Err(err) = self.client.post(self.endpoint.clone()).json(&body).send().await {
            client_debug!("analytics event {name} dropped: {err}");
        }
    }
}

/// Sink used when no ingest endpoint is configured.
pub struct NoopAnalyticsSink;

#[async_trait::async_trait]
impl AnalyticsSink for NoopAnalyticsSink {
    async fn track(&self, name: &str, _payload: Value) {
        client_debug!("analytics event {name} (no sink configured)");
    }
}

pub fn event_name(event: &AnalyticsEvent) -> &'static str {
    match event {
        AnalyticsEvent::ButtonClick { .. } => "button_click",
        AnalyticsEvent::OptionSelect { .. } => "option_select",
        AnalyticsEvent::TextInput { .. } => "text_input",
        AnalyticsEvent::TaskLoad { .. } => "task_load",
        AnalyticsEvent::TaskSubmit { .. } => "task_submit",
        AnalyticsEvent::TaskSkip { .. } => "task_skip",
        AnalyticsEvent::PageView { .. } => "page_view",
        AnalyticsEvent::UserAction { .. } => "user_action",
    }
}

pub fn event_payload(event: &AnalyticsEvent) -> Value {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match event {
        AnalyticsEvent::ButtonClick { name } => json!({
            "button_name": name,
            "timestamp": timestamp,
        }),
        AnalyticsEvent::OptionSelect { option_type, value } => json!({
            "option_type": option_type,
            "option_value": value,
            "timestamp": timestamp,
        }),
        AnalyticsEvent::TextInput { name, length } => json!({
            "input_name": name,
            "text_length": length,
            "has_content": *length > 0,
            "timestamp": timestamp,
        }),
        AnalyticsEvent::TaskLoad { task_id } => json!({
            "task_id": task_id,
            "timestamp": timestamp,
        }),
        AnalyticsEvent::TaskSubmit {
            task_id,
            agrees_with_claim,
            explanation_length,
        } => json!({
            "task_id": task_id,
            "agrees_with_claim": agrees_with_claim,
            "explanation_length": explanation_length,
            "timestamp": timestamp,
        }),
        AnalyticsEvent::TaskSkip { task_id } => json!({
            "task_id": task_id,
            "timestamp": timestamp,
        }),
        AnalyticsEvent::PageView { page } => json!({
            "page": page,
            "timestamp": timestamp,
        }),
        AnalyticsEvent::UserAction { action, details } => {
            let mut payload = json!({
                "action": action,
                "timestamp": timestamp,
            });
            if let Some(map) = payload.as_object_mut() {
                for (key, value) in details {
                    map.insert(key.clone(), Value::String(value.clone()));
                }
            }
            payload
        }
    }
}
