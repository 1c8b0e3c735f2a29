//! Load-detection state machine for the embedded article viewer.
//!
//! A cross-origin embedded document gives the host no reliable
//! "content painted" signal, so each attempt races several weak heuristics:
//! the native load/error signals, a periodic same-origin probe, an explicit
//! readiness message, and an optimistic deadline. The first signal to land
//! wins and every other timer for the attempt is cancelled.

use std::time::Duration;

use crate::effect::Effect;
use crate::highlight;

/// Identifies one embed attempt. Bumped on every navigation so that a stale
/// attempt's late-firing timers cannot touch a newer attempt.
pub type AttemptId = u64;

/// How often the same-origin probe runs while an attempt is loading.
pub const PROBE_INTERVAL: Duration = Duration::from_millis(500);

/// Optimistic fallback deadline for externally hosted documents. Local proxy
/// documents resolve immediately instead.
pub const EXTERNAL_DEADLINE: Duration = Duration::from_secs(8);

/// Lifecycle of one embed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Initial,
    Loading,
    Ready,
    Error,
}

impl LoadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Ready | LoadState::Error)
    }
}

/// A detection signal reported back for a specific attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedSignal {
    /// Native load-complete signal from the embedding element.
    FrameLoaded,
    /// Native load-error signal.
    FrameFailed,
    /// The periodic probe introspected the document without failing.
    ProbeSucceeded,
    /// The embedded content posted an explicit readiness message.
    ReadyMessage { origin: String },
    /// The bounded fallback deadline elapsed with no other signal.
    DeadlineElapsed,
}

/// The document an attempt is pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSource {
    pub url: String,
    pub highlight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmbedWidget {
    attempt: AttemptId,
    state: LoadState,
    source: Option<EmbedSource>,
}

impl EmbedWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn source(&self) -> Option<&EmbedSource> {
        self.source.as_ref()
    }

    /// URL rendered inside the frame, highlight applied.
    pub fn frame_url(&self) -> Option<String> {
        let source = self.source.as_ref()?;
        Some(highlight::compose(
            &source.url,
            source.highlight.as_deref().unwrap_or(""),
        ))
    }

    /// URL for the "open in new tab" fallback: always the external document.
    pub fn fallback_url(&self) -> Option<String> {
        let source = self.source.as_ref()?;
        Some(highlight::page_url(
            &source.url,
            source.highlight.as_deref(),
        ))
    }

    /// Point the widget at a new document, restarting detection under a
    /// fresh attempt id. The previous attempt's timers are cancelled before
    /// the new ones start.
    pub fn navigate(&mut self, url: String, highlight_text: Option<String>) -> Vec<Effect> {
        let stale = self.current_attempt_effects();
        let deadline = if highlight::is_proxy_url(&url) {
            Duration::ZERO
        } else {
            EXTERNAL_DEADLINE
        };

        self.attempt += 1;
        self.state = LoadState::Loading;
        self.source = Some(EmbedSource {
            url,
            highlight: highlight_text.filter(|text| !text.trim().is_empty()),
        });

        let mut effects = stale;
        effects.push(Effect::StartEmbedAttempt {
            attempt: self.attempt,
            url: self.frame_url().unwrap_or_default(),
            probe_interval: PROBE_INTERVAL,
            deadline,
        });
        effects
    }

    /// Drop the widget's target entirely, cancelling the active attempt.
    pub fn clear(&mut self) -> Vec<Effect> {
        let effects = self.current_attempt_effects();
        self.state = LoadState::Initial;
        self.source = None;
        effects
    }

    /// Apply a detection signal. Signals for any attempt other than the
    /// current one, or arriving after a terminal state, are ignored.
    pub fn apply_signal(&mut self, attempt: AttemptId, signal: EmbedSignal) -> Vec<Effect> {
        if attempt != self.attempt || self.state != LoadState::Loading {
            return Vec::new();
        }

        let next = match signal {
            EmbedSignal::FrameLoaded | EmbedSignal::ProbeSucceeded => Some(LoadState::Ready),
            EmbedSignal::FrameFailed => Some(LoadState::Error),
            EmbedSignal::ReadyMessage { origin } => {
                // Only the embedded document's own origin may declare it ready.
                if self.document_origin().as_deref() == Some(origin.as_str()) {
                    Some(LoadState::Ready)
                } else {
                    None
                }
            }
            EmbedSignal::DeadlineElapsed => Some(if self.source.is_some() {
                LoadState::Ready
            } else {
                LoadState::Error
            }),
        };

        match next {
            Some(state) => {
                self.state = state;
                vec![Effect::CancelEmbedAttempt {
                    attempt: self.attempt,
                }]
            }
            None => Vec::new(),
        }
    }

    fn document_origin(&self) -> Option<String> {
        self.source
            .as_ref()
            .and_then(|source| highlight::origin_of(&source.url))
    }

    fn current_attempt_effects(&self) -> Vec<Effect> {
        if self.attempt == 0 {
            Vec::new()
        } else {
            vec![Effect::CancelEmbedAttempt {
                attempt: self.attempt,
            }]
        }
    }
}
