//! Timer executor for embed load-detection attempts.
//!
//! The core decides what an attempt means; this driver gives it real clocks.
//! Per attempt it runs up to three tasks: one initial document fetch that
//! stands in for the native load/error signal, a periodic probe that only
//! introspects same-origin documents, and the fallback deadline. Cancelling
//! an attempt aborts all of them, so a stale attempt can never report back.

use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Duration;

use client_logging::client_trace;
use tokio::task::AbortHandle;
use url::Url;
use wikifix_core::{AttemptId, EmbedSignal};

pub struct EmbedDriver {
    base_url: Url,
    client: reqwest::Client,
    signals: mpsc::Sender<(AttemptId, EmbedSignal)>,
    attempts: HashMap<AttemptId, Vec<AbortHandle>>,
}

impl EmbedDriver {
    pub fn new(
        base_url: Url,
        client: reqwest::Client,
        signals: mpsc::Sender<(AttemptId, EmbedSignal)>,
    ) -> Self {
        Self {
            base_url,
            client,
            signals,
            attempts: HashMap::new(),
        }
    }

    /// Start the detection tasks for an attempt. Must run inside a tokio
    /// runtime context.
    pub fn start(
        &mut self,
        attempt: AttemptId,
        url: &str,
        probe_interval: Duration,
        deadline: Duration,
    ) {
        // Restarting the same attempt id replaces its tasks.
        self.cancel(attempt);
        let mut handles = Vec::with_capacity(3);

        match self.resolve(url) {
            Some(document) => {
                handles.push(self.spawn_native_fetch(attempt, document.clone()));
                if self.is_same_origin(&document) {
                    handles.push(self.spawn_probe(attempt, document, probe_interval));
                }
            }
            None => {
                // No fetchable target behaves like a native error.
                let _ = self.signals.send((attempt, EmbedSignal::FrameFailed));
            }
        }

        handles.push(self.spawn_deadline(attempt, deadline));
        self.attempts.insert(attempt, handles);
    }

    /// Abort every pending task of an attempt.
    pub fn cancel(&mut self, attempt: AttemptId) {
        if let Some(handles) = self.attempts.remove(&attempt) {
            client_trace!("cancelling embed attempt {attempt}");
            for handle in handles {
                handle.abort();
            }
        }
    }

    fn resolve(&self, url: &str) -> Option<Url> {
        Url::parse(url)
            .or_else(|_| self.base_url.join(url))
            .ok()
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }

    fn spawn_native_fetch(&self, attempt: AttemptId, document: Url) -> AbortHandle {
        let client = self.client.clone();
        let signals = self.signals.clone();
        tokio::spawn(async move {
            let signal = match client.get(document).send().await {
                Ok(response) if response.status().is_success() => EmbedSignal::FrameLoaded,
                Ok(_) | Err(_) => EmbedSignal::FrameFailed,
            };
            let _ = signals.send((attempt, signal));
        })
        .abort_handle()
    }

    fn spawn_probe(&self, attempt: AttemptId, document: Url, every: Duration) -> AbortHandle {
        let client = self.client.clone();
        let signals = self.signals.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(every);
            loop {
                ticks.tick().await;
                match client.head(document.clone()).send().await {
                    Ok(response) if response.status().is_success() => {
                        let _ = signals.send((attempt, EmbedSignal::ProbeSucceeded));
                        return;
                    }
                    // Not ready yet; the probe abstains and tries again.
                    Ok(_) | Err(_) => {}
                }
            }
        })
        .abort_handle()
    }

    fn spawn_deadline(&self, attempt: AttemptId, deadline: Duration) -> AbortHandle {
        let signals = self.signals.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            let _ = signals.send((attempt, EmbedSignal::DeadlineElapsed));
        })
        .abort_handle()
    }
}

impl Drop for EmbedDriver {
    fn drop(&mut self) {
        let attempts: Vec<AttemptId> = self.attempts.keys().copied().collect();
        for attempt in attempts {
            self.cancel(attempt);
        }
    }
}
