//! Terminal stand-in for the provider popup window.
//!
//! There is no browser to post a message back, so the "window" is the user's
//! own browser plus a paste: the opener prints the provider URL, and the
//! shell feeds the pasted result payload into the flow's message channel.
//! Dropping the channel sender cancels the flow, exactly like closing the
//! popup would.

use std::sync::{Arc, Mutex};

use client_logging::client_warn;
use tokio::sync::mpsc;
use wikifix_client::{AuthError, AuthMessage, PopupHandle, PopupOpener};

/// Slot holding the sender side of the active login, if one is running.
pub(crate) type AuthInbox = Arc<Mutex<Option<mpsc::Sender<AuthMessage>>>>;

pub(crate) struct TerminalPopupOpener {
    inbox: AuthInbox,
}

impl TerminalPopupOpener {
    pub(crate) fn new() -> (Self, AuthInbox) {
        let inbox: AuthInbox = Arc::new(Mutex::new(None));
        (
            Self {
                inbox: inbox.clone(),
            },
            inbox,
        )
    }
}

impl PopupOpener for TerminalPopupOpener {
    fn open(
        &self,
        url: &str,
    ) -> Result<(Box<dyn PopupHandle>, mpsc::Receiver<AuthMessage>), AuthError> {
        let (tx, rx) = mpsc::channel(8);
        match self.inbox.lock() {
            Ok(mut slot) => *slot = Some(tx),
            Err(_) => return Err(AuthError::PopupBlocked),
        }

        println!();
        println!("Open this URL in your browser to sign in:");
        println!("  {url}");
        println!("Then paste the result payload here, or type `cancel`.");
        println!();

        Ok((Box::new(TerminalPopup), rx))
    }
}

/// The printed URL cannot report being closed; cancellation happens by
/// dropping the sender out of the inbox instead.
struct TerminalPopup;

impl PopupHandle for TerminalPopup {
    fn is_closed(&self) -> bool {
        false
    }

    fn close(&self) {}
}

/// Route a pasted payload into the active login, if any.
pub(crate) fn deliver_payload(inbox: &AuthInbox, api_origin: &str, payload: serde_json::Value) {
    let Ok(slot) = inbox.lock() else {
        return;
    };
    match slot.as_ref() {
        Some(tx) => {
            if tx
                .try_send(AuthMessage {
                    origin: api_origin.to_string(),
                    payload,
                })
                .is_err()
            {
                client_warn!("login flow is gone; payload dropped");
            }
        }
        None => println!("No login in progress. Type `login` first."),
    }
}

/// Cancel the active login by closing its message channel.
pub(crate) fn cancel_login(inbox: &AuthInbox) {
    if let Ok(mut slot) = inbox.lock() {
        if slot.take().is_some() {
            println!("Login cancelled.");
        }
    }
}
