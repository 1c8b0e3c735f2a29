use client_logging::{client_info, client_warn};
use wikifix_client::FileStore;
use wikifix_core::Session;

/// Load the session from the store, logging any blob that failed validation.
pub(crate) fn load_session(store: &FileStore) -> Session {
    let (session, violations) = Session::load(store);
    for violation in &violations {
        client_warn!(
            "Ignoring invalid stored value for {}: {}",
            violation.key,
            violation.detail
        );
    }
    if session.user.is_some() {
        client_info!("Restored signed-in session");
    }
    session
}

/// Write the session back through the store.
pub(crate) fn save_session(store: &mut FileStore, session: &Session) {
    session.save(store);
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikifix_core::{keys, AuthUser, SessionStore};

    fn sample_session() -> Session {
        Session {
            user: Some(AuthUser {
                id: "u1".to_string(),
                email: "ada@example.com".to_string(),
                token: "tok".to_string(),
                name: None,
                picture: None,
                needs_onboarding: None,
            }),
            topics: vec!["science".to_string()],
            languages: Vec::new(),
            wikipedia_username: None,
            completed_tasks: 3,
        }
    }

    #[test]
    fn session_survives_a_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::open(dir.path()).expect("open");
        save_session(&mut store, &sample_session());
        drop(store);

        let store = FileStore::open(dir.path()).expect("reopen");
        assert_eq!(load_session(&store), sample_session());
    }

    #[test]
    fn corrupt_user_blob_degrades_to_signed_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::open(dir.path()).expect("open");
        save_session(&mut store, &sample_session());
        store.set(keys::USER, "{broken".to_string());

        let session = load_session(&store);
        assert!(session.user.is_none());
        assert_eq!(session.topics, vec!["science".to_string()]);
    }
}
