//! Typed client session over the string key-value store.
//!
//! The store holds plain JSON blobs under fixed keys. Reads validate each
//! blob against the expected shape; anything missing or malformed is treated
//! as absent and reported so the shell can log it, never as a hard error.

use serde::{Deserialize, Serialize};

/// Storage keys. The blobs are unversioned JSON.
pub mod keys {
    pub const USER: &str = "wikifacts_user";
    pub const TOPICS: &str = "wikifacts_topics";
    pub const LANGUAGES: &str = "wikifacts_languages";
    pub const WIKIPEDIA_USERNAME: &str = "wikifacts_wikipedia_username";
    pub const COMPLETED_TASKS: &str = "wikifacts_completed_tasks";

    pub const ALL: [&str; 5] = [USER, TOPICS, LANGUAGES, WIKIPEDIA_USERNAME, COMPLETED_TASKS];
}

/// String key-value store the session persists through. Mirrors the browser
/// local-storage contract: whole-value get/set/remove, no partial updates.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// The signed-in user, as delivered by the auth handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub token: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub needs_onboarding: Option<bool>,
}

impl AuthUser {
    /// First word of the display name, for greetings.
    pub fn first_name(&self) -> Option<&str> {
        self.name.as_deref().and_then(|name| name.split_whitespace().next())
    }
}

/// A stored blob that failed schema validation on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub key: &'static str,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub user: Option<AuthUser>,
    pub topics: Vec<String>,
    pub languages: Vec<String>,
    pub wikipedia_username: Option<String>,
    pub completed_tasks: u64,
}

impl Session {
    /// Read the whole session from the store. Invalid blobs fall back to the
    /// field default and are reported as violations.
    pub fn load(store: &dyn SessionStore) -> (Self, Vec<SchemaViolation>) {
        let mut violations = Vec::new();
        let session = Self {
            user: read_key(store, keys::USER, &mut violations),
            topics: read_key(store, keys::TOPICS, &mut violations).unwrap_or_default(),
            languages: read_key(store, keys::LANGUAGES, &mut violations).unwrap_or_default(),
            wikipedia_username: read_key(store, keys::WIKIPEDIA_USERNAME, &mut violations),
            completed_tasks: read_key(store, keys::COMPLETED_TASKS, &mut violations)
                .unwrap_or_default(),
        };
        (session, violations)
    }

    /// Write the whole session back. Fields at their defaults clear their key
    /// so a later load does not resurrect stale data.
    pub fn save(&self, store: &mut dyn SessionStore) {
        write_key(store, keys::USER, self.user.as_ref());
        write_key(
            store,
            keys::TOPICS,
            (!self.topics.is_empty()).then_some(&self.topics),
        );
        write_key(
            store,
            keys::LANGUAGES,
            (!self.languages.is_empty()).then_some(&self.languages),
        );
        write_key(
            store,
            keys::WIKIPEDIA_USERNAME,
            self.wikipedia_username.as_ref(),
        );
        write_key(
            store,
            keys::COMPLETED_TASKS,
            (self.completed_tasks != 0).then_some(&self.completed_tasks),
        );
    }

    /// Remove the onboarding scratch keys after interests were accepted.
    pub fn clear_onboarding_scratch(store: &mut dyn SessionStore) {
        store.remove(keys::TOPICS);
        store.remove(keys::LANGUAGES);
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.token.as_str())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.id.as_str())
    }
}

fn read_key<T: serde::de::DeserializeOwned>(
    store: &dyn SessionStore,
    key: &'static str,
    violations: &mut Vec<SchemaViolation>,
) -> Option<T> {
    let blob = store.get(key)?;
    match serde_json::from_str(&blob) {
        Ok(value) => Some(value),
        Err(err) => {
            violations.push(SchemaViolation {
                key,
                detail: err.to_string(),
            });
            None
        }
    }
}

fn write_key<T: Serialize>(store: &mut dyn SessionStore, key: &str, value: Option<T>) {
    match value {
        Some(value) => match serde_json::to_string(&value) {
            Ok(blob) => store.set(key, blob),
            // Serializing plain data cannot fail; leave the key untouched.
            Err(_) => {}
        },
        None => store.remove(key),
    }
}
