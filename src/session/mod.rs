//! Session-scoped key-value storage
//!
//! The host page gates the intro on a single flag kept in a session store.
//! The store is injected rather than ambient so tests can substitute an
//! in-memory fake and the CLI can persist a "browser session" across runs.

mod file;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::SessionError;

pub use file::FileSessionStore;

/// Key under which the intro-shown flag is stored.
pub const INTRO_SHOWN_KEY: &str = "introShown";

/// String key-value store scoped to one browsing session.
///
/// Methods take `&self`; implementations use interior mutability so a
/// single store can be shared between page mounts via `Arc`.
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if a persistent store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
}

/// Returns whether the intro has already been shown this session.
///
/// Any non-empty value counts as set; an absent key is unset.
#[must_use]
pub fn intro_shown(store: &dyn SessionStore) -> bool {
    store
        .get(INTRO_SHOWN_KEY)
        .is_some_and(|value| !value.is_empty())
}

/// Records that the intro has been shown this session.
///
/// # Errors
///
/// Propagates the store's write error.
pub fn mark_intro_shown(store: &dyn SessionStore) -> Result<(), SessionError> {
    store.set(INTRO_SHOWN_KEY, "true")
}

/// In-memory session store. Lives exactly as long as the value.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("session store lock poisoned").len()
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("session store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries
            .lock()
            .expect("session store lock poisoned")
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
