//! File-backed session store.
//!
//! Persists the session map as a JSON object so that separate CLI runs
//! sharing one file behave like page loads within one browser session.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::SessionError;

use super::SessionStore;

/// Session store persisted to a JSON file.
///
/// The whole map is read once at [`open`](Self::open) and rewritten on every
/// [`set`](SessionStore::set).
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Opens the store at `path`. A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Io` if the file exists but cannot be read,
    /// or `SessionError::Corrupt` if it is not a JSON string map.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| SessionError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "session file absent; starting new session");
                BTreeMap::new()
            }
            Err(source) => return Err(SessionError::Io { path, source }),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("session store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().expect("session store lock poisoned");
        let mut next = entries.clone();
        next.insert(key.to_owned(), value.to_owned());
        let json = serde_json::to_string_pretty(&next)?;

        // lock stays held across the write
        std::fs::write(&self.path, json).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })?;
        *entries = next;
        Ok(())
    }
}
