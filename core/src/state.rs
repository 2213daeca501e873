//! Persisted client state: the selected workspace, project and the last
//! visited URL.
//!
//! Plain get/set/remove over three fixed keys, no versioning or migration.
//! `MemoryStore` lives for the process; `FileStore` keeps a flat JSON object
//! on disk and rewrites it through a temp file + rename on every change.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unknown state key '{0}' (expected workspace_id, project_id or current_url)")]
    UnknownKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StateKey {
    WorkspaceId,
    ProjectId,
    CurrentUrl,
}

impl StateKey {
    pub const ALL: [StateKey; 3] = [StateKey::WorkspaceId, StateKey::ProjectId, StateKey::CurrentUrl];

    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::WorkspaceId => "workspace_id",
            StateKey::ProjectId => "project_id",
            StateKey::CurrentUrl => "current_url",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateKey {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| StateError::UnknownKey(s.to_string()))
    }
}

pub trait StateStore {
    fn get(&self, key: StateKey) -> Result<Option<String>, StateError>;
    fn set(&self, key: StateKey, value: &str) -> Result<(), StateError>;
    fn remove(&self, key: StateKey) -> Result<(), StateError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<StateKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, BTreeMap<StateKey, String>> {
        // A poisoned map is still a valid map.
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: StateKey) -> Result<Option<String>, StateError> {
        Ok(self.values().get(&key).cloned())
    }

    fn set(&self, key: StateKey, value: &str) -> Result<(), StateError> {
        self.values().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StateKey) -> Result<(), StateError> {
        self.values().remove(&key);
        Ok(())
    }
}

/// File-backed store. Unknown keys already present in the file are kept.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StateError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StateError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "state file unreadable; starting empty");
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StateError> {
        let io_err = |source: std::io::Error| StateError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(map)?).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl StateStore for FileStore {
    fn get(&self, key: StateKey) -> Result<Option<String>, StateError> {
        Ok(self.load()?.remove(key.as_str()))
    }

    fn set(&self, key: StateKey, value: &str) -> Result<(), StateError> {
        let mut map = self.load()?;
        map.insert(key.as_str().to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&self, key: StateKey) -> Result<(), StateError> {
        let mut map = self.load()?;
        if map.remove(key.as_str()).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn StateStore) {
        assert_eq!(store.get(StateKey::ProjectId).unwrap(), None);

        store.set(StateKey::ProjectId, "p-1").unwrap();
        store.set(StateKey::CurrentUrl, "/projects/p-1").unwrap();
        assert_eq!(store.get(StateKey::ProjectId).unwrap().as_deref(), Some("p-1"));

        store.set(StateKey::ProjectId, "p-2").unwrap();
        assert_eq!(store.get(StateKey::ProjectId).unwrap().as_deref(), Some("p-2"));

        store.remove(StateKey::ProjectId).unwrap();
        assert_eq!(store.get(StateKey::ProjectId).unwrap(), None);
        assert_eq!(
            store.get(StateKey::CurrentUrl).unwrap().as_deref(),
            Some("/projects/p-1")
        );

        // Removing an absent key is not an error.
        store.remove(StateKey::WorkspaceId).unwrap();
    }

    #[test]
    fn memory_store_get_set_remove() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn file_store_get_set_remove() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileStore::new(dir.path().join("nested").join("state.json")));
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        FileStore::new(&path).set(StateKey::WorkspaceId, "ws-9").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(StateKey::WorkspaceId).unwrap().as_deref(), Some("ws-9"));

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["workspace_id"], "ws-9");
    }

    #[test]
    fn file_store_keeps_foreign_keys_and_tolerates_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();
        let store = FileStore::new(&path);
        store.set(StateKey::ProjectId, "p").unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");

        fs::write(&path, "not json").unwrap();
        assert_eq!(store.get(StateKey::ProjectId).unwrap(), None);
    }

    #[test]
    fn keys_parse_from_their_names() {
        for key in StateKey::ALL {
            assert_eq!(key.as_str().parse::<StateKey>().unwrap(), key);
        }
        assert!(matches!(
            "token".parse::<StateKey>(),
            Err(StateError::UnknownKey(_))
        ));
    }
}
