// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted client state: the session token.
//!
//! Mirrors browser local storage: a flat string map with the token under a
//! fixed key. Storage failures are logged and otherwise ignored, the same
//! way a full or disabled local storage would behave.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "token";

/// Where the session token lives between runs.
pub trait TokenStorage: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

/// Process-lifetime storage, for tests and embedded use.
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that starts out holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn set(&self, token: &str) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }
}

/// JSON file storage, shared by every `codeopt` invocation.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/code-optimizer/storage.json`, if the platform has a data
    /// directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("code-optimizer").join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Map<String, Value> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read token storage");
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::warn!(path = %self.path.display(), "Token storage is corrupt, ignoring");
                Map::new()
            }
        }
    }

    fn save(&self, map: &Map<String, Value>) {
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(map)?;
            std::fs::write(&self.path, json)
        })();

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write token storage");
        }
    }
}

impl TokenStorage for FileTokenStorage {
    fn get(&self) -> Option<String> {
        self.load()
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set(&self, token: &str) {
        let mut map = self.load();
        map.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.save(&map);
    }

    fn clear(&self) {
        let mut map = self.load();
        if map.remove(TOKEN_KEY).is_some() {
            self.save(&map);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryTokenStorage::new();
        assert_eq!(storage.get(), None);
        storage.set("abc");
        assert_eq!(storage.get().as_deref(), Some("abc"));
        storage.clear();
        storage.clear();
        assert_eq!(storage.get(), None);
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        FileTokenStorage::new(&path).set("abc");
        assert_eq!(FileTokenStorage::new(&path).get().as_deref(), Some("abc"));

        FileTokenStorage::new(&path).clear();
        assert_eq!(FileTokenStorage::new(&path).get(), None);
    }

    #[test]
    fn test_file_storage_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let storage = FileTokenStorage::new(&path);
        storage.set("abc");
        storage.clear();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\""));
        assert!(!raw.contains("abc"));
    }

    #[test]
    fn test_file_storage_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileTokenStorage::new(&path);
        assert_eq!(storage.get(), None);
        storage.set("abc");
        assert_eq!(storage.get().as_deref(), Some("abc"));
    }
}
