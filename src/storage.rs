//! Key-value shadow store for client state (cart, favorites, theme, session).
//!
//! The in-memory application state is the source of truth during a session;
//! storage is a write-through shadow read once at startup. Execution contexts
//! without durable storage inject [`NoopStorage`] and everything degrades to
//! in-memory behavior without errors.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Well-known storage keys.
pub mod keys {
    pub const CART: &str = "cart";
    pub const FAVORITES: &str = "favorites";
    pub const THEME: &str = "theme";
    pub const USER: &str = "user";
    pub const AUTH_TOKEN: &str = "authToken";
}

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

pub type SharedStorage = Arc<dyn Storage>;

/// Deserialize a stored value. Corrupt entries are dropped and the key
/// removed, so a bad write can never wedge startup.
pub fn read_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding corrupt stored value");
            storage.remove(key);
            None
        }
    }
}

pub fn write_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => storage.set(key, &raw),
        Err(err) => tracing::warn!(key, error = %err, "failed to serialize value for storage"),
    }
}

/// Volatile map-backed storage for tests and short-lived sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// Storage for contexts with no persistence at all: reads come back absent,
/// writes vanish, nothing ever fails.
pub struct NoopStorage;

impl Storage for NoopStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}
}

/// Single-file JSON storage, written through on every mutation.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn load(path: &Path) -> HashMap<String, String> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "discarding corrupt storage file");
                HashMap::new()
            }
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(error = %err, "failed to create storage directory");
                return;
            }
        }
        match serde_json::to_string_pretty(entries) {
            Ok(raw) => {
                if let Err(err) = fs::write(&self.path, raw) {
                    tracing::warn!(path = %self.path.display(), error = %err, "failed to write storage file");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to serialize storage file"),
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        self.flush(&entries);
    }
}
