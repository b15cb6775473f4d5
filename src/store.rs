//! Persistent key/value storage for the auth token, settings, and
//! daily-login date.
//!
//! Mirrors the extension-storage contract: `get`/`set`/`remove` over JSON
//! values. The file-backed store keeps one `<key>.json` per key under
//! `~/.factflow/`; an in-memory store backs tests.

use crate::error::Result;
use crate::models::Settings;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

pub const KEY_TOKEN: &str = "auth_token";
pub const KEY_SETTINGS: &str = "settings";
pub const KEY_LAST_LOGIN: &str = "last_login";

/// Application data directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".factflow")
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One JSON file per key under a base directory, created lazily.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(&value)?;
        fs::write(self.path(key), json)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// HashMap-backed store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().expect("store lock").get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries
            .lock()
            .expect("store lock")
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().expect("store lock").remove(key);
        Ok(())
    }
}

// Typed accessors for the three persisted keys.

pub fn load_token(store: &dyn KeyValueStore) -> Result<Option<String>> {
    Ok(store
        .get(KEY_TOKEN)?
        .and_then(|v| v.as_str().map(str::to_string)))
}

pub fn save_token(store: &dyn KeyValueStore, token: &str) -> Result<()> {
    store.set(KEY_TOKEN, Value::String(token.to_string()))
}

pub fn clear_token(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(KEY_TOKEN)
}

/// Settings fall back to defaults when missing or unreadable; a corrupt
/// settings file must not lock the user out.
pub fn load_settings(store: &dyn KeyValueStore) -> Settings {
    store
        .get(KEY_SETTINGS)
        .ok()
        .flatten()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

pub fn save_settings(store: &dyn KeyValueStore, settings: &Settings) -> Result<()> {
    store.set(KEY_SETTINGS, serde_json::to_value(settings)?)
}

pub fn load_last_login(store: &dyn KeyValueStore) -> Result<Option<String>> {
    Ok(store
        .get(KEY_LAST_LOGIN)?
        .and_then(|v| v.as_str().map(str::to_string)))
}

pub fn save_last_login(store: &dyn KeyValueStore, date: &str) -> Result<()> {
    store.set(KEY_LAST_LOGIN, Value::String(date.to_string()))
}
