//! Persisted search history
//!
//! History is a single JSON array under one key in an injected key-value
//! store, mirroring the browser-local storage it replaces. Appends are whole
//! read-modify-write cycles with no concurrency control; that is acceptable
//! for one caller at a time.

use crate::{Page, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Storage key holding the whole history array.
pub const HISTORY_KEY: &str = "history";

/// One fetch event: exactly one page, stamped when it was appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub pages: Vec<Page>,
    pub date: DateTime<Utc>,
}

/// Key-value persistence capability, injected so callers can substitute an
/// in-memory store.
pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// File-backed store keeping one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at the platform data directory.
    pub fn open() -> Option<Self> {
        ProjectDirs::from("com", "magpie", "magpie")
            .map(|dirs| Self::at(dirs.data_dir().to_path_buf()))
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Append-only history over an injected store.
#[derive(Debug)]
pub struct HistoryStore<S: Store> {
    store: S,
}

impl<S: Store> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append one page as a new entry, rewriting the whole array.
    pub fn append(&mut self, page: &Page) -> Result<()> {
        let mut entries = self.list();
        entries.push(HistoryEntry {
            pages: vec![page.clone()],
            date: Utc::now(),
        });
        self.store.set(HISTORY_KEY, &serde_json::to_string(&entries)?)
    }

    /// All recorded entries, oldest first. A missing or unreadable payload
    /// reads as an empty history.
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.store
            .get(HISTORY_KEY)
            .map(|raw| serde_json::from_str(&raw).unwrap_or_default())
            .unwrap_or_default()
    }

    /// Drop the whole history atomically by removing the key.
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(HISTORY_KEY)
    }
}
