//! Salt cache keyed by subject. Entries are never invalidated or replaced.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::SaltError;

pub trait SaltCache: Send + Sync {
    fn get(&self, subject: &str) -> Result<Option<String>, SaltError>;

    /// Record `salt` for `subject` unless the subject already has one.
    /// First write wins; returns the salt now held for the subject.
    fn put(&self, subject: &str, salt: &str) -> Result<String, SaltError>;
}

#[derive(Default)]
pub struct MemorySaltCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySaltCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SaltCache for MemorySaltCache {
    fn get(&self, subject: &str) -> Result<Option<String>, SaltError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SaltError::Cache("lock poisoned".into()))?;
        Ok(entries.get(subject).cloned())
    }

    fn put(&self, subject: &str, salt: &str) -> Result<String, SaltError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SaltError::Cache("lock poisoned".into()))?;
        Ok(entries
            .entry(subject.to_string())
            .or_insert_with(|| salt.to_string())
            .clone())
    }
}

/// Salt cache persisted as a JSON object `{ subject: salt }`.
///
/// The whole map is loaded at open and rewritten on every `put`.
pub struct FileSaltCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileSaltCache {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaltError> {
        let path = path.into();
        let entries = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| SaltError::Cache(format!("failed to read salt cache: {e}")))?;
            serde_json::from_str(&json)
                .map_err(|e| SaltError::Cache(format!("invalid salt cache JSON: {e}")))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }
}

impl SaltCache for FileSaltCache {
    fn get(&self, subject: &str) -> Result<Option<String>, SaltError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SaltError::Cache("lock poisoned".into()))?;
        Ok(entries.get(subject).cloned())
    }

    fn put(&self, subject: &str, salt: &str) -> Result<String, SaltError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SaltError::Cache("lock poisoned".into()))?;
        if let Some(held) = entries.get(subject) {
            return Ok(held.clone());
        }
        entries.insert(subject.to_string(), salt.to_string());
        let json = serde_json::to_string_pretty(&*entries)
            .map_err(|e| SaltError::Cache(format!("JSON serialization failed: {e}")))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SaltError::Cache(format!("failed to create cache dir: {e}")))?;
            }
        }
        std::fs::write(&self.path, json)
            .map_err(|e| SaltError::Cache(format!("failed to write salt cache: {e}")))?;
        Ok(salt.to_string())
    }
}
