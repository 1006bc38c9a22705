//! Session persistence.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{SessionRecord, StoreError};

/// Key under which the session record is stored.
pub const SESSION_RECORD_KEY: &str = "userKeyData";

/// Storage for the single session record of this device.
pub trait SessionStore: Send + Sync {
    /// Read the record, `None` if nothing was stored yet.
    fn load(&self) -> Result<Option<SessionRecord>, StoreError>;
    /// Replace the stored record.
    fn save(&self, record: &SessionRecord) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Session store backed by a JSON file.
///
/// The file holds a JSON object; the record lives under
/// [`SESSION_RECORD_KEY`] and other keys are preserved on save.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Io(format!("failed to read session file: {e}")))?;
        match serde_json::from_str(&json) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Corrupt("session file is not a JSON object".into())),
            Err(e) => Err(StoreError::Corrupt(format!("invalid session JSON: {e}"))),
        }
    }

    fn write_object(&self, map: Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Io(format!("failed to create session dir: {e}")))?;
            }
        }
        let json = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| StoreError::Corrupt(format!("JSON serialization failed: {e}")))?;
        std::fs::write(&self.path, json)
            .map_err(|e| StoreError::Io(format!("failed to write session file: {e}")))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, StoreError> {
        let mut map = self.read_object()?;
        match map.remove(SESSION_RECORD_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::Corrupt(format!("invalid session record: {e}"))),
        }
    }

    fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut map = self.read_object()?;
        let value = serde_json::to_value(record)
            .map_err(|e| StoreError::Corrupt(format!("JSON serialization failed: {e}")))?;
        map.insert(SESSION_RECORD_KEY.to_string(), value);
        self.write_object(map)?;
        tracing::debug!(path = %self.path.display(), "session record saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut map = self.read_object()?;
        if map.remove(SESSION_RECORD_KEY).is_some() {
            self.write_object(map)?;
        }
        Ok(())
    }
}

/// In-memory session store.
#[derive(Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionRecord>, StoreError> {
        let guard = self
            .record
            .lock()
            .map_err(|_| StoreError::Io("session store lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| StoreError::Io("session store lock poisoned".into()))?;
        *guard = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| StoreError::Io("session store lock poisoned".into()))?;
        *guard = None;
        Ok(())
    }
}
