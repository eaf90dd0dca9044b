//! Key → blob storage shared by every process.
//!
//! The backend is replicated and last-write-wins per key. Nothing is
//! atomic across keys and a concurrent writer may replace a key between
//! any read and write made here. Callers re-read right before writing.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Well-known keys
pub mod keys {
    pub const WORDS: &str = "vocabulary-words";
    pub const SETTINGS: &str = "settings";
    pub const ACTIVITIES: &str = "learning-activities";
    pub const STUDY_LISTS: &str = "study-lists";
}

pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when the key has never been written
    fn get_value(&self, key: &str) -> Result<Option<Value>>;

    fn set_value(&self, key: &str, value: &Value) -> Result<()>;
}

/// In-process store. Failures can be switched on to exercise degraded paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl RecordStore for MemoryStore {
    fn get_value(&self, key: &str) -> Result<Option<Value>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("read of {}", key)));
        }
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set_value(&self, key: &str, value: &Value) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("write of {}", key)));
        }
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// One JSON file per key.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader in another process sees either the old or the new blob.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|p| p.join("lexicard"))
    }

    /// Initialize storage directory
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl RecordStore for FileStore {
    fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn set_value(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.base_path)?;

        let tmp_path = self
            .base_path
            .join(format!(".{}.{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_path, serde_json::to_string_pretty(value)?)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_last_write_wins() {
        let store = MemoryStore::new();
        assert!(store.get_value(keys::WORDS).unwrap().is_none());

        store.set_value(keys::WORDS, &json!([1])).unwrap();
        store.set_value(keys::WORDS, &json!([2])).unwrap();
        assert_eq!(store.get_value(keys::WORDS).unwrap(), Some(json!([2])));
    }

    #[test]
    fn test_memory_store_fault_injection() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(store.set_value(keys::WORDS, &json!([])).is_err());
        store.set_fail_writes(false);
        store.set_value(keys::WORDS, &json!([])).unwrap();

        store.set_fail_reads(true);
        assert!(store.get_value(keys::WORDS).is_err());
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("data"));
        store.init().unwrap();

        assert!(store.get_value(keys::STUDY_LISTS).unwrap().is_none());
        let value = json!([{ "id": "default-thai", "wordIds": ["a"] }]);
        store.set_value(keys::STUDY_LISTS, &value).unwrap();
        assert_eq!(store.get_value(keys::STUDY_LISTS).unwrap(), Some(value));

        // No temporary files left behind
        let leftovers = fs::read_dir(store.base_path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().to_path_buf());
        assert!(matches!(
            store.set_value("../escape", &json!(1)),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_file_store_corrupt_blob_is_error() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().to_path_buf());
        fs::write(temp.path().join("settings.json"), "{ not json").unwrap();
        assert!(matches!(
            store.get_value(keys::SETTINGS),
            Err(StoreError::Json(_))
        ));
    }
}
