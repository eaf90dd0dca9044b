//! Typed access to the store's top-level collections.
//!
//! Reads never fail: an unreachable or unreadable key is an empty
//! collection. Writes are best-effort and report success as a bool.
//! Read-modify-write goes through `update*`, which takes a fresh snapshot
//! for every call and skips the write entirely when that snapshot could
//! not be read, so an outage never turns into "overwrite with empty".

use std::sync::Arc;

use serde_json::Value;

use super::models::{ActivityRecord, Settings, StoredRecord, StudyList, WordRecord};
use super::record_store::{keys, RecordStore};

#[derive(Clone)]
pub struct Collections {
    store: Arc<dyn RecordStore>,
}

impl Collections {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Latest snapshot of a collection, or `None` when it could not be read
    fn snapshot<T: StoredRecord>(&self, key: &str) -> Option<Vec<T>> {
        match self.store.get_value(key) {
            Ok(None) | Ok(Some(Value::Null)) => Some(Vec::new()),
            Ok(Some(Value::Array(items))) => Some(
                items
                    .iter()
                    .filter_map(|item| {
                        let record = T::from_stored(item);
                        if record.is_none() {
                            log::warn!("Store: dropping unreadable {} in {}", T::KIND, key);
                        }
                        record
                    })
                    .collect(),
            ),
            Ok(Some(_)) => {
                log::warn!("Store: {} does not hold a list, ignoring it", key);
                None
            }
            Err(e) => {
                log::warn!("Store: read of {} failed: {}", key, e);
                None
            }
        }
    }

    pub fn load<T: StoredRecord>(&self, key: &str) -> Vec<T> {
        self.snapshot(key).unwrap_or_default()
    }

    pub fn save<T: StoredRecord>(&self, key: &str, records: &[T]) -> bool {
        self.write(key, serde_json::to_value(records))
    }

    /// Read the freshest snapshot, let `f` modify it and write it back.
    /// `f` returns `None` when nothing changed, which skips the write.
    pub fn update<T: StoredRecord, R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut Vec<T>) -> Option<R>,
    ) -> Option<R> {
        let mut records = self.snapshot(key)?;
        let outcome = f(&mut records)?;
        self.save(key, &records);
        Some(outcome)
    }

    fn write(&self, key: &str, value: serde_json::Result<Value>) -> bool {
        let value = match value {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Store: could not encode {}: {}", key, e);
                return false;
            }
        };
        match self.store.set_value(key, &value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Store: write of {} dropped: {}", key, e);
                false
            }
        }
    }

    // ===== Words =====

    pub fn words(&self) -> Vec<WordRecord> {
        self.load(keys::WORDS)
    }

    pub fn save_words(&self, words: &[WordRecord]) -> bool {
        self.save(keys::WORDS, words)
    }

    pub fn update_words<R>(&self, f: impl FnOnce(&mut Vec<WordRecord>) -> Option<R>) -> Option<R> {
        self.update(keys::WORDS, f)
    }

    // ===== Study lists =====

    pub fn lists(&self) -> Vec<StudyList> {
        self.load(keys::STUDY_LISTS)
    }

    pub fn save_lists(&self, lists: &[StudyList]) -> bool {
        self.save(keys::STUDY_LISTS, lists)
    }

    pub fn update_lists<R>(&self, f: impl FnOnce(&mut Vec<StudyList>) -> Option<R>) -> Option<R> {
        self.update(keys::STUDY_LISTS, f)
    }

    // ===== Activities =====

    pub fn activities(&self) -> Vec<ActivityRecord> {
        self.load(keys::ACTIVITIES)
    }

    pub fn save_activities(&self, activities: &[ActivityRecord]) -> bool {
        self.save(keys::ACTIVITIES, activities)
    }

    pub fn update_activities<R>(
        &self,
        f: impl FnOnce(&mut Vec<ActivityRecord>) -> Option<R>,
    ) -> Option<R> {
        self.update(keys::ACTIVITIES, f)
    }

    // ===== Settings =====

    /// Stored settings; `Some(Settings::default())` when never written,
    /// `None` when unreadable
    fn settings_snapshot(&self) -> Option<Settings> {
        match self.store.get_value(keys::SETTINGS) {
            Ok(None) | Ok(Some(Value::Null)) => Some(Settings::default()),
            Ok(Some(value)) => {
                let settings = Settings::from_stored(&value);
                if settings.is_none() {
                    log::warn!("Store: settings blob is not an object, ignoring it");
                }
                settings
            }
            Err(e) => {
                log::warn!("Store: read of {} failed: {}", keys::SETTINGS, e);
                None
            }
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings_snapshot().unwrap_or_default()
    }

    pub fn save_settings(&self, settings: &Settings) -> bool {
        self.write(keys::SETTINGS, serde_json::to_value(settings))
    }

    pub fn update_settings<R>(&self, f: impl FnOnce(&mut Settings) -> Option<R>) -> Option<R> {
        let mut settings = self.settings_snapshot()?;
        let outcome = f(&mut settings)?;
        self.save_settings(&settings);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Utc;
    use serde_json::json;

    fn setup() -> (Arc<MemoryStore>, Collections) {
        let store = Arc::new(MemoryStore::new());
        let collections = Collections::new(store.clone());
        (store, collections)
    }

    #[test]
    fn test_failed_read_is_empty() {
        let (store, collections) = setup();
        store
            .set_value(keys::WORDS, &json!([{ "id": "a", "word": "x" }]))
            .unwrap();
        store.set_fail_reads(true);
        assert!(collections.words().is_empty());
        assert_eq!(collections.settings(), Settings::default());
    }

    #[test]
    fn test_failed_write_is_dropped() {
        let (store, collections) = setup();
        store.set_fail_writes(true);
        let word = WordRecord::new("a".into(), "x".into(), "thai".into(), Utc::now());
        assert!(!collections.save_words(&[word]));
        store.set_fail_writes(false);
        assert!(collections.words().is_empty());
    }

    #[test]
    fn test_update_skips_write_after_failed_read() {
        let (store, collections) = setup();
        store
            .set_value(keys::WORDS, &json!([{ "id": "a", "word": "x" }]))
            .unwrap();
        store.set_fail_reads(true);

        let outcome = collections.update_words(|words| {
            words.clear();
            Some(())
        });
        assert!(outcome.is_none());

        store.set_fail_reads(false);
        assert_eq!(collections.words().len(), 1);
    }

    #[test]
    fn test_update_without_change_does_not_write() {
        let (store, collections) = setup();
        store.set_fail_writes(true);
        let outcome: Option<()> = collections.update_lists(|_| None);
        assert!(outcome.is_none());
    }

    #[test]
    fn test_unreadable_elements_are_dropped() {
        let (store, collections) = setup();
        store
            .set_value(keys::WORDS, &json!([null, { "id": "a", "word": "x" }, 7]))
            .unwrap();
        let words = collections.words();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].id, "a");
    }

    #[test]
    fn test_non_list_blob_is_left_alone() {
        let (store, collections) = setup();
        store.set_value(keys::STUDY_LISTS, &json!({ "oops": true })).unwrap();
        assert!(collections.lists().is_empty());
        let outcome = collections.update_lists(|lists| {
            lists.push(StudyList::new_default("thai", "#fff".into(), Utc::now()));
            Some(())
        });
        assert!(outcome.is_none());
        assert_eq!(
            store.get_value(keys::STUDY_LISTS).unwrap(),
            Some(json!({ "oops": true }))
        );
    }
}
