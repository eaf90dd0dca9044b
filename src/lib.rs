//! Vocabulary records shared by several independent processes.
//!
//! Every process (a capture handler, a review window, a command line run)
//! opens its own [`Lexicon`] over the same [`RecordStore`]. The store is
//! last-writer-wins with no locking, so each service re-reads right before
//! it writes and keeps nothing cached between calls.

use std::sync::Arc;

pub mod activity;
pub mod capture;
pub mod clock;
pub mod config;
pub mod lists;
pub mod review;
pub mod settings;
pub mod storage;
pub mod words;

use activity::ActivityStorage;
use capture::{CaptureRejection, EntryCapture, EntryFields};
use clock::{Clock, SystemClock};
use config::CoreConfig;
use lists::StudyListStorage;
use review::ReviewStorage;
use settings::SettingsStorage;
use storage::{ensure_unique_ids, Collections, IdMigration, RecordStore, WordRecord};
use words::WordStorage;

/// One process worth of services around a shared store
pub struct Lexicon {
    collections: Collections,
    pub capture: EntryCapture,
    pub review: ReviewStorage,
    pub activity: ActivityStorage,
    pub lists: StudyListStorage,
    pub words: WordStorage,
    pub settings: SettingsStorage,
}

impl Lexicon {
    pub fn open(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, config: &CoreConfig) -> Self {
        let collections = Collections::new(store);
        Self {
            capture: EntryCapture::new(collections.clone(), clock.clone(), config),
            review: ReviewStorage::new(collections.clone(), clock.clone(), config.activity.clone()),
            activity: ActivityStorage::new(collections.clone(), clock.clone(), config.activity.clone()),
            lists: StudyListStorage::new(collections.clone(), clock.clone(), config.lists.clone()),
            words: WordStorage::new(collections.clone(), clock, config.lists.clone()),
            settings: SettingsStorage::new(collections.clone()),
            collections,
        }
    }

    /// Open with the wall clock
    pub fn with_system_clock(store: Arc<dyn RecordStore>, config: &CoreConfig) -> Self {
        Self::open(store, Arc::new(SystemClock), config)
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Add a word captured from an external trigger
    pub fn create_entry(
        &self,
        text: &str,
        language: &str,
        fields: EntryFields,
    ) -> Result<WordRecord, CaptureRejection> {
        self.capture.create_entry(text, language, fields)
    }

    /// Record a review answer; see [`ReviewStorage::submit_answer`]
    pub fn answer(&self, word_id: &str, was_correct: bool) -> Option<WordRecord> {
        self.review.submit_answer(word_id, was_correct)
    }

    /// Run the id repair on demand
    pub fn migrate(&self) -> IdMigration {
        ensure_unique_ids(&self.collections)
    }
}
