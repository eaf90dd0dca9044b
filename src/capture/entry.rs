//! Capturing new words from external triggers.
//!
//! A capture is refused when its signature is in flight, was accepted
//! moments ago, or is already among the most recent persisted records.
//! The first two checks only see this process; the persisted scan catches
//! a duplicate committed by another process sharing the store.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::guard::{CaptureRejection, DuplicateGuard};
use super::normalize::Signature;
use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::lists::StudyListStorage;
use crate::storage::migration::fresh_id;
use crate::storage::{ensure_unique_ids, Collections, WordRecord};

/// Optional fields supplied with a capture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFields {
    pub translation: Option<String>,
    pub pronunciation: Option<String>,
    pub reference: Option<String>,
    pub hint: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Most recent persisted record with the same signature created inside
/// `window`. Only the last `limit` records are inspected.
pub fn find_recent_duplicate<'a>(
    words: &'a [WordRecord],
    signature: &Signature,
    now: DateTime<Utc>,
    window: Duration,
    limit: usize,
) -> Option<&'a WordRecord> {
    words.iter().rev().take(limit).find(|w| {
        signature.matches(&w.language, &w.word) && now - w.created_at < window
    })
}

pub struct EntryCapture {
    collections: Collections,
    clock: Arc<dyn Clock>,
    guard: DuplicateGuard,
    lists: StudyListStorage,
}

impl EntryCapture {
    pub fn new(collections: Collections, clock: Arc<dyn Clock>, config: &CoreConfig) -> Self {
        let guard = DuplicateGuard::new(clock.clone(), config.guard.clone());
        let lists = StudyListStorage::new(collections.clone(), clock.clone(), config.lists.clone());
        Self {
            collections,
            clock,
            guard,
            lists,
        }
    }

    pub fn guard(&self) -> &DuplicateGuard {
        &self.guard
    }

    /// Store a new word unless it duplicates one just added.
    ///
    /// On success the record has a fresh unique id and is a member of its
    /// language's default list.
    pub fn create_entry(
        &self,
        text: &str,
        language: &str,
        fields: EntryFields,
    ) -> Result<WordRecord, CaptureRejection> {
        let text = text.trim();
        let signature = Signature::new(language, text);
        if signature.text.is_empty() || language.is_empty() {
            return Err(CaptureRejection::EmptyText);
        }

        let ticket = self.guard.admit(signature).map_err(|rejection| {
            log::debug!("Capture: {}", rejection);
            rejection
        })?;
        let signature = ticket.signature();

        // The duplicate scan and the insert below rely on unique ids
        ensure_unique_ids(&self.collections);

        let config = self.guard.config();
        let now = self.clock.now();
        let mut entry = WordRecord::new(String::new(), text.to_string(), language.to_string(), now);
        entry.translation = non_blank(fields.translation).unwrap_or_default();
        entry.pronunciation = non_blank(fields.pronunciation);
        entry.reference = non_blank(fields.reference);
        entry.hint = non_blank(fields.hint);

        let mut duplicate = None;
        let stored = self.collections.update_words(|words| {
            if let Some(existing) = find_recent_duplicate(
                words,
                signature,
                now,
                config.recent_duplicate_window(),
                config.recent_scan_limit,
            ) {
                duplicate = Some(existing.id.clone());
                return None;
            }
            let mut taken: HashSet<String> = words.iter().map(|w| w.id.clone()).collect();
            entry.id = fresh_id(&mut taken);
            words.push(entry.clone());
            Some(entry)
        });

        let entry = match (stored, duplicate) {
            (Some(entry), _) => entry,
            (None, Some(existing)) => {
                log::debug!("Capture: {} already stored as {}", signature, existing);
                return Err(CaptureRejection::RecentDuplicate(signature.to_string()));
            }
            (None, None) => {
                log::warn!("Capture: word collection unreadable, dropping {}", signature);
                return Err(CaptureRejection::Unavailable(signature.to_string()));
            }
        };

        self.lists.add_to_default_list(&entry.language, &entry.id);
        log::info!("Capture: added {} as {}", signature, entry.id);
        Ok(entry)
    }
}
