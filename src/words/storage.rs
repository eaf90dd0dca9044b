//! Word record maintenance
//!
//! Deleting a word also removes its id from every study list. The two
//! collections are written separately, so a list may briefly reference a
//! deleted word until the prune (or a later repair pass) lands.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::clock::Clock;
use crate::config::ListsConfig;
use crate::lists::StudyListStorage;
use crate::storage::{ensure_unique_ids, Collections, WordRecord};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordError {
    #[error("Word not found: {0}")]
    NotFound(String),

    #[error("Word text must not be blank")]
    BlankWord,

    #[error("Words are unavailable right now")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, WordError>;

/// Field changes for an edit; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordEdit {
    pub word: Option<String>,
    pub translation: Option<String>,
    /// A blank value clears the field
    pub pronunciation: Option<String>,
    pub reference: Option<String>,
    pub hint: Option<String>,
}

fn optional(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub struct WordStorage {
    collections: Collections,
    lists: StudyListStorage,
}

impl WordStorage {
    pub fn new(collections: Collections, clock: Arc<dyn Clock>, lists: ListsConfig) -> Self {
        let lists = StudyListStorage::new(collections.clone(), clock, lists);
        Self { collections, lists }
    }

    /// Words of a language in stored order
    pub fn list(&self, language: &str, include_archived: bool) -> Vec<WordRecord> {
        self.collections
            .words()
            .into_iter()
            .filter(|w| w.language == language && (include_archived || !w.is_archived()))
            .collect()
    }

    pub fn get(&self, word_id: &str) -> Option<WordRecord> {
        self.collections.words().into_iter().find(|w| w.id == word_id)
    }

    pub fn edit(&self, word_id: &str, edit: WordEdit) -> Result<WordRecord> {
        if matches!(&edit.word, Some(w) if w.trim().is_empty()) {
            return Err(WordError::BlankWord);
        }
        ensure_unique_ids(&self.collections);

        let mut outcome = Err(WordError::Unavailable);
        self.collections.update_words(|words| {
            let Some(word) = words.iter_mut().find(|w| w.id == word_id) else {
                outcome = Err(WordError::NotFound(word_id.to_string()));
                return None;
            };
            if let Some(text) = edit.word {
                word.word = text.trim().to_string();
            }
            if let Some(translation) = edit.translation {
                word.translation = translation.trim().to_string();
            }
            if let Some(pronunciation) = edit.pronunciation {
                word.pronunciation = optional(pronunciation);
            }
            if let Some(reference) = edit.reference {
                word.reference = optional(reference);
            }
            if let Some(hint) = edit.hint {
                word.hint = optional(hint);
            }
            outcome = Ok(word.clone());
            Some(())
        });
        outcome
    }

    /// Archive or unarchive several words in one write.
    /// Returns how many records changed.
    pub fn set_archived(&self, word_ids: &[String], archived: bool) -> usize {
        ensure_unique_ids(&self.collections);
        let ids: HashSet<&str> = word_ids.iter().map(String::as_str).collect();
        self.collections
            .update_words(|words| {
                let mut changed = 0;
                for word in words.iter_mut().filter(|w| ids.contains(w.id.as_str())) {
                    if word.is_archived() != archived {
                        word.archived = Some(archived);
                        changed += 1;
                    }
                }
                (changed > 0).then_some(changed)
            })
            .unwrap_or(0)
    }

    /// Delete a word and drop it from every study list
    pub fn delete(&self, word_id: &str) -> Result<()> {
        ensure_unique_ids(&self.collections);
        let mut outcome = Err(WordError::Unavailable);
        self.collections.update_words(|words| {
            let before = words.len();
            words.retain(|w| w.id != word_id);
            if words.len() == before {
                outcome = Err(WordError::NotFound(word_id.to_string()));
                return None;
            }
            outcome = Ok(());
            Some(())
        });
        outcome?;

        self.lists.prune_word(word_id);
        log::info!("Words: deleted {}", word_id);
        Ok(())
    }
}
