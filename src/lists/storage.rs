//! Study list maintenance
//!
//! Every write below is one read-modify-write on the freshest snapshot of
//! the list collection.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::ListsConfig;
use crate::storage::{ensure_unique_ids, Collections, StudyList};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("Study list not found: {0}")]
    NotFound(String),

    #[error("Default lists cannot be deleted: {0}")]
    DefaultListProtected(String),

    #[error("Study lists are unavailable right now")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, ListError>;

/// Counts from a repair pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListRepair {
    /// Repeated ids removed
    pub deduplicated: usize,
    /// Ids removed because no word has them
    pub pruned: usize,
}

pub struct StudyListStorage {
    collections: Collections,
    clock: Arc<dyn Clock>,
    config: ListsConfig,
}

impl StudyListStorage {
    pub fn new(collections: Collections, clock: Arc<dyn Clock>, config: ListsConfig) -> Self {
        Self {
            collections,
            clock,
            config,
        }
    }

    pub fn list_all(&self) -> Vec<StudyList> {
        self.collections.lists()
    }

    /// Lists shown for a language
    pub fn list_for_language(&self, language: &str) -> Vec<StudyList> {
        self.collections
            .lists()
            .into_iter()
            .filter(|l| l.belongs_to(language))
            .collect()
    }

    pub fn get(&self, list_id: &str) -> Option<StudyList> {
        self.collections.lists().into_iter().find(|l| l.id == list_id)
    }

    /// Lists a word is a member of
    pub fn lists_containing(&self, word_id: &str) -> Vec<StudyList> {
        self.collections
            .lists()
            .into_iter()
            .filter(|l| l.contains(word_id))
            .collect()
    }

    fn new_default_list(&self, language: &str) -> StudyList {
        StudyList::new_default(language, self.config.default_color.clone(), self.clock.now())
    }

    /// The language's default list, created on first use
    pub fn ensure_default_list(&self, language: &str) -> Option<StudyList> {
        let default_id = StudyList::default_id(language);
        if let Some(list) = self.get(&default_id) {
            return Some(list);
        }
        self.collections.update_lists(|lists| {
            // Another process may have created it since the read above
            if let Some(list) = lists.iter().find(|l| l.id == default_id) {
                return Some(list.clone());
            }
            let list = self.new_default_list(language);
            log::info!("Lists: created default list {}", list.id);
            lists.push(list.clone());
            Some(list)
        })
    }

    /// Put a word in its language's default list, creating the list if needed.
    /// Returns true when the membership was written.
    pub fn add_to_default_list(&self, language: &str, word_id: &str) -> bool {
        let default_id = StudyList::default_id(language);
        self.collections
            .update_lists(|lists| {
                let index = match lists.iter().position(|l| l.id == default_id) {
                    Some(index) => index,
                    None => {
                        lists.push(self.new_default_list(language));
                        lists.len() - 1
                    }
                };
                lists[index].insert_word(word_id).then_some(())
            })
            .is_some()
    }

    /// Create a custom list. A blank name becomes "New List".
    pub fn create_list(&self, language: &str, name: &str) -> Option<StudyList> {
        let name = name.trim();
        let list = StudyList {
            id: format!("list-{}-{}", language, Uuid::new_v4()),
            name: if name.is_empty() { "New List".to_string() } else { name.to_string() },
            language: Some(language.to_string()),
            word_ids: Vec::new(),
            created_at: self.clock.now(),
            color: self.config.default_color.clone(),
            extra: Default::default(),
        };
        self.collections.update_lists(|lists| {
            lists.push(list.clone());
            Some(list)
        })
    }

    /// Rename a list. A blank name keeps the current one.
    pub fn rename_list(&self, list_id: &str, name: &str) -> Result<StudyList> {
        let name = name.trim();
        let mut outcome = Err(ListError::Unavailable);
        self.collections.update_lists(|lists| {
            let Some(list) = lists.iter_mut().find(|l| l.id == list_id) else {
                outcome = Err(ListError::NotFound(list_id.to_string()));
                return None;
            };
            if name.is_empty() || list.name == name {
                outcome = Ok(list.clone());
                return None;
            }
            list.name = name.to_string();
            outcome = Ok(list.clone());
            Some(())
        });
        outcome
    }

    /// Delete a custom list. Words are untouched.
    pub fn delete_list(&self, list_id: &str) -> Result<()> {
        if list_id.starts_with("default-") {
            return Err(ListError::DefaultListProtected(list_id.to_string()));
        }
        let mut outcome = Err(ListError::Unavailable);
        self.collections.update_lists(|lists| {
            let before = lists.len();
            lists.retain(|l| l.id != list_id);
            if lists.len() == before {
                outcome = Err(ListError::NotFound(list_id.to_string()));
                return None;
            }
            outcome = Ok(());
            Some(())
        });
        outcome
    }

    /// Add or remove a word from a list. Ok(true) when membership changed.
    pub fn set_membership(&self, list_id: &str, word_id: &str, member: bool) -> Result<bool> {
        ensure_unique_ids(&self.collections);
        let mut outcome = Err(ListError::Unavailable);
        self.collections.update_lists(|lists| {
            let Some(list) = lists.iter_mut().find(|l| l.id == list_id) else {
                outcome = Err(ListError::NotFound(list_id.to_string()));
                return None;
            };
            let changed = if member {
                list.insert_word(word_id)
            } else {
                list.remove_word(word_id)
            };
            outcome = Ok(changed);
            changed.then_some(())
        });
        outcome
    }

    /// Remove a word id from every list. Returns true when any list changed.
    pub fn prune_word(&self, word_id: &str) -> bool {
        self.collections
            .update_lists(|lists| {
                let mut changed = false;
                for list in lists.iter_mut() {
                    changed |= list.remove_word(word_id);
                }
                changed.then_some(())
            })
            .is_some()
    }

    /// Restore set semantics and drop references to deleted words.
    ///
    /// Word ids are read right before the list write; a word added by
    /// another process after that read can still lose its membership, so
    /// this runs on request rather than on every load.
    pub fn repair(&self) -> ListRepair {
        let known: HashSet<String> = self.collections.words().into_iter().map(|w| w.id).collect();
        self.collections
            .update_lists(|lists| {
                let mut repair = ListRepair::default();
                for list in lists.iter_mut() {
                    let before = list.word_ids.len();
                    list.dedupe_word_ids();
                    let deduped = list.word_ids.len();
                    list.word_ids.retain(|id| known.contains(id));
                    repair.deduplicated += before - deduped;
                    repair.pruned += deduped - list.word_ids.len();
                }
                if repair == ListRepair::default() {
                    return None;
                }
                log::info!(
                    "Lists: repair removed {} repeated and {} stale id(s)",
                    repair.deduplicated,
                    repair.pruned
                );
                Some(repair)
            })
            .unwrap_or_default()
    }
}
