//! Repair of word identifiers.
//!
//! Two processes appending to the word collection at the same time can
//! leave records without an id, or two records sharing one. This module
//! gives every record a unique id again. When an id is shared, the first
//! record in stored order keeps it and each later holder is split off under
//! a fresh id. Lists that referenced the shared id gain the new ids as well;
//! the old id stays because it still belongs to the first holder.
//!
//! Running the repair on an already repaired collection changes nothing.

use std::collections::{BTreeMap, HashSet};

use uuid::Uuid;

use super::collections::Collections;
use super::models::{StudyList, WordRecord};

/// Shared id → ids handed to the later holders, in stored order
pub type IdMapping = BTreeMap<String, Vec<String>>;

/// Outcome of one repair pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdMigration {
    /// At least one record got a new id
    pub changed: bool,
    /// Records that had no id at all
    pub assigned: usize,
    pub splits: IdMapping,
}

/// Give every record a unique id, in place.
pub fn migrate_ids(records: &mut [WordRecord]) -> IdMigration {
    let mut taken: HashSet<String> = records
        .iter()
        .filter(|r| !r.id.is_empty())
        .map(|r| r.id.clone())
        .collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut migration = IdMigration::default();

    for record in records.iter_mut() {
        if record.id.is_empty() {
            record.id = fresh_id(&mut taken);
            migration.assigned += 1;
            migration.changed = true;
        } else if seen.contains(&record.id) {
            let new_id = fresh_id(&mut taken);
            let old_id = std::mem::replace(&mut record.id, new_id.clone());
            migration.splits.entry(old_id).or_default().push(new_id);
            migration.changed = true;
        }
        seen.insert(record.id.clone());
    }

    migration
}

/// An id that no record uses yet
pub(crate) fn fresh_id(taken: &mut HashSet<String>) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

/// Add split-off ids next to the shared id in every list that holds it.
/// Returns true when any list changed.
pub fn repair_list_references(lists: &mut [StudyList], splits: &IdMapping) -> bool {
    let mut changed = false;
    for list in lists.iter_mut() {
        for (old_id, new_ids) in splits {
            if !list.contains(old_id) {
                continue;
            }
            for new_id in new_ids {
                changed |= list.insert_word(new_id);
            }
        }
    }
    changed
}

/// Repair the persisted word collection and the lists pointing into it.
///
/// Words are written only when an id changed; lists only when a split
/// happened. Each write is made against a snapshot read just before it.
pub fn ensure_unique_ids(collections: &Collections) -> IdMigration {
    let migration = collections.update_words(|words| {
        let migration = migrate_ids(words);
        migration.changed.then_some(migration)
    });
    let Some(migration) = migration else {
        return IdMigration::default();
    };

    log::info!(
        "Migration: assigned {} missing id(s), split {} shared id(s)",
        migration.assigned,
        migration.splits.len()
    );

    if !migration.splits.is_empty() {
        let repaired = collections
            .update_lists(|lists| repair_list_references(lists, &migration.splits).then_some(()));
        if repaired.is_some() {
            log::info!("Migration: study lists now reference split ids");
        }
    }

    migration
}
