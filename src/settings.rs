//! User settings with defaults and per-language preferences

use thiserror::Error;

use crate::storage::{ActivityRecord, Collections, Language, Settings, StudyList, WordRecord};

pub const DEFAULT_DAILY_GOAL: u32 = 10;

pub fn default_languages() -> Vec<Language> {
    vec![
        Language::new("japanese", "Japanese"),
        Language::new("thai", "Thai"),
        Language::new("spanish", "Spanish"),
        Language::new("korean", "Korean"),
    ]
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Language already exists: {0}")]
    LanguageExists(String),

    #[error("Language id and label must not be blank")]
    BlankLanguage,

    #[error("The last language cannot be removed")]
    LastLanguage,

    #[error("Settings are unavailable right now")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Fill in whatever is missing. Returns true when something changed.
pub fn apply_defaults(settings: &mut Settings) -> bool {
    let mut changed = false;
    if settings.languages.is_empty() {
        settings.languages = default_languages();
        changed = true;
    }
    if settings.active_language.is_empty() {
        settings.active_language = settings.languages[0].id.clone();
        changed = true;
    }
    if settings.daily_goal == 0 {
        settings.daily_goal = DEFAULT_DAILY_GOAL;
        changed = true;
    }
    changed
}

pub struct SettingsStorage {
    collections: Collections,
}

impl SettingsStorage {
    pub fn new(collections: Collections) -> Self {
        Self { collections }
    }

    /// Current settings with defaults applied. Defaults are written back
    /// only when something had to be filled in.
    pub fn load(&self) -> Settings {
        let filled = self.collections.update_settings(|settings| {
            apply_defaults(settings).then(|| settings.clone())
        });
        filled.unwrap_or_else(|| {
            let mut settings = self.collections.settings();
            apply_defaults(&mut settings);
            settings
        })
    }

    /// Read-modify-write with defaults applied first
    fn modify<R>(&self, f: impl FnOnce(&mut Settings) -> Result<R>) -> Result<R> {
        let mut outcome = Err(SettingsError::Unavailable);
        self.collections.update_settings(|settings| {
            apply_defaults(settings);
            match f(settings) {
                Ok(value) => {
                    outcome = Ok(value);
                    Some(())
                }
                Err(e) => {
                    outcome = Err(e);
                    None
                }
            }
        });
        outcome
    }

    pub fn set_active_language(&self, language: &str) -> Result<()> {
        self.modify(|settings| {
            if !settings.languages.iter().any(|l| l.id == language) {
                return Err(SettingsError::UnknownLanguage(language.to_string()));
            }
            settings.active_language = language.to_string();
            Ok(())
        })
    }

    /// Zero falls back to the default goal
    pub fn set_daily_goal(&self, goal: u32) -> Result<u32> {
        let goal = if goal == 0 { DEFAULT_DAILY_GOAL } else { goal };
        self.modify(|settings| {
            settings.daily_goal = goal;
            Ok(goal)
        })
    }

    pub fn add_language(&self, id: &str, label: &str) -> Result<Language> {
        let (id, label) = (id.trim(), label.trim());
        if id.is_empty() || label.is_empty() {
            return Err(SettingsError::BlankLanguage);
        }
        self.modify(|settings| {
            if settings.languages.iter().any(|l| l.id == id) {
                return Err(SettingsError::LanguageExists(id.to_string()));
            }
            let language = Language::new(id, label);
            settings.languages.push(language.clone());
            Ok(language)
        })
    }

    /// Remove a language. If it was active, the first remaining one
    /// becomes active. Words in that language are kept.
    pub fn remove_language(&self, id: &str) -> Result<()> {
        self.modify(|settings| {
            let Some(index) = settings.languages.iter().position(|l| l.id == id) else {
                return Err(SettingsError::UnknownLanguage(id.to_string()));
            };
            if settings.languages.len() == 1 {
                return Err(SettingsError::LastLanguage);
            }
            settings.languages.remove(index);
            if settings.active_language == id {
                settings.active_language = settings.languages[0].id.clone();
            }
            Ok(())
        })
    }

    pub fn set_show_archived(&self, language: &str, show: bool) -> Result<()> {
        self.modify(|settings| {
            settings.show_archived.insert(language.to_string(), show);
            Ok(())
        })
    }

    pub fn set_missed_today_only(&self, language: &str, only: bool) -> Result<()> {
        self.modify(|settings| {
            settings.missed_today_only.insert(language.to_string(), only);
            Ok(())
        })
    }

    /// Select the study list reviewed for a language, or clear it
    pub fn set_study_list_filter(&self, language: &str, list_id: Option<&str>) -> Result<()> {
        self.modify(|settings| {
            let ids = list_id.map(|id| vec![id.to_string()]).unwrap_or_default();
            settings.study_list_filter.insert(language.to_string(), ids);
            Ok(())
        })
    }

    /// Clear words, activities and lists, and reset goal and languages.
    /// Preferences owned by other surfaces are kept.
    pub fn reset_all(&self) -> bool {
        let cleared = self.collections.save_words(&[] as &[WordRecord])
            & self.collections.save_activities(&[] as &[ActivityRecord])
            & self.collections.save_lists(&[] as &[StudyList]);

        let languages = default_languages();
        let reset = self
            .collections
            .update_settings(|settings| {
                settings.daily_goal = DEFAULT_DAILY_GOAL;
                settings.active_language = languages[0].id.clone();
                settings.languages = languages;
                Some(())
            })
            .is_some();
        log::info!("Settings: reset all data");
        cleared && reset
    }
}

impl Settings {
    pub fn show_archived_for(&self, language: &str) -> bool {
        self.show_archived.get(language).copied().unwrap_or(false)
    }

    pub fn missed_today_only_for(&self, language: &str) -> bool {
        self.missed_today_only.get(language).copied().unwrap_or(false)
    }

    pub fn study_list_for(&self, language: &str) -> Option<&str> {
        self.study_list_filter
            .get(language)
            .and_then(|ids| ids.first())
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{keys, MemoryStore, RecordStore};
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryStore>, SettingsStorage) {
        let store = Arc::new(MemoryStore::new());
        let storage = SettingsStorage::new(Collections::new(store.clone()));
        (store, storage)
    }

    #[test]
    fn test_load_fills_defaults_once() {
        let (store, storage) = setup();
        let settings = storage.load();
        assert_eq!(settings.languages.len(), 4);
        assert_eq!(settings.active_language, "japanese");
        assert_eq!(settings.daily_goal, 10);
        assert!(store.get_value(keys::SETTINGS).unwrap().is_some());

        // Already complete: a failing write does not matter
        store.set_fail_writes(true);
        assert_eq!(storage.load(), settings);
    }

    #[test]
    fn test_load_keeps_foreign_preferences() {
        let (store, storage) = setup();
        store
            .set_value(keys::SETTINGS, &json!({ "theme": "dark", "dailyGoal": 25 }))
            .unwrap();
        let settings = storage.load();
        assert_eq!(settings.daily_goal, 25);
        assert_eq!(store.get_value(keys::SETTINGS).unwrap().unwrap()["theme"], json!("dark"));
    }

    #[test]
    fn test_load_without_store_returns_defaults() {
        let (store, storage) = setup();
        store.set_fail_reads(true);
        let settings = storage.load();
        assert_eq!(settings.active_language, "japanese");
        store.set_fail_reads(false);
        assert!(store.get_value(keys::SETTINGS).unwrap().is_none());
    }

    #[test]
    fn test_active_language_must_be_known() {
        let (_store, storage) = setup();
        storage.set_active_language("thai").unwrap();
        assert_eq!(storage.load().active_language, "thai");
        assert_eq!(
            storage.set_active_language("klingon"),
            Err(SettingsError::UnknownLanguage("klingon".into()))
        );
    }

    #[test]
    fn test_daily_goal() {
        let (_store, storage) = setup();
        assert_eq!(storage.set_daily_goal(30), Ok(30));
        assert_eq!(storage.set_daily_goal(0), Ok(10));
        assert_eq!(storage.load().daily_goal, 10);
    }

    #[test]
    fn test_language_management() {
        let (_store, storage) = setup();
        storage.add_language("german", " German ").unwrap();
        assert_eq!(
            storage.add_language("german", "Deutsch"),
            Err(SettingsError::LanguageExists("german".into()))
        );
        assert_eq!(storage.add_language(" ", "x"), Err(SettingsError::BlankLanguage));

        storage.remove_language("japanese").unwrap();
        let settings = storage.load();
        assert_eq!(settings.active_language, "thai");
        assert_eq!(settings.languages.last().unwrap().label, "German");
    }

    #[test]
    fn test_last_language_is_kept() {
        let (_store, storage) = setup();
        for id in ["japanese", "thai", "spanish"] {
            storage.remove_language(id).unwrap();
        }
        assert_eq!(storage.remove_language("korean"), Err(SettingsError::LastLanguage));
        assert_eq!(storage.load().active_language, "korean");
    }

    #[test]
    fn test_per_language_preferences() {
        let (_store, storage) = setup();
        storage.set_show_archived("thai", true).unwrap();
        storage.set_missed_today_only("thai", true).unwrap();
        storage.set_study_list_filter("thai", Some("list-a")).unwrap();

        let settings = storage.load();
        assert!(settings.show_archived_for("thai"));
        assert!(!settings.show_archived_for("korean"));
        assert!(settings.missed_today_only_for("thai"));
        assert_eq!(settings.study_list_for("thai"), Some("list-a"));

        storage.set_study_list_filter("thai", None).unwrap();
        assert_eq!(storage.load().study_list_for("thai"), None);
    }

    #[test]
    fn test_reset_all() {
        let (store, storage) = setup();
        let collections = Collections::new(store.clone());
        collections.save_words(&[WordRecord::new("a".into(), "x".into(), "thai".into(), Utc::now())]);
        storage.add_language("german", "German").unwrap();
        storage.set_daily_goal(40).unwrap();
        storage.set_show_archived("thai", true).unwrap();

        assert!(storage.reset_all());
        assert!(collections.words().is_empty());
        let settings = storage.load();
        assert_eq!(settings.languages, default_languages());
        assert_eq!(settings.daily_goal, 10);
        assert!(settings.show_archived_for("thai"));
    }
}
