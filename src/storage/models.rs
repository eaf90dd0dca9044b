use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Difficulty assigned to new and unreadable records
pub const DEFAULT_DIFFICULTY: f64 = 3.0;
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 5.0;

/// A record kept inside one of the store's collections.
///
/// Strict serde decoding is tried first. Records written by older or
/// foreign clients that fail it are salvaged field by field instead of
/// being dropped, because a later write of the collection would lose them.
pub trait StoredRecord: Serialize + DeserializeOwned {
    /// Human-readable kind for log lines
    const KIND: &'static str;

    fn salvage(value: &Value) -> Option<Self>;

    fn from_stored(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone())
            .ok()
            .or_else(|| Self::salvage(value))
    }
}

fn default_difficulty() -> f64 {
    DEFAULT_DIFFICULTY
}

/// Records without a creation time sort as the oldest possible entry
fn default_created_at() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn default_list_color() -> String {
    "#6366f1".to_string()
}

/// A single vocabulary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    /// Opaque identifier; empty means "not assigned yet"
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// 1.0 (easy) to 5.0 (hard)
    #[serde(default = "default_difficulty")]
    pub difficulty: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    /// Outcome of the most recent answer
    #[serde(
        rename = "_lastAnswerCorrect",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_answer_correct: Option<bool>,
    /// Fields this crate does not know about, kept for round trips
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WordRecord {
    pub fn new(id: String, word: String, language: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            word,
            translation: String::new(),
            language,
            pronunciation: None,
            reference: None,
            hint: None,
            difficulty: DEFAULT_DIFFICULTY,
            review_count: 0,
            correct_count: 0,
            created_at,
            last_reviewed: None,
            next_review: None,
            archived: None,
            last_answer_correct: None,
            extra: Map::new(),
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived.unwrap_or(false)
    }

    /// Due when never scheduled or when the scheduled time has passed
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review {
            None => true,
            Some(next) => next <= now,
        }
    }
}

const WORD_FIELDS: &[&str] = &[
    "id",
    "word",
    "translation",
    "language",
    "pronunciation",
    "reference",
    "hint",
    "difficulty",
    "reviewCount",
    "correctCount",
    "createdAt",
    "lastReviewed",
    "nextReview",
    "archived",
    "_lastAnswerCorrect",
];

impl StoredRecord for WordRecord {
    const KIND: &'static str = "word";

    fn salvage(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let difficulty = lenient_number(obj, "difficulty")
            .map(|d| d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY))
            .unwrap_or(DEFAULT_DIFFICULTY);

        Some(Self {
            id: lenient_text(obj, "id").unwrap_or_default(),
            word: lenient_text(obj, "word").unwrap_or_default(),
            translation: lenient_text(obj, "translation").unwrap_or_default(),
            language: lenient_text(obj, "language").unwrap_or_default(),
            pronunciation: lenient_text(obj, "pronunciation"),
            reference: lenient_text(obj, "reference"),
            hint: lenient_text(obj, "hint"),
            difficulty,
            review_count: lenient_count(obj, "reviewCount"),
            correct_count: lenient_count(obj, "correctCount"),
            created_at: lenient_instant(obj, "createdAt").unwrap_or_else(default_created_at),
            last_reviewed: lenient_instant(obj, "lastReviewed"),
            next_review: lenient_instant(obj, "nextReview"),
            archived: obj.get("archived").and_then(Value::as_bool),
            last_answer_correct: obj.get("_lastAnswerCorrect").and_then(Value::as_bool),
            extra: unknown_fields(obj, WORD_FIELDS),
        })
    }
}

/// A named set of word ids. Lists reference words, they never own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyList {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Absent on lists written by old clients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub word_ids: Vec<String>,
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_list_color")]
    pub color: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StudyList {
    pub fn default_id(language: &str) -> String {
        format!("default-{}", language)
    }

    /// The per-language list every captured word joins
    pub fn new_default(language: &str, color: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Self::default_id(language),
            name: format!("{} list", language),
            language: Some(language.to_string()),
            word_ids: Vec::new(),
            created_at,
            color,
            extra: Map::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.id.starts_with("default-")
    }

    /// Lists without a language field are matched through their default id
    pub fn belongs_to(&self, language: &str) -> bool {
        match &self.language {
            Some(lang) => lang == language,
            None => self.id.starts_with(&Self::default_id(language)),
        }
    }

    pub fn contains(&self, word_id: &str) -> bool {
        self.word_ids.iter().any(|id| id == word_id)
    }

    /// Set insert; returns true when the id was not yet a member
    pub fn insert_word(&mut self, word_id: &str) -> bool {
        if self.contains(word_id) {
            return false;
        }
        self.word_ids.push(word_id.to_string());
        true
    }

    pub fn remove_word(&mut self, word_id: &str) -> bool {
        let before = self.word_ids.len();
        self.word_ids.retain(|id| id != word_id);
        self.word_ids.len() != before
    }

    /// Drop repeated ids, keeping first occurrences in order
    pub fn dedupe_word_ids(&mut self) -> bool {
        let before = self.word_ids.len();
        let mut seen = HashSet::new();
        self.word_ids.retain(|id| seen.insert(id.clone()));
        self.word_ids.len() != before
    }
}

const LIST_FIELDS: &[&str] = &["id", "name", "language", "wordIds", "createdAt", "color"];

impl StoredRecord for StudyList {
    const KIND: &'static str = "study list";

    fn salvage(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let word_ids = obj
            .get("wordIds")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            id: lenient_text(obj, "id").unwrap_or_default(),
            name: lenient_text(obj, "name").unwrap_or_default(),
            language: lenient_text(obj, "language"),
            word_ids,
            created_at: lenient_instant(obj, "createdAt").unwrap_or_else(default_created_at),
            color: lenient_text(obj, "color").unwrap_or_else(default_list_color),
            extra: unknown_fields(obj, LIST_FIELDS),
        })
    }
}

/// Per-day counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Local calendar day (YYYY-MM-DD)
    pub date: NaiveDate,
    #[serde(default)]
    pub sessions: u32,
    #[serde(default)]
    pub words: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub streak_break: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActivityRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sessions: 0,
            words: 0,
            minutes: 0,
            streak_break: false,
            extra: Map::new(),
        }
    }

    /// A day counts towards a streak once anything was studied
    pub fn qualifies(&self) -> bool {
        self.sessions > 0 || self.words > 0
    }
}

const ACTIVITY_FIELDS: &[&str] = &["date", "sessions", "words", "minutes", "streakBreak"];

impl StoredRecord for ActivityRecord {
    const KIND: &'static str = "activity";

    fn salvage(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        // A bucket is meaningless without its day
        let date = obj
            .get("date")
            .and_then(Value::as_str)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())?;

        Some(Self {
            date,
            sessions: lenient_count(obj, "sessions"),
            words: lenient_count(obj, "words"),
            minutes: lenient_count(obj, "minutes"),
            streak_break: obj
                .get("streakBreak")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            extra: unknown_fields(obj, ACTIVITY_FIELDS),
        })
    }
}

/// A study language offered in the language picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    pub label: String,
}

impl Language {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

/// User settings. Preferences owned by other surfaces (theme, locale, ...)
/// ride along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub active_language: String,
    #[serde(default)]
    pub daily_goal: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub show_archived: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub missed_today_only: BTreeMap<String, bool>,
    /// Selected study list per language (zero or one id)
    #[serde(
        default,
        deserialize_with = "one_or_many_ids",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub study_list_filter: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const SETTINGS_FIELDS: &[&str] = &[
    "languages",
    "activeLanguage",
    "dailyGoal",
    "showArchived",
    "missedTodayOnly",
    "studyListFilter",
];

impl StoredRecord for Settings {
    const KIND: &'static str = "settings";

    fn salvage(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let languages = obj
            .get("languages")
            .and_then(Value::as_array)
            .map(|langs| {
                langs
                    .iter()
                    .filter_map(|l| serde_json::from_value::<Language>(l.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        let flags = |key: &str| -> BTreeMap<String, bool> {
            obj.get(key)
                .and_then(Value::as_object)
                .map(|m| {
                    m.iter()
                        .filter_map(|(k, v)| v.as_bool().map(|b| (k.clone(), b)))
                        .collect()
                })
                .unwrap_or_default()
        };
        let study_list_filter = obj
            .get("studyListFilter")
            .and_then(|v| one_or_many_ids(v.clone()).ok())
            .unwrap_or_default();

        Some(Self {
            languages,
            active_language: lenient_text(obj, "activeLanguage").unwrap_or_default(),
            daily_goal: lenient_count(obj, "dailyGoal"),
            show_archived: flags("showArchived"),
            missed_today_only: flags("missedTodayOnly"),
            study_list_filter,
            extra: unknown_fields(obj, SETTINGS_FIELDS),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Option<String>),
    Many(Vec<String>),
}

/// Older clients stored a single id string instead of an array
fn one_or_many_ids<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, OneOrMany> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(lang, ids)| {
            let ids = match ids {
                OneOrMany::One(Some(id)) if !id.is_empty() => vec![id],
                OneOrMany::One(_) => Vec::new(),
                OneOrMany::Many(ids) => ids,
            };
            (lang, ids)
        })
        .collect())
}

// ===== Lenient field readers =====

fn lenient_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let n = match obj.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn lenient_count(obj: &Map<String, Value>, key: &str) -> u32 {
    lenient_number(obj, key)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round().min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

/// RFC 3339 strings or epoch milliseconds
fn lenient_instant(obj: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    match obj.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
        _ => None,
    }
}

fn unknown_fields(obj: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    obj.iter()
        .filter(|(k, _)| !known.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_word_round_trip_keeps_unknown_fields() {
        let raw = json!({
            "id": "a",
            "word": "猫",
            "translation": "cat",
            "language": "japanese",
            "difficulty": 3,
            "reviewCount": 0,
            "correctCount": 0,
            "createdAt": "2026-01-02T03:04:05.000Z",
            "_lastAnswerCorrect": false,
            "color": "red"
        });

        let word = WordRecord::from_stored(&raw).unwrap();
        assert_eq!(word.id, "a");
        assert_eq!(word.last_answer_correct, Some(false));
        assert_eq!(word.extra.get("color"), Some(&json!("red")));

        let back = serde_json::to_value(&word).unwrap();
        assert_eq!(back["color"], json!("red"));
        assert_eq!(back["_lastAnswerCorrect"], json!(false));
        assert_eq!(back["reviewCount"], json!(0));
        assert!(back.get("nextReview").is_none());
    }

    #[test]
    fn test_word_salvaged_from_loose_shape() {
        let raw = json!({
            "word": "gato",
            "language": "spanish",
            "difficulty": "9",
            "reviewCount": 2.0,
            "correctCount": -4,
            "createdAt": 1_700_000_000_000i64,
            "nextReview": "not a date"
        });

        let word = WordRecord::from_stored(&raw).unwrap();
        assert_eq!(word.id, "");
        assert_eq!(word.difficulty, MAX_DIFFICULTY);
        assert_eq!(word.review_count, 2);
        assert_eq!(word.correct_count, 0);
        assert_eq!(word.created_at.timestamp_millis(), 1_700_000_000_000);
        assert!(word.next_review.is_none());
    }

    #[test]
    fn test_non_object_is_not_salvaged() {
        assert!(WordRecord::from_stored(&Value::Null).is_none());
        assert!(StudyList::from_stored(&json!("x")).is_none());
    }

    #[test]
    fn test_due_predicate() {
        let now = Utc::now();
        let mut word = WordRecord::new("a".into(), "w".into(), "thai".into(), now);
        assert!(word.is_due(now));

        word.next_review = Some(now - chrono::Duration::days(1));
        assert!(word.is_due(now));

        word.next_review = Some(now + chrono::Duration::days(1));
        assert!(!word.is_due(now));
    }

    #[test]
    fn test_list_language_fallback() {
        let mut list = StudyList::new_default("thai", default_list_color(), Utc::now());
        list.language = None;
        assert!(list.belongs_to("thai"));
        assert!(!list.belongs_to("japanese"));
        assert!(list.is_default());
    }

    #[test]
    fn test_list_set_semantics() {
        let mut list = StudyList::new_default("thai", default_list_color(), Utc::now());
        assert!(list.insert_word("x"));
        assert!(!list.insert_word("x"));
        list.word_ids.push("y".into());
        list.word_ids.push("x".into());
        assert!(list.dedupe_word_ids());
        assert_eq!(list.word_ids, vec!["x", "y"]);
        assert!(list.remove_word("x"));
        assert!(!list.remove_word("x"));
    }

    #[test]
    fn test_activity_date_format() {
        let raw = json!({ "date": "2026-05-06", "sessions": 1, "words": 2, "minutes": 3, "streakBreak": false });
        let act = ActivityRecord::from_stored(&raw).unwrap();
        assert_eq!(act.date, NaiveDate::from_ymd_opt(2026, 5, 6).unwrap());
        assert!(act.qualifies());
        assert_eq!(serde_json::to_value(&act).unwrap(), raw);
    }

    #[test]
    fn test_settings_accepts_single_filter_id() {
        let raw = json!({
            "languages": [{ "id": "thai", "label": "Thai" }],
            "activeLanguage": "thai",
            "dailyGoal": 12,
            "studyListFilter": { "thai": "list-a", "korean": ["list-b"], "spanish": "" },
            "theme": "dark"
        });

        let settings = Settings::from_stored(&raw).unwrap();
        assert_eq!(settings.study_list_filter["thai"], vec!["list-a"]);
        assert_eq!(settings.study_list_filter["korean"], vec!["list-b"]);
        assert!(settings.study_list_filter["spanish"].is_empty());
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));
    }
}
