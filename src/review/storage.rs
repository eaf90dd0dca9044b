//! Review sessions over the stored words
//!
//! The pool is recomputed from the store on every call; nothing about a
//! session is kept in memory between answers.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::algorithm::schedule;
use crate::activity::{ActivityDelta, ActivityStorage, GoalProgress, StreakStats};
use crate::clock::{local_date, Clock};
use crate::config::ActivityConfig;
use crate::storage::{ensure_unique_ids, Collections, WordRecord};

/// Words with at least this many correct answers count as learned
pub const LEARNED_THRESHOLD: u32 = 3;

/// Narrowing applied to a language's words when building the pool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolFilter {
    /// Words reviewed today instead of due words
    pub retake: bool,
    /// Only words answered wrong today
    pub missed_today_only: bool,
    /// Restrict to one study list; unknown ids are ignored
    pub list_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub language: String,
    pub total: usize,
    pub learned: usize,
    /// Percent of all answers that were correct, rounded
    pub accuracy: u32,
    pub due: usize,
    pub reviewed_today: usize,
    pub goal: GoalProgress,
    pub streak: StreakStats,
}

/// Next word to show, preferring one other than `avoid_id`
pub fn pick_next<'a>(pool: &'a [WordRecord], avoid_id: Option<&str>) -> Option<&'a WordRecord> {
    let first = pool.first()?;
    match avoid_id {
        Some(avoid) => Some(pool.iter().find(|w| w.id != avoid).unwrap_or(first)),
        None => Some(first),
    }
}

pub struct ReviewStorage {
    collections: Collections,
    clock: Arc<dyn Clock>,
    activity: ActivityStorage,
}

impl ReviewStorage {
    pub fn new(collections: Collections, clock: Arc<dyn Clock>, config: ActivityConfig) -> Self {
        let activity = ActivityStorage::new(collections.clone(), clock.clone(), config);
        Self {
            collections,
            clock,
            activity,
        }
    }

    fn reviewed_today(&self, word: &WordRecord) -> bool {
        let today = self.clock.today();
        word.last_reviewed
            .map(|at| local_date(at) == today)
            .unwrap_or(false)
    }

    fn missed_today(&self, word: &WordRecord) -> bool {
        self.reviewed_today(word)
            && (word.last_answer_correct == Some(false) || word.review_count > word.correct_count)
    }

    /// Words to review for a language, in stored order
    pub fn due_pool(&self, language: &str, filter: &PoolFilter) -> Vec<WordRecord> {
        let now = self.clock.now();
        let members: Option<HashSet<String>> = filter.list_id.as_ref().and_then(|list_id| {
            self.collections
                .lists()
                .into_iter()
                .find(|l| &l.id == list_id)
                .map(|l| l.word_ids.into_iter().collect())
        });

        self.collections
            .words()
            .into_iter()
            .filter(|w| w.language == language && !w.is_archived())
            .filter(|w| {
                if filter.retake {
                    self.reviewed_today(w)
                } else {
                    w.is_due(now)
                }
            })
            .filter(|w| !filter.missed_today_only || self.missed_today(w))
            .filter(|w| members.as_ref().map_or(true, |ids| ids.contains(&w.id)))
            .collect()
    }

    /// Number of words in a language reviewed today
    pub fn reviewed_today_count(&self, language: &str) -> usize {
        self.collections
            .words()
            .iter()
            .filter(|w| w.language == language && self.reviewed_today(w))
            .count()
    }

    /// Schedule an answer and count it towards today's activity.
    ///
    /// Ids are repaired and the word is re-read right before the write, so
    /// the update starts from the freshest stored copy. Returns the updated
    /// word, or `None` if it no longer exists or the store is unavailable.
    pub fn submit_answer(&self, word_id: &str, was_correct: bool) -> Option<WordRecord> {
        ensure_unique_ids(&self.collections);

        let now = self.clock.now();
        let updated = self.collections.update_words(|words| {
            let word = words.iter_mut().find(|w| w.id == word_id)?;
            schedule(word, was_correct, now).apply_to(word, was_correct);
            Some(word.clone())
        });

        match &updated {
            Some(word) => {
                log::info!(
                    "Review: {} answered {}, difficulty {:.1}",
                    word.id,
                    if was_correct { "correctly" } else { "wrong" },
                    word.difficulty
                );
                self.activity.record_activity(ActivityDelta::REVIEW);
            }
            None => log::warn!("Review: answer for {} not recorded", word_id),
        }
        updated
    }

    pub fn dashboard(&self, language: &str, daily_goal: u32) -> DashboardStats {
        let now = self.clock.now();
        let words: Vec<WordRecord> = self
            .collections
            .words()
            .into_iter()
            .filter(|w| w.language == language)
            .collect();

        let reviews: u64 = words.iter().map(|w| u64::from(w.review_count)).sum();
        let correct: u64 = words.iter().map(|w| u64::from(w.correct_count)).sum();
        let accuracy = if reviews > 0 {
            (correct as f64 / reviews as f64 * 100.0).round() as u32
        } else {
            0
        };

        DashboardStats {
            language: language.to_string(),
            total: words.len(),
            learned: words
                .iter()
                .filter(|w| w.correct_count >= LEARNED_THRESHOLD)
                .count(),
            accuracy,
            due: words
                .iter()
                .filter(|w| !w.is_archived() && w.is_due(now))
                .count(),
            reviewed_today: words.iter().filter(|w| self.reviewed_today(w)).count(),
            goal: self.activity.goal_progress(daily_goal),
            streak: self.activity.streak(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{MemoryStore, StudyList};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    struct Harness {
        collections: Collections,
        clock: Arc<ManualClock>,
        review: ReviewStorage,
    }

    fn setup() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let collections = Collections::new(store);
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap(),
        ));
        let review = ReviewStorage::new(collections.clone(), clock.clone(), ActivityConfig::default());
        Harness {
            collections,
            clock,
            review,
        }
    }

    fn word(id: &str, language: &str, now: DateTime<Utc>) -> WordRecord {
        WordRecord::new(id.into(), format!("word {}", id), language.into(), now - Duration::days(10))
    }

    #[test]
    fn test_due_pool_skips_archived_and_future() {
        let h = setup();
        let now = h.clock.now();
        let mut future = word("b", "thai", now);
        future.next_review = Some(now + Duration::days(3));
        let mut archived = word("c", "thai", now);
        archived.archived = Some(true);
        h.collections.save_words(&[
            word("a", "thai", now),
            future,
            archived,
            word("d", "korean", now),
        ]);

        let pool = h.review.due_pool("thai", &PoolFilter::default());
        let ids: Vec<&str> = pool.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_submit_answer_schedules_and_records_activity() {
        let h = setup();
        let now = h.clock.now();
        h.collections.save_words(&[word("a", "thai", now)]);

        let updated = h.review.submit_answer("a", true).unwrap();
        assert_eq!(updated.review_count, 1);
        assert_eq!(updated.next_review, Some(now + Duration::days(7)));
        assert_eq!(updated.last_answer_correct, Some(true));
        assert_eq!(h.collections.words()[0], updated);

        let acts = h.collections.activities();
        assert_eq!(acts.len(), 1);
        assert_eq!((acts[0].sessions, acts[0].words, acts[0].minutes), (1, 1, 1));

        assert!(h.review.due_pool("thai", &PoolFilter::default()).is_empty());
    }

    #[test]
    fn test_submit_answer_uses_fresh_copy() {
        let h = setup();
        let now = h.clock.now();
        h.collections.save_words(&[word("a", "thai", now)]);
        let stale = h.review.due_pool("thai", &PoolFilter::default());

        // Another process answers in between
        let other = ReviewStorage::new(h.collections.clone(), h.clock.clone(), ActivityConfig::default());
        other.submit_answer("a", false);

        let updated = h.review.submit_answer(&stale[0].id, false).unwrap();
        assert_eq!(updated.review_count, 2);
        assert!((updated.difficulty - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_word_is_not_recorded() {
        let h = setup();
        assert!(h.review.submit_answer("ghost", true).is_none());
        assert!(h.collections.activities().is_empty());
    }

    #[test]
    fn test_retake_and_missed_filters() {
        let h = setup();
        let now = h.clock.now();
        h.collections.save_words(&[word("a", "thai", now), word("b", "thai", now), word("c", "thai", now)]);
        h.review.submit_answer("a", true);
        h.review.submit_answer("b", false);

        let retake = PoolFilter {
            retake: true,
            ..Default::default()
        };
        let ids: Vec<String> = h.review.due_pool("thai", &retake).into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let missed = PoolFilter {
            retake: true,
            missed_today_only: true,
            ..Default::default()
        };
        let ids: Vec<String> = h.review.due_pool("thai", &missed).into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(h.review.reviewed_today_count("thai"), 2);
    }

    #[test]
    fn test_list_filter() {
        let h = setup();
        let now = h.clock.now();
        h.collections.save_words(&[word("a", "thai", now), word("b", "thai", now)]);
        let mut list = StudyList::new_default("thai", "#6366f1".into(), now);
        list.word_ids = vec!["b".into()];
        h.collections.save_lists(&[list]);

        let filter = PoolFilter {
            list_id: Some("default-thai".into()),
            ..Default::default()
        };
        let pool = h.review.due_pool("thai", &filter);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, "b");

        let unknown = PoolFilter {
            list_id: Some("list-gone".into()),
            ..Default::default()
        };
        assert_eq!(h.review.due_pool("thai", &unknown).len(), 2);
    }

    #[test]
    fn test_pick_next_avoids_last_word() {
        let now = Utc::now();
        let pool = vec![word("a", "thai", now), word("b", "thai", now)];
        assert_eq!(pick_next(&pool, None).unwrap().id, "a");
        assert_eq!(pick_next(&pool, Some("a")).unwrap().id, "b");
        assert_eq!(pick_next(&pool[..1], Some("a")).unwrap().id, "a");
        assert!(pick_next(&[], Some("a")).is_none());
    }

    #[test]
    fn test_dashboard() {
        let h = setup();
        let now = h.clock.now();
        let mut learned = word("a", "thai", now);
        learned.review_count = 4;
        learned.correct_count = 3;
        learned.next_review = Some(now + Duration::days(5));
        h.collections.save_words(&[learned, word("b", "thai", now), word("c", "korean", now)]);
        h.review.submit_answer("b", false);

        let stats = h.review.dashboard("thai", 4);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.learned, 1);
        // 3 correct out of 5 answers
        assert_eq!(stats.accuracy, 60);
        assert_eq!(stats.due, 1);
        assert_eq!(stats.reviewed_today, 1);
        assert_eq!(stats.goal.done, 1);
        assert_eq!(stats.goal.percent, 25);
        assert_eq!(stats.streak.streak, 1);
    }
}
