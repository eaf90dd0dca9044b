//! Per-day activity buckets and the statistics derived from them
//!
//! Buckets are keyed by local calendar date. Two processes recording on
//! the same new day can each append a bucket for it; lookups add such
//! buckets together instead of picking one.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use super::models::{ActivityDelta, GoalProgress, HeatmapDay, StreakStats};
use crate::clock::Clock;
use crate::config::ActivityConfig;
use crate::storage::{ActivityRecord, Collections};

/// Date → (sessions, words) with same-day buckets summed
fn by_date(activities: &[ActivityRecord]) -> BTreeMap<NaiveDate, (u32, u32)> {
    let mut days: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for act in activities {
        let entry = days.entry(act.date).or_default();
        entry.0 = entry.0.saturating_add(act.sessions);
        entry.1 = entry.1.saturating_add(act.words);
    }
    days
}

fn qualifies(days: &BTreeMap<NaiveDate, (u32, u32)>, date: NaiveDate) -> bool {
    days.get(&date)
        .map(|(sessions, words)| *sessions > 0 || *words > 0)
        .unwrap_or(false)
}

/// `count` days ending at `today`, oldest first
fn trailing_days(today: NaiveDate, count: u32) -> impl Iterator<Item = NaiveDate> {
    (0..i64::from(count))
        .rev()
        .map(move |back| today - Duration::days(back))
}

pub fn compute_streak(
    activities: &[ActivityRecord],
    today: NaiveDate,
    config: &ActivityConfig,
) -> StreakStats {
    let days = by_date(activities);

    let mut streak = 0;
    let mut check_date = today;
    while qualifies(&days, check_date) {
        streak += 1;
        check_date = check_date - Duration::days(1);
    }

    let mut longest = streak;
    let mut run = 0;
    for date in trailing_days(today, config.longest_window_days) {
        if qualifies(&days, date) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    let this_week = trailing_days(today, config.week_days)
        .filter_map(|date| days.get(&date))
        .fold(0u32, |acc, (sessions, _)| acc.saturating_add(*sessions));

    StreakStats {
        streak,
        longest,
        this_week,
    }
}

/// level = min(4, ceil(sessions + words / 5))
pub fn heatmap_level(sessions: u32, words: u32) -> u8 {
    let raw = (f64::from(sessions) + f64::from(words) / 5.0).ceil();
    raw.min(4.0) as u8
}

pub fn heatmap(activities: &[ActivityRecord], today: NaiveDate, days_back: u32) -> Vec<HeatmapDay> {
    let days = by_date(activities);
    trailing_days(today, days_back)
        .map(|date| {
            let (sessions, words) = days.get(&date).copied().unwrap_or_default();
            HeatmapDay {
                date,
                level: heatmap_level(sessions, words),
                sessions,
                words,
            }
        })
        .collect()
}

pub struct ActivityStorage {
    collections: Collections,
    clock: Arc<dyn Clock>,
    config: ActivityConfig,
}

impl ActivityStorage {
    pub fn new(collections: Collections, clock: Arc<dyn Clock>, config: ActivityConfig) -> Self {
        Self {
            collections,
            clock,
            config,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Add `delta` to today's bucket, creating it if needed.
    /// Returns the bucket as written, or `None` if the store was unavailable.
    pub fn record_activity(&self, delta: ActivityDelta) -> Option<ActivityRecord> {
        let today = self.today();
        let bucket = self.collections.update_activities(|acts| {
            let index = match acts.iter().position(|a| a.date == today) {
                Some(index) => index,
                None => {
                    acts.push(ActivityRecord::empty(today));
                    acts.len() - 1
                }
            };
            let bucket = &mut acts[index];
            bucket.sessions = bucket.sessions.saturating_add(delta.sessions);
            bucket.words = bucket.words.saturating_add(delta.words);
            bucket.minutes = bucket.minutes.saturating_add(delta.minutes);
            Some(bucket.clone())
        });
        if bucket.is_none() {
            log::warn!("Activity: could not record {:?} for {}", delta, today);
        }
        bucket
    }

    pub fn streak(&self) -> StreakStats {
        compute_streak(&self.collections.activities(), self.today(), &self.config)
    }

    pub fn heatmap(&self) -> Vec<HeatmapDay> {
        heatmap(
            &self.collections.activities(),
            self.today(),
            self.config.heatmap_days,
        )
    }

    /// Latest buckets, newest first
    pub fn recent_sessions(&self) -> Vec<ActivityRecord> {
        let mut acts = self.collections.activities();
        acts.sort_by(|a, b| b.date.cmp(&a.date));
        acts.truncate(self.config.recent_sessions);
        acts
    }

    /// Words studied today
    pub fn words_today(&self) -> u32 {
        by_date(&self.collections.activities())
            .get(&self.today())
            .map(|(_, words)| *words)
            .unwrap_or(0)
    }

    pub fn goal_progress(&self, daily_goal: u32) -> GoalProgress {
        GoalProgress::new(self.words_today(), daily_goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn act(date: NaiveDate, sessions: u32, words: u32) -> ActivityRecord {
        ActivityRecord {
            sessions,
            words,
            ..ActivityRecord::empty(date)
        }
    }

    #[test]
    fn test_streak_counts_back_from_today() {
        let today = day(2026, 5, 6);
        let acts = vec![
            act(day(2026, 5, 4), 2, 2),
            act(day(2026, 5, 5), 0, 3),
            act(day(2026, 5, 6), 1, 1),
            // Empty bucket breaks the run
            act(day(2026, 5, 3), 0, 0),
            act(day(2026, 5, 2), 1, 1),
        ];

        let stats = compute_streak(&acts, today, &ActivityConfig::default());
        assert_eq!(stats.streak, 3);
        assert_eq!(stats.longest, 3);
        assert_eq!(stats.this_week, 4);
    }

    #[test]
    fn test_no_activity_today_means_no_streak() {
        let today = day(2026, 5, 6);
        let acts = vec![act(day(2026, 5, 5), 1, 1), act(day(2026, 5, 4), 1, 1)];
        let stats = compute_streak(&acts, today, &ActivityConfig::default());
        assert_eq!(stats.streak, 0);
        assert_eq!(stats.longest, 2);
    }

    #[test]
    fn test_longest_run_inside_window() {
        let today = day(2026, 5, 6);
        let mut acts: Vec<ActivityRecord> = (10..15).map(|d| act(day(2026, 4, d), 1, 0)).collect();
        acts.push(act(day(2026, 5, 6), 1, 0));
        // Outside the trailing window
        acts.extend((1..20).map(|d| act(day(2025, 1, d), 1, 0)));

        let stats = compute_streak(&acts, today, &ActivityConfig::default());
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.longest, 5);
    }

    #[test]
    fn test_week_window_excludes_eighth_day() {
        let today = day(2026, 5, 8);
        let acts = vec![act(day(2026, 5, 1), 10, 0), act(day(2026, 5, 2), 3, 0)];
        let stats = compute_streak(&acts, today, &ActivityConfig::default());
        assert_eq!(stats.this_week, 3);
    }

    #[test]
    fn test_same_day_buckets_are_summed() {
        let today = day(2026, 5, 6);
        let acts = vec![act(today, 1, 1), act(today, 2, 4)];
        let stats = compute_streak(&acts, today, &ActivityConfig::default());
        assert_eq!(stats.this_week, 3);

        let cells = heatmap(&acts, today, 1);
        assert_eq!(cells[0].sessions, 3);
        assert_eq!(cells[0].words, 5);
    }

    #[test]
    fn test_heatmap_levels() {
        assert_eq!(heatmap_level(0, 0), 0);
        assert_eq!(heatmap_level(0, 1), 1);
        assert_eq!(heatmap_level(1, 5), 2);
        assert_eq!(heatmap_level(2, 3), 3);
        assert_eq!(heatmap_level(9, 9), 4);

        let today = day(2026, 5, 6);
        let cells = heatmap(&[act(today, 1, 0)], today, 28);
        assert_eq!(cells.len(), 28);
        assert_eq!(cells[0].date, day(2026, 4, 9));
        assert_eq!(cells[27].level, 1);
    }

    fn storage() -> (Arc<MemoryStore>, ActivityStorage) {
        let store = Arc::new(MemoryStore::new());
        // Midday UTC keeps the local date stable for any runner timezone
        // within ±11h
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 6, 12, 0, 0).unwrap(),
        ));
        let storage = ActivityStorage::new(
            Collections::new(store.clone()),
            clock,
            ActivityConfig::default(),
        );
        (store, storage)
    }

    #[test]
    fn test_record_activity_upserts_today() {
        let (store, storage) = storage();
        storage.record_activity(ActivityDelta::REVIEW).unwrap();
        let bucket = storage.record_activity(ActivityDelta::REVIEW).unwrap();
        assert_eq!(bucket.sessions, 2);
        assert_eq!(bucket.words, 2);
        assert_eq!(bucket.minutes, 2);

        let acts = Collections::new(store).activities();
        assert_eq!(acts.len(), 1);
        assert_eq!(acts[0].date, storage.today());
        assert!(!acts[0].streak_break);
        assert_eq!(storage.words_today(), 2);
        assert_eq!(storage.streak().streak, 1);
        assert_eq!(storage.goal_progress(10).percent, 20);
    }

    #[test]
    fn test_record_activity_keeps_other_days() {
        let (store, storage) = storage();
        let collections = Collections::new(store);
        let yesterday = storage.today() - Duration::days(1);
        collections.save_activities(&[act(yesterday, 4, 4)]);

        storage.record_activity(ActivityDelta { sessions: 0, words: 3, minutes: 0 });
        let acts = collections.activities();
        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].sessions, 4);
        assert_eq!(storage.streak().streak, 2);
    }

    #[test]
    fn test_unreadable_store_records_nothing() {
        let (store, storage) = storage();
        store.set_fail_reads(true);
        assert!(storage.record_activity(ActivityDelta::REVIEW).is_none());
        assert_eq!(storage.streak(), StreakStats::default());
    }

    #[test]
    fn test_recent_sessions_newest_first() {
        let (store, storage) = storage();
        let today = storage.today();
        let acts: Vec<ActivityRecord> = (0..8)
            .map(|back| act(today - Duration::days(back * 2), 1, 1))
            .collect();
        Collections::new(store).save_activities(&acts);

        let recent = storage.recent_sessions();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].date, today);
        assert!(recent.windows(2).all(|w| w[0].date > w[1].date));
    }
}
