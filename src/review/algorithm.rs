//! Adaptive review scheduling
//!
//! Each word carries a difficulty between 1 (easy) and 5 (hard). A correct
//! answer lowers it by 0.2, a wrong one raises it by 0.3. The rounded
//! difficulty picks the next interval from a fixed ladder:
//!
//! | difficulty | 1 | 2 | 3 | 4  | 5  |
//! |------------|---|---|---|----|----|
//! | days       | 1 | 3 | 7 | 14 | 30 |
//!
//! A wrong answer makes the word due again immediately.

use chrono::{DateTime, Days, Duration, Local, Utc};

use crate::storage::{WordRecord, DEFAULT_DIFFICULTY, MAX_DIFFICULTY, MIN_DIFFICULTY};

/// Review intervals in days, indexed by rounded difficulty - 1
pub const INTERVALS: [i64; 5] = [1, 3, 7, 14, 30];

const CORRECT_STEP: f64 = -0.2;
const WRONG_STEP: f64 = 0.3;

/// New scheduling fields for one answered word
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewUpdate {
    pub review_count: u32,
    pub correct_count: u32,
    pub difficulty: f64,
    pub next_review: DateTime<Utc>,
    pub last_reviewed: DateTime<Utc>,
    /// Interval applied to a correct answer; 0 after a wrong one
    pub interval_days: i64,
}

impl ReviewUpdate {
    /// Copy the scheduling fields onto a record
    pub fn apply_to(&self, word: &mut WordRecord, was_correct: bool) {
        word.review_count = self.review_count;
        word.correct_count = self.correct_count;
        word.difficulty = self.difficulty;
        word.next_review = Some(self.next_review);
        word.last_reviewed = Some(self.last_reviewed);
        word.last_answer_correct = Some(was_correct);
    }
}

/// Interval for a difficulty value, in days
pub fn interval_for(difficulty: f64) -> i64 {
    let index = (difficulty.round() as i64 - 1).clamp(0, INTERVALS.len() as i64 - 1);
    INTERVALS[index as usize]
}

/// Move `now` forward by whole calendar days in local time, keeping the
/// wall-clock time. Falls back to 24-hour days when that local time does not
/// exist or is ambiguous on the target date.
fn add_local_days(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    if days <= 0 {
        return now;
    }
    now.with_timezone(&Local)
        .checked_add_days(Days::new(days.unsigned_abs()))
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| now + Duration::days(days))
}

/// Compute the outcome of answering `word`.
pub fn schedule(word: &WordRecord, was_correct: bool, now: DateTime<Utc>) -> ReviewUpdate {
    // Out-of-range values from other clients are pulled back in first
    let current = if word.difficulty.is_finite() {
        word.difficulty
    } else {
        DEFAULT_DIFFICULTY
    };
    let step = if was_correct { CORRECT_STEP } else { WRONG_STEP };
    let difficulty = (current + step).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);

    let interval_days = if was_correct { interval_for(difficulty) } else { 0 };

    ReviewUpdate {
        review_count: word.review_count.saturating_add(1),
        correct_count: word.correct_count.saturating_add(u32::from(was_correct)),
        difficulty,
        next_review: add_local_days(now, interval_days),
        last_reviewed: now,
        interval_days,
    }
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i64) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
