//! Activity aggregation types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Counters added to today's bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDelta {
    pub sessions: u32,
    pub words: u32,
    pub minutes: u32,
}

impl ActivityDelta {
    /// What one answered review contributes
    pub const REVIEW: ActivityDelta = ActivityDelta {
        sessions: 1,
        words: 1,
        minutes: 1,
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakStats {
    /// Consecutive qualifying days ending today
    pub streak: u32,
    /// Longest run inside the trailing window
    pub longest: u32,
    /// Sessions over the trailing week, today included
    pub this_week: u32,
}

/// One heatmap cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    /// 0 (nothing) to 4
    pub level: u8,
    pub sessions: u32,
    pub words: u32,
}

/// Today's progress towards the daily goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub done: u32,
    pub goal: u32,
    /// Capped at 100
    pub percent: u32,
}

impl GoalProgress {
    pub fn new(done: u32, goal: u32) -> Self {
        let goal = goal.max(1);
        let percent = (f64::from(done) / f64::from(goal) * 100.0).round().min(100.0) as u32;
        Self { done, goal, percent }
    }
}
