//! Spaced repetition: the scheduler and review sessions

pub mod algorithm;
pub mod storage;

pub use algorithm::{format_interval, schedule, ReviewUpdate, INTERVALS};
pub use storage::{pick_next, DashboardStats, PoolFilter, ReviewStorage};
