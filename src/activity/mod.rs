//! Daily activity buckets, streaks and heatmap

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::{compute_streak, heatmap, ActivityStorage};
