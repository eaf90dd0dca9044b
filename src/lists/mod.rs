//! Study lists: per-language default lists, custom lists and the repair pass

pub mod storage;

pub use storage::{ListError, ListRepair, StudyListStorage};
