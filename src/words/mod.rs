//! Listing, editing, archiving and deleting words

pub mod storage;

pub use storage::{WordEdit, WordError, WordStorage};
