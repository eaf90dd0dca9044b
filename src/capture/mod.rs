//! Word capture with duplicate-add protection

pub mod entry;
pub mod guard;
pub mod normalize;

pub use entry::{EntryCapture, EntryFields};
pub use guard::{CaptureRejection, DuplicateGuard};
pub use normalize::{normalize, Signature};
