mod collections;
pub mod migration;
mod models;
mod record_store;

pub use collections::Collections;
pub use migration::{ensure_unique_ids, IdMapping, IdMigration};
pub use models::*;
pub use record_store::{keys, FileStore, MemoryStore, RecordStore, StoreError};
