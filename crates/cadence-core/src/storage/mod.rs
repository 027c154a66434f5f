//! Storage Module
//!
//! SQLite-based storage layer with:
//! - Versioned schema migrations
//! - Separate reader/writer connections (WAL)
//! - Plan/topic reads and session writes inside one immediate transaction

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{
    DATABASE_FILE, DATA_DIR_ENV, ExclusionRecord, PlanInput, PlanRecord, PlanTransaction, Result,
    SessionRecord, Storage, StorageError, SubjectRecord,
};
