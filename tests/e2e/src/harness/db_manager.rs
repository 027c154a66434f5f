//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - Shared handles for multi-threaded tests
//! - Session and plan counters for assertions
//! - Reopening the same file to exercise migrations

use cadence_core::{SessionStatus, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Manager for test databases
///
/// Creates isolated database instances for each test to prevent interference.
/// Automatically cleans up temporary databases when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
///
/// // Use the storage
/// db.storage.create_plan(PlanInput::new(1, "Boards", exam_date))?;
///
/// // Database is automatically deleted when `db` goes out of scope
/// ```
pub struct TestDatabaseManager {
    /// The storage instance
    pub storage: Arc<Storage>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: TempDir,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory
    ///
    /// The database is automatically deleted when the manager is dropped.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_cadence.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: temp_dir,
            db_path,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Another handle to the same storage, for spawned tasks
    pub fn shared(&self) -> Arc<Storage> {
        Arc::clone(&self.storage)
    }

    /// Check if the user owns no plans
    pub fn is_empty(&self, user_id: i64) -> bool {
        self.plan_count(user_id) == 0
    }

    /// Number of plans owned by a user
    pub fn plan_count(&self, user_id: i64) -> usize {
        self.storage
            .list_plans(user_id)
            .map(|plans| plans.len())
            .unwrap_or(0)
    }

    /// Number of sessions of a plan, optionally filtered by status
    pub fn session_count(&self, plan_id: i64, status: Option<SessionStatus>) -> usize {
        self.storage
            .list_sessions(plan_id, status)
            .map(|sessions| sessions.len())
            .unwrap_or(0)
    }

    /// Open a second storage on the same file (migrations run again)
    pub fn reopen(&self) -> Storage {
        Storage::new(Some(self.db_path.clone())).expect("Failed to reopen storage")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::PlanInput;
    use chrono::NaiveDate;

    #[test]
    fn test_temp_database_creation() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty(1));
        assert!(db.path().exists());
    }

    #[test]
    fn test_shared_handle_sees_writes() {
        let db = TestDatabaseManager::new_temp();
        let shared = db.shared();
        shared
            .create_plan(PlanInput::new(1, "Boards", NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()))
            .unwrap();
        assert_eq!(db.plan_count(1), 1);
        assert_eq!(db.plan_count(2), 0);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let db = TestDatabaseManager::new_temp();
        db.storage
            .create_plan(PlanInput::new(1, "Boards", NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()))
            .unwrap();

        let reopened = db.reopen();
        assert_eq!(reopened.list_plans(1).unwrap().len(), 1);
    }
}
