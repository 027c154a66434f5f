//! Test harness

mod db_manager;

pub use db_manager::TestDatabaseManager;
pub use schedule_checks::{PlannedCalendar, assert_schedule_invariants};
