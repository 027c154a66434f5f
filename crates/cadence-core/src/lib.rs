//! # Cadence Core
//!
//! Study schedule engine. Turns a plan's subjects, topics and weekly
//! availability into a dated list of study sessions up to the exam:
//!
//! - **Weighted recurrence**: blended subject/topic priority decides how often
//!   each pending topic comes back
//! - **Smooth weighted round-robin**: slots are handed out by running weight,
//!   with minimum spacing between repeats and a cap on any subject's share
//! - **Consolidated reviews**: +7/+14/+28 day reviews grouped onto Saturdays
//! - **Capacity filling**: essays on Sundays, directed mock exams on empty days
//! - **Final stretch**: when topics outnumber slots, keep the highest-ranked
//!   ones and record the rest
//! - **Transactional regeneration**: pending sessions are replaced in one
//!   `BEGIN IMMEDIATE` transaction; completed work is never touched
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cadence_core::{PlanInput, ScheduleGenerator, Storage};
//! use serde_json::json;
//!
//! let storage = Storage::new(None)?;
//! let plan = storage.create_plan(PlanInput::new(1, "Bar exam", exam_date))?;
//! let law = storage.add_subject(plan.id, "Constitutional law", 5)?;
//! storage.add_topic(law.id, "Judicial review", 4)?;
//!
//! let summary = ScheduleGenerator::default().generate(&storage, &json!({
//!     "plan_id": plan.id,
//!     "user_id": 1,
//!     "weekly_hours": {"1": 2, "2": 2, "3": 2, "4": 2, "5": 2, "6": 3},
//!     "session_duration_minutes": 50,
//! }))?;
//! println!("{} sessions", summary.total_sessions);
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): Bundle SQLite
//! - `encryption`: SQLCipher, keyed by `CADENCE_ENCRYPTION_KEY`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod plan;
pub mod schedule;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Plan types
pub use plan::{
    ConfigValidator, GenerationConfig, PlanConfig, ReviewItem, ScheduledSession, SessionMetadata,
    SessionStatus, SessionType, StudyDay, TopicExclusion, TopicRecord, TopicStatus, ValidatedConfig,
    ValidationError, WeeklyHours,
};

// Generation pipeline
pub use schedule::{
    GenerationError, GenerationSummary, ScheduleGenerator, ScheduleOutput, ScheduleParams,
    build_schedule, compute_study_days,
};

// Storage layer
pub use storage::{
    ExclusionRecord, PlanInput, PlanRecord, Result, SessionRecord, Storage, StorageError,
    SubjectRecord,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        GenerationError, GenerationSummary, PlanInput, ScheduleGenerator, ScheduleParams,
        SessionStatus, SessionType, Storage, StorageError, TopicStatus, WeeklyHours,
    };
}
