//! Plan module - Core types for study plans
//!
//! - Weekly availability matrix and the per-run plan configuration
//! - Topic rows joined with their subject
//! - Scheduled sessions, their metadata and the study days they land on
//! - Validation of loosely typed generation requests

mod session;
mod topic;
mod validator;
mod weekly;

pub use session::{
    ReviewItem, ScheduledSession, SessionMetadata, SessionStatus, SessionType, StudyDay,
};
pub use topic::{
    DEFAULT_PRIORITY_WEIGHT, MAX_PRIORITY_WEIGHT, MIN_PRIORITY_WEIGHT, TopicExclusion, TopicRecord,
    TopicStatus, clamp_priority,
};
pub use validator::{
    ConfigValidator, GenerationConfig, MAX_DAILY_QUESTION_GOAL, MAX_SESSION_DURATION,
    MAX_WEEKLY_QUESTION_GOAL, MIN_SESSION_DURATION, ValidatedConfig, ValidationError, coerce_bool,
    coerce_int,
};
pub use weekly::{
    DAYS_PER_WEEK, DEFAULT_SESSION_DURATION_MINUTES, PlanConfig, SUNDAY_FIRST, WeeklyHours,
    is_workday, slots_per_day, weekday_from_index, weekday_index,
};
