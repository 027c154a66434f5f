//! Schedule module - The generation pipeline
//!
//! - Study-day availability from weekly hours
//! - Weighted recurrence planning per topic
//! - Smooth weighted round-robin slot allocation with spacing and subject caps
//! - Consolidated spaced reviews, Sunday essays and mock-exam filling
//! - Final stretch topic selection
//! - The transactional orchestrator

mod allocator;
mod availability;
mod essay;
mod filler;
mod final_stretch;
mod generator;
mod params;
mod pipeline;
mod recurrence;
mod review;
mod wrr;

pub use allocator::{AllocationOutcome, DEGRADED_TAG, SlotAllocator};
pub use availability::{compute_study_days, workday_capacity};
pub use essay::{ESSAY_SUBJECT, plan_essays};
pub use filler::fill_remaining;
pub use final_stretch::{FinalStretchSelection, select_for_final_stretch};
pub use generator::{GenerationError, GenerationSummary, ScheduleGenerator};
pub use params::ScheduleParams;
pub use pipeline::{ScheduleOutput, build_schedule};
pub use recurrence::{
    RecurrenceBasis, RecurrencePlan, combined_weight, normalize_priority, plan_recurrence,
};
pub use review::{MIXED_REVIEW_SUBJECT, ReviewOutcome, inject_reviews, snap_to_review_day};
pub use wrr::WeightedRoundRobin;
