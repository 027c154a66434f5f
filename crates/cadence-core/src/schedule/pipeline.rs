//! The pure generation pipeline
//!
//! Runs every stage on in-memory data: no storage, no clock. The orchestrator
//! feeds it the plan's topics and study days and persists the result.

use rand::Rng;
use serde::Serialize;

use super::allocator::SlotAllocator;
use super::availability::workday_capacity;
use super::essay::plan_essays;
use super::filler::fill_remaining;
use super::final_stretch::select_for_final_stretch;
use super::params::ScheduleParams;
use super::recurrence::plan_recurrence;
use super::review::inject_reviews;
use crate::plan::{PlanConfig, ScheduledSession, SessionType, StudyDay, TopicExclusion, TopicRecord};

/// Everything one pipeline run produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutput {
    /// All sessions ordered by date
    pub sessions: Vec<ScheduledSession>,
    pub excluded: Vec<TopicExclusion>,
    pub degraded: usize,
    pub dropped_reviews: usize,
    /// Planned appearances that did not fit before the exam
    pub unscheduled: usize,
    pub warnings: Vec<String>,
}

impl ScheduleOutput {
    /// Sessions of one type
    pub fn count(&self, session_type: SessionType) -> usize {
        self.sessions.iter().filter(|s| s.session_type == session_type).count()
    }

    /// `NewTopic` plus `Reinforcement` sessions
    pub fn study_sessions(&self) -> usize {
        self.sessions.iter().filter(|s| s.session_type.is_study()).count()
    }
}

/// Build the full schedule for one plan
pub fn build_schedule<R: Rng + ?Sized>(
    config: &PlanConfig,
    topics: &[TopicRecord],
    days: &[StudyDay],
    params: &ScheduleParams,
    rng: &mut R,
) -> ScheduleOutput {
    let mut output = ScheduleOutput::default();
    let pending: Vec<TopicRecord> = topics.iter().filter(|t| t.is_pending()).cloned().collect();
    let (total_slots, _) = workday_capacity(days);
    let total_slots = total_slots as usize;

    let planned = if pending.len() > total_slots && total_slots > 0 {
        if config.final_stretch {
            let selection = select_for_final_stretch(&pending, total_slots);
            output.excluded = selection.excluded;
            selection.selected
        } else {
            output.warnings.push(format!(
                "{} pending topics but only {} weekday slots: some topics will not be \
                 scheduled (enable final stretch to choose which)",
                pending.len(),
                total_slots
            ));
            pending
        }
    } else {
        pending
    };

    let mut sessions = Vec::new();
    if !planned.is_empty() {
        let plans = plan_recurrence(&planned, days, params);
        let allocation = SlotAllocator::new(&plans, config.exam_date, params).allocate(days);
        output.degraded = allocation.degraded;
        output.unscheduled = allocation.unscheduled;
        sessions = allocation.sessions;
    }

    let reviews = inject_reviews(&sessions, days, params);
    output.dropped_reviews = reviews.dropped;
    sessions.extend(reviews.sessions);

    if config.include_essay {
        let essays = plan_essays(days, &sessions);
        sessions.extend(essays);
    }

    let mocks = fill_remaining(&sessions, topics, days, params, rng);
    sessions.extend(mocks);

    // stable: keeps allocation order within a day
    sessions.sort_by_key(|s| s.date);
    output.sessions = sessions;

    if output.degraded > 0 {
        output.warnings.push(format!(
            "{} sessions were placed without full spacing or subject balance",
            output.degraded
        ));
    }
    if output.dropped_reviews > 0 {
        output.warnings.push(format!(
            "{} reviews had no study day on or after their due date and were dropped",
            output.dropped_reviews
        ));
    }
    if output.unscheduled > 0 {
        output.warnings.push(format!(
            "{} planned topic appearances did not fit before the exam",
            output.unscheduled
        ));
    }

    output
}
