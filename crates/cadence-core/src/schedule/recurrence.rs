//! Proportional recurrence planning
//!
//! Decides how many times each pending topic should appear, scaled to the
//! weekday capacity so that denser calendars get more repetitions without a
//! hand-tuned table per plan size.

use serde::{Deserialize, Serialize};

use super::availability::workday_capacity;
use super::params::ScheduleParams;
use crate::plan::{StudyDay, TopicRecord};

/// Normalised value for priority weights 0 through 5
const PRIORITY_LOOKUP: [f64; 6] = [0.0, 0.0, 0.2, 0.4, 0.7, 1.0];

/// Map a 1-5 priority weight onto `[0, 1]`
pub fn normalize_priority(weight: u8) -> f64 {
    PRIORITY_LOOKUP[(weight as usize).min(PRIORITY_LOOKUP.len() - 1)]
}

/// Blend subject and topic priority into one weight in `[0, 1]`
pub fn combined_weight(subject_weight: u8, topic_weight: u8, subject_blend: f64) -> f64 {
    let blend = subject_blend.clamp(0.0, 1.0);
    (blend * normalize_priority(subject_weight) + (1.0 - blend) * normalize_priority(topic_weight))
        .clamp(0.0, 1.0)
}

/// How often one topic should be scheduled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePlan {
    pub topic: TopicRecord,
    pub combined_weight: f64,
    pub target_appearances: u32,
}

/// Weekday totals the targets were derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceBasis {
    pub total_slots: u32,
    pub workday_count: usize,
    /// Even share of slots per topic, rounded up
    pub base: u32,
    /// Upper bound on appearances: one per week of workdays
    pub weekly_cap: u32,
}

impl RecurrenceBasis {
    pub fn new(topic_count: usize, days: &[StudyDay]) -> Self {
        let (total_slots, workday_count) = workday_capacity(days);
        let base = if topic_count == 0 {
            0
        } else {
            total_slots.div_ceil(topic_count as u32)
        };
        let weekly_cap = (workday_count as u32).div_ceil(7).max(1);
        Self {
            total_slots,
            workday_count,
            base,
            weekly_cap,
        }
    }

    /// `round(base * (0.5 + 1.5 * weight))`, clamped to `[1, weekly_cap]`
    pub fn target_for(&self, combined_weight: f64) -> u32 {
        let scaled = (self.base as f64 * (0.5 + 1.5 * combined_weight)).round();
        (scaled.max(0.0) as u32).clamp(1, self.weekly_cap)
    }
}

/// Target appearance count for each pending topic, in input order
pub fn plan_recurrence(
    pending: &[TopicRecord],
    days: &[StudyDay],
    params: &ScheduleParams,
) -> Vec<RecurrencePlan> {
    if pending.is_empty() {
        return Vec::new();
    }

    let basis = RecurrenceBasis::new(pending.len(), days);
    tracing::debug!(
        topics = pending.len(),
        total_slots = basis.total_slots,
        workdays = basis.workday_count,
        base = basis.base,
        weekly_cap = basis.weekly_cap,
        "Planning recurrence"
    );

    pending
        .iter()
        .map(|topic| {
            let weight =
                combined_weight(topic.subject_weight, topic.topic_weight, params.subject_blend);
            RecurrencePlan {
                topic: topic.clone(),
                combined_weight: weight,
                target_appearances: basis.target_for(weight),
            }
        })
        .collect()
}
