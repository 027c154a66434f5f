//! Slot allocation
//!
//! Expands the recurrence plans into a queue of topic instances and walks
//! every weekday slot in calendar order, choosing one instance per slot with a
//! weighted round-robin. Two constraints can veto the round-robin leader:
//!
//! - **Subject cap**: no subject may hold more than `subject_share_cap` of the
//!   sessions allocated so far (checked once `bootstrap_sessions` exist).
//! - **Spacing**: a topic must not reappear within `min_spacing` slots.
//!
//! A reinforcement is also held back while the remaining slots are only just
//! enough to introduce every topic not yet seen, so that every pending topic
//! gets its first session whenever capacity allows.
//!
//! When every candidate is vetoed the slot is still filled by a degraded
//! pick, tagged as such in the session.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use super::params::ScheduleParams;
use super::recurrence::RecurrencePlan;
use super::wrr::WeightedRoundRobin;
use crate::plan::{ScheduledSession, SessionMetadata, SessionType, StudyDay};

/// Marker appended to degraded session descriptions
pub const DEGRADED_TAG: &str = "[degraded]";

/// Result of one allocation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationOutcome {
    /// `NewTopic` and `Reinforcement` sessions in slot order
    pub sessions: Vec<ScheduledSession>,
    /// Sessions placed by the degraded fallback
    pub degraded: usize,
    /// Queue instances left over when the slots ran out
    pub unscheduled: usize,
}

/// Why the round-robin leader was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Veto {
    SubjectCap,
    Spacing,
}

/// Per-run allocator state
///
/// Holds the running weights, per-topic history and per-subject counts. A new
/// allocator is created for every generation run.
pub struct SlotAllocator<'a> {
    params: &'a ScheduleParams,
    plans: &'a [RecurrencePlan],
    exam_date: NaiveDate,
    /// Queue of plan indices, one entry per planned appearance
    queue: WeightedRoundRobin<usize>,
    appearances: Vec<u32>,
    last_slot: Vec<Option<usize>>,
    subject_counts: HashMap<i64, usize>,
    allocated: usize,
    not_introduced: usize,
    total_slots: usize,
}

impl<'a> SlotAllocator<'a> {
    pub fn new(
        plans: &'a [RecurrencePlan],
        exam_date: NaiveDate,
        params: &'a ScheduleParams,
    ) -> Self {
        let mut queue = WeightedRoundRobin::new();
        let rounds = plans.iter().map(|p| p.target_appearances).max().unwrap_or(0);
        // iteration-major: every first appearance precedes every second one
        for round in 0..rounds {
            for (index, plan) in plans.iter().enumerate() {
                if round < plan.target_appearances {
                    queue.push(index, plan.combined_weight.max(params.min_wrr_weight));
                }
            }
        }

        Self {
            params,
            plans,
            exam_date,
            queue,
            appearances: vec![0; plans.len()],
            last_slot: vec![None; plans.len()],
            subject_counts: HashMap::new(),
            allocated: 0,
            not_introduced: plans.len(),
            total_slots: 0,
        }
    }

    /// Remaining queue size
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Fill the weekday slots of `days`
    pub fn allocate(mut self, days: &[StudyDay]) -> AllocationOutcome {
        let mut outcome = AllocationOutcome::default();
        self.total_slots = days
            .iter()
            .filter(|d| d.is_workday())
            .map(|d| d.session_slots as usize)
            .sum();

        let mut slot_index = 0;
        'days: for day in days.iter().filter(|d| d.is_workday()) {
            let days_remaining = (self.exam_date - day.date).num_days();
            for _ in 0..day.session_slots {
                if self.queue.is_empty() {
                    break 'days;
                }
                let session = self.fill_slot(day.date, slot_index, days_remaining);
                if session.is_degraded() {
                    outcome.degraded += 1;
                }
                outcome.sessions.push(session);
                slot_index += 1;
            }
        }

        outcome.unscheduled = self.queue.len();
        tracing::debug!(
            sessions = outcome.sessions.len(),
            degraded = outcome.degraded,
            unscheduled = outcome.unscheduled,
            "Slot allocation finished"
        );
        outcome
    }

    fn fill_slot(
        &mut self,
        date: NaiveDate,
        slot_index: usize,
        days_remaining: i64,
    ) -> ScheduledSession {
        self.queue.tick();

        let slots_after = self.total_slots.saturating_sub(slot_index + 1);
        let reserve_held = slots_after < self.not_introduced;
        let max_attempts = 2 * self.queue.len();

        let mut rejected_topics: HashSet<usize> = HashSet::new();
        let mut rejected_subjects: HashSet<i64> = HashSet::new();

        for _ in 0..max_attempts {
            let Some(candidate) = self.queue.leader(|&plan| {
                !rejected_topics.contains(&plan)
                    && !rejected_subjects.contains(&self.plans[plan].topic.subject_id)
                    && self.reserve_allows(plan, reserve_held)
            }) else {
                break;
            };
            let plan = self.queue.get(candidate).copied().unwrap_or_default();

            match self.veto(plan, slot_index, days_remaining) {
                Some(Veto::SubjectCap) => {
                    tracing::debug!(
                        topic_id = self.plans[plan].topic.topic_id,
                        %date,
                        "Rejected by subject cap"
                    );
                    rejected_subjects.insert(self.plans[plan].topic.subject_id);
                    self.queue.penalize(candidate);
                }
                Some(Veto::Spacing) => {
                    tracing::debug!(
                        topic_id = self.plans[plan].topic.topic_id,
                        %date,
                        "Rejected by spacing"
                    );
                    rejected_topics.insert(plan);
                    self.queue.penalize(candidate);
                }
                None => return self.take(candidate, date, slot_index, false),
            }
        }

        let candidate = self.degraded_candidate(slot_index, days_remaining, reserve_held);
        let plan = self.queue.get(candidate).copied().unwrap_or_default();
        tracing::warn!(
            topic_id = self.plans[plan].topic.topic_id,
            subject = %self.plans[plan].topic.subject_name,
            %date,
            "Allocation degraded: no candidate satisfied spacing and subject cap"
        );
        self.take(candidate, date, slot_index, true)
    }

    /// New topics always pass; reinforcements wait while the reserve is held
    fn reserve_allows(&self, plan: usize, reserve_held: bool) -> bool {
        !reserve_held || self.appearances[plan] == 0
    }

    fn spacing_ok(&self, plan: usize, slot_index: usize, days_remaining: i64) -> bool {
        let Some(last) = self.last_slot[plan] else {
            return true;
        };
        let spacing = self.params.min_spacing(days_remaining, self.plans[plan].combined_weight);
        slot_index - last >= spacing
    }

    fn veto(&self, plan: usize, slot_index: usize, days_remaining: i64) -> Option<Veto> {
        if self.allocated >= self.params.bootstrap_sessions {
            let subject = self.plans[plan].topic.subject_id;
            let count = self.subject_counts.get(&subject).copied().unwrap_or(0);
            let share = (count + 1) as f64 / (self.allocated + 1) as f64;
            if share > self.params.subject_share_cap {
                return Some(Veto::SubjectCap);
            }
        }
        if !self.spacing_ok(plan, slot_index, days_remaining) {
            return Some(Veto::Spacing);
        }
        None
    }

    /// Lowest-weight instance that keeps spacing, else the topic seen longest ago
    fn degraded_candidate(
        &self,
        slot_index: usize,
        days_remaining: i64,
        reserve_held: bool,
    ) -> usize {
        let eligible: Vec<(usize, usize)> = self
            .queue
            .iter()
            .filter(|(_, plan)| self.reserve_allows(**plan, reserve_held))
            .map(|(i, plan)| (i, *plan))
            .collect();

        let lightest = eligible
            .iter()
            .filter(|(_, plan)| self.spacing_ok(*plan, slot_index, days_remaining))
            .fold(None, |best: Option<(usize, f64)>, (i, plan)| {
                let weight = self.plans[*plan].combined_weight;
                match best {
                    Some((_, w)) if w <= weight => best,
                    _ => Some((*i, weight)),
                }
            });
        if let Some((index, _)) = lightest {
            return index;
        }

        eligible
            .iter()
            .min_by_key(|(i, plan)| (self.last_slot[*plan], *i))
            .map(|(i, _)| *i)
            .unwrap_or(0)
    }

    fn take(
        &mut self,
        candidate: usize,
        date: NaiveDate,
        slot_index: usize,
        degraded: bool,
    ) -> ScheduledSession {
        let plan_index = self.queue.remove(candidate);
        let plan = &self.plans[plan_index];
        let topic = &plan.topic;

        let iteration = self.appearances[plan_index] + 1;
        if iteration == 1 {
            self.not_introduced = self.not_introduced.saturating_sub(1);
        }
        self.appearances[plan_index] = iteration;
        self.last_slot[plan_index] = Some(slot_index);
        *self.subject_counts.entry(topic.subject_id).or_default() += 1;
        self.allocated += 1;

        let (session_type, mut description) = if iteration == 1 {
            (SessionType::NewTopic, topic.label())
        } else {
            (
                SessionType::Reinforcement,
                format!("Reinforcement #{}: {}", iteration - 1, topic.label()),
            )
        };
        if degraded {
            description.push(' ');
            description.push_str(DEGRADED_TAG);
        }

        ScheduledSession {
            date,
            subject_id: Some(topic.subject_id),
            subject_name: topic.subject_name.clone(),
            topic_id: Some(topic.topic_id),
            topic_name: Some(topic.topic_name.clone()),
            session_type,
            description,
            metadata: SessionMetadata {
                topic_id: Some(topic.topic_id),
                subject_id: Some(topic.subject_id),
                iteration: Some(iteration),
                weight: Some(plan.combined_weight),
                degraded,
                ..Default::default()
            },
        }
    }
}
