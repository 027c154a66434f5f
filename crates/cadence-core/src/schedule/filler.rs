//! Capacity filling with directed mock exams
//!
//! Days that received no session at all (Sundays excepted) are filled with
//! mock exams, one per slot. Subjects rotate by priority weight; each mock
//! exam focuses on a random handful of the subject's topics.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use super::params::ScheduleParams;
use super::wrr::WeightedRoundRobin;
use crate::plan::{ScheduledSession, SessionMetadata, SessionType, StudyDay, TopicRecord};

/// A subject with the names of all its topics
#[derive(Debug, Clone, PartialEq)]
struct SubjectPool {
    subject_id: i64,
    subject_name: String,
    weight: u8,
    topic_names: Vec<String>,
}

/// Group the catalog by subject, keeping first-seen order
fn subject_pools(all_topics: &[TopicRecord]) -> Vec<SubjectPool> {
    let mut pools: Vec<SubjectPool> = Vec::new();
    for topic in all_topics {
        match pools.iter_mut().find(|p| p.subject_id == topic.subject_id) {
            Some(pool) => pool.topic_names.push(topic.topic_name.clone()),
            None => pools.push(SubjectPool {
                subject_id: topic.subject_id,
                subject_name: topic.subject_name.clone(),
                weight: topic.subject_weight,
                topic_names: vec![topic.topic_name.clone()],
            }),
        }
    }
    pools
}

/// Mock exams for every non-Sunday study day without sessions
pub fn fill_remaining<R: Rng + ?Sized>(
    scheduled: &[ScheduledSession],
    all_topics: &[TopicRecord],
    days: &[StudyDay],
    params: &ScheduleParams,
    rng: &mut R,
) -> Vec<ScheduledSession> {
    let pools = subject_pools(all_topics);
    if pools.is_empty() {
        return Vec::new();
    }

    let mut rotation = WeightedRoundRobin::new();
    for (index, pool) in pools.iter().enumerate() {
        rotation.push(index, pool.weight as f64);
    }

    let occupied: HashSet<NaiveDate> = scheduled.iter().map(|s| s.date).collect();
    let mut sessions = Vec::new();

    for day in days.iter().filter(|d| !d.is_sunday() && !occupied.contains(&d.date)) {
        for _ in 0..day.session_slots {
            let Some(&index) = rotation.select() else {
                break;
            };
            let pool = &pools[index];
            let focus_topics: Vec<String> = pool
                .topic_names
                .choose_multiple(rng, params.mock_focus_topics)
                .cloned()
                .collect();

            sessions.push(ScheduledSession {
                date: day.date,
                subject_id: Some(pool.subject_id),
                subject_name: pool.subject_name.clone(),
                topic_id: None,
                topic_name: None,
                session_type: SessionType::DirectedMockExam,
                description: format!(
                    "Directed mock exam: {} ({} questions, {})",
                    pool.subject_name, params.mock_question_count, params.mock_suggested_duration
                ),
                metadata: SessionMetadata {
                    subject_id: Some(pool.subject_id),
                    focus_topics,
                    question_count: Some(params.mock_question_count),
                    suggested_duration: Some(params.mock_suggested_duration.clone()),
                    ..Default::default()
                },
            });
        }
    }

    tracing::debug!(mock_exams = sessions.len(), "Filled remaining capacity");
    sessions
}
