//! Sunday essay practice

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::plan::{ScheduledSession, SessionMetadata, SessionType, StudyDay};

/// Subject name attached to essay sessions
pub const ESSAY_SUBJECT: &str = "Essay";

/// One essay session on each Sunday study day that still has a free slot
pub fn plan_essays(days: &[StudyDay], scheduled: &[ScheduledSession]) -> Vec<ScheduledSession> {
    let mut used: HashMap<NaiveDate, u32> = HashMap::new();
    for session in scheduled {
        *used.entry(session.date).or_default() += 1;
    }

    days.iter()
        .filter(|d| d.is_sunday())
        .filter(|d| used.get(&d.date).copied().unwrap_or(0) < d.session_slots)
        .map(|d| ScheduledSession {
            date: d.date,
            subject_id: None,
            subject_name: ESSAY_SUBJECT.to_string(),
            topic_id: None,
            topic_name: None,
            session_type: SessionType::EssayPractice,
            description: "Essay practice: write and review one full essay".to_string(),
            metadata: SessionMetadata::default(),
        })
        .collect()
}
