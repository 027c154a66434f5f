//! Spaced-repetition reviews
//!
//! Each first study session schedules reviews at fixed day offsets. Every
//! review is pushed forward to the review weekday, and all reviews landing on
//! the same date share one consolidated session.

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashSet};

use super::params::ScheduleParams;
use crate::plan::{ReviewItem, ScheduledSession, SessionMetadata, SessionType, StudyDay};

/// Subject name used when a review spans several subjects
pub const MIXED_REVIEW_SUBJECT: &str = "Review";

/// Consolidated review sessions plus the reviews that found no date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewOutcome {
    pub sessions: Vec<ScheduledSession>,
    pub dropped: usize,
}

/// First date on or after `from` that falls on the review weekday and is a
/// study day, looking at most `params.review_search_days` ahead
pub fn snap_to_review_day(
    from: NaiveDate,
    study_dates: &HashSet<NaiveDate>,
    params: &ScheduleParams,
) -> Option<NaiveDate> {
    (0..=params.review_search_days)
        .map(|offset| from + Duration::days(offset))
        .find(|date| date.weekday() == params.review_weekday && study_dates.contains(date))
}

/// Build consolidated reviews for every `NewTopic` session in `sessions`
pub fn inject_reviews(
    sessions: &[ScheduledSession],
    days: &[StudyDay],
    params: &ScheduleParams,
) -> ReviewOutcome {
    let study_dates: HashSet<NaiveDate> = days.iter().map(|d| d.date).collect();
    let mut by_date: BTreeMap<NaiveDate, Vec<ReviewItem>> = BTreeMap::new();
    let mut dropped = 0;

    for session in sessions.iter().filter(|s| s.session_type == SessionType::NewTopic) {
        let (Some(topic_id), Some(subject_id)) = (session.topic_id, session.subject_id) else {
            continue;
        };
        for offset in &params.review_offsets {
            let due = session.date + Duration::days(*offset);
            let Some(date) = snap_to_review_day(due, &study_dates, params) else {
                dropped += 1;
                continue;
            };
            let items = by_date.entry(date).or_default();
            if items.iter().any(|item| item.topic_id == topic_id) {
                continue;
            }
            items.push(ReviewItem {
                topic_id,
                subject_id,
                subject_name: session.subject_name.clone(),
                topic_name: session.topic_name.clone().unwrap_or_default(),
                label: format!("R{}", offset),
            });
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, "Reviews fell outside the study calendar and were dropped");
    }

    let sessions = by_date
        .into_iter()
        .map(|(date, items)| consolidated_session(date, items))
        .collect();

    ReviewOutcome { sessions, dropped }
}

fn consolidated_session(date: NaiveDate, items: Vec<ReviewItem>) -> ScheduledSession {
    // subjects in order of first appearance
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    for item in &items {
        let entry = format!("{} ({})", item.topic_name, item.label);
        match groups.iter_mut().find(|(name, _)| *name == item.subject_name) {
            Some((_, topics)) => topics.push(entry),
            None => groups.push((item.subject_name.as_str(), vec![entry])),
        }
    }
    let description = format!(
        "Consolidated review: {}",
        groups
            .iter()
            .map(|(subject, topics)| format!("{}: {}", subject, topics.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    );

    let single_subject = items
        .first()
        .filter(|first| items.iter().all(|i| i.subject_id == first.subject_id))
        .map(|first| (first.subject_id, first.subject_name.clone()));
    let single_label = items
        .first()
        .filter(|first| items.iter().all(|i| i.label == first.label))
        .map(|first| first.label.clone());

    let (subject_id, subject_name) = match single_subject {
        Some((id, name)) => (Some(id), name),
        None => (None, MIXED_REVIEW_SUBJECT.to_string()),
    };

    ScheduledSession {
        date,
        subject_id,
        subject_name,
        topic_id: None,
        topic_name: None,
        session_type: SessionType::ConsolidatedReview,
        description,
        metadata: SessionMetadata {
            subject_id,
            review_label: single_label,
            review_items: items,
            ..Default::default()
        },
    }
}
