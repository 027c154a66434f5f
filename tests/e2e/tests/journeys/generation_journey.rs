//! Generation Journey Tests
//!
//! Full workflows from an empty database to a persisted schedule:
//! seeding a plan, generating, and inspecting what a student would see.

use cadence_core::{ScheduleParams, SessionStatus, SessionType, TopicStatus, WeeklyHours};
use cadence_e2e_tests::harness::schedule_checks::study_sessions;
use cadence_e2e_tests::{
    PlannedCalendar, ScenarioConfig, TestDataFactory, TestDatabaseManager,
    assert_schedule_invariants,
};
use chrono::{Duration, NaiveDate, Weekday};
use std::collections::{HashMap, HashSet};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_bar_exam_journey() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_bar_exam_scenario(&db.storage, monday(), 90);
    let hours = TestDataFactory::standard_hours();

    let mut request = scenario.request(hours, 50);
    request["include_essay"] = serde_json::json!(true);
    let summary = scenario.generator().generate(&db.storage, &request).unwrap();

    let sessions = db.storage.list_sessions(scenario.plan_id, None).unwrap();
    assert_eq!(sessions.len(), summary.total_sessions);
    assert_eq!(
        db.session_count(scenario.plan_id, Some(SessionStatus::Pending)),
        summary.total_sessions
    );
    assert!(
        sessions
            .iter()
            .all(|s| s.generation_id.as_deref() == Some(summary.generation_id.as_str()))
    );

    let params = ScheduleParams::default();
    let calendar = PlannedCalendar::new(scenario.today, scenario.exam_date, &hours, 50);
    assert_schedule_invariants(&sessions, &scenario.topic_ids, &calendar, &params);

    assert!(summary.review_sessions > 0);
    assert!(summary.essay_sessions > 0);
    assert_eq!(summary.excluded_topics_count, 0);

    // a review is dropped only when no Saturday study day is left on or after its due date
    let last_saturday = calendar
        .days
        .iter()
        .filter(|d| d.is_saturday())
        .map(|d| d.date)
        .max()
        .unwrap();
    let expected_dropped: usize = sessions
        .iter()
        .filter(|s| s.session_type == SessionType::NewTopic)
        .map(|s| {
            [7, 14, 28]
                .iter()
                .filter(|offset| s.session_date + Duration::days(**offset) > last_saturday)
                .count()
        })
        .sum();
    assert_eq!(summary.dropped_reviews, expected_dropped);
    if expected_dropped > 0 {
        assert!(summary.warnings.iter().any(|w| w.contains("dropped")));
    }

    // settings from the request land on the plan row
    let plan = db.storage.get_plan(scenario.plan_id, 1).unwrap().unwrap();
    assert!(plan.include_essay);
    assert_eq!(plan.weekly_hours, hours);
    assert_eq!(plan.session_duration_minutes, 50);
}

#[test]
fn test_heavier_topics_recur_more() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_bar_exam_scenario(&db.storage, monday(), 90);
    scenario
        .generator()
        .generate(&db.storage, &scenario.request(TestDataFactory::standard_hours(), 50))
        .unwrap();

    let sessions = db.storage.list_sessions(scenario.plan_id, None).unwrap();
    let mut appearances: HashMap<i64, usize> = HashMap::new();
    for session in study_sessions(&sessions) {
        *appearances.entry(session.topic_id.unwrap()).or_default() += 1;
    }

    let judicial_review = scenario.topic_ids[0];
    let confidentiality = *scenario.topic_ids.last().unwrap();
    // 65 workdays cap every topic at 10 appearances
    assert_eq!(appearances[&judicial_review], 10);
    assert!(appearances[&judicial_review] > appearances[&confidentiality]);
}

#[test]
fn test_single_heavy_topic_reaches_weekly_cap() {
    let db = TestDatabaseManager::new_temp();
    let plan = TestDataFactory::create_plan(&db.storage, 1, "Cap", monday() + Duration::days(30));
    let heavy_subject = db.storage.add_subject(plan.id, "Anatomy", 5).unwrap();
    let heavy = db.storage.add_topic(heavy_subject.id, "Cranial nerves", 5).unwrap();
    let light_subject = db.storage.add_subject(plan.id, "History", 1).unwrap();
    let mut light_ids = Vec::new();
    for i in 0..19 {
        let topic = db
            .storage
            .add_topic(light_subject.id, &format!("Era {}", i), 1)
            .unwrap();
        light_ids.push(topic.topic_id);
    }

    let hours = WeeklyHours::weekdays_only(2);
    let request = TestDataFactory::generation_request(plan.id, 1, hours, 60);
    cadence_core::ScheduleGenerator::default()
        .with_today(monday())
        .with_seed(1)
        .generate(&db.storage, &request)
        .unwrap();

    let sessions = db.storage.list_sessions(plan.id, None).unwrap();
    let count = |topic_id: i64| sessions.iter().filter(|s| s.topic_id == Some(topic_id)).count();
    // 23 workdays: weekly cap 4, base 3
    assert_eq!(count(heavy.topic_id), 4);
    for id in light_ids {
        assert_eq!(count(id), 2);
    }
}

#[test]
fn test_weekday_only_plan_drops_reviews() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_scenario(
        &db.storage,
        ScenarioConfig {
            exam_in_days: 30,
            subject_count: 2,
            topics_per_subject: 5,
            subject_weights: vec![3],
            topic_weights: vec![3],
            ..Default::default()
        },
    );
    let hours = WeeklyHours::new([0, 2, 2, 2, 2, 2, 0]);
    let summary = scenario
        .generator()
        .generate(&db.storage, &scenario.request(hours, 60))
        .unwrap();

    // 23 weekdays with 2 slots each; 10 topics capped at 4 appearances
    assert_eq!(summary.study_sessions, 40);
    // the last three weekdays stay empty and take two mock exams each
    assert_eq!(summary.mock_exam_sessions, 6);
    assert_eq!(summary.total_sessions, 46);

    // no Saturday study days: every review is dropped and reported
    assert_eq!(summary.review_sessions, 0);
    assert_eq!(summary.dropped_reviews, 30);
    assert!(summary.warnings.iter().any(|w| w.contains("dropped")));

    let sessions = db.storage.list_sessions(scenario.plan_id, None).unwrap();
    let params = ScheduleParams::default();
    let calendar = PlannedCalendar::new(scenario.today, scenario.exam_date, &hours, 60);
    assert_schedule_invariants(&sessions, &scenario.topic_ids, &calendar, &params);
}

#[test]
fn test_slots_exhausted_before_queue() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_scenario(
        &db.storage,
        ScenarioConfig {
            exam_in_days: 30,
            subject_count: 2,
            topics_per_subject: 5,
            subject_weights: vec![3],
            topic_weights: vec![3],
            ..Default::default()
        },
    );
    let hours = WeeklyHours::new([0, 2, 2, 2, 2, 2, 0]);
    let summary = scenario
        .generator()
        .generate(&db.storage, &scenario.request(hours, 120))
        .unwrap();

    // 23 slots, 10 topics at 3 appearances each: the rest is left over
    assert_eq!(summary.study_sessions, 23);
    assert_eq!(summary.total_sessions, 23);
    assert_eq!(summary.mock_exam_sessions, 0);
    assert!(summary.warnings.iter().any(|w| w.contains("did not fit")));

    let sessions = db.storage.list_sessions(scenario.plan_id, None).unwrap();
    let introduced: HashSet<i64> = sessions
        .iter()
        .filter(|s| s.session_type == SessionType::NewTopic)
        .filter_map(|s| s.topic_id)
        .collect();
    assert_eq!(introduced.len(), 10);
}

#[test]
fn test_reviews_consolidate_on_saturday() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_scenario(
        &db.storage,
        ScenarioConfig {
            exam_in_days: 40,
            subject_count: 1,
            topics_per_subject: 3,
            ..Default::default()
        },
    );
    let hours = WeeklyHours::weekdays_only(1).with(Weekday::Sat, 1);
    let summary = scenario
        .generator()
        .generate(&db.storage, &scenario.request(hours, 60))
        .unwrap();

    let sessions = db.storage.list_sessions(scenario.plan_id, None).unwrap();

    // introduced Monday, Tuesday and Wednesday of the first week
    let firsts: Vec<(NaiveDate, i64)> = sessions
        .iter()
        .filter(|s| s.session_type == SessionType::NewTopic)
        .map(|s| (s.session_date, s.topic_id.unwrap()))
        .collect();
    assert_eq!(
        firsts.iter().map(|(d, _)| *d).collect::<Vec<_>>(),
        vec![date(2026, 3, 2), date(2026, 3, 3), date(2026, 3, 4)]
    );

    // +7, +14 and +28 all snap to three Saturdays, one session each
    let reviews: Vec<_> = sessions
        .iter()
        .filter(|s| s.session_type == SessionType::ConsolidatedReview)
        .collect();
    assert_eq!(summary.review_sessions, 3);
    assert_eq!(
        reviews.iter().map(|s| s.session_date).collect::<Vec<_>>(),
        vec![date(2026, 3, 14), date(2026, 3, 21), date(2026, 4, 4)]
    );

    let first_review = reviews[0];
    let reviewed: HashSet<i64> = first_review
        .metadata
        .review_items
        .iter()
        .map(|i| i.topic_id)
        .collect();
    let introduced: HashSet<i64> = firsts.iter().map(|(_, id)| *id).collect();
    assert_eq!(reviewed, introduced);
    assert!(first_review.metadata.review_items.iter().all(|i| i.label == "R7"));
    assert!(first_review.description.starts_with("Consolidated review: Subject 1: "));
}

#[test]
fn test_completed_topics_are_not_introduced() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_bar_exam_scenario(&db.storage, monday(), 60);
    let completed: Vec<i64> = scenario.topic_ids.iter().copied().step_by(4).collect();
    for id in &completed {
        db.storage.set_topic_status(*id, TopicStatus::Completed).unwrap();
    }

    let hours = TestDataFactory::standard_hours();
    scenario
        .generator()
        .generate(&db.storage, &scenario.request(hours, 50))
        .unwrap();

    let sessions = db.storage.list_sessions(scenario.plan_id, None).unwrap();
    assert!(
        sessions
            .iter()
            .filter(|s| s.session_type.is_study())
            .all(|s| !completed.contains(&s.topic_id.unwrap()))
    );

    let pending: Vec<i64> = scenario
        .topic_ids
        .iter()
        .copied()
        .filter(|id| !completed.contains(id))
        .collect();
    let calendar = PlannedCalendar::new(scenario.today, scenario.exam_date, &hours, 50);
    assert_schedule_invariants(&sessions, &pending, &calendar, &ScheduleParams::default());

    // mock exams still sample from the whole catalog
    let catalog: HashSet<String> = db
        .storage
        .get_topics_for_plan(scenario.plan_id)
        .unwrap()
        .into_iter()
        .map(|t| t.topic_name)
        .collect();
    for mock in sessions.iter().filter(|s| s.session_type == SessionType::DirectedMockExam) {
        assert!(mock.metadata.focus_topics.iter().all(|t| catalog.contains(t)));
        assert_eq!(mock.metadata.question_count, Some(25));
    }
}
