//! Failure and Rollback Tests
//!
//! A failed generation must leave the plan exactly as it was: settings,
//! sessions and exclusions untouched.

use cadence_core::{GenerationError, ScheduleGenerator, SessionStatus, WeeklyHours};
use cadence_e2e_tests::{ScenarioConfig, TestDataFactory, TestDatabaseManager};
use chrono::Duration;
use serde_json::json;

#[test]
fn test_invalid_request_reports_every_error() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_scenario(&db.storage, ScenarioConfig::default());

    let request = json!({
        "plan_id": scenario.plan_id,
        "user_id": scenario.user_id,
        "weekly_hours": {"1": -2, "2": 30},
        "session_duration_minutes": 5,
        "daily_question_goal": 0,
    });
    let err = scenario.generator().generate(&db.storage, &request).unwrap_err();
    let validation = match err {
        GenerationError::ConfigInvalid(validation) => validation,
        other => panic!("expected ConfigInvalid, got {:?}", other),
    };
    assert!(validation.errors.len() >= 4, "{:?}", validation.errors);
    assert!(validation.to_string().contains("session_duration_minutes"));

    assert_eq!(db.session_count(scenario.plan_id, None), 0);
}

#[test]
fn test_non_object_request() {
    let db = TestDatabaseManager::new_temp();
    let err = ScheduleGenerator::default()
        .generate(&db.storage, &json!([1, 2, 3]))
        .unwrap_err();
    assert!(matches!(err, GenerationError::ConfigInvalid(_)));
}

#[test]
fn test_other_users_plan_is_not_found() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_scenario(&db.storage, ScenarioConfig::default());
    let request = scenario.request(TestDataFactory::standard_hours(), 50);
    let first = scenario.generator().generate(&db.storage, &request).unwrap();

    let mut foreign = request.clone();
    foreign["user_id"] = json!(scenario.user_id + 1);
    foreign["session_duration_minutes"] = json!(90);
    let err = scenario.generator().generate(&db.storage, &foreign).unwrap_err();
    assert!(matches!(
        err,
        GenerationError::PlanNotFound { plan_id, .. } if plan_id == scenario.plan_id
    ));

    // the owner's schedule and settings survive
    assert_eq!(db.session_count(scenario.plan_id, None), first.total_sessions);
    let plan = db.storage.get_plan(scenario.plan_id, scenario.user_id).unwrap().unwrap();
    assert_eq!(plan.session_duration_minutes, 50);
}

#[test]
fn test_missing_plan_is_not_found() {
    let db = TestDatabaseManager::new_temp();
    let hours = TestDataFactory::standard_hours();
    let request = TestDataFactory::generation_request(404, 1, hours, 50);
    assert!(matches!(
        ScheduleGenerator::default().generate(&db.storage, &request),
        Err(GenerationError::PlanNotFound { plan_id: 404, user_id: 1 })
    ));
}

#[test]
fn test_exam_passed_rolls_back_everything() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_scenario(
        &db.storage,
        ScenarioConfig {
            exam_in_days: 20,
            ..Default::default()
        },
    );
    let mut request = scenario.request(TestDataFactory::standard_hours(), 50);
    request["final_stretch"] = json!(true);
    let first = scenario.generator().generate(&db.storage, &request).unwrap();
    let exclusions_before = db.storage.list_exclusions(scenario.plan_id).unwrap().len();

    // a month later the exam is behind us
    let late = ScheduleGenerator::default()
        .with_today(scenario.today + Duration::days(30))
        .with_seed(7);
    let mut changed = scenario.request(WeeklyHours::weekdays_only(6), 120);
    changed["include_essay"] = json!(true);
    let err = late.generate(&db.storage, &changed).unwrap_err();
    assert!(matches!(err, GenerationError::ScheduleNotViable(_)));
    assert!(err.to_string().contains("Adjust your exam date or study hours"));

    // pending sessions were not deleted, settings were not overwritten
    assert_eq!(
        db.session_count(scenario.plan_id, Some(SessionStatus::Pending)),
        first.total_sessions
    );
    let plan = db.storage.get_plan(scenario.plan_id, scenario.user_id).unwrap().unwrap();
    assert_eq!(plan.session_duration_minutes, 50);
    assert_eq!(plan.weekly_hours, TestDataFactory::standard_hours());
    assert!(!plan.include_essay);
    assert!(plan.final_stretch);
    assert_eq!(db.storage.list_exclusions(scenario.plan_id).unwrap().len(), exclusions_before);
}

#[test]
fn test_sessions_longer_than_any_day() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_scenario(&db.storage, ScenarioConfig::default());

    let err = scenario
        .generator()
        .generate(&db.storage, &scenario.request(WeeklyHours::weekdays_only(2), 180))
        .unwrap_err();
    let reason = match err {
        GenerationError::ScheduleNotViable(reason) => reason,
        other => panic!("expected ScheduleNotViable, got {:?}", other),
    };
    assert!(reason.contains("180-minute"));
    assert_eq!(db.session_count(scenario.plan_id, None), 0);
}

#[test]
fn test_plan_without_topics() {
    let db = TestDatabaseManager::new_temp();
    let scenario = TestDataFactory::create_scenario(
        &db.storage,
        ScenarioConfig {
            subject_count: 2,
            topics_per_subject: 0,
            ..Default::default()
        },
    );
    let err = scenario
        .generator()
        .generate(&db.storage, &scenario.request(TestDataFactory::standard_hours(), 50))
        .unwrap_err();
    assert!(matches!(err, GenerationError::NoTopics(id) if id == scenario.plan_id));

    // settings update rolled back with the rest
    let plan = db.storage.get_plan(scenario.plan_id, scenario.user_id).unwrap().unwrap();
    assert_eq!(plan.weekly_hours, WeeklyHours::default());
}
