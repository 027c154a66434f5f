//! Test Data Factory
//!
//! Provides utilities for generating realistic test data:
//! - Plans with subjects and topics of varied priority
//! - Generation requests built from typed weekly hours
//! - Pre-built scenarios for common test cases

use cadence_core::{PlanInput, PlanRecord, ScheduleGenerator, Storage, WeeklyHours};
use chrono::{Duration, NaiveDate};
use serde_json::{Value, json};

/// Factory for creating test data
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
///
/// // A plan with 3 subjects of 4 topics, exam in 60 days
/// let scenario = TestDataFactory::create_scenario(&db.storage, ScenarioConfig::default());
///
/// // Run generation against it
/// let summary = scenario.generator().generate(&db.storage, &scenario.request(hours, 60))?;
/// ```
pub struct TestDataFactory;

/// Configuration for scenario generation
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub user_id: i64,
    /// Date the generator treats as today
    pub today: NaiveDate,
    pub exam_in_days: i64,
    pub subject_count: usize,
    pub topics_per_subject: usize,
    /// Cycled across subjects
    pub subject_weights: Vec<u8>,
    /// Cycled across each subject's topics
    pub topic_weights: Vec<u8>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            user_id: 1,
            // a Monday
            today: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            exam_in_days: 60,
            subject_count: 3,
            topics_per_subject: 4,
            subject_weights: vec![5, 3, 2],
            topic_weights: vec![3],
        }
    }
}

/// A seeded plan ready for generation
#[derive(Debug, Clone)]
pub struct PlanScenario {
    pub plan_id: i64,
    pub user_id: i64,
    pub today: NaiveDate,
    pub exam_date: NaiveDate,
    pub subject_ids: Vec<i64>,
    /// Topic ids in creation order
    pub topic_ids: Vec<i64>,
}

impl PlanScenario {
    /// Generator pinned to the scenario's today with a fixed seed
    pub fn generator(&self) -> ScheduleGenerator {
        ScheduleGenerator::default().with_today(self.today).with_seed(7)
    }

    /// Generation request for this plan
    pub fn request(&self, hours: WeeklyHours, session_duration_minutes: u32) -> Value {
        TestDataFactory::generation_request(
            self.plan_id,
            self.user_id,
            hours,
            session_duration_minutes,
        )
    }
}

impl TestDataFactory {
    /// Create a bare plan
    pub fn create_plan(
        storage: &Storage,
        user_id: i64,
        name: &str,
        exam_date: NaiveDate,
    ) -> PlanRecord {
        storage
            .create_plan(PlanInput::new(user_id, name, exam_date))
            .expect("Failed to create plan")
    }

    /// Create a plan with subjects and topics per `config`
    pub fn create_scenario(storage: &Storage, config: ScenarioConfig) -> PlanScenario {
        let exam_date = config.today + Duration::days(config.exam_in_days);
        let plan = Self::create_plan(storage, config.user_id, "Scenario plan", exam_date);

        let mut subject_ids = Vec::new();
        let mut topic_ids = Vec::new();
        for s in 0..config.subject_count {
            let weight = Self::cycle(&config.subject_weights, s);
            let subject = storage
                .add_subject(plan.id, &format!("Subject {}", s + 1), weight)
                .expect("Failed to add subject");
            subject_ids.push(subject.id);

            for t in 0..config.topics_per_subject {
                let weight = Self::cycle(&config.topic_weights, t);
                let topic = storage
                    .add_topic(subject.id, &format!("Topic {}.{}", s + 1, t + 1), weight)
                    .expect("Failed to add topic");
                topic_ids.push(topic.topic_id);
            }
        }

        PlanScenario {
            plan_id: plan.id,
            user_id: config.user_id,
            today: config.today,
            exam_date,
            subject_ids,
            topic_ids,
        }
    }

    /// A bar exam plan with named subjects of uneven priority
    pub fn create_bar_exam_scenario(
        storage: &Storage,
        today: NaiveDate,
        exam_in_days: i64,
    ) -> PlanScenario {
        let catalog: [(&str, u8, &[(&str, u8)]); 4] = [
            (
                "Constitutional Law",
                5,
                &[
                    ("Judicial review", 5),
                    ("Federalism", 4),
                    ("Due process", 4),
                    ("Equal protection", 3),
                ],
            ),
            (
                "Contracts",
                4,
                &[("Formation", 4), ("Consideration", 3), ("Remedies", 3)],
            ),
            (
                "Torts",
                3,
                &[("Negligence", 5), ("Strict liability", 2), ("Defamation", 2)],
            ),
            ("Ethics", 1, &[("Conflicts of interest", 2), ("Confidentiality", 1)]),
        ];

        let exam_date = today + Duration::days(exam_in_days);
        let plan = Self::create_plan(storage, 1, "Bar exam", exam_date);
        let mut subject_ids = Vec::new();
        let mut topic_ids = Vec::new();
        for (subject_name, subject_weight, topics) in catalog {
            let subject = storage
                .add_subject(plan.id, subject_name, subject_weight)
                .expect("Failed to add subject");
            subject_ids.push(subject.id);
            for (topic_name, topic_weight) in topics {
                let topic = storage
                    .add_topic(subject.id, topic_name, *topic_weight)
                    .expect("Failed to add topic");
                topic_ids.push(topic.topic_id);
            }
        }

        PlanScenario {
            plan_id: plan.id,
            user_id: 1,
            today,
            exam_date,
            subject_ids,
            topic_ids,
        }
    }

    /// Build a generation request body
    pub fn generation_request(
        plan_id: i64,
        user_id: i64,
        hours: WeeklyHours,
        session_duration_minutes: u32,
    ) -> Value {
        json!({
            "plan_id": plan_id,
            "user_id": user_id,
            "weekly_hours": hours.to_json(),
            "session_duration_minutes": session_duration_minutes,
        })
    }

    /// Two hours on weekdays, three on Saturday, one on Sunday
    pub fn standard_hours() -> WeeklyHours {
        WeeklyHours::new([1, 2, 2, 2, 2, 2, 3])
    }

    /// Two hours Monday to Friday only
    pub fn weekday_hours() -> WeeklyHours {
        WeeklyHours::weekdays_only(2)
    }

    fn cycle(weights: &[u8], index: usize) -> u8 {
        if weights.is_empty() {
            return 3;
        }
        weights[index % weights.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::TestDatabaseManager;

    #[test]
    fn test_create_scenario() {
        let db = TestDatabaseManager::new_temp();
        let scenario = TestDataFactory::create_scenario(&db.storage, ScenarioConfig::default());

        assert_eq!(scenario.subject_ids.len(), 3);
        assert_eq!(scenario.topic_ids.len(), 12);
        assert_eq!(db.storage.get_topics_for_plan(scenario.plan_id).unwrap().len(), 12);
        // scheduling order puts the heaviest subject first
        let topics = db.storage.get_topics_for_plan(scenario.plan_id).unwrap();
        assert_eq!(topics[0].subject_weight, 5);
    }

    #[test]
    fn test_bar_exam_scenario() {
        let db = TestDatabaseManager::new_temp();
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let scenario = TestDataFactory::create_bar_exam_scenario(&db.storage, today, 90);
        assert_eq!(scenario.topic_ids.len(), 12);
        assert_eq!(scenario.exam_date, NaiveDate::from_ymd_opt(2026, 5, 31).unwrap());
    }

    #[test]
    fn test_request_shape() {
        let hours = TestDataFactory::standard_hours();
        let request = TestDataFactory::generation_request(3, 9, hours, 50);
        assert_eq!(request["plan_id"], 3);
        assert_eq!(request["user_id"], 9);
        assert_eq!(request["session_duration_minutes"], 50);
        assert!(request["weekly_hours"].is_object());
    }
}
