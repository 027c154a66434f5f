//! Generation orchestrator
//!
//! Validates a request, then runs the whole pipeline inside one immediate
//! transaction: load the plan, persist the validated settings, clear pending
//! sessions, build the schedule, store exclusions and sessions, commit. Any
//! error rolls everything back.

use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

use super::availability::compute_study_days;
use super::params::ScheduleParams;
use super::pipeline::build_schedule;
use crate::plan::{ConfigValidator, PlanConfig, SessionType, ValidationError};
use crate::storage::{Storage, StorageError};

// ============================================================================
// ERRORS
// ============================================================================

/// Why a generation run did not commit
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The request was rejected before any transaction opened
    #[error(transparent)]
    ConfigInvalid(#[from] ValidationError),
    /// No plan with this id belongs to this user
    #[error("Plan {plan_id} not found for user {user_id}")]
    PlanNotFound { plan_id: i64, user_id: i64 },
    /// The calendar has no study day before the exam
    #[error("No viable schedule: {0}. Adjust your exam date or study hours")]
    ScheduleNotViable(String),
    /// The plan has no topics at all
    #[error("Plan {0} has no topics to schedule")]
    NoTopics(i64),
    /// Storage failure; the transaction was rolled back
    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Result of a committed generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub generation_id: String,
    pub plan_id: i64,
    pub total_sessions: usize,
    pub excluded_topics_count: usize,
    /// `NewTopic` and `Reinforcement`
    pub study_sessions: usize,
    pub review_sessions: usize,
    pub mock_exam_sessions: usize,
    pub essay_sessions: usize,
    pub degraded_sessions: usize,
    pub dropped_reviews: usize,
    /// Pending rows replaced by this run
    pub deleted_sessions: usize,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Runs schedule generation against a [`Storage`]
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    params: ScheduleParams,
    today: Option<NaiveDate>,
    seed: Option<u64>,
}

impl ScheduleGenerator {
    pub fn new(params: ScheduleParams) -> Self {
        Self {
            params,
            today: None,
            seed: None,
        }
    }

    /// Pin "today" instead of reading the local clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Seed the mock-exam topic sampling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate `request` and regenerate the plan's pending sessions
    pub fn generate(
        &self,
        storage: &Storage,
        request: &serde_json::Value,
    ) -> Result<GenerationSummary, GenerationError> {
        let start = Instant::now();
        let validated = ConfigValidator::validate(request)?;
        let config = validated.config;
        let mut warnings = validated.warnings;

        let generation_id = Uuid::new_v4().to_string();
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::info!(
            plan_id = config.plan_id,
            generation_id = %generation_id,
            %today,
            "Starting schedule generation"
        );

        let result: Result<GenerationSummary, GenerationError> = storage.with_transaction(|tx| {
            let plan = tx
                .get_plan(config.plan_id, config.user_id)?
                .ok_or(GenerationError::PlanNotFound {
                    plan_id: config.plan_id,
                    user_id: config.user_id,
                })?;
            tx.update_plan_settings(&config)?;

            let topics = tx.get_topics_for_plan(plan.id)?;
            if topics.is_empty() {
                return Err(GenerationError::NoTopics(plan.id));
            }

            let days = compute_study_days(
                today,
                plan.exam_date,
                &config.weekly_hours,
                config.session_duration_minutes,
            );
            if days.is_empty() {
                let reason = if plan.exam_date < today {
                    format!("exam date {} is in the past", plan.exam_date)
                } else {
                    format!(
                        "no study slots between {} and {} with {}-minute sessions",
                        today, plan.exam_date, config.session_duration_minutes
                    )
                };
                return Err(GenerationError::ScheduleNotViable(reason));
            }
            tracing::info!(
                plan_id = plan.id,
                study_days = days.len(),
                topics = topics.len(),
                "Computed availability"
            );

            warnings.extend(ConfigValidator::timeline_warnings(
                today,
                plan.exam_date,
                &config.weekly_hours,
                config.final_stretch,
            ));

            let deleted = tx.delete_pending_sessions(plan.id)?;

            let plan_config = PlanConfig {
                exam_date: plan.exam_date,
                weekly_hours: config.weekly_hours,
                session_duration_minutes: config.session_duration_minutes,
                include_essay: config.include_essay,
                final_stretch: config.final_stretch,
            };
            let output = build_schedule(&plan_config, &topics, &days, &self.params, &mut rng);

            tx.replace_exclusions(plan.id, &output.excluded)?;
            let inserted = tx.insert_sessions(plan.id, &output.sessions, &generation_id)?;
            warnings.extend(output.warnings.iter().cloned());

            Ok(GenerationSummary {
                generation_id: generation_id.clone(),
                plan_id: plan.id,
                total_sessions: inserted,
                excluded_topics_count: output.excluded.len(),
                study_sessions: output.study_sessions(),
                review_sessions: output.count(SessionType::ConsolidatedReview),
                mock_exam_sessions: output.count(SessionType::DirectedMockExam),
                essay_sessions: output.count(SessionType::EssayPractice),
                degraded_sessions: output.degraded,
                dropped_reviews: output.dropped_reviews,
                deleted_sessions: deleted,
                warnings: Vec::new(),
                duration_ms: 0,
            })
        });

        match result {
            Ok(mut summary) => {
                summary.warnings = warnings;
                summary.duration_ms = start.elapsed().as_millis() as u64;
                tracing::info!(
                    plan_id = summary.plan_id,
                    generation_id = %summary.generation_id,
                    sessions = summary.total_sessions,
                    excluded = summary.excluded_topics_count,
                    degraded = summary.degraded_sessions,
                    duration_ms = summary.duration_ms,
                    "Schedule generation committed"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(
                    plan_id = config.plan_id,
                    error = %e,
                    "Schedule generation rolled back"
                );
                Err(e)
            }
        }
    }
}
