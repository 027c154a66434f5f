//! Request validation
//!
//! Generation requests arrive as loosely typed JSON (form posts, CLI flags
//! serialised by hand, older clients sending numbers as strings). The
//! validator coerces every field into a [`GenerationConfig`], collecting all
//! hard errors at once so the caller can report them together, plus advisory
//! warnings that never block a run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::weekly::{DEFAULT_SESSION_DURATION_MINUTES, WeeklyHours, weekday_from_index};

/// Shortest accepted session length in minutes
pub const MIN_SESSION_DURATION: i64 = 10;
/// Longest accepted session length in minutes
pub const MAX_SESSION_DURATION: i64 = 240;
/// Upper bound for the daily question goal
pub const MAX_DAILY_QUESTION_GOAL: i64 = 500;
/// Upper bound for the weekly question goal
pub const MAX_WEEKLY_QUESTION_GOAL: i64 = 3500;
/// Hours in a day; anything above is a typo
pub const MAX_HOURS_PER_DAY: i64 = 24;

const HEAVY_DAY_HOURS: u32 = 12;
const HEAVY_WEEK_HOURS: u32 = 70;
const MIN_COMFORTABLE_STUDY_DAYS: usize = 3;
const GOAL_CONSISTENCY_TOLERANCE: f64 = 0.3;

/// Validation failure with every problem found
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid generation config: {}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

/// Sanitised generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub plan_id: i64,
    pub user_id: i64,
    pub weekly_hours: WeeklyHours,
    pub session_duration_minutes: u32,
    pub daily_question_goal: Option<u32>,
    pub weekly_question_goal: Option<u32>,
    pub include_essay: bool,
    pub final_stretch: bool,
}

/// A config that passed validation, with its advisory warnings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub config: GenerationConfig,
    pub warnings: Vec<String>,
}

// ============================================================================
// COERCION
// ============================================================================

/// Integer-prefix coercion.
///
/// Numbers are truncated toward zero, strings are parsed from their leading
/// `[+-]digits` run (`"12h"` is 12, `"abc"` is nothing). Everything else,
/// including booleans and null, yields `None`.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// `true`, `"true"`, `"1"` and non-zero numbers are true; everything else is false
pub fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}

fn is_present(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Validates raw generation requests
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate and sanitise a request body
    pub fn validate(request: &Value) -> Result<ValidatedConfig, ValidationError> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let Some(body) = request.as_object() else {
            return Err(ValidationError {
                errors: vec!["request body must be a JSON object".to_string()],
            });
        };

        let plan_id = Self::positive_id(body.get("plan_id"), "plan_id", &mut errors);
        let user_id = Self::positive_id(body.get("user_id"), "user_id", &mut errors);

        let weekly_hours = Self::weekly_hours(body.get("weekly_hours"), &mut errors, &mut warnings);

        let session_duration_minutes = if is_present(body.get("session_duration_minutes")) {
            let raw = body
                .get("session_duration_minutes")
                .and_then(coerce_int)
                .unwrap_or(0);
            if !(MIN_SESSION_DURATION..=MAX_SESSION_DURATION).contains(&raw) {
                errors.push(format!(
                    "session_duration_minutes must be between {} and {} (got {})",
                    MIN_SESSION_DURATION, MAX_SESSION_DURATION, raw
                ));
            }
            raw.clamp(0, MAX_SESSION_DURATION) as u32
        } else {
            DEFAULT_SESSION_DURATION_MINUTES
        };

        let daily_question_goal = Self::goal(
            body.get("daily_question_goal"),
            "daily_question_goal",
            MAX_DAILY_QUESTION_GOAL,
            &mut errors,
        );
        let weekly_question_goal = Self::goal(
            body.get("weekly_question_goal"),
            "weekly_question_goal",
            MAX_WEEKLY_QUESTION_GOAL,
            &mut errors,
        );

        if let (Some(daily), Some(weekly)) = (daily_question_goal, weekly_question_goal) {
            let projected = daily as f64 * 7.0;
            if (projected - weekly as f64).abs() > weekly as f64 * GOAL_CONSISTENCY_TOLERANCE {
                warnings.push(format!(
                    "weekly question goal {} is inconsistent with a daily goal of {} ({} per week)",
                    weekly, daily, projected
                ));
            }
        }

        let include_essay = coerce_bool(body.get("include_essay"));
        let final_stretch = coerce_bool(body.get("final_stretch"));

        if !errors.is_empty() {
            return Err(ValidationError { errors });
        }

        for warning in &warnings {
            tracing::warn!(plan_id, "{}", warning);
        }

        Ok(ValidatedConfig {
            config: GenerationConfig {
                plan_id,
                user_id,
                weekly_hours,
                session_duration_minutes,
                daily_question_goal,
                weekly_question_goal,
                include_essay,
                final_stretch,
            },
            warnings,
        })
    }

    /// Advisory warnings that depend on the exam date.
    ///
    /// Only meaningful once the plan has been loaded, so the orchestrator calls
    /// this separately from [`ConfigValidator::validate`].
    pub fn timeline_warnings(
        today: NaiveDate,
        exam_date: NaiveDate,
        weekly_hours: &WeeklyHours,
        final_stretch: bool,
    ) -> Vec<String> {
        let mut warnings = Vec::new();
        let days_until_exam = (exam_date - today).num_days();
        if days_until_exam < 0 {
            return warnings;
        }

        if days_until_exam < 7 {
            warnings.push(
                "less than a week until the exam: focus on review and mock exams".to_string(),
            );
        } else if days_until_exam < 30 && !final_stretch {
            warnings.push(
                "less than 30 days until the exam: consider enabling final stretch mode"
                    .to_string(),
            );
        }

        let weeks_until_exam = (days_until_exam + 6) / 7;
        let available_hours = weekly_hours.total() as i64 * weeks_until_exam;
        if available_hours < 50 {
            warnings.push(format!(
                "only {}h of study time until the exam: consider increasing weekly hours",
                available_hours
            ));
        }

        if weekly_hours.active_days() < 4 && days_until_exam > 60 {
            warnings.push(
                "more than two months until the exam: consider studying on more days"
                    .to_string(),
            );
        }

        warnings
    }

    fn positive_id(value: Option<&Value>, field: &str, errors: &mut Vec<String>) -> i64 {
        let id = value.and_then(coerce_int).unwrap_or(0);
        if id <= 0 {
            errors.push(format!("{} must be a positive integer", field));
        }
        id
    }

    fn goal(value: Option<&Value>, field: &str, max: i64, errors: &mut Vec<String>) -> Option<u32> {
        if !is_present(value) {
            return None;
        }
        let goal = value.and_then(coerce_int).unwrap_or(0);
        if goal <= 0 || goal > max {
            errors.push(format!("{} must be between 1 and {} (got {})", field, max, goal));
            return None;
        }
        Some(goal as u32)
    }

    fn weekly_hours(
        value: Option<&Value>,
        errors: &mut Vec<String>,
        warnings: &mut Vec<String>,
    ) -> WeeklyHours {
        let mut weekly = WeeklyHours::default();
        let Some(map) = value.and_then(Value::as_object) else {
            errors.push("weekly_hours must be an object keyed by weekday (0 = Sunday)".to_string());
            return weekly;
        };

        for (key, raw) in map {
            let Some(day) = key.trim().parse::<usize>().ok().and_then(weekday_from_index) else {
                warnings.push(format!("ignored unknown weekday key '{}'", key));
                continue;
            };
            let hours = coerce_int(raw).unwrap_or(0);
            if hours < 0 {
                errors.push(format!("weekly_hours[{}] must not be negative (got {})", key, hours));
                continue;
            }
            if hours > MAX_HOURS_PER_DAY {
                errors.push(format!(
                    "weekly_hours[{}] must not exceed {} (got {})",
                    key, MAX_HOURS_PER_DAY, hours
                ));
                continue;
            }
            let hours = hours as u32;
            if hours > HEAVY_DAY_HOURS {
                warnings.push(format!("{}h in a single day may be excessive", hours));
            }
            weekly.set(day, hours);
        }

        let total = weekly.total();
        if total == 0 {
            errors.push("weekly_hours sums to zero: no study time available".to_string());
            return weekly;
        }
        if weekly.active_days() < MIN_COMFORTABLE_STUDY_DAYS {
            warnings.push("fewer than 3 study days per week".to_string());
        }
        if total > HEAVY_WEEK_HOURS {
            warnings.push(format!("{}h per week risks burnout", total));
        }

        weekly
    }
}
