//! Tunable constants of the schedule engine

use chrono::Weekday;
use std::str::FromStr;

// ============================================================================
// SCHEDULE PARAMS
// ============================================================================

/// Heuristic knobs used by the generation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleParams {
    /// Share of the combined weight taken from the subject (rest from the topic)
    pub subject_blend: f64,
    /// Round-robin weight floor so weight-zero topics still advance
    pub min_wrr_weight: f64,
    /// Days before the exam under which high-priority topics may repeat sooner.
    ///
    /// Compared against the days left from each study day, not from the run
    /// date, so a long plan tightens spacing only in its last stretch. The 14-day
    /// default and [`ScheduleParams::high_priority_weight`] are product
    /// heuristics awaiting confirmation; keep them overridable.
    pub short_horizon_days: i64,
    /// Combined weight at which a topic counts as high priority
    pub high_priority_weight: f64,
    /// Minimum slot distance between repeats near the exam
    pub relaxed_spacing: usize,
    /// Minimum slot distance between repeats otherwise
    pub default_spacing: usize,
    /// Largest share of allocated sessions a single subject may hold
    pub subject_share_cap: f64,
    /// Sessions allocated before the subject cap is enforced
    pub bootstrap_sessions: usize,
    /// Days after a first study session at which reviews are due
    pub review_offsets: Vec<i64>,
    /// Weekday reviews are snapped to
    pub review_weekday: Weekday,
    /// How far forward a review may be pushed looking for a valid day
    pub review_search_days: i64,
    /// Questions suggested per mock exam
    pub mock_question_count: u32,
    /// Time hint shown on each mock exam
    pub mock_suggested_duration: String,
    /// Topic names sampled into each mock exam
    pub mock_focus_topics: usize,
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            subject_blend: 0.7,
            min_wrr_weight: 0.05,
            short_horizon_days: 14,
            high_priority_weight: 0.9,
            relaxed_spacing: 1,
            default_spacing: 2,
            subject_share_cap: 0.45,
            bootstrap_sessions: 5,
            review_offsets: vec![7, 14, 28],
            review_weekday: Weekday::Sat,
            review_search_days: 365,
            mock_question_count: 25,
            mock_suggested_duration: "30-40 min".to_string(),
            mock_focus_topics: 5,
        }
    }
}

impl ScheduleParams {
    /// Defaults with `CADENCE_*` environment overrides applied
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            short_horizon_days: env_or("CADENCE_SHORT_HORIZON_DAYS", defaults.short_horizon_days),
            high_priority_weight: env_or(
                "CADENCE_HIGH_PRIORITY_WEIGHT",
                defaults.high_priority_weight,
            )
            .clamp(0.0, 1.0),
            subject_share_cap: env_or("CADENCE_SUBJECT_SHARE_CAP", defaults.subject_share_cap)
                .clamp(0.0, 1.0),
            bootstrap_sessions: env_or("CADENCE_BOOTSTRAP_SESSIONS", defaults.bootstrap_sessions),
            mock_question_count: env_or(
                "CADENCE_MOCK_QUESTION_COUNT",
                defaults.mock_question_count,
            ),
            ..defaults
        }
    }

    /// Minimum slot distance for a topic, `days_remaining` counted from the
    /// study day being filled
    pub fn min_spacing(&self, days_remaining: i64, combined_weight: f64) -> usize {
        if days_remaining < self.short_horizon_days
            && combined_weight >= self.high_priority_weight
        {
            self.relaxed_spacing
        } else {
            self.default_spacing
        }
    }
}

fn env_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
