//! Weekly availability and the per-run plan configuration
//!
//! Weekday keys follow the calendar convention used by the request payloads:
//! Sunday is index 0 and Saturday is index 6. Inside the crate every lookup
//! goes through [`chrono::Weekday`] so the convention lives in one place.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Number of weekdays in the availability matrix
pub const DAYS_PER_WEEK: usize = 7;

/// Weekdays in payload order (Sunday = 0)
pub const SUNDAY_FIRST: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Default session length when a request does not specify one
pub const DEFAULT_SESSION_DURATION_MINUTES: u32 = 50;

/// Payload index of a weekday (Sunday = 0)
pub fn weekday_index(day: Weekday) -> usize {
    day.num_days_from_sunday() as usize
}

/// Weekday for a payload index, if the index is in range
pub fn weekday_from_index(index: usize) -> Option<Weekday> {
    SUNDAY_FIRST.get(index).copied()
}

/// Monday through Friday
pub fn is_workday(day: Weekday) -> bool {
    !matches!(day, Weekday::Sat | Weekday::Sun)
}

// ============================================================================
// WEEKLY HOURS
// ============================================================================

/// Whole study hours available on each weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeeklyHours([u32; DAYS_PER_WEEK]);

impl WeeklyHours {
    /// Build from an array in payload order (Sunday first)
    pub fn new(hours: [u32; DAYS_PER_WEEK]) -> Self {
        Self(hours)
    }

    /// Same number of hours Monday through Friday, nothing on weekends
    pub fn weekdays_only(hours: u32) -> Self {
        let mut weekly = Self::default();
        for day in SUNDAY_FIRST.iter().copied().filter(|d| is_workday(*d)) {
            weekly.set(day, hours);
        }
        weekly
    }

    pub fn get(&self, day: Weekday) -> u32 {
        self.0[weekday_index(day)]
    }

    pub fn set(&mut self, day: Weekday, hours: u32) {
        self.0[weekday_index(day)] = hours;
    }

    /// Builder-style [`WeeklyHours::set`]
    pub fn with(mut self, day: Weekday, hours: u32) -> Self {
        self.set(day, hours);
        self
    }

    /// Total hours across the week
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Number of weekdays with any study time
    pub fn active_days(&self) -> usize {
        self.0.iter().filter(|h| **h > 0).count()
    }

    /// JSON object keyed `"0"`..`"6"`, the shape stored on the plan row
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .enumerate()
            .map(|(i, h)| (i.to_string(), serde_json::Value::from(*h)))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Lenient parse of the stored JSON object.
    ///
    /// Unknown keys are ignored, unparseable or negative values count as 0.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let map = value.as_object()?;
        let mut weekly = Self::default();
        for (key, raw) in map {
            let Some(day) = key.trim().parse::<usize>().ok().and_then(weekday_from_index) else {
                continue;
            };
            let hours = super::validator::coerce_int(raw).unwrap_or(0).max(0);
            weekly.set(day, u32::try_from(hours).unwrap_or(u32::MAX));
        }
        Some(weekly)
    }
}

// ============================================================================
// PLAN CONFIG
// ============================================================================

/// Immutable input to one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    /// Last day that can hold a session (inclusive)
    pub exam_date: NaiveDate,
    pub weekly_hours: WeeklyHours,
    pub session_duration_minutes: u32,
    /// Schedule essay practice on Sundays
    pub include_essay: bool,
    /// Drop the lowest-priority topics when they cannot all fit
    pub final_stretch: bool,
}

impl PlanConfig {
    pub fn new(
        exam_date: NaiveDate,
        weekly_hours: WeeklyHours,
        session_duration_minutes: u32,
    ) -> Self {
        Self {
            exam_date,
            weekly_hours,
            session_duration_minutes,
            include_essay: false,
            final_stretch: false,
        }
    }
}

/// `floor(hours * 60 / duration)`; a zero duration yields no slots
pub fn slots_per_day(hours: u32, session_duration_minutes: u32) -> u32 {
    if session_duration_minutes == 0 {
        return 0;
    }
    hours.saturating_mul(60) / session_duration_minutes
}
