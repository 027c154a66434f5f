//! Study-day computation from the weekly availability matrix

use chrono::{Datelike, NaiveDate};

use crate::plan::{StudyDay, WeeklyHours, slots_per_day};

/// Every calendar day from `today` through `exam_date` (inclusive) that has at
/// least one session slot.
///
/// Empty when the exam is in the past, the week has no hours, or the session
/// duration is zero. Callers treat an empty result as "no viable schedule".
pub fn compute_study_days(
    today: NaiveDate,
    exam_date: NaiveDate,
    weekly_hours: &WeeklyHours,
    session_duration_minutes: u32,
) -> Vec<StudyDay> {
    if exam_date < today || session_duration_minutes == 0 || weekly_hours.total() == 0 {
        return Vec::new();
    }

    today
        .iter_days()
        .take_while(|date| *date <= exam_date)
        .filter_map(|date| {
            let slots = slots_per_day(weekly_hours.get(date.weekday()), session_duration_minutes);
            (slots > 0).then(|| StudyDay::new(date, slots))
        })
        .collect()
}

/// Slots on Monday-Friday study days
pub fn workday_capacity(days: &[StudyDay]) -> (u32, usize) {
    days.iter()
        .filter(|d| d.is_workday())
        .fold((0, 0), |(slots, count), d| (slots + d.session_slots, count + 1))
}
