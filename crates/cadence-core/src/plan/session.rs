//! Scheduled sessions and the study days they are placed on

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::weekly::is_workday;

// ============================================================================
// ENUMS
// ============================================================================

/// What a session asks the student to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// First time a topic is studied
    NewTopic,
    /// Later appearance of an already introduced topic
    Reinforcement,
    /// Saturday review covering several topics
    ConsolidatedReview,
    /// Question set drawn from a weighted subject
    DirectedMockExam,
    /// Sunday essay writing
    EssayPractice,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::NewTopic => "new_topic",
            SessionType::Reinforcement => "reinforcement",
            SessionType::ConsolidatedReview => "consolidated_review",
            SessionType::DirectedMockExam => "directed_mock_exam",
            SessionType::EssayPractice => "essay_practice",
        }
    }

    pub fn parse_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new_topic" => Some(SessionType::NewTopic),
            "reinforcement" => Some(SessionType::Reinforcement),
            "consolidated_review" => Some(SessionType::ConsolidatedReview),
            "directed_mock_exam" => Some(SessionType::DirectedMockExam),
            "essay_practice" => Some(SessionType::EssayPractice),
            _ => None,
        }
    }

    /// Sessions produced by the slot allocator
    pub fn is_study(&self) -> bool {
        matches!(self, SessionType::NewTopic | SessionType::Reinforcement)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress of a persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn parse_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(SessionStatus::Pending),
            "in_progress" | "in-progress" => Some(SessionStatus::InProgress),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// METADATA
// ============================================================================

/// One topic referenced by a consolidated review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub topic_id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub topic_name: String,
    /// Offset label such as `R7`
    pub label: String,
}

/// Structured details persisted alongside a session as JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<i64>,
    /// 1-based appearance number of the topic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_label: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub review_items: Vec<ReviewItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_duration: Option<String>,
}

// ============================================================================
// SESSIONS AND DAYS
// ============================================================================

/// A session produced by a generation run, before persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    pub date: NaiveDate,
    /// None when a review spans several subjects
    pub subject_id: Option<i64>,
    pub subject_name: String,
    /// None for reviews, mock exams and essays
    pub topic_id: Option<i64>,
    pub topic_name: Option<String>,
    pub session_type: SessionType,
    pub description: String,
    pub metadata: SessionMetadata,
}

impl ScheduledSession {
    pub fn is_degraded(&self) -> bool {
        self.metadata.degraded
    }
}

/// A calendar day with at least one session slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub session_slots: u32,
}

impl StudyDay {
    pub fn new(date: NaiveDate, session_slots: u32) -> Self {
        Self {
            date,
            weekday: date.weekday(),
            session_slots,
        }
    }

    /// Monday through Friday
    pub fn is_workday(&self) -> bool {
        is_workday(self.weekday)
    }

    pub fn is_saturday(&self) -> bool {
        self.weekday == Weekday::Sat
    }

    pub fn is_sunday(&self) -> bool {
        self.weekday == Weekday::Sun
    }
}
