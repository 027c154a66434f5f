//! Topics and subjects as seen by the schedule engine

use serde::{Deserialize, Serialize};

/// Priority assumed when a subject or topic has none recorded
pub const DEFAULT_PRIORITY_WEIGHT: u8 = 3;

/// Lowest accepted priority weight
pub const MIN_PRIORITY_WEIGHT: u8 = 1;

/// Highest accepted priority weight
pub const MAX_PRIORITY_WEIGHT: u8 = 5;

/// Clamp a stored priority into `1..=5`
pub fn clamp_priority(raw: i64) -> u8 {
    raw.clamp(MIN_PRIORITY_WEIGHT as i64, MAX_PRIORITY_WEIGHT as i64) as u8
}

/// Completion status of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    #[default]
    Pending,
    Completed,
}

impl TopicStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicStatus::Pending => "pending",
            TopicStatus::Completed => "completed",
        }
    }

    /// Parse from stored text; anything unrecognised is still pending
    pub fn parse_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "completed" | "complete" | "done" => TopicStatus::Completed,
            _ => TopicStatus::Pending,
        }
    }
}

impl std::fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A topic row joined with its subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRecord {
    pub topic_id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub topic_name: String,
    /// Subject-level priority (1-5)
    pub subject_weight: u8,
    /// Topic-level priority (1-5)
    pub topic_weight: u8,
    pub status: TopicStatus,
}

impl TopicRecord {
    pub fn is_pending(&self) -> bool {
        self.status == TopicStatus::Pending
    }

    /// Ranking used when topics must be dropped: subject dominates, topic breaks ties
    pub fn final_stretch_priority(&self) -> u32 {
        self.subject_weight as u32 * 10 + self.topic_weight as u32
    }

    /// `Subject: topic` label used in session descriptions
    pub fn label(&self) -> String {
        format!("{}: {}", self.subject_name, self.topic_name)
    }
}

/// A pending topic left out of a final-stretch plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicExclusion {
    pub topic_id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub topic_name: String,
    /// Rank score the topic had when it was cut
    pub priority: u32,
    pub reason: String,
}
