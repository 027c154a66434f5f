//! SQLite Storage Implementation
//!
//! Plan/topic store and session store backed by one SQLite file. Reads go
//! through a dedicated reader connection; every write, including whole
//! generation runs, goes through the writer connection.

use chrono::{DateTime, NaiveDate, Utc};
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::plan::{
    DEFAULT_PRIORITY_WEIGHT, DEFAULT_SESSION_DURATION_MINUTES, GenerationConfig, ScheduledSession,
    SessionMetadata, SessionStatus, SessionType, TopicExclusion, TopicRecord, TopicStatus,
    WeeklyHours, clamp_priority,
};

/// Environment variable overriding the database directory
pub const DATA_DIR_ENV: &str = "CADENCE_DATA_DIR";

/// File name of the database inside the data directory
pub const DATABASE_FILE: &str = "cadence.db";

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored or supplied data could not be converted
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// RECORDS
// ============================================================================

/// A study plan row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: i64,
    pub user_id: i64,
    pub plan_name: String,
    pub exam_date: NaiveDate,
    pub session_duration_minutes: u32,
    pub weekly_hours: WeeklyHours,
    pub daily_question_goal: Option<u32>,
    pub weekly_question_goal: Option<u32>,
    pub include_essay: bool,
    pub final_stretch: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanInput {
    pub user_id: i64,
    pub plan_name: String,
    pub exam_date: NaiveDate,
    pub session_duration_minutes: u32,
    pub weekly_hours: WeeklyHours,
}

impl PlanInput {
    pub fn new(user_id: i64, plan_name: impl Into<String>, exam_date: NaiveDate) -> Self {
        Self {
            user_id,
            plan_name: plan_name.into(),
            exam_date,
            session_duration_minutes: DEFAULT_SESSION_DURATION_MINUTES,
            weekly_hours: WeeklyHours::default(),
        }
    }
}

/// A subject row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub id: i64,
    pub plan_id: i64,
    pub subject_name: String,
    pub priority_weight: u8,
}

/// A persisted study session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: i64,
    pub plan_id: i64,
    pub topic_id: Option<i64>,
    pub subject_name: String,
    pub session_date: NaiveDate,
    pub session_type: SessionType,
    pub description: String,
    pub status: SessionStatus,
    pub metadata: SessionMetadata,
    pub generation_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A persisted final-stretch exclusion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRecord {
    pub plan_id: i64,
    pub subject_id: i64,
    pub topic_id: i64,
    pub reason: String,
    pub excluded_at: DateTime<Utc>,
}

// ============================================================================
// STORAGE
// ============================================================================

/// Main storage struct
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, making Storage `Send + Sync` so callers can
/// share an `Arc<Storage>` across threads.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl Storage {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("CADENCE_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Resolve the database path when none is given explicitly
    fn default_path() -> Result<PathBuf> {
        let data_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => {
                let proj_dirs = ProjectDirs::from("com", "cadence", "core").ok_or_else(|| {
                    StorageError::Init("Could not determine project directories".to_string())
                })?;
                proj_dirs.data_dir().to_path_buf()
            }
        };

        std::fs::create_dir_all(&data_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(&data_dir, perms);
        }
        Ok(data_dir.join(DATABASE_FILE))
    }

    /// Create new storage instance
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_path()?,
        };

        let writer_conn = Connection::open(&path)?;

        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::info!(path = %path.display(), applied, "Database schema up to date");
        }

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction on the writer.
    ///
    /// The write lock is taken before `f` runs, so concurrent callers queue
    /// up instead of failing halfway. Commits when `f` returns `Ok`; any
    /// error drops the transaction, which rolls it back.
    pub fn with_transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&PlanTransaction<'_>) -> std::result::Result<T, E>,
        E: From<StorageError>,
    {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let tx = writer
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;

        let plan_tx = PlanTransaction { tx };
        let value = f(&plan_tx)?;
        plan_tx.tx.commit().map_err(StorageError::from)?;
        Ok(value)
    }

    // ========================================================================
    // PLANS
    // ========================================================================

    /// Create a plan
    pub fn create_plan(&self, input: PlanInput) -> Result<PlanRecord> {
        let now = Utc::now().to_rfc3339();
        let weekly_hours = input.weekly_hours.to_json().to_string();

        let id = {
            let writer = self
                .writer
                .lock()
                .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
            writer.execute(
                "INSERT INTO study_plans (
                    user_id, plan_name, exam_date, session_duration_minutes, weekly_hours,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    input.user_id,
                    input.plan_name,
                    input.exam_date,
                    input.session_duration_minutes,
                    weekly_hours,
                    now,
                ],
            )?;
            writer.last_insert_rowid()
        };

        self.get_plan(id, input.user_id)?
            .ok_or_else(|| StorageError::NotFound(format!("plan {}", id)))
    }

    /// Get a plan owned by `user_id`
    pub fn get_plan(&self, plan_id: i64, user_id: i64) -> Result<Option<PlanRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        query_plan(&reader, plan_id, user_id)
    }

    /// All plans of a user, newest first
    pub fn list_plans(&self, user_id: i64) -> Result<Vec<PlanRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM study_plans WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let plans = stmt
            .query_map(params![user_id], row_to_plan)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(plans)
    }

    // ========================================================================
    // SUBJECTS & TOPICS
    // ========================================================================

    /// Add a subject to a plan
    pub fn add_subject(
        &self,
        plan_id: i64,
        subject_name: &str,
        priority_weight: u8,
    ) -> Result<SubjectRecord> {
        let priority_weight = clamp_priority(priority_weight as i64);
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "INSERT INTO subjects (plan_id, subject_name, priority_weight, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![plan_id, subject_name, priority_weight, Utc::now().to_rfc3339()],
        )?;
        Ok(SubjectRecord {
            id: writer.last_insert_rowid(),
            plan_id,
            subject_name: subject_name.to_string(),
            priority_weight,
        })
    }

    /// Subjects of a plan, highest priority first
    pub fn list_subjects(&self, plan_id: i64) -> Result<Vec<SubjectRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT id, plan_id, subject_name, priority_weight FROM subjects
             WHERE plan_id = ?1 ORDER BY priority_weight DESC, id ASC",
        )?;
        let subjects = stmt
            .query_map(params![plan_id], |row| {
                Ok(SubjectRecord {
                    id: row.get(0)?,
                    plan_id: row.get(1)?,
                    subject_name: row.get(2)?,
                    priority_weight: clamp_priority(row.get(3)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(subjects)
    }

    /// Add a pending topic to a subject
    pub fn add_topic(
        &self,
        subject_id: i64,
        topic_name: &str,
        priority_weight: u8,
    ) -> Result<TopicRecord> {
        let priority_weight = clamp_priority(priority_weight as i64);
        let id = {
            let writer = self
                .writer
                .lock()
                .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
            writer.execute(
                "INSERT INTO topics (subject_id, topic_name, priority_weight, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    subject_id,
                    topic_name,
                    priority_weight,
                    TopicStatus::Pending.as_str(),
                    Utc::now().to_rfc3339(),
                ],
            )?;
            writer.last_insert_rowid()
        };
        self.get_topic(id)?
            .ok_or_else(|| StorageError::NotFound(format!("topic {}", id)))
    }

    /// Get a topic joined with its subject
    pub fn get_topic(&self, topic_id: i64) -> Result<Option<TopicRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let topic = reader
            .query_row(
                &format!("{} WHERE t.id = ?1", TOPIC_SELECT),
                params![topic_id],
                row_to_topic,
            )
            .optional()?;
        Ok(topic)
    }

    /// Mark a topic pending or completed
    pub fn set_topic_status(&self, topic_id: i64, status: TopicStatus) -> Result<()> {
        let completed_at = match status {
            TopicStatus::Completed => Some(Utc::now().to_rfc3339()),
            TopicStatus::Pending => None,
        };
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let rows = writer.execute(
            "UPDATE topics SET status = ?1, completed_at = ?2 WHERE id = ?3",
            params![status.as_str(), completed_at, topic_id],
        )?;
        if rows == 0 {
            return Err(StorageError::NotFound(format!("topic {}", topic_id)));
        }
        Ok(())
    }

    /// Every topic of a plan in scheduling order
    pub fn get_topics_for_plan(&self, plan_id: i64) -> Result<Vec<TopicRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        query_topics(&reader, plan_id)
    }

    // ========================================================================
    // SESSIONS
    // ========================================================================

    /// Sessions of a plan ordered by date, optionally filtered by status
    pub fn list_sessions(
        &self,
        plan_id: i64,
        status: Option<SessionStatus>,
    ) -> Result<Vec<SessionRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM study_sessions
             WHERE plan_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY session_date ASC, id ASC",
        )?;
        let sessions = stmt
            .query_map(params![plan_id, status.map(|s| s.as_str())], row_to_session)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    /// Move a session to another status
    pub fn set_session_status(&self, session_id: i64, status: SessionStatus) -> Result<()> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let rows = writer.execute(
            "UPDATE study_sessions SET status = ?1 WHERE id = ?2",
            params![status.as_str(), session_id],
        )?;
        if rows == 0 {
            return Err(StorageError::NotFound(format!("session {}", session_id)));
        }
        Ok(())
    }

    /// Final-stretch exclusions recorded for a plan
    pub fn list_exclusions(&self, plan_id: i64) -> Result<Vec<ExclusionRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT plan_id, subject_id, topic_id, reason, excluded_at
             FROM final_stretch_exclusions WHERE plan_id = ?1 ORDER BY id ASC",
        )?;
        let exclusions = stmt
            .query_map(params![plan_id], |row| {
                let excluded_at: String = row.get(4)?;
                Ok(ExclusionRecord {
                    plan_id: row.get(0)?,
                    subject_id: row.get(1)?,
                    topic_id: row.get(2)?,
                    reason: row.get(3)?,
                    excluded_at: parse_timestamp(&excluded_at, "excluded_at")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(exclusions)
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// Write access for one generation run
///
/// Only obtainable through [`Storage::with_transaction`].
pub struct PlanTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl PlanTransaction<'_> {
    /// Get a plan owned by `user_id`
    pub fn get_plan(&self, plan_id: i64, user_id: i64) -> Result<Option<PlanRecord>> {
        query_plan(&self.tx, plan_id, user_id)
    }

    /// Persist validated generation settings onto the plan row
    pub fn update_plan_settings(&self, config: &GenerationConfig) -> Result<()> {
        let rows = self.tx.execute(
            "UPDATE study_plans SET
                session_duration_minutes = ?1,
                weekly_hours = ?2,
                daily_question_goal = ?3,
                weekly_question_goal = ?4,
                include_essay = ?5,
                final_stretch = ?6,
                updated_at = ?7
             WHERE id = ?8 AND user_id = ?9",
            params![
                config.session_duration_minutes,
                config.weekly_hours.to_json().to_string(),
                config.daily_question_goal,
                config.weekly_question_goal,
                config.include_essay,
                config.final_stretch,
                Utc::now().to_rfc3339(),
                config.plan_id,
                config.user_id,
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::NotFound(format!("plan {}", config.plan_id)));
        }
        Ok(())
    }

    /// Every topic of a plan in scheduling order
    pub fn get_topics_for_plan(&self, plan_id: i64) -> Result<Vec<TopicRecord>> {
        query_topics(&self.tx, plan_id)
    }

    /// Delete the plan's pending sessions; in-progress and completed rows stay
    pub fn delete_pending_sessions(&self, plan_id: i64) -> Result<usize> {
        let deleted = self.tx.execute(
            "DELETE FROM study_sessions WHERE plan_id = ?1 AND status = ?2",
            params![plan_id, SessionStatus::Pending.as_str()],
        )?;
        Ok(deleted)
    }

    /// Bulk insert freshly generated sessions as pending
    pub fn insert_sessions(
        &self,
        plan_id: i64,
        sessions: &[ScheduledSession],
        generation_id: &str,
    ) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO study_sessions (
                plan_id, topic_id, subject_name, session_date, session_type,
                description, status, metadata, generation_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;

        for session in sessions {
            let metadata = serde_json::to_string(&session.metadata)
                .map_err(|e| StorageError::InvalidData(format!("session metadata: {}", e)))?;
            stmt.execute(params![
                plan_id,
                session.topic_id,
                session.subject_name,
                session.date,
                session.session_type.as_str(),
                session.description,
                SessionStatus::Pending.as_str(),
                metadata,
                generation_id,
                now,
            ])?;
        }

        Ok(sessions.len())
    }

    /// Replace the plan's final-stretch exclusions
    pub fn replace_exclusions(&self, plan_id: i64, exclusions: &[TopicExclusion]) -> Result<usize> {
        self.tx.execute(
            "DELETE FROM final_stretch_exclusions WHERE plan_id = ?1",
            params![plan_id],
        )?;

        let now = Utc::now().to_rfc3339();
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO final_stretch_exclusions
                 (plan_id, subject_id, topic_id, reason, excluded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for exclusion in exclusions {
            stmt.execute(params![
                plan_id,
                exclusion.subject_id,
                exclusion.topic_id,
                exclusion.reason,
                now,
            ])?;
        }
        Ok(exclusions.len())
    }
}

// ============================================================================
// QUERIES & ROW MAPPING
// ============================================================================

const TOPIC_SELECT: &str = "SELECT t.id, t.subject_id, s.subject_name, t.topic_name,
        COALESCE(s.priority_weight, 3), COALESCE(t.priority_weight, 3), t.status
    FROM topics t
    JOIN subjects s ON s.id = t.subject_id";

fn query_plan(conn: &Connection, plan_id: i64, user_id: i64) -> Result<Option<PlanRecord>> {
    let plan = conn
        .query_row(
            "SELECT * FROM study_plans WHERE id = ?1 AND user_id = ?2",
            params![plan_id, user_id],
            row_to_plan,
        )
        .optional()?;
    Ok(plan)
}

/// Topics ordered by subject weight, then topic weight, then id
fn query_topics(conn: &Connection, plan_id: i64) -> Result<Vec<TopicRecord>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{} WHERE s.plan_id = ?1
         ORDER BY COALESCE(s.priority_weight, 3) DESC,
                  COALESCE(t.priority_weight, 3) DESC,
                  t.id ASC",
        TOPIC_SELECT
    ))?;
    let topics = stmt
        .query_map(params![plan_id], row_to_topic)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(topics)
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

/// Parse RFC3339 timestamp
fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            conversion_error(0, format!("Invalid {} timestamp '{}': {}", field_name, value, e))
        })
}

fn row_to_plan(row: &rusqlite::Row) -> rusqlite::Result<PlanRecord> {
    let weekly_json: String = row.get("weekly_hours")?;
    let weekly_hours = serde_json::from_str::<serde_json::Value>(&weekly_json)
        .ok()
        .and_then(|v| WeeklyHours::from_json(&v))
        .ok_or_else(|| conversion_error(0, format!("Invalid weekly_hours '{}'", weekly_json)))?;

    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(PlanRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        plan_name: row.get("plan_name")?,
        exam_date: row.get("exam_date")?,
        session_duration_minutes: row.get("session_duration_minutes")?,
        weekly_hours,
        daily_question_goal: row.get("daily_question_goal")?,
        weekly_question_goal: row.get("weekly_question_goal")?,
        include_essay: row.get("include_essay")?,
        final_stretch: row.get("final_stretch")?,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

fn row_to_topic(row: &rusqlite::Row) -> rusqlite::Result<TopicRecord> {
    let subject_weight: Option<i64> = row.get(4)?;
    let topic_weight: Option<i64> = row.get(5)?;
    let status: String = row.get(6)?;
    Ok(TopicRecord {
        topic_id: row.get(0)?,
        subject_id: row.get(1)?,
        subject_name: row.get(2)?,
        topic_name: row.get(3)?,
        subject_weight: clamp_priority(subject_weight.unwrap_or(DEFAULT_PRIORITY_WEIGHT as i64)),
        topic_weight: clamp_priority(topic_weight.unwrap_or(DEFAULT_PRIORITY_WEIGHT as i64)),
        status: TopicStatus::parse_name(&status),
    })
}

fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<SessionRecord> {
    let session_type: String = row.get("session_type")?;
    let status: String = row.get("status")?;
    let metadata: String = row.get("metadata")?;
    let created_at: String = row.get("created_at")?;

    Ok(SessionRecord {
        id: row.get("id")?,
        plan_id: row.get("plan_id")?,
        topic_id: row.get("topic_id")?,
        subject_name: row.get("subject_name")?,
        session_date: row.get("session_date")?,
        session_type: SessionType::parse_name(&session_type)
            .ok_or_else(|| {
                conversion_error(0, format!("Unknown session type '{}'", session_type))
            })?,
        description: row.get("description")?,
        status: SessionStatus::parse_name(&status)
            .ok_or_else(|| conversion_error(0, format!("Unknown session status '{}'", status)))?,
        metadata: serde_json::from_str(&metadata).unwrap_or_default(),
        generation_id: row.get("generation_id")?,
        created_at: parse_timestamp(&created_at, "created_at")?,
    })
}
