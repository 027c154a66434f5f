//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: plans, subjects, topics, study sessions",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Final stretch exclusions and generation tracking",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Core plan hierarchy
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

-- ============================================================================
-- PLANS
-- ============================================================================

CREATE TABLE IF NOT EXISTS study_plans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    plan_name TEXT NOT NULL,
    exam_date TEXT NOT NULL,
    session_duration_minutes INTEGER NOT NULL DEFAULT 50,
    -- JSON object keyed "0".."6", Sunday = 0
    weekly_hours TEXT NOT NULL DEFAULT '{}',
    daily_question_goal INTEGER,
    weekly_question_goal INTEGER,
    include_essay INTEGER NOT NULL DEFAULT 0,
    final_stretch INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_plans_user ON study_plans(user_id);

CREATE TABLE IF NOT EXISTS subjects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    plan_id INTEGER NOT NULL REFERENCES study_plans(id) ON DELETE CASCADE,
    subject_name TEXT NOT NULL,
    priority_weight INTEGER NOT NULL DEFAULT 3,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_subjects_plan ON subjects(plan_id);

CREATE TABLE IF NOT EXISTS topics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
    topic_name TEXT NOT NULL,
    priority_weight INTEGER NOT NULL DEFAULT 3,
    status TEXT NOT NULL DEFAULT 'pending',
    completed_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_topics_subject ON topics(subject_id);

-- ============================================================================
-- SESSIONS
-- ============================================================================

CREATE TABLE IF NOT EXISTS study_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    plan_id INTEGER NOT NULL REFERENCES study_plans(id) ON DELETE CASCADE,
    topic_id INTEGER REFERENCES topics(id) ON DELETE SET NULL,
    subject_name TEXT NOT NULL,
    session_date TEXT NOT NULL,
    session_type TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'pending',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_plan_date ON study_sessions(plan_id, session_date);
CREATE INDEX IF NOT EXISTS idx_sessions_plan_status ON study_sessions(plan_id, status);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Final stretch exclusions, generation id on sessions
const MIGRATION_V2_UP: &str = r#"
CREATE TABLE IF NOT EXISTS final_stretch_exclusions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    plan_id INTEGER NOT NULL REFERENCES study_plans(id) ON DELETE CASCADE,
    subject_id INTEGER NOT NULL,
    topic_id INTEGER NOT NULL,
    reason TEXT NOT NULL,
    excluded_at TEXT NOT NULL,
    UNIQUE(plan_id, topic_id)
);

CREATE INDEX IF NOT EXISTS idx_exclusions_plan ON final_stretch_exclusions(plan_id);

-- Run that produced the row; NULL for sessions created by hand
ALTER TABLE study_sessions ADD COLUMN generation_id TEXT;

CREATE INDEX IF NOT EXISTS idx_sessions_generation ON study_sessions(generation_id);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
