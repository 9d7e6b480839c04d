//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the local quiz database.
pub const SCHEMA: &str = r#"
-- Append-only answer log
CREATE TABLE IF NOT EXISTS answers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id TEXT NOT NULL,
    is_correct INTEGER NOT NULL,
    answered_at INTEGER NOT NULL,
    time_spent_ms INTEGER NOT NULL DEFAULT 0
);

-- Per-question retention state
CREATE TABLE IF NOT EXISTS retention_states (
    question_id TEXT PRIMARY KEY,
    ease_factor REAL NOT NULL DEFAULT 2.5,
    interval_days INTEGER NOT NULL DEFAULT 0,
    next_review_at INTEGER NOT NULL,
    repetition_count INTEGER NOT NULL DEFAULT 0,
    last_answered_at INTEGER NOT NULL
);

-- Learner settings
CREATE TABLE IF NOT EXISTS quiz_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    quiz_mode TEXT NOT NULL DEFAULT 'balanced',
    question_type TEXT,
    repeat_delay_questions INTEGER NOT NULL DEFAULT 2,
    max_same_category_in_window INTEGER NOT NULL DEFAULT 3,
    daily_goal_questions INTEGER NOT NULL DEFAULT 20,
    weekly_goal_study_days INTEGER NOT NULL DEFAULT 5
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_answers_question ON answers(question_id);
CREATE INDEX IF NOT EXISTS idx_answers_answered_at ON answers(answered_at);
CREATE INDEX IF NOT EXISTS idx_retention_states_next_review ON retention_states(next_review_at);
"#;

/// Initialize quiz settings if not exists.
pub const INIT_QUIZ_SETTINGS: &str = r#"
INSERT OR IGNORE INTO quiz_settings (id) VALUES (1);
"#;
