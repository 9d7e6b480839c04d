//! Repository pattern for database access.

use crate::db::error::DbError;
use crate::db::schema::{INIT_QUIZ_SETTINGS, SCHEMA, SCHEMA_VERSION};
use crate::settings::QuizSettings;
use quiz_core::{
    AnswerRecord, BackupSnapshot, NewAnswer, QuestionType, QuizMode, RecordStore, RetentionState,
    StoreWriter,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

/// Repository for learner settings.
pub trait SettingsRepository {
    fn get_quiz_settings(&self) -> Result<QuizSettings>;
    fn save_quiz_settings(&self, settings: &QuizSettings) -> Result<()>;
}

/// SQLite implementation of repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.conn.execute_batch(INIT_QUIZ_SETTINGS)?;

        let version: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
        match version {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(found) if found > SCHEMA_VERSION => {
                return Err(DbError::UnsupportedSchema {
                    found,
                    supported: SCHEMA_VERSION,
                });
            }
            Some(_) => {}
        }
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i32> {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .map_err(Into::into)
    }

    fn row_to_answer(row: &rusqlite::Row) -> rusqlite::Result<AnswerRecord> {
        let time_spent_ms: i64 = row.get(4)?;
        Ok(AnswerRecord {
            id: row.get(0)?,
            question_id: row.get(1)?,
            is_correct: row.get(2)?,
            answered_at: row.get(3)?,
            time_spent_ms: u64::try_from(time_spent_ms).unwrap_or(0),
        })
    }

    fn row_to_state(row: &rusqlite::Row) -> rusqlite::Result<RetentionState> {
        Ok(RetentionState {
            question_id: row.get(0)?,
            ease_factor: row.get(1)?,
            interval_days: row.get(2)?,
            next_review_at: row.get(3)?,
            repetition_count: row.get(4)?,
            last_answered_at: row.get(5)?,
        })
    }
}

const STATE_COLUMNS: &str =
    "question_id, ease_factor, interval_days, next_review_at, repetition_count, last_answered_at";

fn select_state(conn: &Connection, question_id: &str) -> Result<Option<RetentionState>> {
    conn.query_row(
        &format!("SELECT {STATE_COLUMNS} FROM retention_states WHERE question_id = ?1"),
        params![question_id],
        SqliteRepository::row_to_state,
    )
    .optional()
    .map_err(Into::into)
}

fn insert_answer(conn: &Connection, answer: &NewAnswer) -> Result<i64> {
    let time_spent_ms = i64::try_from(answer.time_spent_ms).unwrap_or(i64::MAX);
    conn.execute(
        "INSERT INTO answers (question_id, is_correct, answered_at, time_spent_ms) VALUES (?1, ?2, ?3, ?4)",
        params![answer.question_id, answer.is_correct, answer.answered_at, time_spent_ms],
    )?;
    Ok(conn.last_insert_rowid())
}

fn upsert_state(conn: &Connection, state: &RetentionState) -> Result<()> {
    conn.execute(
        &format!("INSERT OR REPLACE INTO retention_states ({STATE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
        params![
            state.question_id,
            state.ease_factor,
            state.interval_days,
            state.next_review_at,
            state.repetition_count,
            state.last_answered_at
        ],
    )?;
    Ok(())
}

/// Writes scoped to one open SQL transaction.
struct SqliteWriter<'a> {
    conn: &'a Connection,
}

impl StoreWriter for SqliteWriter<'_> {
    type Error = DbError;

    fn retention_state(&self, question_id: &str) -> Result<Option<RetentionState>> {
        select_state(self.conn, question_id)
    }

    fn append_answer(&mut self, answer: &NewAnswer) -> Result<i64> {
        insert_answer(self.conn, answer)
    }

    fn upsert_retention_state(&mut self, state: &RetentionState) -> Result<()> {
        upsert_state(self.conn, state)
    }
}

impl RecordStore for SqliteRepository {
    type Error = DbError;

    fn all_answers(&self) -> Result<Vec<AnswerRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, question_id, is_correct, answered_at, time_spent_ms FROM answers ORDER BY id",
        )?;
        let answers = stmt
            .query_map([], Self::row_to_answer)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(answers)
    }

    fn all_retention_states(&self) -> Result<Vec<RetentionState>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STATE_COLUMNS} FROM retention_states ORDER BY question_id"
        ))?;
        let states = stmt
            .query_map([], Self::row_to_state)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(states)
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn StoreWriter<Error = DbError>) -> Result<T>,
    {
        let tx = self.conn.transaction()?;
        let out = f(&mut SqliteWriter { conn: &tx })?;
        tx.commit()?;
        Ok(out)
    }

    fn replace_all(&mut self, snapshot: &BackupSnapshot) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM answers", [])?;
        tx.execute("DELETE FROM retention_states", [])?;
        for answer in &snapshot.answers {
            insert_answer(&tx, answer)?;
        }
        for state in &snapshot.retention_states {
            upsert_state(&tx, state)?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl SettingsRepository for SqliteRepository {
    fn get_quiz_settings(&self) -> Result<QuizSettings> {
        let settings = self.conn.query_row(
            "SELECT quiz_mode, question_type, repeat_delay_questions, max_same_category_in_window, daily_goal_questions, weekly_goal_study_days FROM quiz_settings WHERE id = 1",
            [],
            |row| {
                let quiz_mode: String = row.get(0)?;
                let question_type: Option<String> = row.get(1)?;
                let number = |idx: usize| -> rusqlite::Result<u32> {
                    let value: i64 = row.get(idx)?;
                    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
                };

                Ok(QuizSettings {
                    quiz_mode: QuizMode::parse_lenient(&quiz_mode),
                    question_type: question_type.as_deref().and_then(QuestionType::from_str),
                    repeat_delay_questions: number(2)?,
                    max_same_category_in_window: number(3)?,
                    daily_goal_questions: number(4)?,
                    weekly_goal_study_days: number(5)?,
                })
            },
        )?;
        Ok(settings.normalized())
    }

    fn save_quiz_settings(&self, settings: &QuizSettings) -> Result<()> {
        let settings = settings.normalized();
        self.conn.execute(
            "UPDATE quiz_settings SET quiz_mode = ?1, question_type = ?2, repeat_delay_questions = ?3, max_same_category_in_window = ?4, daily_goal_questions = ?5, weekly_goal_study_days = ?6 WHERE id = 1",
            params![
                settings.quiz_mode.as_str(),
                settings.question_type.map(|t| t.as_str()),
                settings.repeat_delay_questions,
                settings.max_same_category_in_window,
                settings.daily_goal_questions,
                settings.weekly_goal_study_days
            ],
        )?;
        Ok(())
    }
}
