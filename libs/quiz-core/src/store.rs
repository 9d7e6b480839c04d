//! Record store seam used by the engine.

use crate::types::{AnswerRecord, BackupSnapshot, NewAnswer, RetentionState};
use std::collections::BTreeMap;
use std::convert::Infallible;

/// Writes available inside a store transaction.
pub trait StoreWriter {
    type Error;

    fn retention_state(&self, question_id: &str) -> Result<Option<RetentionState>, Self::Error>;
    fn append_answer(&mut self, answer: &NewAnswer) -> Result<i64, Self::Error>;
    fn upsert_retention_state(&mut self, state: &RetentionState) -> Result<(), Self::Error>;
}

/// Persistent answer log plus retention states.
pub trait RecordStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn all_answers(&self) -> Result<Vec<AnswerRecord>, Self::Error>;
    fn all_retention_states(&self) -> Result<Vec<RetentionState>, Self::Error>;

    /// Run `f` inside one atomic write scope. If `f` fails nothing is kept.
    fn transaction<T, F>(&mut self, f: F) -> Result<T, Self::Error>
    where
        F: FnOnce(&mut dyn StoreWriter<Error = Self::Error>) -> Result<T, Self::Error>;

    /// Atomically replace every answer and retention state.
    fn replace_all(&mut self, snapshot: &BackupSnapshot) -> Result<(), Self::Error>;
}

/// In-memory store, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    answers: Vec<AnswerRecord>,
    states: BTreeMap<String, RetentionState>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, answer: &NewAnswer) -> i64 {
        self.next_id += 1;
        self.answers.push(answer.clone().with_id(self.next_id));
        self.next_id
    }
}

impl StoreWriter for MemoryStore {
    type Error = Infallible;

    fn retention_state(&self, question_id: &str) -> Result<Option<RetentionState>, Infallible> {
        Ok(self.states.get(question_id).cloned())
    }

    fn append_answer(&mut self, answer: &NewAnswer) -> Result<i64, Infallible> {
        Ok(self.push(answer))
    }

    fn upsert_retention_state(&mut self, state: &RetentionState) -> Result<(), Infallible> {
        self.states.insert(state.question_id.clone(), state.clone());
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    type Error = Infallible;

    fn all_answers(&self) -> Result<Vec<AnswerRecord>, Infallible> {
        Ok(self.answers.clone())
    }

    fn all_retention_states(&self) -> Result<Vec<RetentionState>, Infallible> {
        Ok(self.states.values().cloned().collect())
    }

    fn transaction<T, F>(&mut self, f: F) -> Result<T, Infallible>
    where
        F: FnOnce(&mut dyn StoreWriter<Error = Infallible>) -> Result<T, Infallible>,
    {
        // Work on a copy so a failed closure leaves the store untouched.
        let mut staged = self.clone();
        let out = f(&mut staged)?;
        *self = staged;
        Ok(out)
    }

    fn replace_all(&mut self, snapshot: &BackupSnapshot) -> Result<(), Infallible> {
        let mut fresh = MemoryStore::new();
        for answer in &snapshot.answers {
            fresh.push(answer);
        }
        for state in &snapshot.retention_states {
            fresh.states.insert(state.question_id.clone(), state.clone());
        }
        *self = fresh;
        Ok(())
    }
}
