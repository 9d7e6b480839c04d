//! Engine facade over a catalog and a record store.
//!
//! The store sits behind a mutex. Every call holds the lock for its whole
//! read or write, so a reader never sees an answer without the retention
//! update that goes with it.

use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use crate::insights::{calculate_insights, StudyGoals, StudyInsights};
use crate::mastery::calculate_mastery;
use crate::retention::RetentionModel;
use crate::selector::{select, SelectOptions};
use crate::store::RecordStore;
use crate::types::{BackupSnapshot, MasteryReport, NewAnswer, Question, RetentionState};
use chrono::{TimeZone, Utc};
use rand::Rng;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Non-finite or non-positive durations count as 0; the rest round to whole ms.
fn normalize_time_spent(time_spent_ms: f64) -> u64 {
    if time_spent_ms.is_finite() && time_spent_ms > 0.0 {
        time_spent_ms.round() as u64
    } else {
        0
    }
}

pub struct Engine<S> {
    catalog: Catalog,
    model: RetentionModel,
    store: Mutex<S>,
}

impl<S: RecordStore> Engine<S> {
    pub fn new(catalog: Catalog, store: S) -> Self {
        Self {
            catalog,
            model: RetentionModel::default(),
            store: Mutex::new(store),
        }
    }

    /// Replace the default retention model.
    pub fn with_model(mut self, model: RetentionModel) -> Self {
        self.model = model;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model(&self) -> &RetentionModel {
        &self.model
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>> {
        self.store.lock().map_err(|_| EngineError::LockPoisoned)
    }

    /// Run `f` with exclusive access to the store, for data the engine does
    /// not manage itself.
    pub fn with_store<T>(&self, f: impl FnOnce(&mut S) -> T) -> Result<T> {
        let mut store = self.lock()?;
        Ok(f(&mut *store))
    }

    pub fn select_next<R: Rng + ?Sized>(
        &self,
        options: &SelectOptions,
        rng: &mut R,
    ) -> Result<Question> {
        self.select_next_at(options, rng, now_ms())
    }

    /// Pick the next question as of `now` (epoch ms).
    pub fn select_next_at<R: Rng + ?Sized>(
        &self,
        options: &SelectOptions,
        rng: &mut R,
        now: i64,
    ) -> Result<Question> {
        if self.catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        let options = options.normalized();
        let (answers, states) = {
            let store = self.lock()?;
            let answers = store.all_answers().map_err(EngineError::store)?;
            let states = store.all_retention_states().map_err(EngineError::store)?;
            (answers, states)
        };

        let selection = select(self.catalog.questions(), &answers, &states, &options, now, rng)
            .ok_or(EngineError::EmptyCatalog)?;
        debug!(
            question_id = %selection.question.id,
            tier = ?selection.tier,
            mode = options.mode.as_str(),
            "selected next question"
        );
        Ok(selection.question.clone())
    }

    pub fn record_answer(
        &self,
        question_id: &str,
        is_correct: bool,
        time_spent_ms: f64,
    ) -> Result<RetentionState> {
        self.record_answer_at(question_id, is_correct, time_spent_ms, now_ms())
    }

    /// Log an answer and advance its retention state in one transaction.
    pub fn record_answer_at(
        &self,
        question_id: &str,
        is_correct: bool,
        time_spent_ms: f64,
        now: i64,
    ) -> Result<RetentionState> {
        let time_spent_ms = normalize_time_spent(time_spent_ms);
        let answer = NewAnswer {
            question_id: question_id.to_string(),
            is_correct,
            answered_at: now,
            time_spent_ms,
        };
        let model = &self.model;

        let mut store = self.lock()?;
        let (answer_id, state) = store
            .transaction(|writer| {
                let answer_id = writer.append_answer(&answer)?;
                let current = writer
                    .retention_state(question_id)?
                    .unwrap_or_else(|| model.default_state(question_id, now));
                let quality = model.quality(is_correct, time_spent_ms);
                let next = model.update(&current, quality, now);
                writer.upsert_retention_state(&next)?;
                Ok((answer_id, next))
            })
            .map_err(EngineError::store)?;

        debug!(
            answer_id,
            question_id,
            is_correct,
            interval_days = state.interval_days,
            "recorded answer"
        );
        Ok(state)
    }

    pub fn calculate_mastery(&self) -> Result<MasteryReport> {
        self.calculate_mastery_at(now_ms())
    }

    pub fn calculate_mastery_at(&self, now: i64) -> Result<MasteryReport> {
        let answers = self.lock()?.all_answers().map_err(EngineError::store)?;
        Ok(calculate_mastery(self.catalog.questions(), &answers, now))
    }

    /// Streaks, daily goal and weekly review in time zone `tz`.
    pub fn study_insights<Tz: TimeZone>(
        &self,
        goals: StudyGoals,
        tz: &Tz,
        now: i64,
    ) -> Result<StudyInsights> {
        let answers = self.lock()?.all_answers().map_err(EngineError::store)?;
        Ok(calculate_insights(&answers, goals, tz, now))
    }

    /// Current retention state of a question, if it was ever answered.
    pub fn retention_state(&self, question_id: &str) -> Result<Option<RetentionState>> {
        let states = self
            .lock()?
            .all_retention_states()
            .map_err(EngineError::store)?;
        Ok(states.into_iter().find(|s| s.question_id == question_id))
    }

    /// Every answer (oldest first, ids dropped) and every retention state.
    pub fn export_snapshot(&self) -> Result<BackupSnapshot> {
        let store = self.lock()?;
        let mut answers = store.all_answers().map_err(EngineError::store)?;
        let retention_states = store.all_retention_states().map_err(EngineError::store)?;
        answers.sort_by_key(|a| (a.answered_at, a.id));
        Ok(BackupSnapshot {
            answers: answers.iter().map(NewAnswer::from).collect(),
            retention_states,
        })
    }

    /// Replace the whole store with `snapshot`. Retention states that break
    /// the model's invariants are clamped before they are written.
    pub fn restore_snapshot(&self, snapshot: &BackupSnapshot) -> Result<()> {
        let unknown = snapshot
            .answers
            .iter()
            .filter(|a| self.catalog.get(&a.question_id).is_none())
            .count();
        if unknown > 0 {
            warn!(unknown, "snapshot has answers for questions missing from the catalog");
        }

        let retention_states: Vec<RetentionState> = snapshot
            .retention_states
            .iter()
            .map(|state| self.model.sanitize(state))
            .collect();
        let repaired = retention_states
            .iter()
            .zip(&snapshot.retention_states)
            .filter(|(fixed, raw)| fixed != raw)
            .count();
        if repaired > 0 {
            warn!(repaired, "clamped invalid retention states from snapshot");
        }
        let snapshot = BackupSnapshot {
            answers: snapshot.answers.clone(),
            retention_states,
        };

        self.lock()?
            .replace_all(&snapshot)
            .map_err(EngineError::store)?;
        debug!(
            answers = snapshot.answers.len(),
            retention_states = snapshot.retention_states.len(),
            "restored snapshot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreWriter};
    use crate::types::{AnswerRecord, Category, QuizMode, ONE_DAY_MS};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;
    use std::sync::Arc;

    const NOW: i64 = 1_700_000_000_000;

    fn question(id: &str, category: Category) -> Question {
        Question {
            id: id.to_string(),
            category,
            question: format!("Prompt {id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 1,
            explanation: "Because.".to_string(),
            question_type: None,
            image: None,
            exam_year: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            question("et-1", Category::ElectricalTheory),
            question("et-2", Category::ElectricalTheory),
            question("law-1", Category::Laws),
            question("ins-1", Category::Inspection),
        ])
        .unwrap()
    }

    fn engine() -> Engine<MemoryStore> {
        Engine::new(catalog(), MemoryStore::new())
    }

    #[test]
    fn fast_correct_first_answer_schedules_one_day() {
        let engine = engine();
        let state = engine.record_answer_at("et-1", true, 3_000.0, NOW).unwrap();
        assert_eq!(state.interval_days, 1);
        assert_eq!(state.repetition_count, 1);
        assert_eq!(state.next_review_at, NOW + ONE_DAY_MS);
        assert_eq!(state.last_answered_at, NOW);
        assert!((state.ease_factor - 2.6).abs() < 1e-9);
        assert_eq!(engine.retention_state("et-1").unwrap(), Some(state));
    }

    #[test]
    fn wrong_answer_resets_progress() {
        let engine = engine();
        engine.record_answer_at("et-1", true, 3_000.0, NOW).unwrap();
        engine
            .record_answer_at("et-1", true, 3_000.0, NOW + ONE_DAY_MS)
            .unwrap();
        let state = engine
            .record_answer_at("et-1", false, 3_000.0, NOW + 2 * ONE_DAY_MS)
            .unwrap();
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.repetition_count, 0);
        assert_eq!(state.next_review_at, NOW + 2 * ONE_DAY_MS);
        assert!(state.ease_factor >= RetentionModel::default().minimum_ease);
    }

    #[test]
    fn invalid_durations_are_stored_as_zero() {
        let engine = engine();
        engine.record_answer_at("et-1", true, f64::NAN, NOW).unwrap();
        engine.record_answer_at("et-2", true, -5.0, NOW).unwrap();
        engine.record_answer_at("law-1", true, 1_234.6, NOW).unwrap();
        let snapshot = engine.export_snapshot().unwrap();
        let spent: Vec<u64> = snapshot.answers.iter().map(|a| a.time_spent_ms).collect();
        assert_eq!(spent, vec![0, 0, 1_235]);
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let engine = Engine::new(Catalog::default(), MemoryStore::new());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = engine.select_next_at(&SelectOptions::default(), &mut rng, NOW);
        assert!(matches!(result, Err(EngineError::EmptyCatalog)));
    }

    #[test]
    fn due_review_is_selected_first() {
        let engine = engine();
        for id in ["et-1", "et-2", "law-1", "ins-1"] {
            engine.record_answer_at(id, true, 3_000.0, NOW).unwrap();
        }
        // only law-1 falls due
        engine
            .record_answer_at("law-1", false, 3_000.0, NOW + 1_000)
            .unwrap();
        engine
            .record_answer_at("et-1", true, 3_000.0, NOW + 1_500)
            .unwrap();
        let options = SelectOptions {
            repeat_delay_questions: Some(0),
            max_same_category_in_window: Some(6),
            ..SelectOptions::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let next = engine
            .select_next_at(&options, &mut rng, NOW + 2_000)
            .unwrap();
        assert_eq!(next.id, "law-1");
    }

    #[test]
    fn selection_always_returns_a_catalog_question() {
        let engine = engine();
        let ids: HashSet<String> = catalog().questions().iter().map(|q| q.id.clone()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let options = SelectOptions {
            mode: QuizMode::MistakeFocus,
            repeat_delay_questions: Some(99),
            max_same_category_in_window: Some(-4),
            ..SelectOptions::default()
        };
        for step in 0..20 {
            let now = NOW + step * 60_000;
            let next = engine.select_next_at(&options, &mut rng, now).unwrap();
            assert!(ids.contains(&next.id));
            engine
                .record_answer_at(&next.id, step % 3 != 0, 4_000.0, now)
                .unwrap();
        }
    }

    #[test]
    fn mastery_reflects_recorded_answers() {
        let engine = engine();
        assert_eq!(engine.calculate_mastery_at(NOW).unwrap().overall, 0);
        engine.record_answer_at("law-1", true, 2_000.0, NOW).unwrap();
        let report = engine.calculate_mastery_at(NOW).unwrap();
        assert_eq!(report.by_category[&Category::Laws], 100);
        assert_eq!(report.total_answered, 1);
        assert_eq!(report.last_updated, NOW);
    }

    #[test]
    fn snapshot_restore_replaces_history() {
        let source = engine();
        source.record_answer_at("et-1", true, 3_000.0, NOW).unwrap();
        source
            .record_answer_at("law-1", false, 9_000.0, NOW + ONE_DAY_MS)
            .unwrap();
        let snapshot = source.export_snapshot().unwrap();
        assert_eq!(snapshot.answers.len(), 2);
        assert_eq!(snapshot.answers[0].question_id, "et-1");

        let target = engine();
        target.record_answer_at("ins-1", true, 1_000.0, NOW).unwrap();
        target.restore_snapshot(&snapshot).unwrap();

        assert_eq!(target.export_snapshot().unwrap(), snapshot);
        assert_eq!(target.retention_state("ins-1").unwrap(), None);
        assert_eq!(
            target.calculate_mastery_at(NOW + ONE_DAY_MS).unwrap(),
            source.calculate_mastery_at(NOW + ONE_DAY_MS).unwrap()
        );
    }

    #[test]
    fn restore_keeps_answers_for_unknown_questions() {
        let engine = engine();
        let snapshot = BackupSnapshot {
            answers: vec![NewAnswer {
                question_id: "retired".to_string(),
                is_correct: true,
                answered_at: NOW,
                time_spent_ms: 1_000,
            }],
            retention_states: vec![],
        };
        engine.restore_snapshot(&snapshot).unwrap();
        assert_eq!(engine.export_snapshot().unwrap().answers.len(), 1);
        assert_eq!(engine.calculate_mastery_at(NOW).unwrap().overall, 0);
    }

    #[test]
    fn restored_extreme_timestamps_do_not_break_selection() {
        let engine = engine();
        let mut snapshot: BackupSnapshot = serde_json::from_value(serde_json::json!({
            "answers": [
                {"question_id": "et-1", "is_correct": false, "answered_at": i64::MIN, "time_spent_ms": 0},
                {"question_id": "law-1", "is_correct": true, "answered_at": i64::MAX, "time_spent_ms": 0}
            ],
            "retention_states": [
                {"question_id": "et-1", "ease_factor": 0.0, "interval_days": 0,
                 "next_review_at": i64::MIN, "repetition_count": 0, "last_answered_at": i64::MIN},
                {"question_id": "law-1", "ease_factor": 2.5, "interval_days": 4,
                 "next_review_at": i64::MIN, "repetition_count": 2, "last_answered_at": NOW}
            ]
        }))
        .unwrap();
        engine.restore_snapshot(&snapshot).unwrap();

        let law = engine.retention_state("law-1").unwrap().unwrap();
        assert_eq!(law.next_review_at, NOW + 4 * ONE_DAY_MS);
        let et = engine.retention_state("et-1").unwrap().unwrap();
        assert_eq!(et.ease_factor, RetentionModel::default().minimum_ease);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let next = engine
            .select_next_at(&SelectOptions::default(), &mut rng, NOW)
            .unwrap();
        assert!(engine.catalog().get(&next.id).is_some());
        engine.calculate_mastery_at(NOW).unwrap();
        engine.record_answer_at("et-1", true, 2_000.0, NOW).unwrap();

        snapshot.retention_states.clear();
        engine.restore_snapshot(&snapshot).unwrap();
        assert_eq!(engine.retention_state("law-1").unwrap(), None);
    }

    #[test]
    fn custom_model_thresholds_change_grading() {
        let strict = RetentionModel {
            fast_answer_ms: 1_000,
            ..RetentionModel::default()
        };
        let engine = engine().with_model(strict);
        assert_eq!(engine.model().fast_answer_ms, 1_000);

        // 3 s is no longer fast: grade 4 keeps the initial ease
        let state = engine.record_answer_at("et-1", true, 3_000.0, NOW).unwrap();
        assert_eq!(engine.model().quality(true, 3_000), 4);
        assert!((state.ease_factor - 2.5).abs() < 1e-9);

        let fast = engine.record_answer_at("et-2", true, 800.0, NOW).unwrap();
        assert!((fast.ease_factor - 2.6).abs() < 1e-9);
    }

    #[test]
    fn concurrent_answers_keep_log_and_states_consistent() {
        let engine = Arc::new(engine());
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let engine = Arc::clone(&engine);
                scope.spawn(move || {
                    for i in 0..25 {
                        let id = if (worker + i) % 2 == 0 { "et-1" } else { "law-1" };
                        engine
                            .record_answer_at(id, true, 3_000.0, NOW + i64::from(i))
                            .unwrap();
                    }
                });
            }
        });
        let snapshot = engine.export_snapshot().unwrap();
        assert_eq!(snapshot.answers.len(), 100);
        let total_reps: u32 = snapshot
            .retention_states
            .iter()
            .map(|s| s.repetition_count)
            .sum();
        assert_eq!(total_reps, 100);
    }

    #[test]
    fn with_store_sees_recorded_answers() {
        let engine = engine();
        engine.record_answer_at("et-2", false, 8_000.0, NOW).unwrap();
        let count = engine
            .with_store(|store| store.all_answers().unwrap().len())
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let engine = engine();
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = engine.store.lock().unwrap();
                    panic!("writer crashed");
                })
                .join()
        });
        assert!(matches!(
            engine.calculate_mastery_at(NOW),
            Err(EngineError::LockPoisoned)
        ));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    type StoreResult<T> = std::result::Result<T, DiskFull>;

    /// Store whose writes always fail after appending.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
    }

    struct FailingWriter<'a>(&'a mut MemoryStore);

    impl StoreWriter for FailingWriter<'_> {
        type Error = DiskFull;

        fn retention_state(&self, question_id: &str) -> StoreResult<Option<RetentionState>> {
            Ok(self.0.retention_state(question_id).unwrap_or(None))
        }

        fn append_answer(&mut self, answer: &NewAnswer) -> StoreResult<i64> {
            Ok(self.0.append_answer(answer).unwrap_or_default())
        }

        fn upsert_retention_state(&mut self, _state: &RetentionState) -> StoreResult<()> {
            Err(DiskFull)
        }
    }

    impl RecordStore for FailingStore {
        type Error = DiskFull;

        fn all_answers(&self) -> StoreResult<Vec<AnswerRecord>> {
            Ok(self.inner.all_answers().unwrap_or_default())
        }

        fn all_retention_states(&self) -> StoreResult<Vec<RetentionState>> {
            Ok(self.inner.all_retention_states().unwrap_or_default())
        }

        fn transaction<T, F>(&mut self, f: F) -> StoreResult<T>
        where
            F: FnOnce(&mut dyn StoreWriter<Error = DiskFull>) -> StoreResult<T>,
        {
            let mut staged = self.inner.clone();
            let out = f(&mut FailingWriter(&mut staged))?;
            self.inner = staged;
            Ok(out)
        }

        fn replace_all(&mut self, _snapshot: &BackupSnapshot) -> StoreResult<()> {
            Err(DiskFull)
        }
    }

    #[test]
    fn failed_transaction_writes_nothing() {
        let engine = Engine::new(catalog(), FailingStore::default());
        let err = engine
            .record_answer_at("et-1", true, 3_000.0, NOW)
            .unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
        assert_eq!(err.to_string(), "record store error: disk full");
        assert!(engine.export_snapshot().unwrap().answers.is_empty());
        assert!(engine.restore_snapshot(&BackupSnapshot::default()).is_err());
    }
}
