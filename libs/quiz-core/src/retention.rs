//! SM-2 style retention model.
//!
//! Answer speed stands in for recall confidence: a fast correct answer is
//! graded higher than a slow one. The thresholds are fields on
//! [`RetentionModel`] so they can be tuned without touching the update rule.

use crate::types::{RetentionState, ONE_DAY_MS};

/// Quality grade at or above which an answer counts as a pass.
pub const PASS_QUALITY: u8 = 3;

/// Retention model with configurable parameters.
#[derive(Debug, Clone)]
pub struct RetentionModel {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Correct answers at or under this many ms grade 5.
    pub fast_answer_ms: u64,
    /// Correct answers at or under this many ms grade 4, slower ones 3.
    pub steady_answer_ms: u64,
}

impl Default for RetentionModel {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            fast_answer_ms: 5_000,
            steady_answer_ms: 15_000,
        }
    }
}

impl RetentionModel {
    /// Initial state for a question that has never been answered.
    pub fn default_state(&self, question_id: &str, now: i64) -> RetentionState {
        RetentionState {
            question_id: question_id.to_string(),
            ease_factor: self.initial_ease,
            interval_days: 0,
            next_review_at: now,
            repetition_count: 0,
            last_answered_at: now,
        }
    }

    /// Grade an answer on the 1..=5 SM-2 scale.
    pub fn quality(&self, is_correct: bool, time_spent_ms: u64) -> u8 {
        if !is_correct {
            return 1;
        }
        if time_spent_ms <= self.fast_answer_ms {
            5
        } else if time_spent_ms <= self.steady_answer_ms {
            4
        } else {
            3
        }
    }

    /// Advance `state` after an answer graded `quality` at `now`.
    pub fn update(&self, state: &RetentionState, quality: u8, now: i64) -> RetentionState {
        let (interval_days, repetition_count) = if quality >= PASS_QUALITY {
            let interval = match state.repetition_count {
                0 => 1,
                1 => 3,
                _ => {
                    let grown = (f64::from(state.interval_days) * state.ease_factor).round();
                    (grown as u32).max(1)
                }
            };
            (interval, state.repetition_count.saturating_add(1))
        } else {
            (0, 0)
        };

        let penalty = 5.0 - f64::from(quality);
        let ease_factor = (state.ease_factor + (0.1 - penalty * (0.08 + penalty * 0.02)))
            .max(self.minimum_ease);

        RetentionState {
            question_id: state.question_id.clone(),
            ease_factor,
            interval_days,
            next_review_at: now.saturating_add(i64::from(interval_days) * ONE_DAY_MS),
            repetition_count,
            last_answered_at: now,
        }
    }

    /// Clamp a stored state back onto the update rule's invariants: ease at
    /// or above the minimum, review due `interval_days` after the last answer.
    pub fn sanitize(&self, state: &RetentionState) -> RetentionState {
        let ease_factor = if state.ease_factor.is_finite() {
            state.ease_factor.max(self.minimum_ease)
        } else {
            self.initial_ease
        };
        RetentionState {
            ease_factor,
            next_review_at: state
                .last_answered_at
                .saturating_add(i64::from(state.interval_days) * ONE_DAY_MS),
            ..state.clone()
        }
    }
}
