//! Learner settings persisted in the `quiz_settings` table.

use quiz_core::insights::{DEFAULT_DAILY_GOAL_QUESTIONS, DEFAULT_WEEKLY_GOAL_STUDY_DAYS};
use quiz_core::selector::{DEFAULT_MAX_SAME_CATEGORY_IN_WINDOW, DEFAULT_REPEAT_DELAY_QUESTIONS};
use quiz_core::{QuestionType, QuizMode, SelectOptions, StudyGoals};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_DAILY_GOAL_QUESTIONS: u32 = 5;
pub const MAX_DAILY_GOAL_QUESTIONS: u32 = 100;
pub const MIN_WEEKLY_GOAL_STUDY_DAYS: u32 = 1;
pub const MAX_WEEKLY_GOAL_STUDY_DAYS: u32 = 7;

/// Keys accepted by [`QuizSettings::set`].
pub const KEYS: [&str; 6] = [
    "quiz_mode",
    "question_type",
    "repeat_delay_questions",
    "max_same_category_in_window",
    "daily_goal_questions",
    "weekly_goal_study_days",
];

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("unknown setting {0}")]
    UnknownKey(String),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSettings {
    pub quiz_mode: QuizMode,
    /// `None` mixes every question type.
    pub question_type: Option<QuestionType>,
    pub repeat_delay_questions: u32,
    pub max_same_category_in_window: u32,
    pub daily_goal_questions: u32,
    pub weekly_goal_study_days: u32,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            quiz_mode: QuizMode::Balanced,
            question_type: None,
            repeat_delay_questions: DEFAULT_REPEAT_DELAY_QUESTIONS as u32,
            max_same_category_in_window: DEFAULT_MAX_SAME_CATEGORY_IN_WINDOW as u32,
            daily_goal_questions: DEFAULT_DAILY_GOAL_QUESTIONS,
            weekly_goal_study_days: DEFAULT_WEEKLY_GOAL_STUDY_DAYS,
        }
    }
}

impl QuizSettings {
    /// Copy with every number clamped to its allowed range.
    pub fn normalized(&self) -> Self {
        let options = self.select_options();
        Self {
            quiz_mode: self.quiz_mode,
            question_type: self.question_type,
            repeat_delay_questions: options.repeat_delay() as u32,
            max_same_category_in_window: options.category_cap() as u32,
            daily_goal_questions: self
                .daily_goal_questions
                .clamp(MIN_DAILY_GOAL_QUESTIONS, MAX_DAILY_GOAL_QUESTIONS),
            weekly_goal_study_days: self
                .weekly_goal_study_days
                .clamp(MIN_WEEKLY_GOAL_STUDY_DAYS, MAX_WEEKLY_GOAL_STUDY_DAYS),
        }
    }

    pub fn select_options(&self) -> SelectOptions {
        SelectOptions {
            fixed_type: self.question_type,
            mode: self.quiz_mode,
            repeat_delay_questions: Some(i64::from(self.repeat_delay_questions)),
            max_same_category_in_window: Some(i64::from(self.max_same_category_in_window)),
        }
    }

    pub fn goals(&self) -> StudyGoals {
        StudyGoals {
            daily_questions: self.daily_goal_questions,
            weekly_study_days: self.weekly_goal_study_days,
        }
    }

    /// Update one setting from its string form, then clamp.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let number = || value.trim().parse::<u32>().map_err(|_| invalid());

        match key {
            "quiz_mode" => {
                self.quiz_mode = [QuizMode::Balanced, QuizMode::MistakeFocus, QuizMode::WeakCategory]
                    .into_iter()
                    .find(|mode| mode.as_str() == value)
                    .ok_or_else(invalid)?;
            }
            "question_type" => {
                self.question_type = match value {
                    "any" | "none" => None,
                    other => Some(QuestionType::from_str(other).ok_or_else(invalid)?),
                };
            }
            "repeat_delay_questions" => self.repeat_delay_questions = number()?,
            "max_same_category_in_window" => self.max_same_category_in_window = number()?,
            "daily_goal_questions" => self.daily_goal_questions = number()?,
            "weekly_goal_study_days" => self.weekly_goal_study_days = number()?,
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        *self = self.normalized();
        Ok(())
    }
}
