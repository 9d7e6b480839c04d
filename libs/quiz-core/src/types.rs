//! Core types for the quiz scheduling engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Milliseconds in one day.
pub const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Exam subject area a question belongs to.
///
/// Declaration order is the canonical display order and breaks ties
/// wherever categories are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    ElectricalTheory,
    WiringDiagram,
    Laws,
    ConstructionMethod,
    EquipmentMaterial,
    Inspection,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 6] = [
        Self::ElectricalTheory,
        Self::WiringDiagram,
        Self::Laws,
        Self::ConstructionMethod,
        Self::EquipmentMaterial,
        Self::Inspection,
    ];

    /// Share of the exam blueprint taken by this category. Weights sum to 1.
    pub fn exam_weight(self) -> f64 {
        match self {
            Self::ElectricalTheory => 0.16,
            Self::WiringDiagram => 0.2,
            Self::Laws => 0.16,
            Self::ConstructionMethod => 0.2,
            Self::EquipmentMaterial => 0.16,
            Self::Inspection => 0.12,
        }
    }

    /// Get the category name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ElectricalTheory => "electrical_theory",
            Self::WiringDiagram => "wiring_diagram",
            Self::Laws => "laws",
            Self::ConstructionMethod => "construction_method",
            Self::EquipmentMaterial => "equipment_material",
            Self::Inspection => "inspection",
        }
    }
}

/// Presentation style of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ImageTap,
}

impl Default for QuestionType {
    fn default() -> Self {
        Self::MultipleChoice
    }
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::ImageTap => "image_tap",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "multiple_choice" => Some(Self::MultipleChoice),
            "true_false" => Some(Self::TrueFalse),
            "image_tap" => Some(Self::ImageTap),
            _ => None,
        }
    }
}

/// Pool restriction applied before tiered selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    Balanced,
    MistakeFocus,
    WeakCategory,
}

impl Default for QuizMode {
    fn default() -> Self {
        Self::Balanced
    }
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::MistakeFocus => "mistake_focus",
            Self::WeakCategory => "weak_category",
        }
    }

    /// Parse from string. Unknown values fall back to `Balanced`.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "mistake_focus" => Self::MistakeFocus,
            "weak_category" => Self::WeakCategory,
            _ => Self::Balanced,
        }
    }
}

/// A catalog question. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: Category,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_year: Option<u16>,
}

impl Question {
    /// Question type with the implicit multiple-choice default applied.
    pub fn kind(&self) -> QuestionType {
        self.question_type.unwrap_or_default()
    }

    /// Whether `option_index` is the correct option.
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_index
    }
}

/// One stored answer submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: i64,
    pub question_id: String,
    pub is_correct: bool,
    pub answered_at: i64,
    pub time_spent_ms: u64,
}

/// Answer submission before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnswer {
    pub question_id: String,
    pub is_correct: bool,
    pub answered_at: i64,
    pub time_spent_ms: u64,
}

impl NewAnswer {
    pub fn with_id(self, id: i64) -> AnswerRecord {
        AnswerRecord {
            id,
            question_id: self.question_id,
            is_correct: self.is_correct,
            answered_at: self.answered_at,
            time_spent_ms: self.time_spent_ms,
        }
    }
}

impl From<&AnswerRecord> for NewAnswer {
    fn from(record: &AnswerRecord) -> Self {
        Self {
            question_id: record.question_id.clone(),
            is_correct: record.is_correct,
            answered_at: record.answered_at,
            time_spent_ms: record.time_spent_ms,
        }
    }
}

/// Per-question spaced repetition state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionState {
    pub question_id: String,
    pub ease_factor: f64,
    pub interval_days: u32,
    pub next_review_at: i64,
    pub repetition_count: u32,
    pub last_answered_at: i64,
}

impl RetentionState {
    /// Whether the question is due for review at `now`.
    pub fn is_due(&self, now: i64) -> bool {
        self.next_review_at <= now
    }
}

/// Mastery ("pass power") summary, all scores in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryReport {
    pub overall: u32,
    pub by_category: BTreeMap<Category, u32>,
    pub total_answered: usize,
    pub last_updated: i64,
}

/// Full export of the record store, used for backup and bulk restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub answers: Vec<NewAnswer>,
    pub retention_states: Vec<RetentionState>,
}
