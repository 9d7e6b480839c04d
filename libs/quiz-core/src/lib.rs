//! Adaptive quiz scheduling engine.
//!
//! Provides:
//! - JSON question catalog loading and validation
//! - SM-2 style retention model graded by answer speed
//! - Tiered next-question selection with category balancing
//! - Exam-weighted mastery ("pass power") and study insights
//! - A `RecordStore` seam with an in-memory implementation

pub mod catalog;
pub mod engine;
pub mod error;
pub mod history;
pub mod insights;
pub mod mastery;
pub mod retention;
pub mod selector;
pub mod store;
pub mod types;
pub mod weakness;

pub use catalog::Catalog;
pub use engine::Engine;
pub use error::{CatalogError, EngineError, Result};
pub use insights::{calculate_insights, DailyGoalProgress, StudyGoals, StudyInsights, WeeklyReview};
pub use mastery::{calculate_mastery, time_decay};
pub use retention::{RetentionModel, PASS_QUALITY};
pub use selector::{select, SelectOptions, Selection, Tier};
pub use store::{MemoryStore, RecordStore, StoreWriter};
pub use types::{
    AnswerRecord, BackupSnapshot, Category, MasteryReport, NewAnswer, Question, QuestionType,
    QuizMode, RetentionState, ONE_DAY_MS,
};
