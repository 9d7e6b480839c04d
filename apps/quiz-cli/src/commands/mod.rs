//! Commands exposed by the `quiz` binary.

pub mod backup;
pub mod settings;
pub mod stats;
pub mod study;

use crate::db::DbError;
use crate::settings::SettingsError;
use quiz_core::{CatalogError, EngineError};
use thiserror::Error;

pub use backup::{export_to_file, import_from_file, BackupSummary};
pub use settings::{get_settings, update_setting};
pub use stats::{get_stats, StatsReport};
pub use study::{next_question, run_session, submit_answer, SessionSummary};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown question: {0}")]
    UnknownQuestion(String),
}
