//! Error types for quiz-core.

use thiserror::Error;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading a question catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("question at position {index} has an empty id")]
    MissingId { index: usize },

    #[error("duplicate question id {id}")]
    DuplicateId { id: String },

    #[error("question {id}: {reason}")]
    InvalidQuestion { id: String, reason: String },
}

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("question catalog is empty")]
    EmptyCatalog,

    #[error("record store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("record store lock poisoned")]
    LockPoisoned,
}

impl EngineError {
    pub fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store(Box::new(err))
    }
}
