//! Errors from the SQLite-backed quiz store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("quiz database schema v{found} is newer than this build supports (v{supported})")]
    UnsupportedSchema { found: i32, supported: i32 },
}
