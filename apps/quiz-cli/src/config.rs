//! Process configuration from the environment (and `.env`).

use std::path::PathBuf;
use thiserror::Error;

pub const DB_PATH_VAR: &str = "QUIZ_DB_PATH";
pub const CATALOG_VAR: &str = "QUIZ_CATALOG";
pub const SEED_VAR: &str = "QUIZ_SEED";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub catalog_path: PathBuf,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}

/// Default database location under the user's data directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quiz-engine")
        .join("quiz.db")
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let catalog_path = get(CATALOG_VAR)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(CATALOG_VAR))?;
        let db_path = get(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let seed = get(SEED_VAR)
            .map(|value| {
                value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                    var: SEED_VAR,
                    value,
                })
            })
            .transpose()?;

        Ok(Self {
            db_path,
            catalog_path,
            seed,
        })
    }
}
