//! Application state.

use crate::commands::CommandError;
use crate::config::Config;
use crate::db::{SettingsRepository, SqliteRepository};
use crate::settings::QuizSettings;
use quiz_core::{Catalog, Engine};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::sync::{Mutex, MutexGuard};

/// Global application state.
pub struct AppState {
    pub engine: Engine<SqliteRepository>,
    rng: Mutex<ChaCha8Rng>,
}

impl AppState {
    pub fn new(engine: Engine<SqliteRepository>, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        tracing::debug!(seed, "seeded question rng");
        Self {
            engine,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Load the catalog and open (or create) the database named by `config`.
    pub fn open(config: &Config) -> Result<Self, CommandError> {
        let content = fs::read_to_string(&config.catalog_path)?;
        let catalog = Catalog::from_json(&content)?;
        tracing::info!(
            questions = catalog.len(),
            path = %config.catalog_path.display(),
            "loaded question catalog"
        );

        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let repository = SqliteRepository::open(&config.db_path)?;
        tracing::info!(path = %config.db_path.display(), "opened quiz database");

        Ok(Self::new(Engine::new(catalog, repository), config.seed))
    }

    pub fn rng(&self) -> MutexGuard<'_, ChaCha8Rng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn settings(&self) -> Result<QuizSettings, CommandError> {
        Ok(self.engine.with_store(|repo| repo.get_quiz_settings())??)
    }

    pub fn save_settings(&self, settings: &QuizSettings) -> Result<(), CommandError> {
        Ok(self.engine.with_store(|repo| repo.save_quiz_settings(settings))??)
    }
}
