//! Backup export and import.

use crate::commands::CommandError;
use crate::state::AppState;
use quiz_core::BackupSnapshot;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupSummary {
    pub answers: usize,
    pub retention_states: usize,
}

impl BackupSummary {
    fn of(snapshot: &BackupSnapshot) -> Self {
        Self {
            answers: snapshot.answers.len(),
            retention_states: snapshot.retention_states.len(),
        }
    }
}

/// Write the full answer history and retention states as JSON.
pub fn export_to_file(state: &AppState, path: &Path) -> Result<BackupSummary, CommandError> {
    let snapshot = state.engine.export_snapshot()?;
    fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
    tracing::info!(path = %path.display(), answers = snapshot.answers.len(), "exported backup");
    Ok(BackupSummary::of(&snapshot))
}

/// Replace the stored history with a previously exported file.
pub fn import_from_file(state: &AppState, path: &Path) -> Result<BackupSummary, CommandError> {
    let content = fs::read_to_string(path)?;
    let snapshot: BackupSnapshot = serde_json::from_str(&content)?;
    state.engine.restore_snapshot(&snapshot)?;
    tracing::info!(path = %path.display(), answers = snapshot.answers.len(), "imported backup");
    Ok(BackupSummary::of(&snapshot))
}
