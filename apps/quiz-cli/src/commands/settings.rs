//! Settings commands.

use crate::commands::CommandError;
use crate::settings::QuizSettings;
use crate::state::AppState;

/// Get the stored settings.
pub fn get_settings(state: &AppState) -> Result<QuizSettings, CommandError> {
    state.settings()
}

/// Change one setting and persist the clamped result.
pub fn update_setting(
    state: &AppState,
    key: &str,
    value: &str,
) -> Result<QuizSettings, CommandError> {
    let mut settings = state.settings()?;
    settings.set(key, value)?;
    state.save_settings(&settings)?;
    tracing::info!(key, value, "updated setting");
    Ok(settings)
}
