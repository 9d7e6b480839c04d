//! Statistics commands.

use crate::commands::CommandError;
use crate::state::AppState;
use chrono::{Local, TimeZone};
use quiz_core::{Category, MasteryReport, StudyInsights};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mastery and study habits in one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub mastery: MasteryReport,
    pub insights: StudyInsights,
    pub catalog_questions: usize,
    pub questions_by_category: BTreeMap<Category, usize>,
}

/// Get overall statistics in the local time zone.
pub fn get_stats(state: &AppState) -> Result<StatsReport, CommandError> {
    get_stats_at(state, &Local, chrono::Utc::now().timestamp_millis())
}

pub fn get_stats_at<Tz: TimeZone>(
    state: &AppState,
    tz: &Tz,
    now: i64,
) -> Result<StatsReport, CommandError> {
    let goals = state.settings()?.goals();
    let catalog = state.engine.catalog();
    Ok(StatsReport {
        mastery: state.engine.calculate_mastery_at(now)?,
        insights: state.engine.study_insights(goals, tz, now)?,
        catalog_questions: catalog.len(),
        questions_by_category: catalog.category_counts(),
    })
}
