//! Pass power: accuracy x coverage x recency decay, weighted by the exam
//! blueprint.

use crate::history::{answered_ids, latest_per_question};
use crate::types::{AnswerRecord, Category, MasteryReport, Question, ONE_DAY_MS};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Accuracy only looks at answers newer than this.
pub const ACCURACY_WINDOW_MS: i64 = 30 * ONE_DAY_MS;

/// Recency multiplier for a category last answered at `last_answered_at`.
///
/// Piecewise linear through (0d, 1.0) (7d, 0.9) (14d, 0.8) (30d, 0.6)
/// (60d, 0.4), flat afterwards.
pub fn time_decay(now: i64, last_answered_at: i64) -> f64 {
    let days = now.saturating_sub(last_answered_at) as f64 / ONE_DAY_MS as f64;
    if days <= 0.0 {
        1.0
    } else if days <= 7.0 {
        1.0 - days * (0.1 / 7.0)
    } else if days <= 14.0 {
        0.9 - (days - 7.0) * (0.1 / 7.0)
    } else if days <= 30.0 {
        0.8 - (days - 14.0) * (0.2 / 16.0)
    } else if days <= 60.0 {
        0.6 - (days - 30.0) * (0.2 / 30.0)
    } else {
        0.4
    }
}

/// Compute the mastery report for `answers` at `now`.
pub fn calculate_mastery(
    questions: &[Question],
    answers: &[AnswerRecord],
    now: i64,
) -> MasteryReport {
    let recent = latest_per_question(answers, Some(now.saturating_sub(ACCURACY_WINDOW_MS)));
    let ever = answered_ids(answers);

    let mut by_category = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for category in Category::ALL {
        let weight = category.exam_weight();
        total_weight += weight;

        let members: Vec<&Question> = questions.iter().filter(|q| q.category == category).collect();
        let score = category_score(&members, &recent, &ever, now);
        weighted_sum += f64::from(score) * weight;
        by_category.insert(category, score);
    }

    let overall = if total_weight > 0.0 {
        ((weighted_sum / total_weight).round() as u32).min(100)
    } else {
        0
    };

    MasteryReport {
        overall,
        by_category,
        total_answered: answers.len(),
        last_updated: now,
    }
}

fn category_score(
    members: &[&Question],
    recent: &HashMap<&str, &AnswerRecord>,
    ever: &HashSet<&str>,
    now: i64,
) -> u32 {
    if members.is_empty() {
        return 0;
    }

    let windowed: Vec<&AnswerRecord> = members
        .iter()
        .filter_map(|q| recent.get(q.id.as_str()).copied())
        .collect();
    let Some(latest_at) = windowed.iter().map(|a| a.answered_at).max() else {
        return 0;
    };

    let correct = windowed.iter().filter(|a| a.is_correct).count();
    let accuracy = correct as f64 / windowed.len() as f64;

    let answered_ever = members.iter().filter(|q| ever.contains(q.id.as_str())).count();
    let coverage = (answered_ever as f64 / members.len() as f64).min(1.0);

    let decay = time_decay(now, latest_at);
    ((accuracy * coverage * decay * 100.0).round() as u32).min(100)
}
