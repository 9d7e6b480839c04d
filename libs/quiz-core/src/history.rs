//! Views over the append-only answer log.

use crate::types::AnswerRecord;
use std::collections::{HashMap, HashSet};

/// Latest answer for each question id, keyed by question id.
///
/// With `since` set, only answers strictly newer than `since` are considered.
/// When two answers share a timestamp the one stored later (higher id) wins.
pub fn latest_per_question(
    answers: &[AnswerRecord],
    since: Option<i64>,
) -> HashMap<&str, &AnswerRecord> {
    let mut latest: HashMap<&str, &AnswerRecord> = HashMap::new();
    for answer in answers {
        if since.is_some_and(|start| answer.answered_at <= start) {
            continue;
        }
        latest
            .entry(answer.question_id.as_str())
            .and_modify(|prev| {
                if (answer.answered_at, answer.id) > (prev.answered_at, prev.id) {
                    *prev = answer;
                }
            })
            .or_insert(answer);
    }
    latest
}

/// Question ids that have at least one answer.
pub fn answered_ids(answers: &[AnswerRecord]) -> HashSet<&str> {
    answers.iter().map(|a| a.question_id.as_str()).collect()
}

/// The `n` most recent answers, newest first.
pub fn most_recent(answers: &[AnswerRecord], n: usize) -> Vec<&AnswerRecord> {
    let mut sorted: Vec<&AnswerRecord> = answers.iter().collect();
    sorted.sort_by(|a, b| (b.answered_at, b.id).cmp(&(a.answered_at, a.id)));
    sorted.truncate(n);
    sorted
}
