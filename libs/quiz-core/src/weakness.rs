//! Per-category weakness estimate.
//!
//! Weakness is `max(0.1, 1 - accuracy * coverage)` over the latest answer of
//! each question. The 0.1 floor keeps mastered categories in rotation.

use crate::history::latest_per_question;
use crate::types::{AnswerRecord, Category, Question};
use std::collections::BTreeMap;

/// Lowest weakness a category can reach.
pub const MIN_WEAKNESS: f64 = 0.1;

/// Weakness for every category present in `questions`.
pub fn category_weakness(
    questions: &[&Question],
    answers: &[AnswerRecord],
) -> BTreeMap<Category, f64> {
    let latest = latest_per_question(answers, None);

    let mut totals: BTreeMap<Category, (usize, usize, usize)> = BTreeMap::new();
    for question in questions {
        let entry = totals.entry(question.category).or_default();
        entry.0 += 1;
        if let Some(answer) = latest.get(question.id.as_str()) {
            entry.1 += 1;
            if answer.is_correct {
                entry.2 += 1;
            }
        }
    }

    totals
        .into_iter()
        .map(|(category, (total, answered, correct))| {
            (category, weakness(total, answered, correct))
        })
        .collect()
}

fn weakness(total: usize, answered: usize, correct: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    let accuracy = if answered > 0 {
        correct as f64 / answered as f64
    } else {
        0.0
    };
    let coverage = answered as f64 / total as f64;
    (1.0 - accuracy * coverage).max(MIN_WEAKNESS)
}

/// Category with the highest weakness. Ties go to the earlier category.
pub fn weakest_category(weakness: &BTreeMap<Category, f64>) -> Option<Category> {
    let mut selected = None;
    let mut max = f64::NEG_INFINITY;
    for (&category, &value) in weakness {
        if value > max {
            max = value;
            selected = Some(category);
        }
    }
    selected
}
