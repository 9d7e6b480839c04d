//! Test fixtures and factory functions for creating test data.

use serde_json::{json, Value};

const CATEGORIES: [&str; 6] = [
    "electrical_theory",
    "wiring_diagram",
    "laws",
    "construction_method",
    "equipment_material",
    "inspection",
];

/// Multiple choice question with the second option correct.
pub fn question(id: &str, category: &str) -> Value {
    json!({
        "id": id,
        "category": category,
        "question": format!("Question {id}?"),
        "options": ["A", "B", "C", "D"],
        "correct_index": 1,
        "explanation": format!("Explanation for {id}."),
    })
}

/// Catalog with `per_category` questions in every category.
///
/// Ids look like `laws-0`, `laws-1`, ...
pub fn sample_catalog(per_category: usize) -> Value {
    let questions: Vec<Value> = CATEGORIES
        .iter()
        .flat_map(|category| {
            (0..per_category).map(move |i| question(&format!("{category}-{i}"), category))
        })
        .collect();
    Value::Array(questions)
}

/// Scripted stdin answering every question with option 2 (correct).
pub fn all_correct_input(rounds: usize) -> String {
    "2\n".repeat(rounds)
}
