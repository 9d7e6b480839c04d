//! Static question catalog.
//!
//! # Format
//! A JSON array of questions:
//! ```json
//! [
//!   {
//!     "id": "et-001",
//!     "category": "electrical_theory",
//!     "question": "What is the combined resistance of 2 and 3 ohms in series?",
//!     "options": ["1 ohm", "1.2 ohm", "5 ohm", "6 ohm"],
//!     "correct_index": 2,
//!     "explanation": "Series resistances add up."
//!   }
//! ]
//! ```

use crate::error::CatalogError;
use crate::types::{Category, Question, QuestionType};
use std::collections::{BTreeMap, HashMap};

/// Validated, read-only question set.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    questions: Vec<Question>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Parse and validate a JSON catalog.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let questions: Vec<Question> = serde_json::from_str(content)?;
        Self::new(questions)
    }

    /// Validate an already deserialized question list.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(questions.len());
        for (position, question) in questions.iter().enumerate() {
            validate(position, question)?;
            if index.insert(question.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId {
                    id: question.id.clone(),
                });
            }
        }
        Ok(Self { questions, index })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.index.get(id).map(|&i| &self.questions[i])
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question count per category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for question in &self.questions {
            *counts.entry(question.category).or_default() += 1;
        }
        counts
    }
}

fn validate(position: usize, question: &Question) -> Result<(), CatalogError> {
    if question.id.trim().is_empty() {
        return Err(CatalogError::MissingId { index: position });
    }
    let invalid = |reason: &str| CatalogError::InvalidQuestion {
        id: question.id.clone(),
        reason: reason.to_string(),
    };

    if question.question.trim().is_empty() {
        return Err(invalid("empty prompt"));
    }
    if question.explanation.trim().is_empty() {
        return Err(invalid("empty explanation"));
    }
    if question.options.len() < 2 {
        return Err(invalid("needs at least 2 options"));
    }
    match question.kind() {
        QuestionType::MultipleChoice if question.options.len() != 4 => {
            return Err(invalid("multiple_choice needs exactly 4 options"));
        }
        QuestionType::TrueFalse if question.options.len() != 2 => {
            return Err(invalid("true_false needs exactly 2 options"));
        }
        _ => {}
    }
    if question.correct_index >= question.options.len() {
        return Err(invalid("correct_index out of range"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "id": "et-1",
            "category": "electrical_theory",
            "question": "Series resistance of 2 and 3 ohms?",
            "options": ["1", "1.2", "5", "6"],
            "correct_index": 2,
            "explanation": "Series resistances add."
        },
        {
            "id": "law-1",
            "category": "laws",
            "question": "A licence is required for this work.",
            "options": ["True", "False"],
            "correct_index": 0,
            "explanation": "The act says so.",
            "question_type": "true_false",
            "exam_year": 2023
        }
    ]"#;

    #[test]
    fn parse_sample_catalog() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("law-1").unwrap().kind(), QuestionType::TrueFalse);
        assert_eq!(catalog.get("et-1").unwrap().kind(), QuestionType::MultipleChoice);
        assert!(catalog.get("missing").is_none());
        assert_eq!(catalog.category_counts()[&Category::Laws], 1);
    }

    #[test]
    fn reject_duplicate_ids() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let mut questions = catalog.questions().to_vec();
        questions.push(questions[0].clone());
        let result = Catalog::new(questions);
        assert!(matches!(result, Err(CatalogError::DuplicateId { id }) if id == "et-1"));
    }

    #[test]
    fn reject_out_of_range_answer() {
        let mut questions = Catalog::from_json(SAMPLE).unwrap().questions().to_vec();
        questions[1].correct_index = 2;
        let result = Catalog::new(questions);
        assert!(matches!(result, Err(CatalogError::InvalidQuestion { id, .. }) if id == "law-1"));
    }

    #[test]
    fn reject_wrong_option_count() {
        let mut questions = Catalog::from_json(SAMPLE).unwrap().questions().to_vec();
        questions[0].options.pop();
        assert!(matches!(
            Catalog::new(questions),
            Err(CatalogError::InvalidQuestion { .. })
        ));
    }

    #[test]
    fn reject_blank_id() {
        let mut questions = Catalog::from_json(SAMPLE).unwrap().questions().to_vec();
        questions[1].id = "  ".to_string();
        assert!(matches!(
            Catalog::new(questions),
            Err(CatalogError::MissingId { index: 1 })
        ));
    }

    #[test]
    fn reject_malformed_json() {
        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn empty_array_is_an_empty_catalog() {
        let catalog = Catalog::from_json("[]").unwrap();
        assert!(catalog.is_empty());
    }
}
