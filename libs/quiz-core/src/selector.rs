//! Next-question selection.
//!
//! The candidate pool is narrowed by a chain of filters (question type, quiz
//! mode, anti-repeat, category balance). A filter that would leave nothing is
//! skipped, so a non-empty catalog always yields a question. The surviving
//! pool is then searched tier by tier:
//!
//! 1. due reviews, most overdue first
//! 2. never answered questions, weighted towards weak categories
//! 3. answered questions with the shortest intervals
//! 4. anything left in the pool

use crate::history::{answered_ids, latest_per_question, most_recent};
use crate::types::{AnswerRecord, Category, Question, QuestionType, QuizMode, RetentionState};
use crate::weakness::{category_weakness, weakest_category};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Number of recent answers inspected for category balance.
pub const RECENT_CATEGORY_WINDOW: usize = 10;
/// Due reviews are drawn from this many of the most overdue.
pub const DUE_TOP_K: usize = 6;
/// Weakest-retained fallback draws from this many candidates.
pub const WEAKEST_TOP_K: usize = 10;

pub const DEFAULT_REPEAT_DELAY_QUESTIONS: usize = 2;
pub const MAX_REPEAT_DELAY_QUESTIONS: usize = 10;
pub const DEFAULT_MAX_SAME_CATEGORY_IN_WINDOW: usize = 3;
pub const MIN_SAME_CATEGORY_LIMIT: usize = 1;
pub const MAX_SAME_CATEGORY_LIMIT: usize = 6;

/// Caller supplied selection options. Out-of-range numbers are clamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectOptions {
    #[serde(default)]
    pub fixed_type: Option<QuestionType>,
    #[serde(default)]
    pub mode: QuizMode,
    #[serde(default)]
    pub repeat_delay_questions: Option<i64>,
    #[serde(default)]
    pub max_same_category_in_window: Option<i64>,
}

impl SelectOptions {
    /// How many of the latest answers are blocked from repeating.
    pub fn repeat_delay(&self) -> usize {
        match self.repeat_delay_questions {
            Some(n) => n.clamp(0, MAX_REPEAT_DELAY_QUESTIONS as i64) as usize,
            None => DEFAULT_REPEAT_DELAY_QUESTIONS,
        }
    }

    /// Per-category cap inside the recent answer window.
    pub fn category_cap(&self) -> usize {
        match self.max_same_category_in_window {
            Some(n) => n.clamp(MIN_SAME_CATEGORY_LIMIT as i64, MAX_SAME_CATEGORY_LIMIT as i64)
                as usize,
            None => DEFAULT_MAX_SAME_CATEGORY_IN_WINDOW,
        }
    }

    /// Copy with every numeric field replaced by its clamped value.
    pub fn normalized(&self) -> Self {
        Self {
            fixed_type: self.fixed_type,
            mode: self.mode,
            repeat_delay_questions: Some(self.repeat_delay() as i64),
            max_same_category_in_window: Some(self.category_cap() as i64),
        }
    }
}

/// Priority level that produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Due,
    Unanswered,
    WeakestRetained,
    Fallback,
}

/// Chosen question and the tier it came from.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub question: &'a Question,
    pub tier: Tier,
}

/// Pick the next question. Returns `None` only for an empty catalog.
pub fn select<'a, R: Rng + ?Sized>(
    questions: &'a [Question],
    answers: &[AnswerRecord],
    states: &[RetentionState],
    options: &SelectOptions,
    now: i64,
    rng: &mut R,
) -> Option<Selection<'a>> {
    let catalog: Vec<&Question> = questions.iter().collect();
    let type_pool = narrow(&catalog, "question_type", |q| {
        options.fixed_type.map_or(true, |t| q.kind() == t)
    });
    let mode_pool = apply_mode(&type_pool, answers, options.mode);
    let pool = apply_recency_filters(questions, &mode_pool, answers, options);

    let states_by_id: HashMap<&str, &RetentionState> = states
        .iter()
        .map(|s| (s.question_id.as_str(), s))
        .collect();

    let due = due_candidates(&pool, &states_by_id, now);
    if let Some(question) = pick_uniform(top(&due, DUE_TOP_K), rng) {
        return Some(Selection { question, tier: Tier::Due });
    }

    let answered = answered_ids(answers);
    let unanswered: Vec<&Question> = pool
        .iter()
        .copied()
        .filter(|q| !answered.contains(q.id.as_str()))
        .collect();
    if !unanswered.is_empty() {
        let weakness = category_weakness(&mode_pool, answers);
        if let Some(question) = pick_weighted(&unanswered, &weakness, rng) {
            return Some(Selection { question, tier: Tier::Unanswered });
        }
    }

    let weakest = weakest_candidates(&pool, &states_by_id, answers);
    if let Some(question) = pick_uniform(top(&weakest, WEAKEST_TOP_K), rng) {
        return Some(Selection { question, tier: Tier::WeakestRetained });
    }

    pick_uniform(&pool, rng).map(|question| Selection { question, tier: Tier::Fallback })
}

/// Keep the questions matching `keep`, unless none do.
fn narrow<'a>(
    pool: &[&'a Question],
    filter: &'static str,
    keep: impl Fn(&Question) -> bool,
) -> Vec<&'a Question> {
    let narrowed: Vec<&Question> = pool.iter().copied().filter(|q| keep(*q)).collect();
    if narrowed.is_empty() && !pool.is_empty() {
        tracing::trace!(filter, "filter would empty the pool, ignoring it");
        return pool.to_vec();
    }
    narrowed
}

fn apply_mode<'a>(
    pool: &[&'a Question],
    answers: &[AnswerRecord],
    mode: QuizMode,
) -> Vec<&'a Question> {
    match mode {
        QuizMode::Balanced => pool.to_vec(),
        QuizMode::MistakeFocus => {
            let latest = latest_per_question(answers, None);
            narrow(pool, "mistake_focus", |q| {
                latest
                    .get(q.id.as_str())
                    .is_some_and(|answer| !answer.is_correct)
            })
        }
        QuizMode::WeakCategory => {
            let weakness = category_weakness(pool, answers);
            match weakest_category(&weakness) {
                Some(category) => narrow(pool, "weak_category", |q| q.category == category),
                None => pool.to_vec(),
            }
        }
    }
}

fn apply_recency_filters<'a>(
    questions: &[Question],
    pool: &[&'a Question],
    answers: &[AnswerRecord],
    options: &SelectOptions,
) -> Vec<&'a Question> {
    let repeat_delay = options.repeat_delay();
    let recent = most_recent(answers, RECENT_CATEGORY_WINDOW.max(repeat_delay));

    let pool = match recent.first() {
        Some(last) => narrow(pool, "immediate_repeat", |q| q.id != last.question_id),
        None => pool.to_vec(),
    };

    let delayed: HashSet<&str> = recent
        .iter()
        .take(repeat_delay)
        .map(|a| a.question_id.as_str())
        .collect();
    let pool = narrow(&pool, "repeat_delay", |q| !delayed.contains(q.id.as_str()));

    let category_of: HashMap<&str, Category> = questions
        .iter()
        .map(|q| (q.id.as_str(), q.category))
        .collect();
    let mut category_counts: HashMap<Category, usize> = HashMap::new();
    for answer in recent.iter().take(RECENT_CATEGORY_WINDOW) {
        if let Some(&category) = category_of.get(answer.question_id.as_str()) {
            *category_counts.entry(category).or_default() += 1;
        }
    }
    let cap = options.category_cap();
    narrow(&pool, "category_balance", |q| {
        category_counts.get(&q.category).copied().unwrap_or(0) < cap
    })
}

/// Due questions, most overdue first, then shortest interval first.
pub(crate) fn due_candidates<'a>(
    pool: &[&'a Question],
    states_by_id: &HashMap<&str, &RetentionState>,
    now: i64,
) -> Vec<&'a Question> {
    let mut due: Vec<(&Question, &RetentionState)> = pool
        .iter()
        .filter_map(|q| {
            states_by_id
                .get(q.id.as_str())
                .filter(|s| s.is_due(now))
                .map(|s| (*q, *s))
        })
        .collect();
    due.sort_by(|(_, a), (_, b)| {
        a.next_review_at
            .cmp(&b.next_review_at)
            .then(a.interval_days.cmp(&b.interval_days))
    });
    due.into_iter().map(|(q, _)| q).collect()
}

/// Every pool question, shortest interval first, then longest untouched.
pub(crate) fn weakest_candidates<'a>(
    pool: &[&'a Question],
    states_by_id: &HashMap<&str, &RetentionState>,
    answers: &[AnswerRecord],
) -> Vec<&'a Question> {
    let latest = latest_per_question(answers, None);
    let mut ranked: Vec<(&Question, u32, i64)> = pool
        .iter()
        .map(|q| {
            let state = states_by_id.get(q.id.as_str());
            let interval = state.map_or(0, |s| s.interval_days);
            let last = state
                .map(|s| s.last_answered_at)
                .or_else(|| latest.get(q.id.as_str()).map(|a| a.answered_at))
                .unwrap_or(0);
            (*q, interval, last)
        })
        .collect();
    ranked.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().map(|(q, _, _)| q).collect()
}

fn top<'s, 'a>(ranked: &'s [&'a Question], k: usize) -> &'s [&'a Question] {
    &ranked[..ranked.len().min(k)]
}

fn pick_uniform<'a, R: Rng + ?Sized>(items: &[&'a Question], rng: &mut R) -> Option<&'a Question> {
    items.choose(rng).copied()
}

/// Roulette draw where each question weighs its category's weakness.
fn pick_weighted<'a, R: Rng + ?Sized>(
    candidates: &[&'a Question],
    weakness: &BTreeMap<Category, f64>,
    rng: &mut R,
) -> Option<&'a Question> {
    let weights: Vec<f64> = candidates
        .iter()
        .map(|q| weakness.get(&q.category).copied().unwrap_or(1.0))
        .collect();
    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(candidates[dist.sample(rng)]),
        Err(_) => pick_uniform(candidates, rng),
    }
}
