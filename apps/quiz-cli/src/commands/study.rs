//! Study session commands.

use crate::commands::CommandError;
use crate::state::AppState;
use quiz_core::{Question, RetentionState};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub answered: u32,
    pub correct: u32,
    pub quit_early: bool,
}

/// Pick the next question using the stored settings.
pub fn next_question(state: &AppState) -> Result<Question, CommandError> {
    let options = state.settings()?.select_options();
    let mut rng = state.rng();
    state
        .engine
        .select_next(&options, &mut *rng)
        .map_err(Into::into)
}

/// Record an answer for a catalog question.
pub fn submit_answer(
    state: &AppState,
    question_id: &str,
    is_correct: bool,
    time_spent_ms: f64,
) -> Result<RetentionState, CommandError> {
    if state.engine.catalog().get(question_id).is_none() {
        return Err(CommandError::UnknownQuestion(question_id.to_string()));
    }
    state
        .engine
        .record_answer(question_id, is_correct, time_spent_ms)
        .map_err(Into::into)
}

/// Interactive session of up to `count` questions.
pub fn run_session<R: BufRead, W: Write>(
    state: &AppState,
    count: u32,
    input: &mut R,
    output: &mut W,
) -> Result<SessionSummary, CommandError> {
    let mut summary = SessionSummary::default();

    for round in 1..=count {
        let question = next_question(state)?;
        writeln!(
            output,
            "\n[{round}/{count}] {} ({})",
            question.question,
            question.category.as_str()
        )?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(output, "  {}. {}", i + 1, option)?;
        }

        let started = Instant::now();
        let Some(choice) = read_choice(input, output, question.options.len())? else {
            summary.quit_early = true;
            break;
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let is_correct = question.is_correct(choice);
        let retention = submit_answer(state, &question.id, is_correct, elapsed_ms)?;
        summary.answered += 1;
        if is_correct {
            summary.correct += 1;
            writeln!(output, "Correct.")?;
        } else {
            let answer = question
                .options
                .get(question.correct_index)
                .map_or("?", String::as_str);
            writeln!(output, "Wrong. Answer: {answer}")?;
        }
        writeln!(output, "{}", question.explanation)?;
        writeln!(output, "Next review in {} day(s).", retention.interval_days)?;
    }

    writeln!(output, "\n{}/{} correct", summary.correct, summary.answered)?;
    Ok(summary)
}

/// Zero-based option index, or `None` on quit or end of input.
fn read_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    option_count: usize,
) -> Result<Option<usize>, CommandError> {
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=option_count).contains(&n) => return Ok(Some(n - 1)),
            _ => writeln!(output, "Enter a number from 1 to {option_count}, or q to quit.")?,
        }
    }
}
