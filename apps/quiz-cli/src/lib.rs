pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod settings;
pub mod state;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Command;
use crate::config::Config;
use crate::state::AppState;

pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = cli::parse(&args).map_err(|err| anyhow::anyhow!("{err}\n\n{}", err.hint()))?;
    if command == Command::Help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    let config = Config::from_env().context("loading configuration")?;
    let state = AppState::open(&config).context("opening quiz data")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    execute(&state, command, &mut stdin.lock(), &mut stdout.lock())
}

/// Run one parsed command, writing its result to `output`.
pub fn execute<R: BufRead, W: Write>(
    state: &AppState,
    command: Command,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Study { count } => {
            commands::run_session(state, count, input, output)?;
        }
        Command::Next => print_json(output, &commands::next_question(state)?)?,
        Command::Answer {
            question_id,
            is_correct,
            time_spent_ms,
        } => print_json(
            output,
            &commands::submit_answer(state, &question_id, is_correct, time_spent_ms)?,
        )?,
        Command::Stats => print_json(output, &commands::get_stats(state)?)?,
        Command::ShowSettings => print_json(output, &commands::get_settings(state)?)?,
        Command::UpdateSetting { key, value } => {
            print_json(output, &commands::update_setting(state, &key, &value)?)?
        }
        Command::Export { path } => print_json(output, &commands::export_to_file(state, &path)?)?,
        Command::Import { path } => {
            print_json(output, &commands::import_from_file(state, &path)?)?
        }
        Command::Help => writeln!(output, "{}", cli::USAGE)?,
    }
    Ok(())
}

fn print_json<W: Write, T: Serialize>(output: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *output, value)?;
    writeln!(output)?;
    Ok(())
}
