//! Command-line argument parsing.

use crate::settings::KEYS;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_SESSION_QUESTIONS: u32 = 10;

pub const USAGE: &str = "\
usage: quiz <command>

commands:
  study [count]                     interactive session (default 10 questions)
  next                              print the next question as JSON
  answer <id> <correct|wrong> [ms]  record an answer
  stats                             mastery and study insights
  settings [key value]              show or change a setting
  export <file>                     write a backup snapshot
  import <file>                     replace history from a backup snapshot";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Study { count: u32 },
    Next,
    Answer {
        question_id: String,
        is_correct: bool,
        time_spent_ms: f64,
    },
    Stats,
    ShowSettings,
    UpdateSetting { key: String, value: String },
    Export { path: PathBuf },
    Import { path: PathBuf },
    Help,
}

#[derive(Debug, Error, PartialEq)]
pub enum UsageError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing argument <{arg}> for {command}")]
    MissingArgument {
        command: &'static str,
        arg: &'static str,
    },

    #[error("invalid {arg}: {value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("too many arguments for {0}")]
    TooManyArguments(&'static str),
}

impl UsageError {
    /// Extra hint printed after the error.
    pub fn hint(&self) -> String {
        match self {
            Self::MissingArgument { command: "settings", .. } => {
                format!("settings keys: {}", KEYS.join(", "))
            }
            _ => USAGE.to_string(),
        }
    }
}

/// Parse the arguments after the program name.
pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Command, UsageError> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    let Some((&command, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    let command = match command {
        "study" => {
            let count = match rest.first() {
                Some(raw) => raw
                    .parse::<u32>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| UsageError::InvalidArgument {
                        arg: "count",
                        value: raw.to_string(),
                    })?,
                None => DEFAULT_SESSION_QUESTIONS,
            };
            expect_at_most(rest, 1, "study")?;
            Command::Study { count }
        }
        "next" => {
            expect_at_most(rest, 0, "next")?;
            Command::Next
        }
        "answer" => {
            let question_id = required(rest, 0, "answer", "id")?;
            let is_correct = match required(rest, 1, "answer", "correct|wrong")? {
                "correct" | "c" | "true" => true,
                "wrong" | "w" | "false" => false,
                other => {
                    return Err(UsageError::InvalidArgument {
                        arg: "result",
                        value: other.to_string(),
                    })
                }
            };
            let time_spent_ms = match rest.get(2) {
                Some(raw) => raw.parse::<f64>().map_err(|_| UsageError::InvalidArgument {
                    arg: "ms",
                    value: raw.to_string(),
                })?,
                None => 0.0,
            };
            expect_at_most(rest, 3, "answer")?;
            Command::Answer {
                question_id: question_id.to_string(),
                is_correct,
                time_spent_ms,
            }
        }
        "stats" => {
            expect_at_most(rest, 0, "stats")?;
            Command::Stats
        }
        "settings" => match rest {
            [] => Command::ShowSettings,
            [_] => {
                return Err(UsageError::MissingArgument {
                    command: "settings",
                    arg: "value",
                })
            }
            [key, value] => Command::UpdateSetting {
                key: key.to_string(),
                value: value.to_string(),
            },
            _ => return Err(UsageError::TooManyArguments("settings")),
        },
        "export" => {
            let path = required(rest, 0, "export", "file")?;
            expect_at_most(rest, 1, "export")?;
            Command::Export { path: path.into() }
        }
        "import" => {
            let path = required(rest, 0, "import", "file")?;
            expect_at_most(rest, 1, "import")?;
            Command::Import { path: path.into() }
        }
        "help" | "-h" | "--help" => Command::Help,
        other => return Err(UsageError::UnknownCommand(other.to_string())),
    };
    Ok(command)
}

fn required<'a>(
    rest: &[&'a str],
    index: usize,
    command: &'static str,
    arg: &'static str,
) -> Result<&'a str, UsageError> {
    rest.get(index)
        .copied()
        .ok_or(UsageError::MissingArgument { command, arg })
}

fn expect_at_most(rest: &[&str], max: usize, command: &'static str) -> Result<(), UsageError> {
    if rest.len() > max {
        return Err(UsageError::TooManyArguments(command));
    }
    Ok(())
}
