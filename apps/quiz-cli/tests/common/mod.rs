//! Common test utilities and fixtures for integration tests.
//!
//! `TestContext` writes a catalog to a temporary directory and opens a
//! file-backed database next to it, the same way the binary does.

pub mod fixtures;

use std::io::Cursor;
use std::path::PathBuf;

use serde_json::Value;
use tempfile::TempDir;

use quiz_cli::cli::Command;
use quiz_cli::config::Config;
use quiz_cli::state::AppState;

pub struct TestContext {
    pub state: AppState,
    pub config: Config,
    dir: TempDir,
}

impl TestContext {
    /// Context with two questions per category and a fixed seed.
    pub fn new() -> Self {
        Self::with_catalog(fixtures::sample_catalog(2))
    }

    pub fn with_catalog(catalog: Value) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let catalog_path = dir.path().join("questions.json");
        std::fs::write(&catalog_path, catalog.to_string()).expect("Failed to write catalog");

        let config = Config {
            db_path: dir.path().join("data").join("quiz.db"),
            catalog_path,
            seed: Some(7),
        };
        let state = AppState::open(&config).expect("Failed to open app state");
        Self { state, config, dir }
    }

    /// Path inside the context's temp directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Run a command with scripted stdin, returning stdout.
    pub fn run(&self, command: Command, input: &str) -> anyhow::Result<String> {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        quiz_cli::execute(&self.state, command, &mut input, &mut output)?;
        Ok(String::from_utf8(output).expect("stdout is utf-8"))
    }

    /// Run a command that prints JSON and parse it.
    pub fn run_json(&self, command: Command) -> Value {
        let stdout = self.run(command, "").expect("command failed");
        serde_json::from_str(&stdout).expect("stdout is json")
    }

    /// Reopen the same files, as a new process would.
    pub fn reopen(&self) -> AppState {
        AppState::open(&self.config).expect("Failed to reopen app state")
    }
}
