//! CLI command implementations for Skirmish.

pub(crate) mod run;
pub(crate) mod tournament;

mod output;

use clap::ValueEnum;
use skirmish::SimConfig;
use skirmish::error::{ConfigError, SetupError};
use std::error::Error;
use std::fmt;

use crate::GameOptions;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `tournament` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum TournamentFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SetupError> for CliError {
    fn from(e: SetupError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

/// Build the config from an optional file plus command-line overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the result is invalid.
pub(crate) fn load_config(options: &GameOptions) -> Result<SimConfig, CliError> {
    let mut config = match &options.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(ai) = options.ai {
        config.ai_players = ai;
    }
    if let Some(max_ticks) = options.max_ticks {
        config.max_ticks = max_ticks;
    }
    if options.autopilot {
        config.autopilot_human = true;
    }
    config.validate()?;
    Ok(config)
}

/// Print the default config.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub(crate) fn print_default_config() -> Result<(), CliError> {
    let text = SimConfig::default()
        .to_toml_string()
        .map_err(|e| CliError::new(format!("TOML serialization failed: {e}")))?;
    print!("{text}");
    Ok(())
}

/// A seed from the clock, for when the user did not pick one.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}
