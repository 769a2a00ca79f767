//! Skirmish CLI - run headless games and tournaments.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Skirmish - a deterministic RTS simulation
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that play games.
#[derive(clap::Args, Debug)]
struct GameOptions {
    /// TOML config file (defaults apply to anything it omits)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of AI opponents
    #[arg(long)]
    ai: Option<usize>,

    /// Maximum ticks per game
    #[arg(short = 't', long)]
    max_ticks: Option<u64>,

    /// Let the AI play the human seat too
    #[arg(long)]
    autopilot: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single headless game
    Run {
        #[command(flatten)]
        options: GameOptions,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Print the final map as seen by the human player
        #[arg(long)]
        map: bool,
    },

    /// Run many games in parallel and aggregate statistics
    Tournament {
        #[command(flatten)]
        options: GameOptions,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Print the default configuration as TOML
    Config,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            options,
            seed,
            format,
            map,
        } => cli::load_config(&options).and_then(|config| cli::run::execute(&config, seed, format, map)),

        Commands::Tournament {
            options,
            games,
            seed,
            threads,
            format,
            progress,
        } => cli::load_config(&options).and_then(|config| {
            cli::tournament::execute(&config, games, seed, threads, format, progress)
        }),

        Commands::Config => cli::print_default_config(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
