//! Run command implementation.

use super::output::{format_text, render_fog_map};
use super::{CliError, OutputFormat, clock_seed};
use skirmish::SimConfig;
use skirmish::session::{GameResult, Session, headless_dt};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the game cannot be set up.
pub(crate) fn execute(
    config: &SimConfig,
    seed: Option<u64>,
    format: OutputFormat,
    map: bool,
) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(clock_seed);

    if format == OutputFormat::Text {
        println!("Running game with seed {seed}...");
        println!(
            "Players: 1 human{}, {} AI",
            if config.autopilot_human { " (autopilot)" } else { "" },
            config.ai_players
        );
        println!();
    }

    // Drive the session directly so the final world is still around for --map
    let mut session = Session::new(seed, *config)?;
    let dt = headless_dt();
    while !session.world().is_over() && session.world().tick_count() < config.max_ticks {
        session.step(dt);
    }
    let result = GameResult::from_world(seed, session.world());

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result));
            if map {
                println!();
                print!("{}", render_fog_map(session.world(), 1));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)?;
            println!("{json}");
        }
    }

    Ok(())
}
