//! Error types for the simulation core.
//!
//! Every error here is recoverable. Commands that fail leave the world
//! untouched and the tick loop keeps running.

use std::path::PathBuf;

use thiserror::Error;

use crate::game::{BuildingKind, Coord, PlayerId};

/// Why a command or placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The player cannot pay for the requested unit.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        /// Cost of the request.
        needed: i64,
        /// Money the player had at the time.
        available: i64,
    },
    /// A finished unit had nowhere to spawn (capital destroyed).
    #[error("player {0} has no capital to spawn units at")]
    NoValidSpawnLocation(PlayerId),
    /// A footprint cell already holds a structure or is not buildable.
    #[error("tile {0} is occupied")]
    TileOccupied(Coord),
    /// A building was placed with a footprint other than its kind's.
    #[error("footprint {footprint} does not match {kind:?}")]
    FootprintMismatch {
        /// Kind being placed.
        kind: BuildingKind,
        /// Footprint side length requested.
        footprint: u16,
    },
    /// A coordinate lies outside the grid.
    #[error("tile {0} is out of bounds")]
    OutOfBounds(Coord),
    /// No player with this ID exists.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    /// The player has already been eliminated.
    #[error("player {0} has been eliminated")]
    PlayerEliminated(PlayerId),
    /// The player is computer controlled and does not accept input commands.
    #[error("player {0} is not controlled by input")]
    NotHuman(PlayerId),
    /// Nothing hostile to attack at the given tile.
    #[error("no enemy target at {0}")]
    NoTarget(Coord),
    /// An order was issued with no live units selected.
    #[error("no units selected")]
    EmptySelection,
    /// The game has already ended.
    #[error("game is over")]
    GameOver,
}

/// Failure to build a starting layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Player count outside the supported range.
    #[error("unsupported player count {0} (need 2-{max})", max = crate::game::MAX_PLAYERS)]
    PlayerCount(usize),
    /// The map is too small to fit every capital with spacing.
    #[error("map {width}x{height} cannot fit {players} capitals")]
    MapTooSmall {
        /// Map width in tiles.
        width: u16,
        /// Map height in tiles.
        height: u16,
        /// Number of players requested.
        players: usize,
    },
    /// A capital could not be placed.
    #[error("failed to place capital for player {player}: {source}")]
    Placement {
        /// Player whose capital failed.
        player: PlayerId,
        /// Underlying placement error.
        source: CommandError,
    },
}

/// Failure to load or validate a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The TOML could not be parsed.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its allowed range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Convenience alias for command results.
pub type CommandResult<T = ()> = Result<T, CommandError>;
