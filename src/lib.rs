// Allow unwrap and exact float comparisons in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]
//! Skirmish: a deterministic tick simulation core for real-time strategy.
//!
//! One human and several AI players share a tile grid. Players earn money
//! from the buildings they own, train military units, and fight over
//! buildings. A player who loses every city hall is eliminated; the last
//! one standing wins.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI / renderer / input layer      │
//! ├─────────────────────────────────────┤
//! │   Session (clock, restart, runner)  │
//! ├─────────────────────────────────────┤
//! │   World::tick                       │
//! │   economy → production → units →    │
//! │   fog → AI → victory                │
//! └─────────────────────────────────────┘
//! ```
//!
//! Given the same seed, config and command sequence, a game always plays
//! out identically.

pub mod config;
pub mod error;
pub mod game;
pub mod session;

pub use config::SimConfig;
pub use error::{CommandError, CommandResult, ConfigError, SetupError};

// Re-export key game types at crate root for convenience
pub use game::{
    Command, Coord, Grid, MilitaryUnit, Outcome, Player, PlayerId, UnitId, UnitKind, World,
};
pub use session::{GameResult, Session, run_game};
