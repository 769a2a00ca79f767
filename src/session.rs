//! Game sessions and the headless runner.
//!
//! A [`Session`] owns one [`World`] plus the tick clock, and routes input
//! commands: speed changes and restarts act on the session, everything else
//! goes to the world.
//!
//! [`run_game`] is a pure function `(seed, config) -> GameResult` that plays
//! a whole game at normal speed with no input, used by the CLI and tests.

mod mapgen;

pub use mapgen::{MIN_CAPITAL_SPACING, STARTER_BUILDINGS, generate_layout};

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::config::SimConfig;
use crate::error::{CommandResult, SetupError};
use crate::game::{Command, Outcome, PlayerId, Speed, TickScheduler, World};

/// One game plus its clock.
#[derive(Debug, Clone)]
pub struct Session {
    world: World,
    /// Snapshot the session returns to on restart.
    initial: World,
    clock: TickScheduler,
    seed: u64,
}

impl Session {
    /// Start a new game from a seed.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if no starting layout fits the config.
    pub fn new(seed: u64, config: SimConfig) -> Result<Self, SetupError> {
        let (grid, players) = generate_layout(seed, &config)?;
        let world = World::new(grid, players, config, seed);
        Ok(Self {
            initial: world.clone(),
            world,
            clock: TickScheduler::new(Speed::Normal),
            seed,
        })
    }

    /// The current world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The current world, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Current speed setting.
    #[must_use]
    pub const fn speed(&self) -> Speed {
        self.clock.speed()
    }

    /// Seed this session was started with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Apply an input command.
    ///
    /// # Errors
    ///
    /// Returns the reason a world command was rejected.
    pub fn apply(&mut self, command: Command) -> CommandResult {
        match command {
            Command::SetSpeed(speed) => {
                self.clock.set_speed(speed);
                Ok(())
            }
            Command::Restart => {
                info!(seed = self.seed, "restarting game");
                self.world = self.initial.clone();
                Ok(())
            }
            other => self.world.apply(other),
        }
    }

    /// Feed elapsed wall time, ticking the world when the clock says so.
    ///
    /// Returns `true` if a tick ran.
    pub fn update(&mut self, elapsed: Duration) -> bool {
        match self.clock.advance(elapsed) {
            Some(dt) => {
                self.world.advance(dt);
                true
            }
            None => false,
        }
    }

    /// Tick the world once with an explicit `dt`, ignoring the clock.
    pub fn step(&mut self, dt: f32) {
        self.world.advance(dt);
    }
}

/// Final statistics for a single player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerStats {
    /// Player identifier.
    pub player_id: PlayerId,
    /// Whether this was the human seat.
    pub is_human: bool,
    /// Final score.
    pub final_score: f64,
    /// Money at the end.
    pub money: i64,
    /// Buildings owned at the end.
    pub buildings: u32,
    /// Live units at the end.
    pub units: usize,
    /// Enemy units killed.
    pub units_killed: u32,
    /// Own units lost.
    pub units_lost: u32,
    /// Enemy buildings destroyed.
    pub buildings_destroyed: u32,
    /// Tick the player was eliminated (None if survived).
    pub eliminated_tick: Option<u64>,
}

/// Final result of a headless game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameResult {
    /// The seed used for this game.
    pub seed: u64,
    /// How the game ended, or `None` if it hit the tick limit.
    pub outcome: Option<Outcome>,
    /// The winning player, if any.
    pub winner: Option<PlayerId>,
    /// Total ticks played.
    pub ticks_played: u64,
    /// Per-player statistics.
    pub player_stats: Vec<PlayerStats>,
    /// Elimination order (first eliminated is index 0).
    pub elimination_order: Vec<PlayerId>,
}

impl GameResult {
    /// Summarise a world.
    #[must_use]
    pub fn from_world(seed: u64, world: &World) -> Self {
        let player_stats = world
            .players()
            .iter()
            .map(|p| PlayerStats {
                player_id: p.id,
                is_human: p.is_human,
                final_score: p.score,
                money: p.money,
                buildings: world.grid().count_buildings(p.id),
                units: world.units().live_count(p.id),
                units_killed: p.units_killed,
                units_lost: p.units_lost,
                buildings_destroyed: p.buildings_destroyed,
                eliminated_tick: p.eliminated_at,
            })
            .collect();

        let mut eliminated: Vec<(u64, PlayerId)> = world
            .players()
            .iter()
            .filter_map(|p| p.eliminated_at.map(|t| (t, p.id)))
            .collect();
        eliminated.sort_unstable();

        let outcome = world.outcome();
        Self {
            seed,
            outcome,
            winner: outcome.and_then(Outcome::winner),
            ticks_played: world.tick_count(),
            player_stats,
            elimination_order: eliminated.into_iter().map(|(_, id)| id).collect(),
        }
    }

    /// Player with the highest final score (lowest ID on ties).
    #[must_use]
    pub fn leader(&self) -> Option<PlayerId> {
        self.player_stats
            .iter()
            .max_by(|a, b| {
                a.final_score
                    .total_cmp(&b.final_score)
                    .then(b.player_id.cmp(&a.player_id))
            })
            .map(|s| s.player_id)
    }
}

/// Fixed `dt` used by headless runs: one normal-speed tick interval.
#[must_use]
pub fn headless_dt() -> f32 {
    Speed::Normal
        .interval()
        .map_or(0.1, |interval| interval.as_secs_f32())
}

/// Play a full game with no input until it ends or hits `max_ticks`.
///
/// Only the AI acts, so the human seat just collects income unless
/// `config.autopilot_human` is set.
///
/// # Errors
///
/// Returns [`SetupError`] if no starting layout fits the config.
pub fn run_game(seed: u64, config: &SimConfig) -> Result<GameResult, SetupError> {
    let mut session = Session::new(seed, *config)?;
    let dt = headless_dt();
    while !session.world().is_over() && session.world().tick_count() < config.max_ticks {
        session.step(dt);
    }
    let result = GameResult::from_world(seed, session.world());
    info!(
        seed,
        ticks = result.ticks_played,
        outcome = ?result.outcome,
        "game finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::UnitKind;

    fn short_config() -> SimConfig {
        SimConfig {
            max_ticks: 300,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_run_game_determinism() {
        let config = short_config();
        let a = run_game(12345, &config).unwrap();
        let b = run_game(12345, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.ticks_played, 300);
        assert_eq!(a.player_stats.len(), 3);
    }

    #[test]
    fn test_speed_and_restart_stay_in_session() {
        let mut session = Session::new(5, short_config()).unwrap();
        session.apply(Command::SetSpeed(Speed::Paused)).unwrap();
        assert_eq!(session.speed(), Speed::Paused);
        assert!(!session.update(Duration::from_secs(5)));
        assert_eq!(session.world().tick_count(), 0);

        session.apply(Command::SetSpeed(Speed::Fast)).unwrap();
        assert!(session.update(Duration::from_millis(60)));
        assert_eq!(session.world().tick_count(), 1);

        session
            .apply(Command::EnqueueProduction {
                player: 1,
                kind: UnitKind::Infantry,
            })
            .unwrap();
        session.apply(Command::Restart).unwrap();
        assert_eq!(session.world().tick_count(), 0);
        assert_eq!(session.world().production().pending(1), 0);
        assert_eq!(
            session.world().player(1).unwrap().money,
            short_config().starting_money
        );
    }

    #[test]
    fn test_leader_breaks_ties_by_id() {
        let config = short_config();
        let mut result = run_game(1, &config).unwrap();
        for stats in &mut result.player_stats {
            stats.final_score = 10.0;
        }
        assert_eq!(result.leader(), Some(1));
    }
}
