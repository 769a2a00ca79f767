//! Scripted AI controller.
//!
//! Each computer player re-derives its decisions from the current world on a
//! jittered cadence so different AIs do not act in lockstep. The only state
//! kept between evaluations is when each player next evaluates.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::config::{AiConfig, SimConfig};
use crate::game::{
    AttackTarget, Coord, Grid, Player, PlayerId, ProductionScheduler, UnitId, UnitKind, UnitTable,
};

/// A decision taken by the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiAction {
    /// Enqueued a unit.
    Train {
        /// Acting player.
        player: PlayerId,
        /// Unit enqueued.
        kind: UnitKind,
    },
    /// Sent idle units at an enemy building.
    Attack {
        /// Acting player.
        player: PlayerId,
        /// Origin of the targeted building.
        origin: Coord,
        /// Number of units ordered.
        units: usize,
    },
}

/// Evaluation cadence for computer-controlled players.
#[derive(Debug, Clone, Default)]
pub struct AiController {
    /// Game time (seconds) at which each player next evaluates.
    next_eval: BTreeMap<PlayerId, f64>,
}

impl AiController {
    /// Create a controller with no scheduled evaluations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When a player next evaluates, if scheduled.
    #[must_use]
    pub fn next_evaluation(&self, player: PlayerId) -> Option<f64> {
        self.next_eval.get(&player).copied()
    }

    /// Whether the AI drives this player.
    #[must_use]
    pub const fn controls(player: &Player, config: &SimConfig) -> bool {
        player.is_alive() && (!player.is_human || config.autopilot_human)
    }

    /// Run every AI player whose evaluation is due at game time `now`.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &mut self,
        grid: &Grid,
        players: &mut [Player],
        units: &mut UnitTable,
        production: &mut ProductionScheduler,
        now: f64,
        rng: &mut ChaCha8Rng,
        config: &SimConfig,
    ) -> Vec<AiAction> {
        let mut actions = Vec::new();

        let ids: Vec<PlayerId> = players
            .iter()
            .filter(|p| Self::controls(p, config))
            .map(|p| p.id)
            .collect();

        for id in ids {
            let due = *self
                .next_eval
                .entry(id)
                .or_insert_with(|| now + next_interval(rng, &config.ai));
            if now < due {
                continue;
            }
            self.next_eval.insert(id, now + next_interval(rng, &config.ai));

            if let Some(action) = try_train(players, production, id, rng, &config.ai) {
                actions.push(action);
            }
            if let Some(action) = try_attack(grid, units, id, rng, &config.ai) {
                actions.push(action);
            }
        }

        actions
    }
}

/// Seconds until the next evaluation.
fn next_interval(rng: &mut ChaCha8Rng, config: &AiConfig) -> f64 {
    f64::from(config.base_interval_secs + config.jitter_secs * rng.random::<f32>())
}

/// Rule (a): keep the production queue topped up.
fn try_train(
    players: &mut [Player],
    production: &mut ProductionScheduler,
    player: PlayerId,
    rng: &mut ChaCha8Rng,
    config: &AiConfig,
) -> Option<AiAction> {
    if production.pending(player) >= config.max_queue {
        return None;
    }
    let money = players.iter().find(|p| p.id == player)?.money;
    let affordable: Vec<UnitKind> = UnitKind::ALL
        .into_iter()
        .filter(|k| k.cost() <= money)
        .collect();

    let kind = if rng.random_bool(config.strong_unit_chance) {
        *affordable.last()?
    } else {
        *affordable.first()?
    };

    match production.enqueue(players, player, kind) {
        Ok(()) => {
            trace!(player, ?kind, "ai enqueued unit");
            Some(AiAction::Train { player, kind })
        }
        Err(err) => {
            trace!(player, ?kind, "ai enqueue rejected: {err}");
            None
        }
    }
}

/// Rule (b): send the idle army at a random enemy building.
fn try_attack(
    grid: &Grid,
    units: &mut UnitTable,
    player: PlayerId,
    rng: &mut ChaCha8Rng,
    config: &AiConfig,
) -> Option<AiAction> {
    let idle: Vec<UnitId> = units
        .live_units_of(player)
        .filter(|u| u.is_unassigned())
        .map(|u| u.id)
        .collect();
    if idle.len() < config.attack_threshold || !rng.random_bool(config.attack_chance) {
        return None;
    }

    let enemy: Vec<Coord> = grid
        .records()
        .iter()
        .filter(|r| r.owner != player)
        .map(|r| r.tile)
        .collect();
    let origin = *enemy.choose(rng)?;

    for id in &idle {
        if let Some(unit) = units.get_mut(*id) {
            unit.order_attack(AttackTarget::Building { origin }, origin);
        }
    }
    trace!(player, %origin, units = idle.len(), "ai mass attack");
    Some(AiAction::Attack {
        player,
        origin,
        units: idle.len(),
    })
}
