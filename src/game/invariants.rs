//! Game invariants - sanity checks that detect bugs.
//!
//! These should never trigger in a correctly implemented game. If they do,
//! some stage has broken the bookkeeping between the grid, the ownership
//! records, the unit table and the player list.

use std::collections::BTreeSet;

use crate::game::{UnitState, World};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

fn violation(message: String) -> InvariantViolation {
    InvariantViolation { message }
}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
/// Intended to run between ticks.
#[must_use]
pub fn check_invariants(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let grid = world.grid();

    // At most one record per origin, and each origin carries a building.
    let mut origins = BTreeSet::new();
    for record in grid.records() {
        if !origins.insert(record.tile) {
            violations.push(violation(format!(
                "Duplicate ownership record at {}",
                record.tile
            )));
        }
        if grid.building_at(record.tile) != Some(record.kind) {
            violations.push(violation(format!(
                "Record at {} has no matching building on the grid",
                record.tile
            )));
        }
        if !(0..=record.max_health).contains(&record.health) {
            violations.push(violation(format!(
                "Building at {} has health {} outside [0, {}]",
                record.tile, record.health, record.max_health
            )));
        }
    }

    for unit in world.units().iter() {
        if !(0..=unit.max_health).contains(&unit.health) {
            violations.push(violation(format!(
                "Unit {} has health {} outside [0, {}]",
                unit.id, unit.health, unit.max_health
            )));
        }
        if unit.health == 0 && unit.is_alive() {
            violations.push(violation(format!("Unit {} has no health but is alive", unit.id)));
        }
        if unit.state == UnitState::Attacking && unit.attack_target.is_none() {
            violations.push(violation(format!(
                "Unit {} is attacking without a target",
                unit.id
            )));
        }
    }

    for player in world.players() {
        for entry in world.production().queue(player.id) {
            if entry.progress > entry.build_time {
                violations.push(violation(format!(
                    "Player {} has production progress {} past build time {}",
                    player.id, entry.progress, entry.build_time
                )));
            }
        }

        if !player.is_eliminated {
            continue;
        }
        let buildings = grid.records_owned_by(player.id).count();
        if buildings > 0 {
            violations.push(violation(format!(
                "Eliminated player {} still owns {buildings} buildings",
                player.id
            )));
        }
        let units = world.units().live_count(player.id);
        if units > 0 {
            violations.push(violation(format!(
                "Eliminated player {} still has {units} live units",
                player.id
            )));
        }
        if world.production().pending(player.id) > 0 {
            violations.push(violation(format!(
                "Eliminated player {} still has queued production",
                player.id
            )));
        }
    }

    violations
}
