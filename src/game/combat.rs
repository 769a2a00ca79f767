//! Unit movement and combat.
//!
//! Runs once per tick over every unit in ID order:
//!
//! 1. Units whose grace window has elapsed are purged.
//! 2. A live unit with `health <= 0` dies before anything else happens.
//! 3. Cooldown and flash timers count down.
//! 4. The attack intent is resolved by lookup. Missing, friendly or long
//!    dead targets clear the intent. In range and off cooldown, the unit
//!    hits; out of range, it re-targets the victim's current tile.
//! 5. Units with a movement target advance in a straight line.
//!
//! Damage is applied immediately, so later units in the same tick see the
//! effect of earlier ones. A victim killed earlier this tick still accepts
//! hits from units processed after its killer, and each such hit counts as
//! another kill. The over-count only affects kill/loss tallies.

use tracing::{debug, info};

use crate::config::SimConfig;
use crate::game::{
    AttackTarget, Coord, Facing, Grid, MilitaryUnit, OwnershipRecord, Player, PlayerId, UnitId,
    UnitState, UnitTable,
};

/// Distance below which a moving unit snaps onto its target tile.
pub const ARRIVAL_EPSILON: f32 = 0.05;

/// A unit killed by another unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kill {
    /// Unit that landed the killing hit.
    pub attacker: UnitId,
    /// Unit that died.
    pub victim: UnitId,
    /// Owner of the attacker.
    pub killer_owner: PlayerId,
    /// Owner of the victim.
    pub victim_owner: PlayerId,
}

/// What happened during one unit step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatReport {
    /// Unit kills in the order they happened.
    pub kills: Vec<Kill>,
    /// Buildings destroyed, with the destroying player.
    pub destroyed: Vec<(PlayerId, OwnershipRecord)>,
    /// Dead units purged this tick.
    pub purged: usize,
}

/// Resolved location of an attack target for this tick.
struct TargetFix {
    /// Point distances are measured to.
    point: (f32, f32),
    /// Tile to walk towards when out of range.
    approach: Coord,
}

/// Run movement and combat for every unit.
pub fn update_units(
    units: &mut UnitTable,
    grid: &mut Grid,
    players: &mut [Player],
    dt: f32,
    tick: u64,
    config: &SimConfig,
) -> CombatReport {
    let mut report = CombatReport {
        purged: units.purge_expired(dt),
        ..CombatReport::default()
    };

    for id in units.ids() {
        let Some(mut unit) = units.get(id).copied() else {
            continue;
        };
        if !unit.is_alive() {
            continue;
        }
        if unit.health <= 0 {
            unit.kill(tick, config.death_grace_secs);
            store(units, unit);
            continue;
        }

        unit.attack_cooldown = (unit.attack_cooldown - dt).max(0.0);
        unit.flash = (unit.flash - dt).max(0.0);

        if let Some(target) = unit.attack_target {
            match resolve_target(units, grid, &unit, target, tick) {
                None => {
                    unit.attack_target = None;
                    unit.target = None;
                    unit.state = UnitState::Idle;
                }
                Some(fix) if unit.distance_to(fix.point) <= unit.attack_range => {
                    unit.target = None;
                    unit.state = UnitState::Attacking;
                    if unit.attack_cooldown <= 0.0 {
                        strike(&mut unit, target, units, grid, players, tick, config, &mut report);
                    }
                }
                Some(fix) => {
                    unit.target = Some(fix.approach);
                    unit.state = UnitState::Moving;
                }
            }
        }

        step_movement(&mut unit, grid, dt);
        store(units, unit);
    }

    report
}

/// Write a working copy back into the table.
fn store(units: &mut UnitTable, unit: MilitaryUnit) {
    if let Some(slot) = units.get_mut(unit.id) {
        *slot = unit;
    }
}

/// Look up an attack target, returning `None` if it is no longer valid.
fn resolve_target(
    units: &UnitTable,
    grid: &Grid,
    attacker: &MilitaryUnit,
    target: AttackTarget,
    tick: u64,
) -> Option<TargetFix> {
    match target {
        AttackTarget::Unit(victim_id) => {
            let victim = units.get(victim_id)?;
            if victim.owner == attacker.owner {
                return None;
            }
            // Victims killed earlier this tick are still resolvable.
            if let UnitState::Dead { tick: died, .. } = victim.state {
                if died != tick {
                    return None;
                }
            }
            Some(TargetFix {
                point: (victim.x, victim.y),
                approach: grid.tile_at(victim.x, victim.y),
            })
        }
        AttackTarget::Building { origin } => {
            let record = grid.record_at(origin)?;
            if record.tile != origin || record.owner == attacker.owner {
                return None;
            }
            Some(TargetFix {
                point: record.center(),
                approach: origin,
            })
        }
    }
}

/// Land one hit on the attacker's target.
#[allow(clippy::too_many_arguments)]
fn strike(
    attacker: &mut MilitaryUnit,
    target: AttackTarget,
    units: &mut UnitTable,
    grid: &mut Grid,
    players: &mut [Player],
    tick: u64,
    config: &SimConfig,
    report: &mut CombatReport,
) {
    attacker.attack_cooldown = attacker.kind.stats().attack_cooldown;

    match target {
        AttackTarget::Unit(victim_id) => {
            let Some(victim) = units.get_mut(victim_id) else {
                return;
            };
            victim.health -= attacker.attack_power;
            victim.flash = config.flash_secs;
            if victim.health > 0 {
                return;
            }

            if victim.is_alive() {
                victim.kill(tick, config.death_grace_secs);
            } else {
                victim.health = 0;
            }
            let victim_owner = victim.owner;
            debug!(attacker = %attacker.id, victim = %victim_id, "unit killed");

            bump(players, attacker.owner, |p| p.units_killed += 1);
            bump(players, victim_owner, |p| p.units_lost += 1);
            report.kills.push(Kill {
                attacker: attacker.id,
                victim: victim_id,
                killer_owner: attacker.owner,
                victim_owner,
            });
            attacker.attack_target = None;
            attacker.state = UnitState::Idle;
        }
        AttackTarget::Building { origin } => {
            let Some(remaining) = grid.damage(origin, attacker.attack_power) else {
                return;
            };
            grid.ignite(origin, config.fire_per_hit);
            if remaining > 0 {
                return;
            }

            if let Some(record) = grid.destroy(origin) {
                info!(
                    attacker = attacker.owner,
                    victim = record.owner,
                    kind = ?record.kind,
                    tile = %record.tile,
                    "building destroyed"
                );
                bump(players, attacker.owner, |p| p.buildings_destroyed += 1);
                report.destroyed.push((attacker.owner, record));
            }
            attacker.attack_target = None;
            attacker.state = UnitState::Idle;
        }
    }
}

/// Apply `f` to the player with the given ID, if present.
fn bump(players: &mut [Player], id: PlayerId, f: impl FnOnce(&mut Player)) {
    if let Some(player) = players.iter_mut().find(|p| p.id == id) {
        f(player);
    }
}

/// Advance a unit towards its movement target.
fn step_movement(unit: &mut MilitaryUnit, grid: &Grid, dt: f32) {
    let Some(target) = unit.target else {
        return;
    };
    let (tx, ty) = target.to_point();
    let (dx, dy) = (tx - unit.x, ty - unit.y);
    let distance = dx.hypot(dy);
    let step = unit.kind.stats().speed * dt;

    if distance > ARRIVAL_EPSILON {
        unit.facing = Facing::from_vector(dx, dy);
    }
    if distance <= ARRIVAL_EPSILON || step >= distance {
        unit.x = tx;
        unit.y = ty;
        unit.target = None;
        unit.state = if unit.attack_target.is_some() {
            UnitState::Attacking
        } else {
            UnitState::Idle
        };
        return;
    }

    unit.x += dx / distance * step;
    unit.y += dy / distance * step;
    let max_x = f32::from(grid.width() - 1);
    let max_y = f32::from(grid.height() - 1);
    unit.x = unit.x.clamp(0.0, max_x);
    unit.y = unit.y.clamp(0.0, max_y);
    unit.state = UnitState::Moving;
}
