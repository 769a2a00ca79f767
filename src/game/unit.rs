//! Military units and the unit table.
//!
//! Units live in a [`UnitTable`] keyed by stable [`UnitId`]s. Anything that
//! refers to another unit (attack intents, selections) holds an ID and
//! resolves it through the table every tick, tolerating its absence.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{Coord, PlayerId};

/// Stable identifier of a unit. Never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Trainable unit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Cheap, short-ranged foot soldiers.
    Infantry,
    /// Slow, armoured, hits hard.
    Tank,
    /// Fast with long sight and range.
    Helicopter,
}

/// Static stats for a unit type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitStats {
    /// Money debited on enqueue.
    pub cost: i64,
    /// Seconds of production at the head of the queue.
    pub build_time: f32,
    /// Starting and maximum hit points.
    pub health: i32,
    /// Damage per hit.
    pub attack_power: i32,
    /// Maximum hit distance in tiles.
    pub attack_range: f32,
    /// Seconds between hits.
    pub attack_cooldown: f32,
    /// Tiles per second.
    pub speed: f32,
    /// Fog reveal radius in tiles.
    pub vision: u16,
}

impl UnitKind {
    /// All unit kinds, cheapest first.
    pub const ALL: [UnitKind; 3] = [UnitKind::Infantry, UnitKind::Tank, UnitKind::Helicopter];

    /// Stats table.
    #[must_use]
    pub const fn stats(self) -> UnitStats {
        match self {
            UnitKind::Infantry => UnitStats {
                cost: 50,
                build_time: 3.0,
                health: 100,
                attack_power: 10,
                attack_range: 1.5,
                attack_cooldown: 1.0,
                speed: 1.5,
                vision: 4,
            },
            UnitKind::Tank => UnitStats {
                cost: 150,
                build_time: 6.0,
                health: 250,
                attack_power: 30,
                attack_range: 2.5,
                attack_cooldown: 1.5,
                speed: 1.0,
                vision: 5,
            },
            UnitKind::Helicopter => UnitStats {
                cost: 200,
                build_time: 8.0,
                health: 150,
                attack_power: 20,
                attack_range: 3.0,
                attack_cooldown: 0.8,
                speed: 2.5,
                vision: 7,
            },
        }
    }

    /// Cost in money.
    #[must_use]
    pub const fn cost(self) -> i64 {
        self.stats().cost
    }

    /// Build time in seconds.
    #[must_use]
    pub const fn build_time(self) -> f32 {
        self.stats().build_time
    }

    /// Fog reveal radius in tiles.
    #[must_use]
    pub const fn vision_range(self) -> u16 {
        self.stats().vision
    }
}

/// Four-way facing, taken from the dominant axis of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// Towards decreasing y.
    North,
    /// Towards increasing y.
    #[default]
    South,
    /// Towards increasing x.
    East,
    /// Towards decreasing x.
    West,
}

impl Facing {
    /// Facing for a movement vector.
    #[must_use]
    pub fn from_vector(dx: f32, dy: f32) -> Self {
        if dx.abs() >= dy.abs() {
            if dx >= 0.0 { Facing::East } else { Facing::West }
        } else if dy >= 0.0 {
            Facing::South
        } else {
            Facing::North
        }
    }
}

/// What a unit intends to attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackTarget {
    /// Another unit, looked up by ID each tick.
    Unit(UnitId),
    /// A building, looked up by its origin tile each tick.
    Building {
        /// Origin tile of the building.
        origin: Coord,
    },
}

/// Unit state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitState {
    /// Standing still with no orders.
    Idle,
    /// Travelling towards `target`.
    Moving,
    /// Engaging `attack_target`.
    Attacking,
    /// Terminal. Kept for `remaining` seconds for death animations.
    Dead {
        /// Tick on which the unit died.
        tick: u64,
        /// Seconds left before the unit is purged.
        remaining: f32,
    },
}

impl UnitState {
    /// Whether this is the terminal state.
    #[must_use]
    pub const fn is_dead(self) -> bool {
        matches!(self, UnitState::Dead { .. })
    }
}

/// A single military unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MilitaryUnit {
    /// Stable identifier.
    pub id: UnitId,
    /// Unit type.
    pub kind: UnitKind,
    /// Owning player.
    pub owner: PlayerId,
    /// Continuous x position in tile units.
    pub x: f32,
    /// Continuous y position in tile units.
    pub y: f32,
    /// Tile the unit is moving towards.
    pub target: Option<Coord>,
    /// Current hit points. Never negative once a tick has finished.
    pub health: i32,
    /// Maximum hit points.
    pub max_health: i32,
    /// Damage per hit.
    pub attack_power: i32,
    /// Maximum hit distance.
    pub attack_range: f32,
    /// Seconds until the next hit is allowed.
    pub attack_cooldown: f32,
    /// What the unit intends to attack.
    pub attack_target: Option<AttackTarget>,
    /// State machine position.
    pub state: UnitState,
    /// Current facing.
    pub facing: Facing,
    /// Seconds left on the hit flash (cosmetic).
    pub flash: f32,
}

impl MilitaryUnit {
    /// Create an idle unit at full health.
    #[must_use]
    pub fn new(id: UnitId, kind: UnitKind, owner: PlayerId, x: f32, y: f32) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            owner,
            x,
            y,
            target: None,
            health: stats.health,
            max_health: stats.health,
            attack_power: stats.attack_power,
            attack_range: stats.attack_range,
            attack_cooldown: 0.0,
            attack_target: None,
            state: UnitState::Idle,
            facing: Facing::default(),
            flash: 0.0,
        }
    }

    /// Whether the unit is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.state.is_dead()
    }

    /// Whether the unit is idle with no movement or attack orders.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        matches!(self.state, UnitState::Idle) && self.target.is_none() && self.attack_target.is_none()
    }

    /// Position rounded to the nearest tile (unclamped).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tile(&self) -> Coord {
        Coord::new(self.x.round().max(0.0) as u16, self.y.round().max(0.0) as u16)
    }

    /// Distance to a point.
    #[must_use]
    pub fn distance_to(&self, (x, y): (f32, f32)) -> f32 {
        (x - self.x).hypot(y - self.y)
    }

    /// Health suitable for display, never below zero.
    #[must_use]
    pub fn display_health(&self) -> i32 {
        self.health.max(0)
    }

    /// Enter the terminal state.
    pub fn kill(&mut self, tick: u64, grace: f32) {
        self.health = self.health.max(0);
        self.target = None;
        self.attack_target = None;
        self.state = UnitState::Dead {
            tick,
            remaining: grace,
        };
    }

    /// Give the unit an attack order.
    pub fn order_attack(&mut self, target: AttackTarget, approach: Coord) {
        self.attack_target = Some(target);
        self.target = Some(approach);
        self.state = UnitState::Moving;
    }

    /// Give the unit a plain move order, dropping any attack intent.
    pub fn order_move(&mut self, destination: Coord) {
        self.attack_target = None;
        self.target = Some(destination);
        self.state = UnitState::Moving;
    }
}

/// Arena of all units across all players.
///
/// Iteration is ordered by ID, which keeps every stage that walks the table
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    /// Units by ID.
    units: BTreeMap<UnitId, MilitaryUnit>,
    /// Next ID to hand out.
    next_id: u32,
}

impl UnitTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a new idle unit and return its ID.
    pub fn spawn(&mut self, kind: UnitKind, owner: PlayerId, x: f32, y: f32) -> UnitId {
        self.next_id += 1;
        let id = UnitId(self.next_id);
        self.units.insert(id, MilitaryUnit::new(id, kind, owner, x, y));
        id
    }

    /// Look up a unit.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&MilitaryUnit> {
        self.units.get(&id)
    }

    /// Look up a unit mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut MilitaryUnit> {
        self.units.get_mut(&id)
    }

    /// Number of units, including dead ones awaiting purge.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// All unit IDs in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    /// Iterate over every unit, dead or alive.
    pub fn iter(&self) -> impl Iterator<Item = &MilitaryUnit> {
        self.units.values()
    }

    /// Iterate mutably over every unit.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MilitaryUnit> {
        self.units.values_mut()
    }

    /// Live units owned by a player.
    pub fn live_units_of(&self, owner: PlayerId) -> impl Iterator<Item = &MilitaryUnit> {
        self.units
            .values()
            .filter(move |u| u.owner == owner && u.is_alive())
    }

    /// Number of live units owned by a player.
    #[must_use]
    pub fn live_count(&self, owner: PlayerId) -> usize {
        self.live_units_of(owner).count()
    }

    /// First live unit standing on `tile` that `filter` accepts.
    #[must_use]
    pub fn unit_at_tile(
        &self,
        tile: Coord,
        filter: impl Fn(&MilitaryUnit) -> bool,
    ) -> Option<&MilitaryUnit> {
        self.units
            .values()
            .find(|u| u.is_alive() && u.tile() == tile && filter(u))
    }

    /// Kill every live unit owned by `owner`. Returns how many died.
    pub fn kill_all_of(&mut self, owner: PlayerId, tick: u64, grace: f32) -> usize {
        let mut killed = 0;
        for unit in self.units.values_mut() {
            if unit.owner == owner && unit.is_alive() {
                unit.kill(tick, grace);
                killed += 1;
            }
        }
        killed
    }

    /// Count down death timers and drop units whose grace window elapsed.
    ///
    /// Returns the number of purged units.
    pub fn purge_expired(&mut self, dt: f32) -> usize {
        for unit in self.units.values_mut() {
            if let UnitState::Dead { remaining, .. } = &mut unit.state {
                *remaining -= dt;
            }
        }
        let before = self.units.len();
        self.units.retain(|_, u| match u.state {
            UnitState::Dead { remaining, .. } => remaining > 0.0,
            _ => true,
        });
        before - self.units.len()
    }
}
