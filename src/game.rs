//! Tick simulation for a real-time strategy skirmish.
//!
//! Implements the game rules:
//! - Tile grid with building ownership records
//! - Per-player fog of war
//! - Military units (movement, combat, death)
//! - Production queues and economy accrual
//! - Scripted AI opponents
//! - Elimination, scoring and victory

mod ai;
mod clock;
mod combat;
mod command;
mod economy;
mod fog;
mod invariants;
mod map;
mod player;
mod production;
mod state;
mod unit;
mod victory;

pub use ai::{AiAction, AiController};
pub use clock::{Speed, TickScheduler};
pub use combat::{ARRIVAL_EPSILON, CombatReport, Kill, update_units};
pub use command::{Command, SelectionRect};
pub use economy::{accrue, building_income, is_accrual_tick, projected_income};
pub use fog::{FogOfWar, Visibility};
pub use invariants::{InvariantViolation, check_invariants};
pub use map::{
    BuildingKind, Coord, Grid, MAX_FOOTPRINT, OwnershipRecord, Structure, Terrain, Tile,
};
pub use player::{Player, PlayerId};
pub use production::{ProductionEntry, ProductionReport, ProductionScheduler};
pub use state::{MAX_PLAYERS, TickReport, World};
pub use unit::{
    AttackTarget, Facing, MilitaryUnit, UnitId, UnitKind, UnitState, UnitStats, UnitTable,
};
pub use victory::{Outcome, VictoryReport, evaluate, score, update_scores};
