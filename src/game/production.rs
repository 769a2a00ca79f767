//! Unit production queues.
//!
//! Money is debited when an entry is enqueued, never at completion. Each
//! tick only the head of each player's queue makes progress. A finished
//! entry spawns exactly one unit beside the player's capital, cycling
//! through four cardinal slots so units do not stack on one tile.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::error::{CommandError, CommandResult};
use crate::game::{Grid, OwnershipRecord, Player, PlayerId, UnitId, UnitKind, UnitTable};

/// One pending unit in a production queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionEntry {
    /// Unit being built.
    pub kind: UnitKind,
    /// Seconds of progress so far, never above `build_time`.
    pub progress: f32,
    /// Seconds needed to finish.
    pub build_time: f32,
}

impl ProductionEntry {
    /// A fresh entry with no progress.
    #[must_use]
    pub const fn new(kind: UnitKind) -> Self {
        Self {
            kind,
            progress: 0.0,
            build_time: kind.build_time(),
        }
    }

    /// Completion fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.build_time <= 0.0 {
            1.0
        } else {
            (self.progress / self.build_time).clamp(0.0, 1.0)
        }
    }
}

/// What happened during one production step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionReport {
    /// Units spawned this tick.
    pub spawned: Vec<UnitId>,
    /// Finished entries dropped because the player had no capital.
    pub dropped: Vec<(PlayerId, UnitKind)>,
}

/// Per-player FIFO production queues.
#[derive(Debug, Clone, Default)]
pub struct ProductionScheduler {
    /// Queue per player.
    queues: BTreeMap<PlayerId, VecDeque<ProductionEntry>>,
    /// Next cardinal spawn slot per player.
    spawn_slot: BTreeMap<PlayerId, u8>,
}

impl ProductionScheduler {
    /// Create empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pay for a unit and append it to the player's queue.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownPlayer`], [`CommandError::PlayerEliminated`]
    /// or [`CommandError::InsufficientFunds`]. State is untouched on error.
    pub fn enqueue(
        &mut self,
        players: &mut [Player],
        player: PlayerId,
        kind: UnitKind,
    ) -> CommandResult {
        let Some(p) = players.iter_mut().find(|p| p.id == player) else {
            return Err(CommandError::UnknownPlayer(player));
        };
        if p.is_eliminated {
            return Err(CommandError::PlayerEliminated(player));
        }
        let cost = kind.cost();
        if !p.can_afford(cost) {
            return Err(CommandError::InsufficientFunds {
                needed: cost,
                available: p.money,
            });
        }

        p.money -= cost;
        self.queues
            .entry(player)
            .or_default()
            .push_back(ProductionEntry::new(kind));
        Ok(())
    }

    /// Entries queued for a player, head first.
    pub fn queue(&self, player: PlayerId) -> impl Iterator<Item = &ProductionEntry> {
        self.queues.get(&player).into_iter().flatten()
    }

    /// Number of entries queued for a player.
    #[must_use]
    pub fn pending(&self, player: PlayerId) -> usize {
        self.queues.get(&player).map_or(0, VecDeque::len)
    }

    /// Drop a player's whole queue. Returns how many entries were removed.
    pub fn clear_player(&mut self, player: PlayerId) -> usize {
        self.queues.remove(&player).map_or(0, |q| q.len())
    }

    /// Advance the head of every live player's queue by `dt` seconds.
    pub fn advance(
        &mut self,
        grid: &Grid,
        players: &[Player],
        units: &mut UnitTable,
        dt: f32,
    ) -> ProductionReport {
        let mut report = ProductionReport::default();

        for player in players.iter().filter(|p| p.is_alive()) {
            let Some(queue) = self.queues.get_mut(&player.id) else {
                continue;
            };
            let Some(head) = queue.front_mut() else {
                continue;
            };

            head.progress = (head.progress + dt).min(head.build_time);
            if head.progress < head.build_time {
                continue;
            }

            let Some(done) = queue.pop_front() else {
                continue;
            };
            match spawn_point(grid, player) {
                Some(capital) => {
                    let slot = self.spawn_slot.entry(player.id).or_insert(0);
                    let (x, y) = slot_position(grid, &capital, *slot);
                    *slot = (*slot + 1) % 4;

                    let id = units.spawn(done.kind, player.id, x, y);
                    debug!(player = player.id, unit = %id, kind = ?done.kind, x, y, "unit trained");
                    report.spawned.push(id);
                }
                None => {
                    let err = CommandError::NoValidSpawnLocation(player.id);
                    debug!(kind = ?done.kind, "dropping finished unit: {err}");
                    report.dropped.push((player.id, done.kind));
                }
            }
        }

        report
    }
}

/// The capital a player's units spawn at: the starting capital if still
/// held, otherwise any city hall they own.
fn spawn_point(grid: &Grid, player: &Player) -> Option<OwnershipRecord> {
    let mut capitals = grid
        .records_owned_by(player.id)
        .filter(|r| r.kind.is_capital());
    let first = capitals.next().copied();
    grid.records_owned_by(player.id)
        .find(|r| r.kind.is_capital() && r.tile == player.capital)
        .copied()
        .or(first)
}

/// Position of cardinal spawn slot `slot` around a capital, clamped to the grid.
fn slot_position(grid: &Grid, capital: &OwnershipRecord, slot: u8) -> (f32, f32) {
    let (cx, cy) = capital.center();
    let reach = f32::from(capital.kind.footprint()) / 2.0 + 0.5;
    let (dx, dy) = match slot % 4 {
        0 => (reach, 0.0),
        1 => (0.0, reach),
        2 => (-reach, 0.0),
        _ => (0.0, -reach),
    };
    let max_x = f32::from(grid.width() - 1);
    let max_y = f32::from(grid.height() - 1);
    ((cx + dx).clamp(0.0, max_x), (cy + dy).clamp(0.0, max_y))
}
