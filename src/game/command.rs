//! Input command surface.
//!
//! Commands are the only way an input layer mutates the world. Each one is
//! validated against current state first; a rejected command returns an
//! error and changes nothing.

use serde::{Deserialize, Serialize};

use crate::error::{CommandError, CommandResult};
use crate::game::{AttackTarget, Coord, PlayerId, Speed, UnitId, UnitKind, World};

/// Axis-aligned selection rectangle in continuous world space.
///
/// Corners may be given in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    /// First corner x.
    pub x0: f32,
    /// First corner y.
    pub y0: f32,
    /// Opposite corner x.
    pub x1: f32,
    /// Opposite corner y.
    pub y1: f32,
}

impl SelectionRect {
    /// Create a rectangle from two corners.
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Whether a point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (lo_x, hi_x) = (self.x0.min(self.x1), self.x0.max(self.x1));
        let (lo_y, hi_y) = (self.y0.min(self.y1), self.y0.max(self.y1));
        (lo_x..=hi_x).contains(&x) && (lo_y..=hi_y).contains(&y)
    }
}

/// An intent issued by the input layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Pay for a unit and queue it.
    EnqueueProduction {
        /// Player paying for the unit.
        player: PlayerId,
        /// Unit to build.
        kind: UnitKind,
    },
    /// Replace the selection with these units.
    SetSelection(Vec<UnitId>),
    /// Replace the selection with every own unit inside a rectangle.
    SetSelectionBox(SelectionRect),
    /// Move every selected unit to a tile.
    MoveSelected(Coord),
    /// Attack whatever hostile thing stands on a tile.
    AttackSelected(Coord),
    /// Change simulation speed.
    SetSpeed(Speed),
    /// Start a fresh game from the same seed.
    Restart,
}

impl World {
    /// Validate and apply a command.
    ///
    /// [`Command::SetSpeed`] and [`Command::Restart`] act on the session
    /// rather than the world and are accepted here as no-ops.
    ///
    /// # Errors
    ///
    /// Returns the reason the command was rejected. The world is unchanged
    /// on error.
    pub fn apply(&mut self, command: Command) -> CommandResult {
        if matches!(command, Command::SetSpeed(_) | Command::Restart) {
            return Ok(());
        }
        if self.outcome().is_some() {
            return Err(CommandError::GameOver);
        }

        match command {
            Command::EnqueueProduction { player, kind } => {
                let p = self.player(player).ok_or(CommandError::UnknownPlayer(player))?;
                if !p.is_human {
                    return Err(CommandError::NotHuman(player));
                }
                self.production.enqueue(&mut self.players, player, kind)
            }
            Command::SetSelection(ids) => {
                let human = self.human_id()?;
                self.selection = ids
                    .into_iter()
                    .filter(|id| {
                        self.units
                            .get(*id)
                            .is_some_and(|u| u.owner == human && u.is_alive())
                    })
                    .collect();
                self.selection.sort_unstable();
                self.selection.dedup();
                Ok(())
            }
            Command::SetSelectionBox(rect) => {
                let human = self.human_id()?;
                self.selection = self
                    .units
                    .live_units_of(human)
                    .filter(|u| rect.contains(u.x, u.y))
                    .map(|u| u.id)
                    .collect();
                Ok(())
            }
            Command::MoveSelected(tile) => {
                let selected = self.checked_selection(tile)?;
                for id in selected {
                    if let Some(unit) = self.units.get_mut(id) {
                        unit.order_move(tile);
                    }
                }
                Ok(())
            }
            Command::AttackSelected(tile) => {
                let selected = self.checked_selection(tile)?;
                let human = self.human_id()?;
                let (target, approach) = self.hostile_at(tile, human)?;
                for id in selected {
                    if let Some(unit) = self.units.get_mut(id) {
                        unit.order_attack(target, approach);
                    }
                }
                Ok(())
            }
            Command::SetSpeed(_) | Command::Restart => Ok(()),
        }
    }

    /// ID of the live human player.
    fn human_id(&self) -> CommandResult<PlayerId> {
        let human = self
            .players
            .iter()
            .find(|p| p.is_human)
            .ok_or(CommandError::UnknownPlayer(0))?;
        if human.is_eliminated {
            return Err(CommandError::PlayerEliminated(human.id));
        }
        Ok(human.id)
    }

    /// Live selected units, after checking the order's tile and the human.
    fn checked_selection(&self, tile: Coord) -> CommandResult<Vec<UnitId>> {
        if !self.grid.in_bounds(tile) {
            return Err(CommandError::OutOfBounds(tile));
        }
        self.human_id()?;
        let selected: Vec<UnitId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| self.units.get(*id).is_some_and(|u| u.is_alive()))
            .collect();
        if selected.is_empty() {
            return Err(CommandError::EmptySelection);
        }
        Ok(selected)
    }

    /// Hostile unit on `tile`, else hostile building covering it.
    ///
    /// Only tiles the human currently sees can be targeted.
    fn hostile_at(&self, tile: Coord, human: PlayerId) -> CommandResult<(AttackTarget, Coord)> {
        if !self.fog(human).is_some_and(|fog| fog.is_visible(tile)) {
            return Err(CommandError::NoTarget(tile));
        }
        if let Some(unit) = self.units.unit_at_tile(tile, |u| u.owner != human) {
            return Ok((AttackTarget::Unit(unit.id), tile));
        }
        match self.grid.record_at(tile) {
            Some(record) if record.owner != human => Ok((
                AttackTarget::Building {
                    origin: record.tile,
                },
                record.tile,
            )),
            _ => Err(CommandError::NoTarget(tile)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::game::{BuildingKind, Grid, Player, UnitState, Visibility};

    fn world() -> World {
        let mut grid = Grid::new(20, 20).unwrap();
        grid.place(Coord::new(2, 2), BuildingKind::CityHall, 1, 2).unwrap();
        grid.place(Coord::new(15, 15), BuildingKind::CityHall, 2, 2).unwrap();
        grid.place(Coord::new(12, 12), BuildingKind::Commercial, 2, 1).unwrap();
        let players = vec![
            Player::new(1, Coord::new(2, 2), 100, true),
            Player::new(2, Coord::new(15, 15), 100, false),
        ];
        World::new(grid, players, SimConfig::default(), 7)
    }

    #[test]
    fn test_enqueue_checks_identity_and_funds() {
        let mut world = world();
        assert_eq!(
            world.apply(Command::EnqueueProduction {
                player: 2,
                kind: UnitKind::Infantry
            }),
            Err(CommandError::NotHuman(2))
        );
        assert_eq!(
            world.apply(Command::EnqueueProduction {
                player: 1,
                kind: UnitKind::Tank
            }),
            Err(CommandError::InsufficientFunds {
                needed: 150,
                available: 100
            })
        );
        world
            .apply(Command::EnqueueProduction {
                player: 1,
                kind: UnitKind::Infantry,
            })
            .unwrap();
        assert_eq!(world.player(1).unwrap().money, 50);
        assert_eq!(world.production().pending(1), 1);
    }

    #[test]
    fn test_selection_keeps_only_own_live_units() {
        let mut world = world();
        let mine = world.units_mut().spawn(UnitKind::Infantry, 1, 4.0, 4.0);
        let theirs = world.units_mut().spawn(UnitKind::Infantry, 2, 5.0, 5.0);
        let dead = world.units_mut().spawn(UnitKind::Infantry, 1, 6.0, 6.0);
        world.units_mut().get_mut(dead).unwrap().kill(0, 1.0);

        world
            .apply(Command::SetSelection(vec![theirs, mine, dead, UnitId(99), mine]))
            .unwrap();
        assert_eq!(world.selection(), &[mine]);

        world
            .apply(Command::SetSelectionBox(SelectionRect::new(10.0, 10.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(world.selection(), &[mine]);
    }

    #[test]
    fn test_move_requires_selection_and_bounds() {
        let mut world = world();
        assert_eq!(
            world.apply(Command::MoveSelected(Coord::new(5, 5))),
            Err(CommandError::EmptySelection)
        );
        let id = world.units_mut().spawn(UnitKind::Infantry, 1, 4.0, 4.0);
        world.apply(Command::SetSelection(vec![id])).unwrap();
        assert_eq!(
            world.apply(Command::MoveSelected(Coord::new(50, 5))),
            Err(CommandError::OutOfBounds(Coord::new(50, 5)))
        );
        world.apply(Command::MoveSelected(Coord::new(8, 4))).unwrap();
        let unit = world.units().get(id).unwrap();
        assert_eq!(unit.target, Some(Coord::new(8, 4)));
        assert_eq!(unit.state, UnitState::Moving);
    }

    #[test]
    fn test_attack_prefers_units_then_buildings() {
        let mut world = world();
        let id = world.units_mut().spawn(UnitKind::Tank, 1, 12.0, 13.0);
        let enemy = world.units_mut().spawn(UnitKind::Infantry, 2, 10.0, 12.0);
        // Fog only sees units spawned after the last tick once it runs again.
        world.advance(0.0);
        world.apply(Command::SetSelection(vec![id])).unwrap();

        world.apply(Command::AttackSelected(Coord::new(10, 12))).unwrap();
        assert_eq!(
            world.units().get(id).unwrap().attack_target,
            Some(AttackTarget::Unit(enemy))
        );

        // Footprint tile of the enemy capital resolves to its origin.
        world.apply(Command::AttackSelected(Coord::new(16, 16))).unwrap();
        let unit = world.units().get(id).unwrap();
        assert_eq!(
            unit.attack_target,
            Some(AttackTarget::Building {
                origin: Coord::new(15, 15)
            })
        );
        assert_eq!(unit.target, Some(Coord::new(15, 15)));

        assert_eq!(
            world.apply(Command::AttackSelected(Coord::new(2, 2))),
            Err(CommandError::NoTarget(Coord::new(2, 2)))
        );
        assert_eq!(
            world.apply(Command::AttackSelected(Coord::new(12, 9))),
            Err(CommandError::NoTarget(Coord::new(12, 9)))
        );
    }

    #[test]
    fn test_attack_needs_a_visible_target() {
        let mut grid = Grid::new(40, 40).unwrap();
        grid.place(Coord::new(2, 2), BuildingKind::CityHall, 1, 2).unwrap();
        grid.place(Coord::new(35, 35), BuildingKind::CityHall, 2, 2).unwrap();
        let players = vec![
            Player::new(1, Coord::new(2, 2), 0, true),
            Player::new(2, Coord::new(35, 35), 0, false),
        ];
        let mut world = World::new(grid, players, SimConfig::default(), 11);
        let id = world.units_mut().spawn(UnitKind::Infantry, 1, 5.0, 5.0);
        let lurker = world.units_mut().spawn(UnitKind::Infantry, 2, 20.0, 20.0);
        world.advance(0.0);
        world.apply(Command::SetSelection(vec![id])).unwrap();

        let capital = Coord::new(35, 35);
        assert_eq!(
            world.fog(1).unwrap().visibility(capital),
            Visibility::Unexplored
        );
        assert_eq!(
            world.apply(Command::AttackSelected(capital)),
            Err(CommandError::NoTarget(capital))
        );
        assert_eq!(
            world.apply(Command::AttackSelected(Coord::new(20, 20))),
            Err(CommandError::NoTarget(Coord::new(20, 20)))
        );
        let unit = world.units().get(id).unwrap();
        assert_eq!(unit.attack_target, None);
        assert_eq!(unit.state, UnitState::Idle);

        // Once scouted, the same orders go through.
        let scout = world.units_mut().get_mut(id).unwrap();
        scout.x = 21.0;
        scout.y = 21.0;
        world.advance(0.0);
        world.apply(Command::AttackSelected(Coord::new(20, 20))).unwrap();
        assert_eq!(
            world.units().get(id).unwrap().attack_target,
            Some(AttackTarget::Unit(lurker))
        );
        let scout = world.units_mut().get_mut(id).unwrap();
        scout.x = 33.0;
        scout.y = 33.0;
        world.advance(0.0);
        world.apply(Command::AttackSelected(capital)).unwrap();
        assert_eq!(
            world.units().get(id).unwrap().attack_target,
            Some(AttackTarget::Building { origin: capital })
        );
    }
}
