//! Per-player fog of war.
//!
//! Visibility is recomputed from scratch every tick: everything currently
//! visible fades to explored, then every owned building and live unit
//! reveals a disk around itself. A tile that has been seen once never
//! returns to unexplored.

use crate::game::{Coord, Grid, PlayerId, UnitTable};

/// Visibility state of a tile for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Never seen.
    #[default]
    Unexplored,
    /// Seen before, not currently in sight.
    Explored,
    /// In sight this tick.
    Visible,
}

/// Fog-of-war grid for a single player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FogOfWar {
    /// Player this fog belongs to.
    player: PlayerId,
    /// Width in tiles.
    width: u16,
    /// Height in tiles.
    height: u16,
    /// Row-major visibility states.
    visibility: Vec<Visibility>,
    /// Row-major tick on which each tile was last visible.
    last_seen: Vec<u64>,
}

impl FogOfWar {
    /// Create a fully unexplored fog grid.
    #[must_use]
    pub fn new(player: PlayerId, width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            player,
            width,
            height,
            visibility: vec![Visibility::Unexplored; size],
            last_seen: vec![0; size],
        }
    }

    /// Player this fog belongs to.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        (coord.x < self.width && coord.y < self.height)
            .then(|| usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
    }

    /// Visibility of a tile. Out-of-bounds tiles are unexplored.
    #[must_use]
    pub fn visibility(&self, coord: Coord) -> Visibility {
        self.index(coord)
            .map_or(Visibility::Unexplored, |idx| self.visibility[idx])
    }

    /// Whether the tile is visible this tick.
    #[must_use]
    pub fn is_visible(&self, coord: Coord) -> bool {
        self.visibility(coord) == Visibility::Visible
    }

    /// Tick on which the tile was last visible, if ever.
    #[must_use]
    pub fn last_seen(&self, coord: Coord) -> Option<u64> {
        let idx = self.index(coord)?;
        (self.visibility[idx] != Visibility::Unexplored).then_some(self.last_seen[idx])
    }

    /// Number of tiles seen at least once.
    #[must_use]
    pub fn explored_count(&self) -> usize {
        self.visibility
            .iter()
            .filter(|v| **v != Visibility::Unexplored)
            .count()
    }

    /// Row-major visibility states, for renderers.
    #[must_use]
    pub fn cells(&self) -> &[Visibility] {
        &self.visibility
    }

    /// Demote every visible tile to explored.
    fn fade(&mut self) {
        for v in &mut self.visibility {
            if *v == Visibility::Visible {
                *v = Visibility::Explored;
            }
        }
    }

    /// Reveal every tile within Euclidean distance `range` of `center`.
    pub fn reveal(&mut self, center: Coord, range: u16, tick: u64) {
        // Squares of a full u16 range overflow i32.
        let r = i64::from(range);
        let r_sq = r * r;
        let cx = i64::from(center.x);
        let cy = i64::from(center.y);

        let y_lo = (cy - r).max(0);
        let y_hi = (cy + r).min(i64::from(self.height) - 1);
        let x_lo = (cx - r).max(0);
        let x_hi = (cx + r).min(i64::from(self.width) - 1);

        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy > r_sq {
                    continue;
                }
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let idx = y as usize * usize::from(self.width) + x as usize;
                self.visibility[idx] = Visibility::Visible;
                self.last_seen[idx] = tick;
            }
        }
    }

    /// Recompute visibility for this tick.
    ///
    /// Buildings reveal `building_range` around every footprint cell; live
    /// units reveal their kind's vision range around their rounded tile.
    pub fn update(&mut self, grid: &Grid, units: &UnitTable, building_range: u16, tick: u64) {
        self.fade();

        let owned: Vec<_> = grid.records_owned_by(self.player).copied().collect();
        for record in owned {
            let size = record.kind.footprint();
            for dy in 0..size {
                for dx in 0..size {
                    let cell = Coord::new(record.tile.x + dx, record.tile.y + dy);
                    self.reveal(cell, building_range, tick);
                }
            }
        }

        for unit in units.live_units_of(self.player) {
            let tile = grid.tile_at(unit.x, unit.y);
            self.reveal(tile, unit.kind.vision_range(), tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{BuildingKind, UnitKind};

    #[test]
    fn test_new_fog_is_unexplored() {
        let fog = FogOfWar::new(1, 10, 10);
        assert_eq!(fog.visibility(Coord::new(3, 3)), Visibility::Unexplored);
        assert_eq!(fog.explored_count(), 0);
        assert_eq!(fog.last_seen(Coord::new(3, 3)), None);
    }

    #[test]
    fn test_reveal_is_a_clipped_disk() {
        let mut fog = FogOfWar::new(1, 10, 10);
        fog.reveal(Coord::new(0, 0), 2, 7);

        assert!(fog.is_visible(Coord::new(0, 0)));
        assert!(fog.is_visible(Coord::new(2, 0)));
        assert!(fog.is_visible(Coord::new(1, 1)));
        // (2, 2) is sqrt(8) > 2 away.
        assert!(!fog.is_visible(Coord::new(2, 2)));
        assert_eq!(fog.last_seen(Coord::new(1, 1)), Some(7));
        // Quarter disk of radius 2: 6 tiles.
        assert_eq!(fog.explored_count(), 6);
    }

    #[test]
    fn test_reveal_with_maximum_range_covers_grid() {
        let mut fog = FogOfWar::new(1, 12, 8);
        fog.reveal(Coord::new(11, 7), u16::MAX, 3);
        assert_eq!(fog.explored_count(), 12 * 8);
        assert!(fog.is_visible(Coord::new(0, 0)));
    }

    #[test]
    fn test_update_fades_and_never_unexplores() {
        let mut grid = Grid::new(20, 20).unwrap();
        grid.place(Coord::new(2, 2), BuildingKind::Residential, 1, 1).unwrap();
        let mut units = UnitTable::new();
        let scout = units.spawn(UnitKind::Infantry, 1, 15.0, 15.0);

        let mut fog = FogOfWar::new(1, 20, 20);
        fog.update(&grid, &units, 3, 1);
        assert!(fog.is_visible(Coord::new(15, 15)));
        assert!(fog.is_visible(Coord::new(2, 4)));

        // Scout walks away; its old area becomes explored, not unexplored.
        let unit = units.get_mut(scout).unwrap();
        unit.x = 10.0;
        unit.y = 15.0;
        fog.update(&grid, &units, 3, 2);
        assert_eq!(fog.visibility(Coord::new(18, 15)), Visibility::Explored);
        assert_eq!(fog.last_seen(Coord::new(18, 15)), Some(1));
        assert!(fog.is_visible(Coord::new(10, 15)));
        assert!(fog.is_visible(Coord::new(2, 2)));
    }

    #[test]
    fn test_update_ignores_other_players_and_dead_units() {
        let mut grid = Grid::new(20, 20).unwrap();
        grid.place(Coord::new(2, 2), BuildingKind::Residential, 2, 1).unwrap();
        let mut units = UnitTable::new();
        let dead = units.spawn(UnitKind::Tank, 1, 10.0, 10.0);
        units.get_mut(dead).unwrap().kill(0, 1.0);
        units.spawn(UnitKind::Tank, 2, 15.0, 15.0);

        let mut fog = FogOfWar::new(1, 20, 20);
        fog.update(&grid, &units, 3, 1);
        assert_eq!(fog.explored_count(), 0);
    }

    #[test]
    fn test_capital_reveals_whole_footprint() {
        let mut grid = Grid::new(20, 20).unwrap();
        grid.place(Coord::new(5, 5), BuildingKind::CityHall, 1, 2).unwrap();
        let mut fog = FogOfWar::new(1, 20, 20);
        fog.update(&grid, &UnitTable::new(), 1, 1);

        // (7, 6) is adjacent to footprint cell (6, 6) but 2 tiles from the origin.
        assert!(fog.is_visible(Coord::new(7, 6)));
        assert!(!fog.is_visible(Coord::new(3, 3)));
    }
}
