//! Tile grid and building ownership store.
//!
//! The grid holds terrain and structures. Buildings larger than one tile
//! keep their data on the origin (top-left) cell and mark the remaining
//! footprint cells with a pointer back to the origin, so both ownership
//! lookups and rendering can resolve any footprint tile.
//!
//! Ownership lives in a flat list of [`OwnershipRecord`]s, one per building
//! origin. Combat damages records through [`Grid::damage`] and removes them
//! with [`Grid::destroy`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CommandError, CommandResult};
use crate::game::PlayerId;

/// Largest footprint side length a building may have.
pub const MAX_FOOTPRINT: u16 = 4;

/// A coordinate on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// This tile as a point in continuous world space.
    ///
    /// Unit positions use the same space: integer values sit on tiles.
    #[must_use]
    pub fn to_point(self) -> (f32, f32) {
        (f32::from(self.x), f32::from(self.y))
    }

    /// Euclidean distance between two tiles.
    #[must_use]
    pub fn distance(self, other: Coord) -> f32 {
        let dx = f32::from(self.x) - f32::from(other.x);
        let dy = f32::from(self.y) - f32::from(other.y);
        dx.hypot(dy)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Base terrain under a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    /// Open ground, buildable.
    Grass,
    /// Water, never buildable. Units still fly or wade over it.
    Water,
}

/// Kind of player-owned building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    /// The capital. Losing every city hall eliminates the player.
    CityHall,
    /// Housing. Adds population, small flat income.
    Residential,
    /// Shops. Medium income.
    Commercial,
    /// Factories. Highest income.
    Industrial,
}

impl BuildingKind {
    /// All building kinds in a stable order.
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::CityHall,
        BuildingKind::Residential,
        BuildingKind::Commercial,
        BuildingKind::Industrial,
    ];

    /// Side length of the square footprint in tiles.
    #[must_use]
    pub const fn footprint(self) -> u16 {
        match self {
            BuildingKind::CityHall => 2,
            _ => 1,
        }
    }

    /// Hit points of a freshly placed building.
    #[must_use]
    pub const fn max_health(self) -> i32 {
        match self {
            BuildingKind::CityHall => 1000,
            BuildingKind::Industrial => 400,
            BuildingKind::Commercial => 300,
            BuildingKind::Residential => 200,
        }
    }

    /// Population housed by the building.
    #[must_use]
    pub const fn population(self) -> u32 {
        match self {
            BuildingKind::CityHall => 50,
            BuildingKind::Residential => 40,
            BuildingKind::Commercial => 10,
            BuildingKind::Industrial => 15,
        }
    }

    /// Whether this is the capital type.
    #[must_use]
    pub const fn is_capital(self) -> bool {
        matches!(self, BuildingKind::CityHall)
    }
}

/// What stands on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// Nothing built here.
    Empty,
    /// Origin cell of a building.
    Building(BuildingKind),
    /// Non-origin cell of a multi-tile building.
    Footprint {
        /// Origin cell that owns this footprint.
        origin: Coord,
    },
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Base terrain.
    pub terrain: Terrain,
    /// Building or footprint marker.
    pub structure: Structure,
    /// Whether the building here is burning (cosmetic).
    pub on_fire: bool,
    /// How far the fire has spread, consumed by renderers.
    pub fire_progress: f32,
}

impl Tile {
    /// Create an empty tile of the given terrain.
    #[must_use]
    pub const fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            structure: Structure::Empty,
            on_fire: false,
            fire_progress: 0.0,
        }
    }

    /// Empty grass tile.
    #[must_use]
    pub const fn grass() -> Self {
        Self::new(Terrain::Grass)
    }

    /// Empty water tile.
    #[must_use]
    pub const fn water() -> Self {
        Self::new(Terrain::Water)
    }

    /// Whether a building may be placed on this tile.
    #[must_use]
    pub const fn is_buildable(&self) -> bool {
        matches!(self.terrain, Terrain::Grass) && matches!(self.structure, Structure::Empty)
    }

    /// Reset to bare terrain, clearing any structure and fire.
    fn clear(&mut self) {
        self.structure = Structure::Empty;
        self.on_fire = false;
        self.fire_progress = 0.0;
    }
}

/// Authoritative mapping from a building origin to its owner and health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipRecord {
    /// Origin tile of the building.
    pub tile: Coord,
    /// Kind of building.
    pub kind: BuildingKind,
    /// Controlling player.
    pub owner: PlayerId,
    /// Remaining hit points, within `[0, max_health]`.
    pub health: i32,
    /// Hit points when undamaged.
    pub max_health: i32,
}

impl OwnershipRecord {
    /// Centre of the building footprint in continuous world space.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        let half = f32::from(self.kind.footprint() - 1) / 2.0;
        let (x, y) = self.tile.to_point();
        (x + half, y + half)
    }
}

/// The tile grid plus its ownership records.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width of the map in tiles.
    width: u16,
    /// Height of the map in tiles.
    height: u16,
    /// Tiles stored in row-major order.
    tiles: Vec<Tile>,
    /// One record per building origin.
    records: Vec<OwnershipRecord>,
}

impl Grid {
    /// Create a new grid filled with grass.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            tiles: vec![Tile::grass(); size],
            records: Vec::new(),
        })
    }

    /// Width of the grid.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height of the grid.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Check if a coordinate is within the grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Clamp a continuous position to the nearest in-bounds tile.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tile_at(&self, x: f32, y: f32) -> Coord {
        let max_x = f32::from(self.width - 1);
        let max_y = f32::from(self.height - 1);
        Coord::new(x.round().clamp(0.0, max_x) as u16, y.round().clamp(0.0, max_y) as u16)
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            None
        }
    }

    /// Get the tile at a coordinate.
    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).map(|idx| &self.tiles[idx])
    }

    /// Get the tile at a coordinate mutably.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        self.index(coord).map(|idx| &mut self.tiles[idx])
    }

    /// Overwrite the terrain at a coordinate. Used by map generation.
    ///
    /// Returns `false` if out of bounds or the tile holds a structure.
    pub fn set_terrain(&mut self, coord: Coord, terrain: Terrain) -> bool {
        match self.get_mut(coord) {
            Some(tile) if tile.structure == Structure::Empty => {
                tile.terrain = terrain;
                true
            }
            _ => false,
        }
    }

    /// Iterate over all coordinates and tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        let width = usize::from(self.width);
        self.tiles.iter().enumerate().map(move |(idx, tile)| {
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coord::new((idx % width) as u16, (idx / width) as u16);
            (coord, tile)
        })
    }

    /// All cells covered by a building of `size` at `origin`.
    ///
    /// Cells falling outside the grid are still yielded so callers can
    /// reject the placement.
    fn footprint_cells(origin: Coord, size: u16) -> impl Iterator<Item = Coord> {
        (0..size).flat_map(move |dy| {
            (0..size).map(move |dx| {
                Coord::new(origin.x.saturating_add(dx), origin.y.saturating_add(dy))
            })
        })
    }

    /// Place a building owned by `owner` with its origin at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::FootprintMismatch`] if `footprint` is not the
    /// kind's own footprint, otherwise [`CommandError::OutOfBounds`] or
    /// [`CommandError::TileOccupied`] for the first footprint cell that
    /// cannot take the building. Nothing is mutated on failure.
    pub fn place(
        &mut self,
        origin: Coord,
        kind: BuildingKind,
        owner: PlayerId,
        footprint: u16,
    ) -> CommandResult {
        // Record centres and fog reveal derive the footprint from the kind.
        if footprint != kind.footprint() {
            return Err(CommandError::FootprintMismatch { kind, footprint });
        }
        for cell in Self::footprint_cells(origin, footprint) {
            let Some(tile) = self.get(cell) else {
                return Err(CommandError::OutOfBounds(cell));
            };
            if !tile.is_buildable() {
                return Err(CommandError::TileOccupied(cell));
            }
        }

        for cell in Self::footprint_cells(origin, footprint) {
            if let Some(tile) = self.get_mut(cell) {
                tile.structure = if cell == origin {
                    Structure::Building(kind)
                } else {
                    Structure::Footprint { origin }
                };
            }
        }

        self.records.push(OwnershipRecord {
            tile: origin,
            kind,
            owner,
            health: kind.max_health(),
            max_health: kind.max_health(),
        });
        Ok(())
    }

    /// Resolve any footprint tile to its building origin.
    #[must_use]
    pub fn origin_of(&self, coord: Coord) -> Option<Coord> {
        match self.get(coord)?.structure {
            Structure::Empty => None,
            Structure::Building(_) => Some(coord),
            Structure::Footprint { origin } => Some(origin),
        }
    }

    /// Kind of the building whose origin is exactly `origin`.
    #[must_use]
    pub fn building_at(&self, origin: Coord) -> Option<BuildingKind> {
        match self.get(origin)?.structure {
            Structure::Building(kind) => Some(kind),
            Structure::Empty | Structure::Footprint { .. } => None,
        }
    }

    /// The ownership record covering a tile, if any.
    #[must_use]
    pub fn record_at(&self, coord: Coord) -> Option<&OwnershipRecord> {
        let origin = self.origin_of(coord)?;
        self.records.iter().find(|r| r.tile == origin)
    }

    /// The player owning the building on a tile, if any.
    #[must_use]
    pub fn owner_at(&self, coord: Coord) -> Option<PlayerId> {
        self.record_at(coord).map(|r| r.owner)
    }

    /// Apply `amount` damage to the building covering `coord`.
    ///
    /// Returns the remaining health before clamping, which may be zero or
    /// negative. The stored health is clamped to `[0, max_health]`. The
    /// caller must call [`Grid::destroy`] when the result is `<= 0`.
    pub fn damage(&mut self, coord: Coord, amount: i32) -> Option<i32> {
        let origin = self.origin_of(coord)?;
        let record = self.records.iter_mut().find(|r| r.tile == origin)?;
        let remaining = record.health.saturating_sub(amount);
        record.health = remaining.clamp(0, record.max_health);
        Some(remaining)
    }

    /// Set the building covering `coord` on fire and grow the fire.
    pub fn ignite(&mut self, coord: Coord, amount: f32) {
        let Some(origin) = self.origin_of(coord) else {
            return;
        };
        if let Some(tile) = self.get_mut(origin) {
            tile.on_fire = true;
            tile.fire_progress = (tile.fire_progress + amount).min(1.0);
        }
    }

    /// Remove the building covering `coord`.
    ///
    /// Drops the ownership record and resets every footprint cell to bare
    /// terrain with no fire. Returns the removed record.
    pub fn destroy(&mut self, coord: Coord) -> Option<OwnershipRecord> {
        let origin = self.origin_of(coord)?;
        if !matches!(self.get(origin)?.structure, Structure::Building(_)) {
            return None;
        }

        for cell in Self::footprint_cells(origin, MAX_FOOTPRINT) {
            if let Some(tile) = self.get_mut(cell) {
                let covered = cell == origin
                    || matches!(tile.structure, Structure::Footprint { origin: o } if o == origin);
                if covered {
                    tile.clear();
                }
            }
        }

        let idx = self.records.iter().position(|r| r.tile == origin)?;
        Some(self.records.remove(idx))
    }

    /// All ownership records.
    #[must_use]
    pub fn records(&self) -> &[OwnershipRecord] {
        &self.records
    }

    /// Records owned by a player.
    pub fn records_owned_by(&self, player: PlayerId) -> impl Iterator<Item = &OwnershipRecord> {
        self.records.iter().filter(move |r| r.owner == player)
    }

    /// Whether the player still owns a capital-type building.
    #[must_use]
    pub fn owns_capital(&self, player: PlayerId) -> bool {
        self.records_owned_by(player).any(|r| r.kind.is_capital())
    }

    /// Count buildings owned by a player.
    #[must_use]
    pub fn count_buildings(&self, player: PlayerId) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let count = self.records_owned_by(player).count() as u32;
        count
    }

    /// Sum of population housed in a player's buildings.
    #[must_use]
    pub fn total_population(&self, player: PlayerId) -> u32 {
        self.records_owned_by(player)
            .map(|r| r.kind.population())
            .sum()
    }

    /// Drop every record owned by `player`, leaving their buildings neutral.
    ///
    /// Returns how many records were released.
    pub fn release_player(&mut self, player: PlayerId) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.owner != player);
        before - self.records.len()
    }
}
