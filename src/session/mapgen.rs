//! Deterministic starting layout.
//!
//! Capitals are spread on a ring around the map centre with a random
//! rotation. Each player also gets a few starter buildings next to their
//! capital, then a sprinkling of water is scattered away from the bases.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::SimConfig;
use crate::error::SetupError;
use crate::game::{BuildingKind, Coord, Grid, MAX_PLAYERS, Player, PlayerId, Terrain};

/// Buildings every player starts with besides the capital.
pub const STARTER_BUILDINGS: [BuildingKind; 3] = [
    BuildingKind::Residential,
    BuildingKind::Commercial,
    BuildingKind::Industrial,
];

/// Minimum distance between two capital origins.
pub const MIN_CAPITAL_SPACING: f32 = 6.0;

/// Water never lands within this distance of a capital.
const WATER_CLEARANCE: f32 = 4.0;

/// Offsets from a capital origin tried in order for starter buildings.
const STARTER_OFFSETS: [(i32, i32); 8] = [
    (3, 0),
    (0, 3),
    (-2, 0),
    (0, -2),
    (3, 3),
    (-2, -2),
    (3, -2),
    (-2, 3),
];

/// Generate the grid and players for a new game.
///
/// Player 1 is the human; the rest are computer controlled.
///
/// # Errors
///
/// Returns [`SetupError`] if the player count is unsupported, the map is too
/// small to space the capitals out, or a capital cannot be placed.
pub fn generate_layout(seed: u64, config: &SimConfig) -> Result<(Grid, Vec<Player>), SetupError> {
    let count = config.player_count();
    if !(2..=MAX_PLAYERS).contains(&count) {
        return Err(SetupError::PlayerCount(count));
    }
    let too_small = SetupError::MapTooSmall {
        width: config.map_width,
        height: config.map_height,
        players: count,
    };

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut grid = Grid::new(config.map_width, config.map_height).ok_or(too_small)?;

    let capitals = capital_positions(&grid, count, &mut rng).ok_or(too_small)?;

    let mut players = Vec::with_capacity(count);
    for (i, &capital) in capitals.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let id = (i + 1) as PlayerId;
        grid.place(capital, BuildingKind::CityHall, id, BuildingKind::CityHall.footprint())
            .map_err(|source| SetupError::Placement { player: id, source })?;
        players.push(Player::new(id, capital, config.starting_money, id == 1));
    }

    for player in &players {
        place_starters(&mut grid, player);
    }
    scatter_water(&mut grid, &capitals, config.water_fraction, &mut rng);

    Ok((grid, players))
}

/// Capital origins on a ring, or `None` if they cannot be spaced out.
fn capital_positions(grid: &Grid, count: usize, rng: &mut ChaCha8Rng) -> Option<Vec<Coord>> {
    let size = BuildingKind::CityHall.footprint();
    let width = f32::from(grid.width());
    let height = f32::from(grid.height());
    let radius = width.min(height) * 0.35;
    let offset = rng.random::<f32>() * std::f32::consts::TAU;
    #[allow(clippy::cast_precision_loss)]
    let step = std::f32::consts::TAU / count as f32;

    let max_x = grid.width().checked_sub(size + 1)?;
    let max_y = grid.height().checked_sub(size + 1)?;

    let mut positions: Vec<Coord> = Vec::with_capacity(count);
    for i in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let angle = offset + step * i as f32;
        let x = width / 2.0 + radius * angle.cos();
        let y = height / 2.0 + radius * angle.sin();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let coord = Coord::new(
            (x.round().max(1.0) as u16).min(max_x),
            (y.round().max(1.0) as u16).min(max_y),
        );
        if positions
            .iter()
            .any(|p| p.distance(coord) < MIN_CAPITAL_SPACING)
        {
            return None;
        }
        positions.push(coord);
    }
    Some(positions)
}

/// Place the starter buildings around a player's capital where they fit.
fn place_starters(grid: &mut Grid, player: &Player) {
    let mut offsets = STARTER_OFFSETS.iter();
    for kind in STARTER_BUILDINGS {
        let placed = offsets.by_ref().any(|&(dx, dy)| {
            let x = i32::from(player.capital.x) + dx;
            let y = i32::from(player.capital.y) + dy;
            match (u16::try_from(x), u16::try_from(y)) {
                (Ok(x), Ok(y)) => grid
                    .place(Coord::new(x, y), kind, player.id, kind.footprint())
                    .is_ok(),
                _ => false,
            }
        });
        if !placed {
            debug!(player = player.id, ?kind, "no room for starter building");
        }
    }
}

/// Turn a random fraction of open tiles into water, away from capitals.
fn scatter_water(grid: &mut Grid, capitals: &[Coord], fraction: f64, rng: &mut ChaCha8Rng) {
    if fraction <= 0.0 {
        return;
    }
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let coord = Coord::new(x, y);
            if !rng.random_bool(fraction) {
                continue;
            }
            if capitals.iter().any(|c| c.distance(coord) < WATER_CLEARANCE) {
                continue;
            }
            grid.set_terrain(coord, Terrain::Water);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_deterministic() {
        let config = SimConfig::default();
        let (grid_a, players_a) = generate_layout(42, &config).unwrap();
        let (grid_b, players_b) = generate_layout(42, &config).unwrap();
        assert_eq!(players_a, players_b);
        assert_eq!(grid_a.records(), grid_b.records());
        let water_a: Vec<_> = grid_a
            .iter()
            .filter(|(_, t)| t.terrain == Terrain::Water)
            .map(|(c, _)| c)
            .collect();
        let water_b: Vec<_> = grid_b
            .iter()
            .filter(|(_, t)| t.terrain == Terrain::Water)
            .map(|(c, _)| c)
            .collect();
        assert_eq!(water_a, water_b);
    }

    #[test]
    fn test_every_player_gets_a_base() {
        let config = SimConfig {
            ai_players: 3,
            ..SimConfig::default()
        };
        let (grid, players) = generate_layout(7, &config).unwrap();
        assert_eq!(players.len(), 4);
        assert!(players[0].is_human);
        assert!(players[1..].iter().all(|p| !p.is_human));
        for player in &players {
            assert_eq!(grid.owner_at(player.capital), Some(player.id));
            assert!(grid.owns_capital(player.id));
            assert_eq!(grid.count_buildings(player.id), 4);
            assert_eq!(player.money, config.starting_money);
        }
    }

    #[test]
    fn test_capitals_are_spaced() {
        let config = SimConfig {
            ai_players: 5,
            ..SimConfig::default()
        };
        let (_, players) = generate_layout(3, &config).unwrap();
        for a in &players {
            for b in players.iter().filter(|b| b.id != a.id) {
                assert!(a.capital.distance(b.capital) >= MIN_CAPITAL_SPACING);
            }
        }
    }

    #[test]
    fn test_rejects_crowded_map() {
        let config = SimConfig {
            map_width: 16,
            map_height: 16,
            ai_players: 7,
            ..SimConfig::default()
        };
        assert!(matches!(
            generate_layout(1, &config),
            Err(SetupError::MapTooSmall { players: 8, .. })
        ));
    }

    #[test]
    fn test_no_water_near_capitals() {
        let config = SimConfig {
            water_fraction: 0.45,
            ..SimConfig::default()
        };
        let (grid, players) = generate_layout(9, &config).unwrap();
        for player in &players {
            let tile = grid.get(player.capital).unwrap();
            assert_eq!(tile.terrain, Terrain::Grass);
        }
    }
}
