//! Economy accrual.
//!
//! Income is paid in chunks every `interval_ticks` ticks rather than every
//! tick. Each payment is a flat base amount plus a per-building amount keyed
//! by building category:
//!
//! | Building    | Income per accrual      |
//! |-------------|-------------------------|
//! | Industrial  | `industrial_income`     |
//! | Commercial  | `commercial_income`     |
//! | Anything else | `building_income`     |
//!
//! Accrual only reads the ownership store.

use crate::config::EconomyConfig;
use crate::game::{BuildingKind, Grid, Player, PlayerId};

/// Income a single building contributes per accrual.
#[must_use]
pub const fn building_income(kind: BuildingKind, config: &EconomyConfig) -> i64 {
    match kind {
        BuildingKind::Industrial => config.industrial_income,
        BuildingKind::Commercial => config.commercial_income,
        BuildingKind::CityHall | BuildingKind::Residential => config.building_income,
    }
}

/// Income a player would receive on the next accrual.
#[must_use]
pub fn projected_income(grid: &Grid, player: &Player, config: &EconomyConfig) -> i64 {
    let buildings: i64 = grid
        .records_owned_by(player.id)
        .map(|r| building_income(r.kind, config))
        .sum();
    player.income_per_tick + buildings
}

/// Whether income is paid on this tick.
#[must_use]
pub const fn is_accrual_tick(tick: u64, config: &EconomyConfig) -> bool {
    config.interval_ticks > 0 && tick % config.interval_ticks == 0
}

/// Pay every live player their income if `tick` is an accrual tick.
///
/// Returns the amount paid to each player, empty on non-accrual ticks.
pub fn accrue(
    grid: &Grid,
    players: &mut [Player],
    tick: u64,
    config: &EconomyConfig,
) -> Vec<(PlayerId, i64)> {
    if !is_accrual_tick(tick, config) {
        return Vec::new();
    }

    let mut paid = Vec::with_capacity(players.len());
    for player in players.iter_mut().filter(|p| p.is_alive()) {
        let income = projected_income(grid, player, config);
        player.money = player.money.saturating_add(income);
        paid.push((player.id, income));
    }
    paid
}
