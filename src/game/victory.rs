//! Elimination, scoring and game outcome.
//!
//! Elimination is derived every tick from the ownership store: a player who
//! owns no city hall record is out. Scores are a projection of current
//! state and are recomputed for every live player each tick. An eliminated
//! player's score is frozen at the moment of elimination.

use serde::Serialize;
use tracing::info;

use crate::config::{ScoringWeights, SimConfig};
use crate::game::{Grid, Player, PlayerId, ProductionScheduler, UnitTable};

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// A single player is left standing.
    Victory(PlayerId),
    /// The human was eliminated while computer players remain.
    Defeat,
    /// Every player was eliminated on the same tick.
    Draw,
}

impl Outcome {
    /// The winning player, if any.
    #[must_use]
    pub const fn winner(self) -> Option<PlayerId> {
        match self {
            Outcome::Victory(id) => Some(id),
            Outcome::Defeat | Outcome::Draw => None,
        }
    }
}

/// What the evaluator found this tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VictoryReport {
    /// Players eliminated this tick.
    pub eliminated: Vec<PlayerId>,
    /// Set once the game is over.
    pub outcome: Option<Outcome>,
}

/// Score of a player from current state.
#[must_use]
pub fn score(grid: &Grid, player: &Player, weights: &ScoringWeights) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let money = player.money as f64;
    money * weights.money
        + f64::from(grid.total_population(player.id)) * weights.population
        + f64::from(grid.count_buildings(player.id)) * weights.building
        + f64::from(player.units_killed) * weights.unit_kill
        + f64::from(player.buildings_destroyed) * weights.building_destroyed
}

/// Recompute scores for every live player.
pub fn update_scores(grid: &Grid, players: &mut [Player], weights: &ScoringWeights) {
    for player in players.iter_mut().filter(|p| p.is_alive()) {
        player.score = score(grid, player, weights);
    }
}

/// Eliminate capital-less players, refresh scores and decide the outcome.
///
/// A newly eliminated player loses everything they still hold: remaining
/// building records are released, live units die and the production queue
/// is dropped.
pub fn evaluate(
    grid: &mut Grid,
    players: &mut [Player],
    units: &mut UnitTable,
    production: &mut ProductionScheduler,
    tick: u64,
    config: &SimConfig,
) -> VictoryReport {
    let mut report = VictoryReport::default();

    for player in players.iter_mut().filter(|p| p.is_alive()) {
        if grid.owns_capital(player.id) {
            continue;
        }
        player.score = score(grid, player, &config.scoring);
        player.eliminate(tick);

        let released = grid.release_player(player.id);
        let killed = units.kill_all_of(player.id, tick, config.death_grace_secs);
        let dropped = production.clear_player(player.id);
        info!(
            player = player.id,
            tick,
            score = player.score,
            released,
            killed,
            dropped,
            "player eliminated"
        );
        report.eliminated.push(player.id);
    }

    update_scores(grid, players, &config.scoring);
    report.outcome = decide(players, config);
    if let Some(outcome) = report.outcome {
        info!(tick, ?outcome, "game over");
    }
    report
}

/// Outcome implied by the current elimination flags, if the game is over.
fn decide(players: &[Player], config: &SimConfig) -> Option<Outcome> {
    let mut alive = players.iter().filter(|p| p.is_alive());
    match (alive.next(), alive.next()) {
        (None, _) => Some(Outcome::Draw),
        (Some(last), None) => Some(Outcome::Victory(last.id)),
        _ => {
            // Autopilot games play on to a single survivor.
            let human_out = players.iter().any(|p| p.is_human && p.is_eliminated);
            (human_out && !config.autopilot_human).then_some(Outcome::Defeat)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{BuildingKind, Coord, UnitKind};

    fn setup(n: u8) -> (Grid, Vec<Player>, UnitTable, ProductionScheduler) {
        let mut grid = Grid::new(40, 40).unwrap();
        let mut players = Vec::new();
        for id in 1..=n {
            let capital = Coord::new(u16::from(id) * 8, 5);
            grid.place(capital, BuildingKind::CityHall, id, 2).unwrap();
            players.push(Player::new(id, capital, 100, id == 1));
        }
        (grid, players, UnitTable::new(), ProductionScheduler::new())
    }

    #[test]
    fn test_score_formula() {
        let (mut grid, mut players, _, _) = setup(1);
        grid.place(Coord::new(1, 1), BuildingKind::Residential, 1, 1).unwrap();
        players[0].units_killed = 2;
        players[0].buildings_destroyed = 1;
        let weights = ScoringWeights::default();
        // 100*0.1 + (50+40)*1 + 2*10 + 2*5 + 1*25
        let expected = 10.0 + 90.0 + 20.0 + 10.0 + 25.0;
        assert!((score(&grid, &players[0], &weights) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_no_elimination_while_capitals_stand() {
        let (mut grid, mut players, mut units, mut prod) = setup(3);
        let config = SimConfig::default();
        let report = evaluate(&mut grid, &mut players, &mut units, &mut prod, 1, &config);
        assert!(report.eliminated.is_empty());
        assert!(report.outcome.is_none());
        assert!(players.iter().all(|p| p.score > 0.0));
    }

    #[test]
    fn test_elimination_cleans_up() {
        let (mut grid, mut players, mut units, mut prod) = setup(3);
        let config = SimConfig::default();
        grid.place(Coord::new(30, 30), BuildingKind::Industrial, 3, 1).unwrap();
        let unit = units.spawn(UnitKind::Tank, 3, 10.0, 10.0);
        prod.enqueue(&mut players, 3, UnitKind::Infantry).unwrap();
        grid.destroy(Coord::new(24, 5));

        let report = evaluate(&mut grid, &mut players, &mut units, &mut prod, 42, &config);
        assert_eq!(report.eliminated, vec![3]);
        assert!(report.outcome.is_none());

        let p3 = &players[2];
        assert!(p3.is_eliminated);
        assert_eq!(p3.eliminated_at, Some(42));
        assert_eq!(grid.records_owned_by(3).count(), 0);
        assert!(!units.get(unit).unwrap().is_alive());
        assert_eq!(prod.pending(3), 0);

        // Frozen: later changes do not move the score.
        let frozen = p3.score;
        players[2].money += 1_000;
        evaluate(&mut grid, &mut players, &mut units, &mut prod, 43, &config);
        assert!((players[2].score - frozen).abs() < f64::EPSILON);
    }

    #[test]
    fn test_last_survivor_wins() {
        let (mut grid, mut players, mut units, mut prod) = setup(3);
        let config = SimConfig::default();
        grid.destroy(Coord::new(16, 5));
        grid.destroy(Coord::new(24, 5));
        let report = evaluate(&mut grid, &mut players, &mut units, &mut prod, 9, &config);
        assert_eq!(report.outcome, Some(Outcome::Victory(1)));
        assert_eq!(report.outcome.and_then(Outcome::winner), Some(1));
    }

    #[test]
    fn test_human_elimination_is_defeat() {
        let (mut grid, mut players, mut units, mut prod) = setup(3);
        let mut config = SimConfig::default();
        grid.destroy(Coord::new(8, 5));
        let report = evaluate(&mut grid, &mut players, &mut units, &mut prod, 9, &config);
        assert_eq!(report.outcome, Some(Outcome::Defeat));

        let (mut grid, mut players, mut units, mut prod) = setup(3);
        config.autopilot_human = true;
        grid.destroy(Coord::new(8, 5));
        let report = evaluate(&mut grid, &mut players, &mut units, &mut prod, 9, &config);
        assert!(report.outcome.is_none());
    }

    #[test]
    fn test_everyone_out_is_draw() {
        let (mut grid, mut players, mut units, mut prod) = setup(2);
        let config = SimConfig::default();
        grid.destroy(Coord::new(8, 5));
        grid.destroy(Coord::new(16, 5));
        let report = evaluate(&mut grid, &mut players, &mut units, &mut prod, 9, &config);
        assert_eq!(report.eliminated, vec![1, 2]);
        assert_eq!(report.outcome, Some(Outcome::Draw));
    }
}
