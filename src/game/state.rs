//! World state and the tick pipeline.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::SimConfig;
use crate::game::{
    AiAction, AiController, CombatReport, FogOfWar, Grid, MilitaryUnit, Outcome, Player, PlayerId,
    ProductionReport, ProductionScheduler, UnitId, UnitTable, VictoryReport, accrue,
    evaluate, update_units,
};

/// Maximum number of players in a game.
pub const MAX_PLAYERS: usize = 8;

/// Everything that happened during the most recent tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Income paid per player (empty on non-accrual ticks).
    pub income: Vec<(PlayerId, i64)>,
    /// Production spawns and drops.
    pub production: ProductionReport,
    /// Kills, destroyed buildings and purges.
    pub combat: CombatReport,
    /// AI decisions.
    pub ai: Vec<AiAction>,
    /// Eliminations and outcome.
    pub victory: VictoryReport,
}

/// Complete simulation state.
///
/// A world is advanced by [`World::tick`], which consumes it and returns the
/// next world. Stages run in a fixed order and each sees every mutation made
/// by the stages before it.
#[derive(Debug, Clone)]
pub struct World {
    pub(super) grid: Grid,
    pub(super) players: Vec<Player>,
    pub(super) units: UnitTable,
    pub(super) production: ProductionScheduler,
    /// One fog grid per player, in player order.
    pub(super) fogs: Vec<FogOfWar>,
    pub(super) ai: AiController,
    /// Units selected by the input layer.
    pub(super) selection: Vec<UnitId>,
    /// Ticks completed.
    tick: u64,
    /// Game time in seconds.
    time: f64,
    rng: ChaCha8Rng,
    outcome: Option<Outcome>,
    config: SimConfig,
    last_report: TickReport,
}

impl World {
    /// Create a world from a prepared grid and player list.
    ///
    /// Players should already own their capitals on the grid. Every player's
    /// base income is taken from the config and fog is revealed once so the
    /// first frame is not blank.
    #[must_use]
    pub fn new(grid: Grid, mut players: Vec<Player>, config: SimConfig, seed: u64) -> Self {
        for player in &mut players {
            player.income_per_tick = config.economy.base_income;
        }
        let fogs = players
            .iter()
            .map(|p| FogOfWar::new(p.id, grid.width(), grid.height()))
            .collect();

        let mut world = Self {
            grid,
            players,
            units: UnitTable::new(),
            production: ProductionScheduler::new(),
            fogs,
            ai: AiController::new(),
            selection: Vec::new(),
            tick: 0,
            time: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            outcome: None,
            config,
            last_report: TickReport::default(),
        };
        world.refresh_fog();
        world
    }

    /// Advance the simulation by `dt` seconds of wall time.
    ///
    /// Stage order: economy, production, units, fog, AI, victory. Once the
    /// game has an outcome the world is returned unchanged.
    #[must_use]
    pub fn tick(mut self, dt: f32) -> Self {
        self.advance(dt);
        self
    }

    /// In-place form of [`World::tick`].
    pub fn advance(&mut self, dt: f32) {
        if self.outcome.is_some() {
            return;
        }
        self.tick += 1;
        self.time += f64::from(dt);
        let tick = self.tick;

        let income = accrue(&self.grid, &mut self.players, tick, &self.config.economy);
        let production = self
            .production
            .advance(&self.grid, &self.players, &mut self.units, dt);
        let combat = update_units(
            &mut self.units,
            &mut self.grid,
            &mut self.players,
            dt,
            tick,
            &self.config,
        );
        self.refresh_fog();
        let ai = self.ai.run(
            &self.grid,
            &mut self.players,
            &mut self.units,
            &mut self.production,
            self.time,
            &mut self.rng,
            &self.config,
        );
        let victory = evaluate(
            &mut self.grid,
            &mut self.players,
            &mut self.units,
            &mut self.production,
            tick,
            &self.config,
        );

        let units = &self.units;
        self.selection
            .retain(|id| units.get(*id).is_some_and(MilitaryUnit::is_alive));
        self.outcome = victory.outcome;
        self.last_report = TickReport {
            income,
            production,
            combat,
            ai,
            victory,
        };
    }

    /// Recompute fog for every live player.
    fn refresh_fog(&mut self) {
        let range = self.config.building_vision_range;
        for fog in &mut self.fogs {
            let alive = self
                .players
                .iter()
                .any(|p| p.id == fog.player() && p.is_alive());
            if alive {
                fog.update(&self.grid, &self.units, range, self.tick);
            }
        }
    }

    /// The tile grid and ownership records.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for scenario setup and tooling.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// All players, eliminated ones included.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The human player, if any.
    #[must_use]
    pub fn human(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_human)
    }

    /// Every unit not yet purged, dead ones included.
    #[must_use]
    pub const fn units(&self) -> &UnitTable {
        &self.units
    }

    /// Mutable unit access for scenario setup and tooling.
    pub fn units_mut(&mut self) -> &mut UnitTable {
        &mut self.units
    }

    /// A player's fog grid.
    #[must_use]
    pub fn fog(&self, player: PlayerId) -> Option<&FogOfWar> {
        self.fogs.iter().find(|f| f.player() == player)
    }

    /// Units a player may see: their own plus others on visible tiles.
    #[must_use]
    pub fn visible_units(&self, player: PlayerId) -> Vec<&MilitaryUnit> {
        let Some(fog) = self.fog(player) else {
            return Vec::new();
        };
        self.units
            .iter()
            .filter(|u| u.owner == player || fog.is_visible(self.grid.tile_at(u.x, u.y)))
            .collect()
    }

    /// Production queues.
    #[must_use]
    pub const fn production(&self) -> &ProductionScheduler {
        &self.production
    }

    /// Currently selected units.
    #[must_use]
    pub fn selection(&self) -> &[UnitId] {
        &self.selection
    }

    /// Ticks completed so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Game time in seconds.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// The outcome, once the game is over.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the game has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Configuration this world runs with.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// What happened during the last tick.
    #[must_use]
    pub const fn last_report(&self) -> &TickReport {
        &self.last_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        AttackTarget, BuildingKind, Command, Coord, UnitKind, UnitState, Visibility,
    };

    fn world(config: SimConfig) -> World {
        let mut grid = Grid::new(24, 24).unwrap();
        grid.place(Coord::new(2, 2), BuildingKind::CityHall, 1, 2).unwrap();
        grid.place(Coord::new(20, 20), BuildingKind::CityHall, 2, 2).unwrap();
        let players = vec![
            Player::new(1, Coord::new(2, 2), 500, true),
            Player::new(2, Coord::new(20, 20), 500, false),
        ];
        World::new(grid, players, config, 11)
    }

    fn passive() -> SimConfig {
        let mut config = SimConfig::default();
        config.ai.base_interval_secs = 1.0e6;
        config
    }

    #[test]
    fn test_initial_fog_is_revealed() {
        let world = world(passive());
        let fog = world.fog(1).unwrap();
        assert!(fog.is_visible(Coord::new(2, 2)));
        assert_eq!(fog.visibility(Coord::new(20, 20)), Visibility::Unexplored);
        assert_eq!(world.player(1).unwrap().income_per_tick, 5);
    }

    #[test]
    fn test_unbounded_building_vision_sees_whole_map() {
        let config = SimConfig {
            building_vision_range: u16::MAX,
            ..passive()
        };
        let world = world(config).tick(0.1);
        let fog = world.fog(1).unwrap();
        assert_eq!(fog.explored_count(), 24 * 24);
        assert!(fog.is_visible(Coord::new(20, 20)));
    }

    #[test]
    fn test_economy_runs_before_production() {
        let mut world = world(passive());
        world
            .apply(Command::EnqueueProduction {
                player: 1,
                kind: UnitKind::Infantry,
            })
            .unwrap();
        for _ in 0..10 {
            world = world.tick(0.1);
        }
        assert_eq!(world.tick_count(), 10);
        // 500 - 50 + (5 base + 1 city hall)
        assert_eq!(world.player(1).unwrap().money, 456);
        assert_eq!(world.last_report().income, vec![(1, 6), (2, 6)]);
        assert_eq!(world.production().pending(1), 1);

        for _ in 0..25 {
            world = world.tick(0.1);
        }
        assert_eq!(world.production().pending(1), 0);
        assert_eq!(world.units().live_count(1), 1);
    }

    #[test]
    fn test_visible_units_hide_fogged_enemies() {
        let mut world = world(passive());
        let mine = world.units_mut().spawn(UnitKind::Infantry, 1, 3.0, 3.0);
        let far = world.units_mut().spawn(UnitKind::Infantry, 2, 19.0, 19.0);
        let near = world.units_mut().spawn(UnitKind::Infantry, 2, 6.0, 3.0);
        world = world.tick(0.01);

        let seen: Vec<UnitId> = world.visible_units(1).iter().map(|u| u.id).collect();
        assert!(seen.contains(&mine));
        assert!(seen.contains(&near));
        assert!(!seen.contains(&far));
    }

    #[test]
    fn test_capital_loss_ends_game_and_freezes_world() {
        let mut world = world(passive());
        let tank = world.units_mut().spawn(UnitKind::Tank, 1, 19.0, 20.0);
        world.units_mut().get_mut(tank).unwrap().order_attack(
            AttackTarget::Building {
                origin: Coord::new(20, 20),
            },
            Coord::new(20, 20),
        );

        let mut ticks = 0;
        while !world.is_over() && ticks < 200 {
            world = world.tick(1.5);
            ticks += 1;
        }
        assert_eq!(world.outcome(), Some(Outcome::Victory(1)));
        let p2 = world.player(2).unwrap();
        assert!(p2.is_eliminated);
        assert_eq!(p2.eliminated_at, Some(world.tick_count()));
        assert_eq!(world.player(1).unwrap().buildings_destroyed, 1);

        let frozen = world.tick_count();
        world = world.tick(1.0);
        assert_eq!(world.tick_count(), frozen);
        assert_eq!(
            world.apply(Command::MoveSelected(Coord::new(1, 1))),
            Err(crate::error::CommandError::GameOver)
        );
    }

    #[test]
    fn test_dead_units_leave_selection() {
        let mut world = world(passive());
        let id = world.units_mut().spawn(UnitKind::Infantry, 1, 5.0, 5.0);
        world.apply(Command::SetSelection(vec![id])).unwrap();
        world.units_mut().get_mut(id).unwrap().health = 0;
        world = world.tick(0.1);
        assert!(world.selection().is_empty());
        assert!(matches!(
            world.units().get(id).unwrap().state,
            UnitState::Dead { .. }
        ));
    }
}
