//! Property-based tests for game mechanics.
//!
//! These tests verify the bookkeeping invariants of the tick pipeline:
//! fog, ownership, health, production and determinism.
//! Run with: cargo test --release prop_game

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use skirmish::config::{AiConfig, SimConfig};
use skirmish::game::{
    AttackTarget, BuildingKind, Coord, Grid, Player, ProductionScheduler, UnitKind, UnitTable,
    Visibility, check_invariants, update_units,
};
use skirmish::session::{Session, run_game};
use skirmish::CommandError;

/// A small, busy game: rich aggressive AIs on a tight map.
fn skirmish_config() -> SimConfig {
    SimConfig {
        map_width: 24,
        map_height: 24,
        starting_money: 2_000,
        autopilot_human: true,
        max_ticks: 400,
        ai: AiConfig {
            base_interval_secs: 0.5,
            jitter_secs: 0.5,
            attack_threshold: 1,
            attack_chance: 1.0,
            ..AiConfig::default()
        },
        ..SimConfig::default()
    }
}

fn unit_kind() -> impl Strategy<Value = UnitKind> {
    prop_oneof![
        Just(UnitKind::Infantry),
        Just(UnitKind::Tank),
        Just(UnitKind::Helicopter),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// A tile that has been visible never goes back to unexplored.
    #[test]
    fn prop_visibility_monotonic(seed in any::<u64>(), ticks in 50usize..250) {
        let config = skirmish_config();
        let mut session = Session::new(seed, config).unwrap();
        let players: Vec<u8> = session.world().players().iter().map(|p| p.id).collect();
        let mut seen: Vec<BTreeSet<Coord>> = vec![BTreeSet::new(); players.len()];

        for _ in 0..ticks {
            session.step(0.1);
            let world = session.world();
            for (i, &id) in players.iter().enumerate() {
                let fog = world.fog(id).unwrap();
                for &coord in &seen[i] {
                    prop_assert_ne!(fog.visibility(coord), Visibility::Unexplored);
                }
                for (coord, _) in world.grid().iter() {
                    if fog.is_visible(coord) {
                        seen[i].insert(coord);
                    }
                }
            }
        }
    }

    /// Ownership, health and elimination bookkeeping hold after every tick.
    #[test]
    fn prop_invariants_hold_every_tick(seed in any::<u64>()) {
        let config = skirmish_config();
        let mut session = Session::new(seed, config).unwrap();
        for _ in 0..config.max_ticks {
            session.step(0.1);
            let violations = check_invariants(session.world());
            prop_assert!(violations.is_empty(), "{:?}", violations);
            if session.world().is_over() {
                break;
            }
        }
    }

    /// Same seed, same config: identical result.
    #[test]
    fn prop_win_determinism(seed in any::<u64>()) {
        let config = SimConfig { max_ticks: 300, ..skirmish_config() };
        let a = run_game(seed, &config).unwrap();
        let b = run_game(seed, &config).unwrap();
        prop_assert_eq!(a, b);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Enqueue debits exactly the cost or changes nothing; completion spawns one unit.
    #[test]
    fn prop_production_conservation(money in 0i64..400, kind in unit_kind()) {
        let mut grid = Grid::new(20, 20).unwrap();
        grid.place(Coord::new(5, 5), BuildingKind::CityHall, 1, 2).unwrap();
        let mut players = vec![Player::new(1, Coord::new(5, 5), money, true)];
        let mut sched = ProductionScheduler::new();
        let mut units = UnitTable::new();

        match sched.enqueue(&mut players, 1, kind) {
            Ok(()) => {
                prop_assert!(money >= kind.cost());
                prop_assert_eq!(players[0].money, money - kind.cost());
                prop_assert_eq!(sched.pending(1), 1);

                let report = sched.advance(&grid, &players, &mut units, kind.build_time());
                prop_assert_eq!(report.spawned.len(), 1);
                prop_assert_eq!(sched.pending(1), 0);
                prop_assert_eq!(units.live_count(1), 1);
            }
            Err(err) => {
                prop_assert!(money < kind.cost());
                prop_assert_eq!(
                    err,
                    CommandError::InsufficientFunds { needed: kind.cost(), available: money }
                );
                prop_assert_eq!(players[0].money, money);
                prop_assert_eq!(sched.pending(1), 0);
            }
        }
    }

    /// Building health stays within bounds and it falls exactly when damage covers it.
    #[test]
    fn prop_building_damage_bounded(hits in prop::collection::vec(1i32..150, 1..40)) {
        let mut grid = Grid::new(10, 10).unwrap();
        grid.place(Coord::new(3, 3), BuildingKind::Industrial, 2, 1).unwrap();
        let max = BuildingKind::Industrial.max_health();
        let mut dealt = 0;

        for hit in hits {
            let Some(remaining) = grid.damage(Coord::new(3, 3), hit) else {
                break;
            };
            dealt += hit;
            prop_assert_eq!(remaining, max - dealt);
            let health = grid.record_at(Coord::new(3, 3)).unwrap().health;
            prop_assert!((0..=max).contains(&health));
            if remaining <= 0 {
                prop_assert!(grid.destroy(Coord::new(3, 3)).is_some());
                prop_assert!(grid.records().is_empty());
            }
        }
    }

    /// Unit health stays within bounds and kills always match losses.
    #[test]
    fn prop_combat_health_and_tallies(
        reds in prop::collection::vec((unit_kind(), 0u16..12, 0u16..12), 1..6),
        blues in prop::collection::vec((unit_kind(), 0u16..12, 0u16..12), 1..6),
        ticks in 1u64..120,
    ) {
        let mut grid = Grid::new(12, 12).unwrap();
        let mut players = vec![
            Player::new(1, Coord::new(0, 0), 0, true),
            Player::new(2, Coord::new(11, 11), 0, false),
        ];
        let mut units = UnitTable::new();
        let red_ids: Vec<_> = reds
            .iter()
            .map(|&(k, x, y)| units.spawn(k, 1, f32::from(x), f32::from(y)))
            .collect();
        let blue_ids: Vec<_> = blues
            .iter()
            .map(|&(k, x, y)| units.spawn(k, 2, f32::from(x), f32::from(y)))
            .collect();
        for (i, id) in red_ids.iter().enumerate() {
            let target = blue_ids[i % blue_ids.len()];
            let approach = units.get(target).unwrap().tile();
            units.get_mut(*id).unwrap().order_attack(AttackTarget::Unit(target), approach);
        }
        for (i, id) in blue_ids.iter().enumerate() {
            let target = red_ids[i % red_ids.len()];
            let approach = units.get(target).unwrap().tile();
            units.get_mut(*id).unwrap().order_attack(AttackTarget::Unit(target), approach);
        }

        let config = SimConfig::default();
        for tick in 1..=ticks {
            update_units(&mut units, &mut grid, &mut players, 0.25, tick, &config);
            for unit in units.iter() {
                prop_assert!((0..=unit.max_health).contains(&unit.health));
                if unit.health == 0 {
                    prop_assert!(!unit.is_alive());
                }
            }
            let killed: u32 = players.iter().map(|p| p.units_killed).sum();
            let lost: u32 = players.iter().map(|p| p.units_lost).sum();
            prop_assert_eq!(killed, lost);
        }
    }
}
