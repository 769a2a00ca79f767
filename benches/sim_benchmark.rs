//! Benchmarks for the tick pipeline.
//!
//! Full headless games are the hot path for tournaments; the per-tick and
//! combat benches isolate the stages that dominate them.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use skirmish::config::{AiConfig, SimConfig};
use skirmish::game::{AttackTarget, Coord, Grid, Player, UnitKind, UnitTable, update_units};
use skirmish::session::{Session, run_game};

fn busy_config() -> SimConfig {
    SimConfig {
        starting_money: 2_000,
        autopilot_human: true,
        max_ticks: 1_000,
        ai: AiConfig {
            attack_threshold: 3,
            attack_chance: 1.0,
            ..AiConfig::default()
        },
        ..SimConfig::default()
    }
}

fn bench_single_game(c: &mut Criterion) {
    let config = busy_config();

    c.bench_function("single_game_3p", |b| {
        b.iter(|| black_box(run_game(black_box(42), black_box(&config)).unwrap()));
    });
}

fn bench_single_game_8p(c: &mut Criterion) {
    let config = SimConfig {
        map_width: 64,
        map_height: 64,
        ai_players: 7,
        ..busy_config()
    };

    c.bench_function("single_game_8p", |b| {
        b.iter(|| black_box(run_game(black_box(42), black_box(&config)).unwrap()));
    });
}

fn bench_tick_throughput(c: &mut Criterion) {
    // Warm a session up so units and queues exist before measuring.
    let mut session = Session::new(7, busy_config()).unwrap();
    for _ in 0..300 {
        session.step(0.1);
    }

    c.bench_function("100_ticks_midgame", |b| {
        b.iter_batched(
            || session.clone(),
            |mut s| {
                for _ in 0..100 {
                    s.step(0.1);
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_melee(c: &mut Criterion) {
    let mut units = UnitTable::new();
    let mut reds = Vec::new();
    let mut blues = Vec::new();
    for i in 0..50u16 {
        reds.push(units.spawn(UnitKind::Infantry, 1, 10.0, f32::from(i % 40)));
        blues.push(units.spawn(UnitKind::Tank, 2, 30.0, f32::from(i % 40)));
    }
    for (red, blue) in reds.iter().zip(&blues) {
        let approach = units.get(*blue).unwrap().tile();
        units
            .get_mut(*red)
            .unwrap()
            .order_attack(AttackTarget::Unit(*blue), approach);
        let approach = units.get(*red).unwrap().tile();
        units
            .get_mut(*blue)
            .unwrap()
            .order_attack(AttackTarget::Unit(*red), approach);
    }
    let grid = Grid::new(40, 40).unwrap();
    let players = vec![
        Player::new(1, Coord::new(0, 0), 0, true),
        Player::new(2, Coord::new(39, 39), 0, false),
    ];
    let config = SimConfig::default();

    c.bench_function("melee_100_units_50_ticks", |b| {
        b.iter_batched(
            || (units.clone(), grid.clone(), players.clone()),
            |(mut units, mut grid, mut players)| {
                for tick in 1..=50 {
                    black_box(update_units(
                        &mut units,
                        &mut grid,
                        &mut players,
                        0.1,
                        tick,
                        &config,
                    ));
                }
                units
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_single_game,
    bench_single_game_8p,
    bench_tick_throughput,
    bench_melee
);
criterion_main!(benches);
