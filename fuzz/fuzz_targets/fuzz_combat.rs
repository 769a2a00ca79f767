#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use skirmish::config::SimConfig;
use skirmish::game::{
    AttackTarget, BuildingKind, Coord, Grid, Player, UnitId, UnitKind, World, check_invariants,
};

/// One unit placed before the fight starts.
#[derive(Arbitrary, Debug)]
struct UnitSpec {
    /// 0 = infantry, 1 = tank, anything else = helicopter.
    kind: u8,
    /// Owner is 1 when false, 2 when true.
    blue: bool,
    x: u8,
    y: u8,
    /// Starting health override (clamped to the unit's max).
    health: i16,
    /// What to go after: a unit index, a building, or a plain move.
    order: Order,
}

#[derive(Arbitrary, Debug)]
enum Order {
    None,
    Unit(u8),
    Capital,
    Move(u8, u8),
}

/// Structured input for combat fuzzing.
#[derive(Arbitrary, Debug)]
struct CombatInput {
    units: Vec<UnitSpec>,
    /// Number of ticks to run.
    ticks: u8,
    /// Tick length in tenths of a second.
    dt_tenths: u8,
}

const SIZE: u16 = 16;

fuzz_target!(|input: CombatInput| {
    let Some(mut grid) = Grid::new(SIZE, SIZE) else {
        return;
    };
    let red_capital = Coord::new(1, 1);
    let blue_capital = Coord::new(SIZE - 3, SIZE - 3);
    if grid.place(red_capital, BuildingKind::CityHall, 1, 2).is_err()
        || grid.place(blue_capital, BuildingKind::CityHall, 2, 2).is_err()
    {
        return;
    }
    let players = vec![
        Player::new(1, red_capital, 0, true),
        Player::new(2, blue_capital, 0, false),
    ];
    let mut config = SimConfig::default();
    config.ai.base_interval_secs = 1.0e6;
    let mut world = World::new(grid, players, config, 0);

    // Cap inputs to keep iterations fast
    let specs = &input.units[..input.units.len().min(64)];
    let mut ids: Vec<UnitId> = Vec::with_capacity(specs.len());
    for spec in specs {
        let kind = match spec.kind {
            0 => UnitKind::Infantry,
            1 => UnitKind::Tank,
            _ => UnitKind::Helicopter,
        };
        let owner = if spec.blue { 2 } else { 1 };
        let x = f32::from(u16::from(spec.x) % SIZE);
        let y = f32::from(u16::from(spec.y) % SIZE);
        let id = world.units_mut().spawn(kind, owner, x, y);
        if let Some(unit) = world.units_mut().get_mut(id) {
            unit.health = i32::from(spec.health).min(unit.max_health);
        }
        ids.push(id);
    }

    for (spec, &id) in specs.iter().zip(&ids) {
        let owner = if spec.blue { 2 } else { 1 };
        let order = match spec.order {
            Order::None => None,
            Order::Unit(i) => {
                let target = ids[usize::from(i) % ids.len()];
                world
                    .units()
                    .get(target)
                    .map(|t| (AttackTarget::Unit(target), t.tile()))
            }
            Order::Capital => {
                let origin = if owner == 1 { blue_capital } else { red_capital };
                Some((AttackTarget::Building { origin }, origin))
            }
            Order::Move(x, y) => {
                let dest = Coord::new(u16::from(x) % SIZE, u16::from(y) % SIZE);
                if let Some(unit) = world.units_mut().get_mut(id) {
                    unit.order_move(dest);
                }
                None
            }
        };
        if let (Some((target, approach)), Some(unit)) = (order, world.units_mut().get_mut(id)) {
            unit.order_attack(target, approach);
        }
    }

    let dt = f32::from(input.dt_tenths % 30 + 1) / 10.0;
    for _ in 0..input.ticks.min(120) {
        world = world.tick(dt);

        let violations = check_invariants(&world);
        assert!(violations.is_empty(), "invariants violated: {violations:?}");

        let killed: u32 = world.players().iter().map(|p| p.units_killed).sum();
        let lost: u32 = world.players().iter().map(|p| p.units_lost).sum();
        assert_eq!(killed, lost, "kill tallies diverged");

        if world.is_over() {
            break;
        }
    }
});
