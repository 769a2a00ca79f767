#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use skirmish::config::SimConfig;
use skirmish::game::{Command, Coord, SelectionRect, Speed, UnitId, UnitKind, check_invariants};
use skirmish::session::Session;

/// A single input event or a tick.
#[derive(Arbitrary, Debug)]
enum Step {
    Tick,
    Enqueue { player: u8, kind: u8 },
    Select(Vec<u16>),
    SelectBox { x0: u8, y0: u8, x1: u8, y1: u8 },
    Move { x: u8, y: u8 },
    Attack { x: u8, y: u8 },
    Speed(u8),
    Restart,
}

/// Structured input for command fuzzing.
#[derive(Arbitrary, Debug)]
struct CommandInput {
    seed: u64,
    autopilot: bool,
    steps: Vec<Step>,
}

fn to_command(step: &Step) -> Option<Command> {
    Some(match *step {
        Step::Tick => return None,
        Step::Enqueue { player, kind } => Command::EnqueueProduction {
            player,
            kind: match kind % 3 {
                0 => UnitKind::Infantry,
                1 => UnitKind::Tank,
                _ => UnitKind::Helicopter,
            },
        },
        Step::Select(ref ids) => {
            Command::SetSelection(ids.iter().take(32).map(|&i| UnitId(u32::from(i))).collect())
        }
        Step::SelectBox { x0, y0, x1, y1 } => Command::SetSelectionBox(SelectionRect::new(
            f32::from(x0),
            f32::from(y0),
            f32::from(x1),
            f32::from(y1),
        )),
        Step::Move { x, y } => Command::MoveSelected(Coord::new(u16::from(x), u16::from(y))),
        Step::Attack { x, y } => Command::AttackSelected(Coord::new(u16::from(x), u16::from(y))),
        Step::Speed(s) => Command::SetSpeed(match s % 4 {
            0 => Speed::Paused,
            1 => Speed::Normal,
            2 => Speed::Fast,
            _ => Speed::VeryFast,
        }),
        Step::Restart => Command::Restart,
    })
}

fuzz_target!(|input: CommandInput| {
    let config = SimConfig {
        map_width: 32,
        map_height: 32,
        autopilot_human: input.autopilot,
        ..SimConfig::default()
    };
    let Ok(mut session) = Session::new(input.seed, config) else {
        return;
    };

    for step in input.steps.iter().take(512) {
        match to_command(step) {
            Some(command) => {
                let before = session.world().players().to_vec();
                let result = session.apply(command.clone());
                // Rejected world commands must not touch player state
                if result.is_err() {
                    assert_eq!(before, session.world().players(), "{command:?} mutated on error");
                }
            }
            None => session.step(0.1),
        }

        let violations = check_invariants(session.world());
        assert!(violations.is_empty(), "invariants violated: {violations:?}");
    }
});
