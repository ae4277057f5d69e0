// Native integration tests for the tulip-catcher game loop.
// Everything here runs on the host: no browser, no wasm.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use tulip_catcher::consts::{OFFSCREEN_Y, TARGET_SCORE};
use tulip_catcher::platform::{RecurringTask, TaskKind};
use tulip_catcher::ui::{Screen, build};
use tulip_catcher::{GameController, GamePhase, Intent};

fn counting_controller(seed: u64) -> (GameController, Rc<Cell<u32>>) {
    let fired = Rc::new(Cell::new(0));
    let mut game = GameController::new(seed);
    let counter = fired.clone();
    game.on_complete(move || counter.set(counter.get() + 1));
    (game, fired)
}

struct Recorder(Rc<Cell<u32>>);

impl RecurringTask for Recorder {
    fn cancel(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn ten_spawn_catch_pairs_win_exactly_once() {
    let (mut game, fired) = counting_controller(2024);
    game.dispatch(Intent::Start);

    for _ in 0..10 {
        let id = game.spawn().expect("spawn while playing");
        game.dispatch(Intent::Catch(id));
    }

    assert_eq!(game.state().score, 10);
    assert!(game.state().victory);
    assert_eq!(fired.get(), 1);
}

#[test]
fn uncaught_tulip_leaves_play_area() {
    let mut game = GameController::new(5);
    game.start();
    let id = game.spawn().unwrap();

    let mut ticks = 0;
    while game.state().tulip(id).is_some() {
        game.tick(20.0);
        ticks += 1;
        assert!(ticks < 1000, "tulip never fell off");
    }

    assert_eq!(game.state().score, 0);
    for _ in 0..10 {
        game.tick(20.0);
        assert!(game.state().tulip(id).is_none());
    }
}

#[test]
fn reset_then_start_is_clean() {
    let (mut game, fired) = counting_controller(77);
    game.start();
    for _ in 0..TARGET_SCORE {
        let id = game.spawn().unwrap();
        game.catch(id);
    }
    assert_eq!(game.phase(), GamePhase::Won);

    game.dispatch(Intent::Reset);
    assert_eq!(game.phase(), GamePhase::NotStarted);
    game.dispatch(Intent::Start);

    assert_eq!(game.state().score, 0);
    assert!(game.state().tulips.is_empty());
    assert!(!game.state().victory);
    assert!(game.state().confetti.is_empty());
    assert_eq!(fired.get(), 1);

    // A second winning session fires again, once
    for _ in 0..TARGET_SCORE {
        let id = game.spawn().unwrap();
        game.catch(id);
    }
    assert_eq!(fired.get(), 2);
}

#[test]
fn won_only_leaves_through_reset() {
    let mut game = GameController::new(8);
    game.start();
    for _ in 0..TARGET_SCORE {
        let id = game.spawn().unwrap();
        game.catch(id);
    }
    game.dispatch(Intent::Catch(0));
    assert!(game.spawn().is_none());
    assert!(!game.tick(1000.0));
    assert_eq!(game.phase(), GamePhase::Won);
    assert_eq!(game.state().score, TARGET_SCORE);
}

#[test]
fn tasks_stop_on_every_exit_from_playing() {
    let cancels = Rc::new(Cell::new(0));
    let mut game = GameController::new(9);

    game.start();
    game.install_task(TaskKind::Spawn, Box::new(Recorder(cancels.clone())));
    game.install_task(TaskKind::Frame, Box::new(Recorder(cancels.clone())));
    game.reset();
    assert_eq!(cancels.get(), 2);

    game.start();
    game.install_task(TaskKind::Spawn, Box::new(Recorder(cancels.clone())));
    game.install_task(TaskKind::Frame, Box::new(Recorder(cancels.clone())));
    for _ in 0..TARGET_SCORE {
        let id = game.spawn().unwrap();
        game.catch(id);
    }
    assert_eq!(cancels.get(), 4);

    game.start();
    game.install_task(TaskKind::Spawn, Box::new(Recorder(cancels.clone())));
    game.teardown();
    assert_eq!(cancels.get(), 5);
}

#[test]
fn view_follows_session() {
    let mut game = GameController::new(10);
    assert!(matches!(build(game.state(), game.tuning(), false), Screen::Start(_)));

    game.start();
    let id = game.spawn().unwrap();
    let Screen::Playing(view) = build(game.state(), game.tuning(), false) else {
        panic!("expected playing screen");
    };
    assert_eq!(view.tulips[0].id, id);

    for _ in 0..TARGET_SCORE {
        let id = game.spawn().unwrap();
        game.catch(id);
    }
    assert!(matches!(build(game.state(), game.tuning(), false), Screen::Victory(_)));
}

#[derive(Debug, Clone)]
enum Op {
    Spawn,
    Tick(f64),
    CatchNewest,
    CatchOldest,
    CatchStale,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Spawn),
        4 => (0.0f64..40.0).prop_map(Op::Tick),
        2 => Just(Op::CatchNewest),
        1 => Just(Op::CatchOldest),
        1 => Just(Op::CatchStale),
    ]
}

proptest! {
    #[test]
    fn session_invariants_hold(seed in any::<u64>(), ops in prop::collection::vec(op(), 0..400)) {
        let (mut game, fired) = counting_controller(seed);
        game.start();
        let mut last_score = 0;
        let mut last_caught = None;

        for op in ops {
            match op {
                Op::Spawn => {
                    game.spawn();
                }
                Op::Tick(ms) => {
                    game.tick(ms);
                }
                Op::CatchNewest => {
                    if let Some(id) = game.state().tulips.last().map(|t| t.id) {
                        game.catch(id);
                        last_caught = Some(id);
                    }
                }
                Op::CatchOldest => {
                    if let Some(id) = game.state().tulips.first().map(|t| t.id) {
                        game.catch(id);
                        last_caught = Some(id);
                    }
                }
                Op::CatchStale => {
                    if let Some(id) = last_caught {
                        let before = game.state().score;
                        prop_assert!(!game.catch(id));
                        prop_assert_eq!(game.state().score, before);
                    }
                }
            }

            let state = game.state();
            prop_assert!(state.tulips.iter().all(|t| t.y < OFFSCREEN_Y));
            prop_assert!(state.score >= last_score);
            prop_assert!(state.score <= TARGET_SCORE);
            prop_assert_eq!(state.victory, state.score >= TARGET_SCORE);
            prop_assert_eq!(fired.get(), u32::from(state.victory));
            last_score = state.score;
        }
    }

    #[test]
    fn ids_never_repeat(seed in any::<u64>(), sessions in 1usize..5, per_session in 0usize..30) {
        let mut game = GameController::new(seed);
        let mut last = None;
        for _ in 0..sessions {
            game.start();
            for _ in 0..per_session {
                let id = game.spawn().unwrap();
                if let Some(prev) = last {
                    prop_assert!(id > prev);
                }
                last = Some(id);
            }
            game.reset();
        }
    }
}
