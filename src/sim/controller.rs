//! Game loop controller
//!
//! Owns the session state, the seeded RNG, the tulip id counter and the two
//! recurring tasks that drive a Playing session.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{GamePhase, GameState, Tulip, confetti_burst};
use super::tick::{FrameThrottle, step};
use crate::platform::{Haptics, NoHaptics, RecurringTask, TaskKind};
use crate::tuning::Tuning;

/// User intents emitted by the presentation shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start,
    Catch(u32),
    Reset,
}

/// The spawn timer and frame loop of the current Playing session
#[derive(Default)]
pub struct PlayingTasks {
    spawn: Option<Box<dyn RecurringTask>>,
    frame: Option<Box<dyn RecurringTask>>,
}

impl PlayingTasks {
    fn slot(&mut self, kind: TaskKind) -> &mut Option<Box<dyn RecurringTask>> {
        match kind {
            TaskKind::Spawn => &mut self.spawn,
            TaskKind::Frame => &mut self.frame,
        }
    }

    /// Register a task, cancelling any task of the same kind it replaces
    pub fn install(&mut self, kind: TaskKind, task: Box<dyn RecurringTask>) {
        if let Some(mut old) = self.slot(kind).replace(task) {
            old.cancel();
        }
    }

    pub fn is_running(&self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::Spawn => self.spawn.is_some(),
            TaskKind::Frame => self.frame.is_some(),
        }
    }

    pub fn cancel_all(&mut self) {
        for kind in [TaskKind::Spawn, TaskKind::Frame] {
            if let Some(mut task) = self.slot(kind).take() {
                task.cancel();
            }
        }
    }
}

impl Drop for PlayingTasks {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Drives one mini-game instance through NotStarted -> Playing -> Won
pub struct GameController<R: Rng = Pcg32> {
    state: GameState,
    tuning: Tuning,
    rng: R,
    /// Never reset, so element keys stay unique across sessions
    next_id: u32,
    throttle: FrameThrottle,
    tasks: PlayingTasks,
    haptics: Box<dyn Haptics>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl GameController<Pcg32> {
    /// Create a controller with default tuning and a seeded PCG generator
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed), Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed), tuning)
    }
}

impl<R: Rng> GameController<R> {
    pub fn with_rng(rng: R, tuning: Tuning) -> Self {
        Self {
            state: GameState::default(),
            tuning,
            rng,
            next_id: 0,
            throttle: FrameThrottle::default(),
            tasks: PlayingTasks::default(),
            haptics: Box::new(NoHaptics),
            on_complete: None,
        }
    }

    pub fn set_haptics(&mut self, haptics: impl Haptics + 'static) {
        self.haptics = Box::new(haptics);
    }

    /// Register the callback fired once when a session reaches the target
    pub fn on_complete(&mut self, callback: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    /// Begin a fresh session. Always resets, even mid-game.
    pub fn start(&mut self) {
        self.tasks.cancel_all();
        self.throttle.reset();
        self.state.clear();
        self.state.started = true;
        log::info!("Session started (next tulip id {})", self.next_id);
    }

    /// Return to the start screen
    pub fn reset(&mut self) {
        self.tasks.cancel_all();
        self.throttle.reset();
        self.state.clear();
        log::info!("Game reset");
    }

    /// Feed elapsed host time; moves tulips at most once per frame interval.
    ///
    /// Returns true if a movement step ran.
    pub fn tick(&mut self, elapsed_ms: f64) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        if !self.throttle.advance(elapsed_ms, self.tuning.frame_interval_ms) {
            return false;
        }
        self.step();
        true
    }

    /// Apply exactly one movement/pruning step
    pub fn step(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        let pruned = step(&mut self.state, &self.tuning);
        if pruned > 0 {
            log::trace!("{} tulip(s) fell off screen", pruned);
        }
    }

    /// Drop a new tulip from the top. Returns its id, or None outside Playing.
    pub fn spawn(&mut self) -> Option<u32> {
        if !self.state.is_playing() {
            return None;
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let tulip = Tulip::random(id, &self.tuning, &mut self.rng);
        log::debug!("Spawned tulip {} at x={:.1} speed={:.2}", id, tulip.x, tulip.speed);
        self.state.tulips.push(tulip);
        Some(id)
    }

    /// Catch a tulip by id. Unknown or already-removed ids are ignored.
    pub fn catch(&mut self, id: u32) -> bool {
        if !self.state.is_playing() || self.state.take_tulip(id).is_none() {
            return false;
        }
        self.state.score += 1;
        self.haptics.pulse(self.tuning.haptic_pulse_ms);
        log::debug!(
            "Caught tulip {} ({}/{})",
            id,
            self.state.score,
            self.tuning.target_score
        );

        if self.state.score >= self.tuning.target_score {
            self.win();
        }
        true
    }

    fn win(&mut self) {
        self.tasks.cancel_all();
        self.state.victory = true;
        self.state.tulips.clear();
        self.state.confetti = confetti_burst(self.tuning.confetti_count, &mut self.rng);
        log::info!("Victory! {} tulips caught", self.state.score);
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }

    pub fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::Start => self.start(),
            Intent::Catch(id) => {
                self.catch(id);
            }
            Intent::Reset => self.reset(),
        }
    }

    /// True when Playing but the spawn timer or frame loop is not installed
    pub fn needs_tasks(&self) -> bool {
        self.state.is_playing()
            && !(self.tasks.is_running(TaskKind::Spawn) && self.tasks.is_running(TaskKind::Frame))
    }

    /// Hand a recurring task to the controller. Outside Playing it is
    /// cancelled immediately.
    pub fn install_task(&mut self, kind: TaskKind, mut task: Box<dyn RecurringTask>) {
        if self.state.is_playing() {
            self.tasks.install(kind, task);
        } else {
            task.cancel();
        }
    }

    pub fn task_running(&self, kind: TaskKind) -> bool {
        self.tasks.is_running(kind)
    }

    /// Stop both recurring tasks without touching the session (host teardown)
    pub fn teardown(&mut self) {
        self.tasks.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct CountingHaptics(Rc<Cell<u32>>);

    impl Haptics for CountingHaptics {
        fn pulse(&self, _duration_ms: u32) -> bool {
            self.0.set(self.0.get() + 1);
            true
        }
    }

    struct FlagTask(Rc<Cell<bool>>);

    impl RecurringTask for FlagTask {
        fn cancel(&mut self) {
            self.0.set(true);
        }
    }

    fn flag_task() -> (Box<dyn RecurringTask>, Rc<Cell<bool>>) {
        let cancelled = Rc::new(Cell::new(false));
        (Box::new(FlagTask(cancelled.clone())), cancelled)
    }

    fn playing(seed: u64) -> GameController {
        let mut game = GameController::new(seed);
        game.start();
        game
    }

    #[test]
    fn test_start_enters_playing() {
        let mut game = GameController::new(1);
        assert_eq!(game.phase(), GamePhase::NotStarted);
        assert!(game.spawn().is_none());
        game.start();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.state().score, 0);
        assert!(game.state().tulips.is_empty());
    }

    #[test]
    fn test_spawn_ids_monotonic_across_sessions() {
        let mut game = playing(2);
        let a = game.spawn().unwrap();
        let b = game.spawn().unwrap();
        assert!(b > a);
        game.reset();
        game.start();
        let c = game.spawn().unwrap();
        assert!(c > b);
    }

    #[test]
    fn test_double_catch_counts_once() {
        let mut game = playing(3);
        let id = game.spawn().unwrap();
        assert!(game.catch(id));
        assert!(!game.catch(id));
        assert_eq!(game.state().score, 1);
    }

    #[test]
    fn test_catch_unknown_id_is_noop() {
        let mut game = playing(4);
        game.spawn();
        assert!(!game.catch(999));
        assert_eq!(game.state().score, 0);
        assert_eq!(game.state().tulips.len(), 1);
    }

    #[test]
    fn test_catch_pulses_haptics() {
        let pulses = Rc::new(Cell::new(0));
        let mut game = playing(5);
        game.set_haptics(CountingHaptics(pulses.clone()));
        let id = game.spawn().unwrap();
        game.catch(id);
        game.catch(id);
        assert_eq!(pulses.get(), 1);
    }

    #[test]
    fn test_ten_catches_win_once() {
        let fired = Rc::new(RefCell::new(0));
        let mut game = GameController::new(6);
        let counter = fired.clone();
        game.on_complete(move || *counter.borrow_mut() += 1);
        game.start();

        for i in 0..10 {
            assert!(!game.state().victory, "victory before catch {}", i + 1);
            let id = game.spawn().unwrap();
            game.catch(id);
        }

        assert_eq!(game.state().score, 10);
        assert!(game.state().victory);
        assert_eq!(game.phase(), GamePhase::Won);
        assert_eq!(game.state().confetti.len(), 50);
        assert_eq!(*fired.borrow(), 1);

        // Won is frozen
        assert!(game.spawn().is_none());
        assert!(!game.tick(100.0));
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn test_reset_does_not_fire_completion() {
        let fired = Rc::new(Cell::new(0));
        let mut game = GameController::new(7);
        let counter = fired.clone();
        game.on_complete(move || counter.set(counter.get() + 1));
        game.start();
        let id = game.spawn().unwrap();
        game.catch(id);
        game.reset();
        assert_eq!(fired.get(), 0);
        assert_eq!(game.phase(), GamePhase::NotStarted);
        assert_eq!(game.state().score, 0);
    }

    #[test]
    fn test_tick_throttled() {
        let mut game = playing(8);
        game.spawn();
        let y0 = game.state().tulips[0].y;
        assert!(!game.tick(5.0));
        assert!(!game.tick(5.0));
        assert_eq!(game.state().tulips[0].y, y0);
        assert!(game.tick(10.0));
        let t = &game.state().tulips[0];
        assert!((t.y - (y0 + t.speed)).abs() < 1e-5);
    }

    #[test]
    fn test_uncaught_tulip_falls_off() {
        let mut game = playing(9);
        let id = game.spawn().unwrap();
        // Slowest tulip needs (110 + 10) / 0.3 = 400 steps
        for _ in 0..401 {
            game.tick(17.0);
            assert!(game.state().tulips.iter().all(|t| t.y < 110.0));
        }
        assert!(game.state().tulip(id).is_none());
        assert_eq!(game.state().score, 0);
    }

    #[test]
    fn test_tasks_cancelled_on_win() {
        let mut game = GameController::with_tuning(
            10,
            Tuning {
                target_score: 1,
                ..Tuning::default()
            },
        );
        game.start();
        let (spawn, spawn_cancelled) = flag_task();
        let (frame, frame_cancelled) = flag_task();
        game.install_task(TaskKind::Spawn, spawn);
        game.install_task(TaskKind::Frame, frame);
        assert!(!game.needs_tasks());

        let id = game.spawn().unwrap();
        game.catch(id);
        assert!(spawn_cancelled.get());
        assert!(frame_cancelled.get());
        assert!(!game.task_running(TaskKind::Spawn));
        assert!(!game.needs_tasks());
    }

    #[test]
    fn test_tasks_cancelled_on_reset_and_restart() {
        let mut game = playing(11);
        let (spawn, cancelled) = flag_task();
        game.install_task(TaskKind::Spawn, spawn);
        game.reset();
        assert!(cancelled.get());

        game.start();
        let (frame, cancelled) = flag_task();
        game.install_task(TaskKind::Frame, frame);
        game.start();
        assert!(cancelled.get());
        assert!(game.needs_tasks());
    }

    #[test]
    fn test_install_outside_playing_cancels() {
        let mut game = GameController::new(12);
        let (task, cancelled) = flag_task();
        game.install_task(TaskKind::Spawn, task);
        assert!(cancelled.get());
        assert!(!game.task_running(TaskKind::Spawn));
    }

    #[test]
    fn test_drop_cancels_tasks() {
        let (task, cancelled) = flag_task();
        {
            let mut game = playing(13);
            game.install_task(TaskKind::Frame, task);
        }
        assert!(cancelled.get());
    }

    #[test]
    fn test_determinism() {
        let mut a = playing(99999);
        let mut b = playing(99999);
        for _ in 0..20 {
            a.spawn();
            b.spawn();
            a.tick(17.0);
            b.tick(17.0);
        }
        assert_eq!(a.state(), b.state());
    }
}
