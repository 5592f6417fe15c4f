//! Game loop controller
//!
//! `Engine<G>` drives one game through the lifecycle
//! `idle -> running <-> paused`, `running -> ended`. Each delivered frame runs,
//! in order: Exit, the fixed-step simulation ticks (intents, integrate,
//! collide, spawn, effects) with scoreboard updates, Pause, render, and a
//! re-schedule while still running.
//!
//! Input handlers never touch the game. They record into the
//! `InputAdapter` and, when the loop is parked, ask for one frame so a
//! pending Restart/Pause/Exit gets seen.

pub mod bridge;
pub mod clock;
pub mod scheduler;

pub use bridge::{HostBridge, Scoreboard};
pub use clock::FrameClock;
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler, pump};

use glam::Vec2;
use log::{debug, info, warn};

use crate::catalog::GameKind;
use crate::error::InitError;
use crate::games::{Game, GameConfig, GameEvent, Setup, Side, advance};
use crate::input::{InputAdapter, Intent, Intents, Key};
use crate::renderer::{Framebuffer, RenderStyle, Scene, render_frame};
use crate::settings::Settings;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    GameOver,
    Victory,
}

/// Loop controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Ended(Outcome),
}

impl RunState {
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }

    pub fn is_ended(self) -> bool {
        matches!(self, RunState::Ended(_))
    }
}

/// Uniform lifecycle over every game, usable as `Box<dyn Cabinet>`
pub trait Cabinet {
    fn kind(&self) -> GameKind;

    /// Bind a surface and host callbacks and build the game
    fn init(&mut self, surface: Option<Framebuffer>, bridge: HostBridge) -> Result<(), InitError>;

    fn start(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    fn reset_game(&mut self);

    /// Deliver a frame requested from the scheduler
    fn on_frame(&mut self, handle: FrameHandle, now_ms: f64);

    fn handle_key_down(&mut self, key: Key);

    fn handle_key_up(&mut self, key: Key);

    fn move_pointer(&mut self, pos: Vec2);

    fn tap(&mut self, pos: Vec2);

    fn surface(&self) -> Option<&Framebuffer>;

    fn run_state(&self) -> RunState;

    fn scoreboard(&self) -> &Scoreboard;
}

pub struct Engine<G: Game> {
    config: G::Config,
    seed: u64,
    max_particles: usize,
    style: RenderStyle,
    game: Option<G>,
    surface: Option<Framebuffer>,
    bridge: HostBridge,
    input: InputAdapter,
    scheduler: Box<dyn FrameScheduler>,
    pending: Option<FrameHandle>,
    clock: FrameClock,
    state: RunState,
    board: Scoreboard,
    /// The game hit a terminal state and must be reset before it runs again
    needs_reset: bool,
    events: Vec<GameEvent>,
}

impl<G: Game + Scene> Engine<G> {
    pub fn new(config: G::Config, settings: &Settings, scheduler: Box<dyn FrameScheduler>) -> Self {
        Self {
            config,
            seed: settings.seed.unwrap_or_else(rand::random),
            max_particles: settings.max_particles(),
            style: settings.render_style(),
            game: None,
            surface: None,
            bridge: HostBridge::default(),
            input: InputAdapter::new(),
            scheduler,
            pending: None,
            clock: FrameClock::new(),
            state: RunState::Idle,
            board: Scoreboard::default(),
            needs_reset: false,
            events: Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.game.is_some()
    }

    pub fn game(&self) -> Option<&G> {
        self.game.as_ref()
    }

    /// Direct access for hosts and tests that stage a situation
    pub fn game_mut(&mut self) -> Option<&mut G> {
        self.game.as_mut()
    }

    fn schedule(&mut self) {
        if self.pending.is_none() {
            self.pending = self.scheduler.request_frame();
            if self.pending.is_none() {
                warn!("{}: host refused a frame; waiting for the next start or input", G::KIND.name());
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Ask for a frame so queued input is looked at, also after a refused frame
    fn wake(&mut self) {
        if self.game.is_some() && self.input.has_pending() {
            self.schedule();
        }
    }

    fn publish_board(&mut self) {
        self.bridge.score_changed(&self.board);
        if let Some(lives) = self.board.lives {
            self.bridge.lives_changed(lives);
        }
    }

    fn restore(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        game.reset();
        self.board = Scoreboard::new(game.starting_lives());
        self.needs_reset = false;
        self.clock.reset();
        self.input.clear();
        self.publish_board();
    }

    fn render(&mut self) {
        let Some(fb) = self.surface.as_mut() else {
            warn!("{}: no surface, frame skipped", G::KIND.name());
            return;
        };
        render_frame(fb, self.game.as_ref(), self.state, &self.board, self.style);
    }

    fn end(&mut self, outcome: Outcome) {
        info!(
            "{}: {:?} with score {} (level {})",
            G::KIND.name(),
            outcome,
            self.board.score,
            self.board.level
        );
        self.state = RunState::Ended(outcome);
        self.needs_reset = true;
        self.bridge.running_changed(false);
    }

    fn apply_event(&mut self, event: GameEvent) {
        if self.state.is_ended() {
            return;
        }
        match event {
            GameEvent::Scored { points, side } => {
                match side {
                    Side::Home => self.board.score = self.board.score.saturating_add(points),
                    Side::Away => self.board.rival_score = self.board.rival_score.saturating_add(points),
                }
                self.bridge.score_changed(&self.board);
            }
            GameEvent::LifeLost => match self.board.lives {
                Some(lives) => {
                    let lives = lives.saturating_sub(1);
                    self.board.lives = Some(lives);
                    self.bridge.lives_changed(lives);
                    if lives == 0 {
                        self.end(Outcome::GameOver);
                    }
                }
                None => self.end(Outcome::GameOver),
            },
            GameEvent::Defeated => {
                if let Some(lives) = self.board.lives.filter(|&l| l > 0) {
                    debug!("{}: defeated with {} lives left", G::KIND.name(), lives);
                    self.board.lives = Some(0);
                    self.bridge.lives_changed(0);
                }
                self.end(Outcome::GameOver);
            }
            GameEvent::LevelCleared { level } => {
                info!("{}: level {}", G::KIND.name(), level);
                self.board.level = level;
                self.bridge.level_changed(level);
            }
            GameEvent::Won => self.end(Outcome::Victory),
        }
    }

    /// Controller intents while parked; returns true if any was acted on
    fn parked_controls(&mut self, intents: &Intents) -> bool {
        for &intent in intents.pressed() {
            let act = match (self.state, intent) {
                (_, Intent::Exit) => {
                    self.exit();
                    return true;
                }
                (RunState::Idle, Intent::Restart | Intent::Shoot | Intent::Jump) => true,
                (RunState::Ended(_), Intent::Restart | Intent::Shoot) => true,
                (RunState::Paused, Intent::Pause | Intent::Restart) => true,
                _ => false,
            };
            if act {
                self.start();
                return true;
            }
        }
        let tap_starts = matches!(self.state, RunState::Idle | RunState::Ended(_));
        if tap_starts && !intents.taps().is_empty() {
            self.start();
            return true;
        }
        false
    }

    fn exit(&mut self) {
        info!("{}: exit requested", G::KIND.name());
        self.stop();
        self.bridge.exited();
    }

    /// One running frame: controls, then up to `MAX_SUBSTEPS` ticks
    fn step(&mut self, now_ms: f64) {
        let ticks = self.clock.advance(now_ms);
        if ticks == 0 {
            return;
        }
        let intents = self.input.take();
        if intents.was_pressed(Intent::Exit) {
            self.exit();
            return;
        }
        let pause = intents.was_pressed(Intent::Pause);

        let rest = intents.held_only();
        let mut events = std::mem::take(&mut self.events);
        for i in 0..ticks {
            if !self.state.is_running() {
                break;
            }
            let Some(game) = self.game.as_mut() else {
                break;
            };
            let snapshot = if i == 0 { &intents } else { &rest };
            advance(game, snapshot, &mut events);
            for event in events.drain(..) {
                self.apply_event(event);
            }
        }
        self.events = events;

        // Presses that came with the pause still got their tick
        if pause {
            self.pause();
        }
    }
}

impl<G: Game + Scene> Cabinet for Engine<G> {
    fn kind(&self) -> GameKind {
        G::KIND
    }

    fn init(&mut self, surface: Option<Framebuffer>, bridge: HostBridge) -> Result<(), InitError> {
        let Some(surface) = surface else {
            warn!("{}: init without a surface", G::KIND.name());
            return Err(InitError::MissingSurface);
        };
        let (width, height) = (surface.width(), surface.height());
        if width == 0 || height == 0 {
            return Err(InitError::InvalidSurface { width, height });
        }
        let setup = Setup::new(width, height, self.seed).with_particles(self.max_particles);
        self.config.validate_for(&setup)?;

        // Re-init replaces the previous binding entirely
        self.stop();

        let game = G::new(self.config.clone(), &setup);
        self.board = Scoreboard::new(game.starting_lives());
        self.game = Some(game);
        self.surface = Some(surface);
        self.bridge = bridge;
        self.state = RunState::Idle;
        self.needs_reset = false;
        self.clock.reset();
        self.input.attach();

        info!("{}: initialized {}x{} (seed {})", G::KIND.name(), width, height, self.seed);
        self.publish_board();
        self.render();
        Ok(())
    }

    fn start(&mut self) {
        if self.game.is_none() {
            warn!("{}: start() before init ignored", G::KIND.name());
            return;
        }
        if self.state.is_running() {
            // A refused frame leaves the loop running with nothing queued
            self.schedule();
            return;
        }
        if self.needs_reset {
            self.restore();
        }
        self.input.attach();
        self.clock.reset();
        self.state = RunState::Running;
        self.schedule();
        info!("{}: running", G::KIND.name());
        self.bridge.running_changed(true);
    }

    fn pause(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.cancel_pending();
        self.state = RunState::Paused;
        info!("{}: paused", G::KIND.name());
        self.bridge.running_changed(false);
        self.render();
    }

    fn stop(&mut self) {
        self.cancel_pending();
        self.input.detach();
        if self.game.is_none() {
            return;
        }
        let was_running = self.state.is_running();
        self.state = RunState::Idle;
        if was_running {
            info!("{}: stopped", G::KIND.name());
            self.bridge.running_changed(false);
        }
    }

    fn reset_game(&mut self) {
        if self.game.is_none() {
            warn!("{}: reset before init ignored", G::KIND.name());
            return;
        }
        self.restore();
        if self.state.is_ended() {
            self.state = RunState::Idle;
        }
        self.render();
    }

    fn on_frame(&mut self, handle: FrameHandle, now_ms: f64) {
        if self.pending != Some(handle) {
            debug!("{}: stale frame {:?} dropped", G::KIND.name(), handle);
            return;
        }
        self.pending = None;
        if self.game.is_none() {
            return;
        }

        if self.state.is_running() {
            self.step(now_ms);
        } else {
            let intents = self.input.take();
            self.parked_controls(&intents);
        }

        self.render();
        if self.state.is_running() {
            self.schedule();
        }
    }

    fn handle_key_down(&mut self, key: Key) {
        let Some(intent) = self.game.as_ref().and_then(|g| g.key_map(key)) else {
            return;
        };
        self.input.press(key, intent);
        self.wake();
    }

    fn handle_key_up(&mut self, key: Key) {
        self.input.release(key);
    }

    fn move_pointer(&mut self, pos: Vec2) {
        self.input.move_pointer(pos);
    }

    fn tap(&mut self, pos: Vec2) {
        self.input.tap(pos);
        self.wake();
    }

    fn surface(&self) -> Option<&Framebuffer> {
        self.surface.as_ref()
    }

    fn run_state(&self) -> RunState {
        self.state
    }

    fn scoreboard(&self) -> &Scoreboard {
        &self.board
    }
}

impl<G: Game> Drop for Engine<G> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::consts::SIM_DT_MS;
    use crate::games::{BrickBreaker, FlappyBird, Maze, Snake};

    fn settings() -> Settings {
        Settings {
            seed: Some(7),
            ..Settings::default()
        }
    }

    fn engine<G: Game + Scene>(config: G::Config) -> (Engine<G>, ManualScheduler) {
        let sched = ManualScheduler::new();
        let (w, h) = G::KIND.surface_size();
        let mut e = Engine::<G>::new(config, &settings(), Box::new(sched.clone()));
        e.init(Some(Framebuffer::new(w, h)), HostBridge::new()).expect("init");
        (e, sched)
    }

    #[test]
    fn test_init_errors() {
        let sched = ManualScheduler::new();
        let mut e = Engine::<Snake>::new(Default::default(), &settings(), Box::new(sched.clone()));
        assert!(matches!(e.init(None, HostBridge::new()), Err(InitError::MissingSurface)));
        assert!(matches!(
            e.init(Some(Framebuffer::new(0, 10)), HostBridge::new()),
            Err(InitError::InvalidSurface { width: 0, height: 10 })
        ));
        assert!(!e.is_initialized());

        // Start on an uninitialized engine does nothing
        e.start();
        assert_eq!(e.run_state(), RunState::Idle);
        assert_eq!(sched.requested(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = crate::games::SnakeConfig {
            grid_size: 0,
            ..Default::default()
        };
        let mut e = Engine::<Snake>::new(config, &settings(), Box::new(ManualScheduler::new()));
        let err = e.init(Some(Framebuffer::new(400, 400)), HostBridge::new());
        assert!(matches!(err, Err(InitError::InvalidConfig(_))));
    }

    #[test]
    fn test_layout_too_big_for_surface_rejected() {
        let sched = ManualScheduler::new();
        let mut e = Engine::<FlappyBird>::new(Default::default(), &settings(), Box::new(sched.clone()));
        let err = e.init(Some(Framebuffer::new(800, 150)), HostBridge::new());
        assert!(matches!(err, Err(InitError::InvalidConfig(_))));
        assert!(!e.is_initialized());
        e.start();
        assert_eq!(sched.requested(), 0);

        e.init(Some(Framebuffer::new(800, 600)), HostBridge::new()).expect("init");
        assert!(e.is_initialized());
    }

    /// Hands out frames from a `ManualScheduler` unless told to refuse
    struct RefusingScheduler {
        inner: ManualScheduler,
        refuse: Rc<Cell<bool>>,
    }

    impl FrameScheduler for RefusingScheduler {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            if self.refuse.get() {
                None
            } else {
                self.inner.request_frame()
            }
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.inner.cancel_frame(handle);
        }
    }

    #[test]
    fn test_refused_frame_is_requested_again() {
        let sched = ManualScheduler::new();
        let refuse = Rc::new(Cell::new(true));
        let host = RefusingScheduler {
            inner: sched.clone(),
            refuse: refuse.clone(),
        };
        let mut e = Engine::<Snake>::new(Default::default(), &settings(), Box::new(host));
        e.init(Some(Framebuffer::new(400, 400)), HostBridge::new()).expect("init");

        e.start();
        assert!(e.run_state().is_running());
        assert_eq!(e.pending, None);

        refuse.set(false);
        e.start();
        assert_eq!(sched.pending(), 1);
        pump(&mut e, &sched, 3, 0.0, SIM_DT_MS);
        assert_eq!(sched.pending(), 1);

        // Refused mid-run, then the next key asks again
        refuse.set(true);
        pump(&mut e, &sched, 1, 100.0, SIM_DT_MS);
        assert_eq!(sched.pending(), 0);
        refuse.set(false);
        e.handle_key_down(Key::Up);
        assert_eq!(sched.pending(), 1);
        pump(&mut e, &sched, 1, 200.0, SIM_DT_MS);
        assert!(e.run_state().is_running());
    }

    #[test]
    fn test_tap_restarts_after_crash() {
        let (mut e, sched) = engine::<FlappyBird>(Default::default());
        e.start();
        e.game_mut().expect("game").bird.pos.y = 575.0;
        pump(&mut e, &sched, 1, 0.0, SIM_DT_MS);
        assert_eq!(e.run_state(), RunState::Ended(Outcome::GameOver));
        assert_eq!(sched.pending(), 0);

        e.tap(glam::Vec2::new(400.0, 300.0));
        assert_eq!(sched.pending(), 1);
        pump(&mut e, &sched, 1, 1_000.0, SIM_DT_MS);
        assert!(e.run_state().is_running());
        let game = e.game().expect("game");
        assert!(!game.crashed());
        assert_eq!(game.bird.pos.y, 300.0);
    }

    #[test]
    fn test_jump_pressed_with_pause_still_lands() {
        let (mut e, sched) = engine::<FlappyBird>(Default::default());
        e.start();
        pump(&mut e, &sched, 1, 0.0, SIM_DT_MS);
        assert!(e.game().expect("game").bird.vel.y > 0.0);

        e.handle_key_down(Key::Space);
        e.handle_key_down(Key::P);
        pump(&mut e, &sched, 1, 100.0, SIM_DT_MS);
        assert_eq!(e.run_state(), RunState::Paused);
        assert!(e.game().expect("game").bird.vel.y < 0.0);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_double_start_schedules_once() {
        let (mut e, sched) = engine::<BrickBreaker>(Default::default());
        e.start();
        e.start();
        assert_eq!(sched.pending(), 1);
        pump(&mut e, &sched, 5, 0.0, SIM_DT_MS);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_stop_cancels_and_stale_frames_are_ignored() {
        let (mut e, sched) = engine::<FlappyBird>(Default::default());
        e.start();
        pump(&mut e, &sched, 3, 0.0, SIM_DT_MS);
        let handle = e.pending.expect("scheduled");
        let bird = e.game().expect("game").bird.pos;

        e.stop();
        assert_eq!(sched.pending(), 0);
        e.on_frame(handle, 1_000.0);
        assert_eq!(e.game().expect("game").bird.pos, bird);
        assert_eq!(e.run_state(), RunState::Idle);
    }

    #[test]
    fn test_running_callbacks() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let sched = ManualScheduler::new();
        let mut e = Engine::<Maze>::new(Default::default(), &settings(), Box::new(sched.clone()));
        e.init(
            Some(Framebuffer::new(320, 320)),
            HostBridge::new().on_running(move |r| log.borrow_mut().push(r)),
        )
        .expect("init");
        e.start();
        e.pause();
        e.start();
        e.stop();
        e.stop();
        assert_eq!(*seen.borrow(), vec![true, false, true, false]);
    }

    #[test]
    fn test_pause_key_round_trip() {
        let (mut e, sched) = engine::<BrickBreaker>(Default::default());
        e.start();
        pump(&mut e, &sched, 2, 0.0, SIM_DT_MS);

        e.handle_key_down(Key::P);
        e.handle_key_up(Key::P);
        pump(&mut e, &sched, 1, 100.0, SIM_DT_MS);
        assert_eq!(e.run_state(), RunState::Paused);
        assert_eq!(sched.pending(), 0);

        // While paused the key wakes the loop for one frame
        e.handle_key_down(Key::P);
        assert_eq!(sched.pending(), 1);
        pump(&mut e, &sched, 1, 200.0, SIM_DT_MS);
        assert_eq!(e.run_state(), RunState::Running);
    }

    #[test]
    fn test_lives_run_out_and_restart() {
        let (mut e, sched) = engine::<BrickBreaker>(Default::default());
        e.start();
        for i in 0..3 {
            let game = e.game_mut().expect("game");
            game.ball.pos = glam::Vec2::new(400.0, 599.0);
            game.ball.vel = glam::Vec2::new(0.0, 5.0);
            pump(&mut e, &sched, 1, i as f64 * 100.0, SIM_DT_MS);
        }
        assert_eq!(e.scoreboard().lives, Some(0));
        assert_eq!(e.run_state(), RunState::Ended(Outcome::GameOver));
        assert_eq!(sched.pending(), 0);

        e.handle_key_down(Key::Enter);
        pump(&mut e, &sched, 1, 10_000.0, SIM_DT_MS);
        assert_eq!(e.run_state(), RunState::Running);
        assert_eq!(e.scoreboard().lives, Some(3));
        assert_eq!(e.scoreboard().score, 0);
    }

    #[test]
    fn test_exit_stops_and_notifies() {
        let exited = Rc::new(RefCell::new(false));
        let flag = exited.clone();
        let sched = ManualScheduler::new();
        let mut e = Engine::<Snake>::new(Default::default(), &settings(), Box::new(sched.clone()));
        e.init(Some(Framebuffer::new(400, 400)), HostBridge::new().on_exit(move || *flag.borrow_mut() = true))
            .expect("init");
        e.start();
        e.handle_key_down(Key::Escape);
        pump(&mut e, &sched, 1, 0.0, SIM_DT_MS);
        assert!(*exited.borrow());
        assert_eq!(e.run_state(), RunState::Idle);
        assert_eq!(sched.pending(), 0);

        // Detached: further keys do nothing
        e.handle_key_down(Key::Enter);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_render_without_surface_is_skipped() {
        let (mut e, sched) = engine::<Snake>(Default::default());
        e.surface = None;
        e.start();
        pump(&mut e, &sched, 3, 0.0, SIM_DT_MS);
        assert!(e.run_state().is_running());
    }
}
