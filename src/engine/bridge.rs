//! Host bridge: scoreboard plus the callbacks the surrounding UI registers

use std::fmt;

/// Counters owned by the loop controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scoreboard {
    pub score: u32,
    /// Second player's score (Pong)
    pub rival_score: u32,
    /// `None` for games without lives
    pub lives: Option<u32>,
    pub level: u32,
}

impl Scoreboard {
    pub fn new(lives: Option<u32>) -> Self {
        Self {
            score: 0,
            rival_score: 0,
            lives,
            level: 1,
        }
    }
}

type ScoreFn = Box<dyn FnMut(&Scoreboard)>;
type CountFn = Box<dyn FnMut(u32)>;
type FlagFn = Box<dyn FnMut(bool)>;
type NotifyFn = Box<dyn FnMut()>;

/// Synchronous change notifications
///
/// Every callback is optional; an unset one is simply skipped.
#[derive(Default)]
pub struct HostBridge {
    on_score: Option<ScoreFn>,
    on_lives: Option<CountFn>,
    on_running: Option<FlagFn>,
    on_level: Option<CountFn>,
    on_exit: Option<NotifyFn>,
}

impl fmt::Debug for HostBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBridge")
            .field("on_score", &self.on_score.is_some())
            .field("on_lives", &self.on_lives.is_some())
            .field("on_running", &self.on_running.is_some())
            .field("on_level", &self.on_level.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

impl HostBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_score(mut self, f: impl FnMut(&Scoreboard) + 'static) -> Self {
        self.on_score = Some(Box::new(f));
        self
    }

    pub fn on_lives(mut self, f: impl FnMut(u32) + 'static) -> Self {
        self.on_lives = Some(Box::new(f));
        self
    }

    pub fn on_running(mut self, f: impl FnMut(bool) + 'static) -> Self {
        self.on_running = Some(Box::new(f));
        self
    }

    pub fn on_level(mut self, f: impl FnMut(u32) + 'static) -> Self {
        self.on_level = Some(Box::new(f));
        self
    }

    pub fn on_exit(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }

    pub(crate) fn score_changed(&mut self, board: &Scoreboard) {
        if let Some(f) = self.on_score.as_mut() {
            f(board);
        }
    }

    pub(crate) fn lives_changed(&mut self, lives: u32) {
        if let Some(f) = self.on_lives.as_mut() {
            f(lives);
        }
    }

    pub(crate) fn running_changed(&mut self, running: bool) {
        if let Some(f) = self.on_running.as_mut() {
            f(running);
        }
    }

    pub(crate) fn level_changed(&mut self, level: u32) {
        if let Some(f) = self.on_level.as_mut() {
            f(level);
        }
    }

    pub(crate) fn exited(&mut self) {
        if let Some(f) = self.on_exit.as_mut() {
            f();
        }
    }
}
