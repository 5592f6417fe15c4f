//! Game simulations
//!
//! Each game is a plain state struct driven one fixed tick at a time by
//! [`advance`]. Games never touch score, lives or level: they report what
//! happened as [`GameEvent`]s and the loop controller owns the scoreboard.

use std::fmt::Debug;

use crate::catalog::GameKind;
use crate::error::ConfigError;
use crate::input::{Intent, Intents, Key, default_key_map};

pub mod alien_invaders;
pub mod brick_breaker;
pub mod candy_crush;
pub mod flappy_bird;
pub mod maze;
pub mod memory_match;
pub mod pong;
pub mod slot_machine;
pub mod snake;

pub use alien_invaders::{AlienInvaders, AlienInvadersConfig};
pub use brick_breaker::{BrickBreaker, BrickBreakerConfig};
pub use candy_crush::{CandyCrush, CandyCrushConfig};
pub use flappy_bird::{FlappyBird, FlappyBirdConfig};
pub use maze::{Maze, MazeConfig};
pub use memory_match::{MemoryMatch, MemoryMatchConfig};
pub use pong::{Pong, PongConfig};
pub use slot_machine::{SlotMachine, SlotMachineConfig};
pub use snake::{Snake, SnakeConfig};

/// Which player an award belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Single player, or player one
    Home,
    /// Player two (Pong's right paddle)
    Away,
}

/// Something that happened during a tick that the scoreboard cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Scored { points: u32, side: Side },
    /// Lose-collision: one life gone
    LifeLost,
    /// Immediate failure regardless of lives
    Defeated,
    /// A level or wave was cleared; `level` is the one now being played
    LevelCleared { level: u32 },
    /// Terminal win
    Won,
}

impl GameEvent {
    pub fn scored(points: u32) -> Self {
        GameEvent::Scored {
            points,
            side: Side::Home,
        }
    }
}

/// Playfield and runtime knobs handed to a game when it is built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setup {
    pub width: f32,
    pub height: f32,
    pub seed: u64,
    /// Particle cap; zero disables effects
    pub max_particles: usize,
}

impl Setup {
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            seed,
            max_particles: 256,
        }
    }

    pub fn with_particles(mut self, max_particles: usize) -> Self {
        self.max_particles = max_particles;
        self
    }
}

/// Per-game tuning loaded from settings
pub trait GameConfig: Clone + Default + Debug {
    /// Reject configurations that cannot produce a playable game
    fn validate(&self) -> Result<(), ConfigError>;

    /// Like `validate`, and also reject layouts that do not fit the playfield
    fn validate_for(&self, setup: &Setup) -> Result<(), ConfigError> {
        let _ = setup;
        self.validate()
    }
}

/// A game simulation
///
/// The phase methods are called by [`advance`] in a fixed order; a game only
/// mutates its own state from inside them.
pub trait Game {
    type Config: GameConfig;

    const KIND: GameKind;

    fn new(config: Self::Config, setup: &Setup) -> Self
    where
        Self: Sized;

    /// Restore the initial entities without rebuilding the game
    fn reset(&mut self);

    fn key_map(&self, key: Key) -> Option<Intent> {
        default_key_map(key)
    }

    /// Lives at the start of a run, for games that have them
    fn starting_lives(&self) -> Option<u32> {
        None
    }

    fn apply_intents(&mut self, intents: &Intents);

    fn integrate(&mut self, events: &mut Vec<GameEvent>);

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>);

    fn spawn(&mut self, _events: &mut Vec<GameEvent>) {}

    /// Particles, banners and other cosmetic timers
    fn update_effects(&mut self) {}
}

/// Run one fixed simulation tick
///
/// Order: apply intents, integrate, collide, spawn, effects.
pub fn advance<G: Game>(game: &mut G, intents: &Intents, events: &mut Vec<GameEvent>) {
    game.apply_intents(intents);
    game.integrate(events);
    game.resolve_collisions(events);
    game.spawn(events);
    game.update_effects();
}

/// Colour as 0xRRGGBB, the form configs and particles use
pub type Tint = u32;

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Advance `ticks` times with the same intents, collecting every event
    pub fn run<G: Game>(game: &mut G, intents: &Intents, ticks: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            advance(game, intents, &mut events);
        }
        events
    }

    pub fn idle<G: Game>(game: &mut G, ticks: u32) -> Vec<GameEvent> {
        run(game, &Intents::default(), ticks)
    }

    pub fn press<G: Game>(game: &mut G, intent: Intent) -> Vec<GameEvent> {
        run(game, &Intents::default().press(intent), 1)
    }

    pub fn score_of(events: &[GameEvent]) -> u32 {
        events
            .iter()
            .map(|e| match e {
                GameEvent::Scored {
                    points,
                    side: Side::Home,
                } => *points,
                _ => 0,
            })
            .sum()
    }
}
