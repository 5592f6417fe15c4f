//! The closed set of arcade games
//!
//! `GameKind` replaces name-string dispatch: every variant knows its display
//! data, its surface size and how to build its engine. The `Catalog` is a
//! plain value built by the caller and handed to whatever lists the games.

use serde::{Deserialize, Serialize};

use crate::engine::{Cabinet, Engine, FrameScheduler};
use crate::games::{
    AlienInvaders, BrickBreaker, CandyCrush, FlappyBird, Maze, MemoryMatch, Pong, SlotMachine, Snake,
};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    BrickBreaker,
    AlienInvaders,
    FlappyBird,
    Pong,
    Snake,
    Maze,
    MemoryMatch,
    CandyCrush,
    SlotMachine,
}

impl GameKind {
    pub const ALL: [GameKind; 9] = [
        GameKind::BrickBreaker,
        GameKind::AlienInvaders,
        GameKind::FlappyBird,
        GameKind::Pong,
        GameKind::Snake,
        GameKind::Maze,
        GameKind::MemoryMatch,
        GameKind::CandyCrush,
        GameKind::SlotMachine,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GameKind::BrickBreaker => "Brick Breaker",
            GameKind::AlienInvaders => "Alien Invaders",
            GameKind::FlappyBird => "Flappy Bird",
            GameKind::Pong => "Pong",
            GameKind::Snake => "Snake",
            GameKind::Maze => "Maze",
            GameKind::MemoryMatch => "Memory Match",
            GameKind::CandyCrush => "Candy Crush",
            GameKind::SlotMachine => "Slot Machine",
        }
    }

    /// Short identifier used on the command line and in URL hashes
    pub fn slug(self) -> &'static str {
        match self {
            GameKind::BrickBreaker => "brick-breaker",
            GameKind::AlienInvaders => "alien-invaders",
            GameKind::FlappyBird => "flappy-bird",
            GameKind::Pong => "pong",
            GameKind::Snake => "snake",
            GameKind::Maze => "maze",
            GameKind::MemoryMatch => "memory-match",
            GameKind::CandyCrush => "candy-crush",
            GameKind::SlotMachine => "slot-machine",
        }
    }

    pub fn from_slug(slug: &str) -> Option<GameKind> {
        let slug = slug.trim().trim_start_matches('#').to_lowercase();
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    /// Surface size in pixels the game was tuned for
    pub fn surface_size(self) -> (u32, u32) {
        match self {
            GameKind::BrickBreaker | GameKind::AlienInvaders | GameKind::FlappyBird => (800, 600),
            GameKind::Pong => (800, 400),
            GameKind::Snake | GameKind::MemoryMatch | GameKind::CandyCrush => (400, 400),
            GameKind::Maze => (320, 320),
            GameKind::SlotMachine => (480, 320),
        }
    }

    /// Build an uninitialized engine for this game
    ///
    /// Per-game tuning comes from `settings.games`; the engine still needs
    /// `init` with a surface before it will run.
    pub fn launch(self, settings: &Settings, scheduler: Box<dyn FrameScheduler>) -> Box<dyn Cabinet> {
        let games = &settings.games;
        match self {
            GameKind::BrickBreaker => {
                Box::new(Engine::<BrickBreaker>::new(games.brick_breaker.clone(), settings, scheduler))
            }
            GameKind::AlienInvaders => {
                Box::new(Engine::<AlienInvaders>::new(games.alien_invaders.clone(), settings, scheduler))
            }
            GameKind::FlappyBird => Box::new(Engine::<FlappyBird>::new(games.flappy_bird.clone(), settings, scheduler)),
            GameKind::Pong => Box::new(Engine::<Pong>::new(games.pong.clone(), settings, scheduler)),
            GameKind::Snake => Box::new(Engine::<Snake>::new(games.snake.clone(), settings, scheduler)),
            GameKind::Maze => Box::new(Engine::<Maze>::new(games.maze.clone(), settings, scheduler)),
            GameKind::MemoryMatch => {
                Box::new(Engine::<MemoryMatch>::new(games.memory_match.clone(), settings, scheduler))
            }
            GameKind::CandyCrush => Box::new(Engine::<CandyCrush>::new(games.candy_crush.clone(), settings, scheduler)),
            GameKind::SlotMachine => {
                Box::new(Engine::<SlotMachine>::new(games.slot_machine.clone(), settings, scheduler))
            }
        }
    }
}

/// One row of the game menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub kind: GameKind,
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl CatalogEntry {
    pub fn new(kind: GameKind, description: &str, icon: &str) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// The games offered to the player, in menu order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Every game with its stock description
    pub fn standard() -> Self {
        use GameKind::*;
        Self::new(vec![
            CatalogEntry::new(
                BrickBreaker,
                "Control a paddle to bounce the ball and break colorful bricks in this classic arcade game.",
                "🧱",
            ),
            CatalogEntry::new(
                AlienInvaders,
                "Destroy the alien invasion. Use arrow keys to move and space to shoot.",
                "👾",
            ),
            CatalogEntry::new(
                FlappyBird,
                "Navigate a bird through pipes by tapping to flap. Don't hit the pipes or the ground!",
                "🐦",
            ),
            CatalogEntry::new(Pong, "Classic two-player Pong. Use W/S and arrow keys to move paddles.", "🏓"),
            CatalogEntry::new(
                Snake,
                "Control the snake to eat food and grow without hitting walls or yourself.",
                "🐍",
            ),
            CatalogEntry::new(Maze, "Navigate through a maze using arrow keys to reach the exit.", "🧩"),
            CatalogEntry::new(
                MemoryMatch,
                "Flip and match pairs of cards. Find all matches with the fewest moves.",
                "🎴",
            ),
            CatalogEntry::new(
                CandyCrush,
                "Match 3 or more candies in a row or column. Create combos for extra points.",
                "🍬",
            ),
            CatalogEntry::new(
                SlotMachine,
                "Spin the reels to match symbols and win coins in this simple slot machine game.",
                "🎰",
            ),
        ])
    }

    pub fn get(&self, kind: GameKind) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
