//! Memory Match
//!
//! A shuffled board of colour pairs. Two face-up cards that differ flip back
//! after a delay; matching every pair wins. Cards are chosen by tapping or by
//! moving a cursor and pressing Space.

use glam::{IVec2, Vec2};
use log::info;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Game, GameConfig, GameEvent, Setup, Tint};
use crate::catalog::GameKind;
use crate::consts::SIM_HZ;
use crate::error::ConfigError;
use crate::input::{Intent, Intents};
use crate::sim::shuffle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryMatchConfig {
    /// Cards per side
    pub grid_size: usize,
    /// One tint per pair
    pub palette: Vec<Tint>,
    pub flip_back_ms: u32,
}

impl Default for MemoryMatchConfig {
    fn default() -> Self {
        Self {
            grid_size: 4,
            palette: vec![
                0xff5252, 0x42a5f5, 0x66bb6a, 0xffc107, 0xab47bc, 0x26c6da, 0xff7043, 0xec407a,
            ],
            flip_back_ms: 1000,
        }
    }
}

impl MemoryMatchConfig {
    pub fn pairs(&self) -> usize {
        self.grid_size * self.grid_size / 2
    }
}

impl GameConfig for MemoryMatchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 || (self.grid_size * self.grid_size) % 2 != 0 {
            return Err(ConfigError::invalid("memory board needs an even number of cards"));
        }
        if self.palette.len() < self.pairs() {
            return Err(ConfigError::invalid(format!(
                "memory board needs {} tints, palette has {}",
                self.pairs(),
                self.palette.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub tint: Tint,
    pub face_up: bool,
    pub matched: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryMatch {
    config: MemoryMatchConfig,
    rng: Pcg32,
    cell: Vec2,
    /// Row-major
    pub cards: Vec<Card>,
    pub cursor: IVec2,
    /// Face-up cards of the current attempt
    flipped: Vec<usize>,
    flip_back_ticks: u32,
    moves: u32,
    matches: usize,
    elapsed_ticks: u32,
    started: bool,
    done: bool,
}

impl MemoryMatch {
    pub fn grid_size(&self) -> usize {
        self.config.grid_size
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    /// Whole seconds since the first flip
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_ticks / SIM_HZ
    }

    fn index_at(&self, pos: Vec2) -> Option<usize> {
        let n = self.config.grid_size as i32;
        let cell = (pos / self.cell).floor().as_ivec2();
        ((0..n).contains(&cell.x) && (0..n).contains(&cell.y)).then(|| (cell.y * n + cell.x) as usize)
    }

    fn flip(&mut self, index: usize) {
        let Some(card) = self.cards.get(index).copied() else {
            return;
        };
        if self.done || card.face_up || card.matched || self.flipped.len() == 2 {
            return;
        }

        self.started = true;
        self.cards[index].face_up = true;
        self.flipped.push(index);
        if self.flipped.len() < 2 {
            return;
        }

        self.moves += 1;
        let (a, b) = (self.flipped[0], self.flipped[1]);
        if self.cards[a].tint == self.cards[b].tint {
            self.cards[a].matched = true;
            self.cards[b].matched = true;
            self.flipped.clear();
            self.matches += 1;
        } else {
            self.flip_back_ticks = crate::ms_to_ticks(self.config.flip_back_ms);
        }
    }

    fn deal(&mut self) {
        let pairs = self.config.pairs();
        let mut cards: Vec<Card> = self
            .config
            .palette
            .iter()
            .take(pairs)
            .flat_map(|&tint| {
                let card = Card {
                    tint,
                    face_up: false,
                    matched: false,
                };
                [card, card]
            })
            .collect();
        shuffle(&mut self.rng, &mut cards);
        self.cards = cards;
    }
}

impl Game for MemoryMatch {
    type Config = MemoryMatchConfig;

    const KIND: GameKind = GameKind::MemoryMatch;

    fn new(config: MemoryMatchConfig, setup: &Setup) -> Self {
        let n = config.grid_size.max(1) as f32;
        let mut game = Self {
            rng: Pcg32::seed_from_u64(setup.seed),
            cell: Vec2::new(setup.width / n, setup.height / n),
            cards: Vec::new(),
            cursor: IVec2::ZERO,
            flipped: Vec::new(),
            flip_back_ticks: 0,
            moves: 0,
            matches: 0,
            elapsed_ticks: 0,
            started: false,
            done: false,
            config,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        self.deal();
        self.cursor = IVec2::ZERO;
        self.flipped.clear();
        self.flip_back_ticks = 0;
        self.moves = 0;
        self.matches = 0;
        self.elapsed_ticks = 0;
        self.started = false;
        self.done = false;
    }

    fn apply_intents(&mut self, intents: &Intents) {
        let last = self.config.grid_size as i32 - 1;
        for &intent in intents.pressed() {
            let delta = match intent {
                Intent::MoveUp => IVec2::NEG_Y,
                Intent::MoveDown => IVec2::Y,
                Intent::MoveLeft => IVec2::NEG_X,
                Intent::MoveRight => IVec2::X,
                Intent::Shoot | Intent::Jump => {
                    let n = self.config.grid_size as i32;
                    self.flip((self.cursor.y * n + self.cursor.x) as usize);
                    continue;
                }
                _ => continue,
            };
            self.cursor = (self.cursor + delta).clamp(IVec2::ZERO, IVec2::splat(last));
        }
        for &tap in intents.taps() {
            if let Some(index) = self.index_at(tap) {
                self.flip(index);
            }
        }
    }

    fn integrate(&mut self, _events: &mut Vec<GameEvent>) {
        if self.started && !self.done {
            self.elapsed_ticks += 1;
        }
        if self.flip_back_ticks > 0 {
            self.flip_back_ticks -= 1;
            if self.flip_back_ticks == 0 {
                for i in self.flipped.drain(..) {
                    self.cards[i].face_up = false;
                }
            }
        }
    }

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        if !self.done && self.matches == self.config.pairs() {
            info!("Memory Match: cleared in {} moves, {}s", self.moves, self.elapsed_secs());
            self.done = true;
            events.push(GameEvent::Won);
        }
    }
}
