//! Candy Crush
//!
//! Match-3 on a square board. Swapping two neighbours that makes a run of
//! three or more clears the run, costs a move and starts a cascade; a swap
//! that makes nothing is reverted after a short delay. The game ends when
//! the moves run out.

use glam::{IVec2, Vec2};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Game, GameConfig, GameEvent, Setup, Tint};
use crate::catalog::GameKind;
use crate::error::ConfigError;
use crate::input::{Intent, Intents};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandyCrushConfig {
    pub grid_size: usize,
    pub palette: Vec<Tint>,
    pub moves: u32,
    /// Delay before a cascade or a revert
    pub cascade_ms: u32,
    pub points_per_candy: u32,
}

impl Default for CandyCrushConfig {
    fn default() -> Self {
        Self {
            grid_size: 8,
            palette: vec![0xff5252, 0x42a5f5, 0x66bb6a, 0xffc107, 0xab47bc, 0x26c6da],
            moves: 20,
            cascade_ms: 300,
            points_per_candy: 10,
        }
    }
}

impl GameConfig for CandyCrushConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 3 {
            return Err(ConfigError::invalid("candy board must be at least 3x3"));
        }
        // Two neighbours can rule out at most two colours when dealing
        if self.palette.len() < 3 {
            return Err(ConfigError::invalid("candy palette needs at least three colours"));
        }
        if self.moves == 0 {
            return Err(ConfigError::invalid("moves must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    /// Waiting for a swap
    Ready,
    /// A swap made nothing; swap back when the timer runs out
    Reverting { a: IVec2, b: IVec2, ticks: u32 },
    /// Matched candies are gone; drop and refill when the timer runs out
    Settling { ticks: u32 },
}

#[derive(Debug, Clone)]
pub struct CandyCrush {
    config: CandyCrushConfig,
    rng: Pcg32,
    cell: Vec2,
    /// Palette index per cell, row-major; `None` is a cleared hole
    board: Vec<Option<u8>>,
    pub selected: Option<IVec2>,
    pub cursor: IVec2,
    phase: BoardPhase,
    moves_left: u32,
    swapped: Option<(IVec2, IVec2)>,
    cascade_due: bool,
    out_of_moves: bool,
}

impl CandyCrush {
    pub fn grid_size(&self) -> usize {
        self.config.grid_size
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    /// Tint at a cell, `None` for holes and out-of-range cells
    pub fn candy(&self, at: IVec2) -> Option<Tint> {
        self.index(at)
            .and_then(|i| self.board[i])
            .and_then(|c| self.config.palette.get(c as usize).copied())
    }

    fn n(&self) -> i32 {
        self.config.grid_size as i32
    }

    fn index(&self, at: IVec2) -> Option<usize> {
        let n = self.n();
        ((0..n).contains(&at.x) && (0..n).contains(&at.y)).then(|| (at.y * n + at.x) as usize)
    }

    fn get(&self, at: IVec2) -> Option<u8> {
        self.index(at).and_then(|i| self.board[i])
    }

    fn swap(&mut self, a: IVec2, b: IVec2) {
        if let (Some(i), Some(j)) = (self.index(a), self.index(b)) {
            self.board.swap(i, j);
        }
    }

    /// Colour for a fresh cell that does not complete a run with the two
    /// cells to its left or the two above
    fn deal_cell(&mut self, at: IVec2) -> u8 {
        let same = |a: IVec2, b: IVec2| match (self.get(a), self.get(b)) {
            (Some(x), Some(y)) if x == y => Some(x),
            _ => None,
        };
        let banned = [
            same(at - IVec2::X, at - IVec2::X * 2),
            same(at - IVec2::Y, at - IVec2::Y * 2),
        ];
        let allowed: Vec<u8> = (0..self.config.palette.len() as u8)
            .filter(|c| !banned.contains(&Some(*c)))
            .collect();
        allowed[self.rng.random_range(0..allowed.len())]
    }

    fn deal(&mut self) {
        let n = self.n();
        self.board = vec![None; (n * n) as usize];
        for y in 0..n {
            for x in 0..n {
                let at = IVec2::new(x, y);
                let colour = self.deal_cell(at);
                if let Some(i) = self.index(at) {
                    self.board[i] = Some(colour);
                }
            }
        }
    }

    /// Cells that belong to a horizontal or vertical run of three or more
    pub fn find_matches(&self) -> Vec<bool> {
        let n = self.n();
        let mut marked = vec![false; self.board.len()];
        for (step, line) in [(IVec2::X, IVec2::Y), (IVec2::Y, IVec2::X)] {
            for k in 0..n {
                let mut start = line * k;
                while self.index(start).is_some() {
                    let colour = self.get(start);
                    let mut len = 1;
                    while colour.is_some() && self.get(start + step * len) == colour {
                        len += 1;
                    }
                    if colour.is_some() && len >= 3 {
                        for i in 0..len {
                            if let Some(idx) = self.index(start + step * i) {
                                marked[idx] = true;
                            }
                        }
                    }
                    start += step * len;
                }
            }
        }
        marked
    }

    /// Clear every matched cell; returns how many were cleared
    fn clear_matches(&mut self) -> u32 {
        let marked = self.find_matches();
        let mut cleared = 0;
        for (cell, hit) in self.board.iter_mut().zip(marked) {
            if hit {
                *cell = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// Let candies fall into the holes below them
    fn collapse(&mut self) {
        let n = self.n();
        for x in 0..n {
            let column: Vec<u8> = (0..n).rev().filter_map(|y| self.get(IVec2::new(x, y))).collect();
            for y in (0..n).rev() {
                let from_bottom = (n - 1 - y) as usize;
                if let Some(i) = self.index(IVec2::new(x, y)) {
                    self.board[i] = column.get(from_bottom).copied();
                }
            }
        }
    }

    fn refill(&mut self) {
        let colours = self.config.palette.len() as u8;
        for cell in self.board.iter_mut().filter(|c| c.is_none()) {
            *cell = Some(self.rng.random_range(0..colours));
        }
    }

    fn cascade_ticks(&self) -> u32 {
        crate::ms_to_ticks(self.config.cascade_ms)
    }

    fn select(&mut self, at: IVec2) {
        if self.phase != BoardPhase::Ready || self.out_of_moves || self.index(at).is_none() {
            return;
        }
        match self.selected.take() {
            None => self.selected = Some(at),
            Some(first) => {
                let d = (first - at).abs();
                if d.x + d.y == 1 {
                    self.swap(first, at);
                    self.swapped = Some((first, at));
                }
            }
        }
    }

    fn score(&mut self, cleared: u32, events: &mut Vec<GameEvent>) {
        if cleared > 0 {
            events.push(GameEvent::scored(cleared * self.config.points_per_candy));
        }
    }
}

impl Game for CandyCrush {
    type Config = CandyCrushConfig;

    const KIND: GameKind = GameKind::CandyCrush;

    fn new(config: CandyCrushConfig, setup: &Setup) -> Self {
        let n = config.grid_size.max(1) as f32;
        let mut game = Self {
            rng: Pcg32::seed_from_u64(setup.seed),
            cell: Vec2::new(setup.width / n, setup.height / n),
            board: Vec::new(),
            selected: None,
            cursor: IVec2::ZERO,
            phase: BoardPhase::Ready,
            moves_left: config.moves,
            swapped: None,
            cascade_due: false,
            out_of_moves: false,
            config,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        self.deal();
        self.selected = None;
        self.cursor = IVec2::ZERO;
        self.phase = BoardPhase::Ready;
        self.moves_left = self.config.moves;
        self.swapped = None;
        self.cascade_due = false;
        self.out_of_moves = false;
    }

    fn apply_intents(&mut self, intents: &Intents) {
        let last = self.n() - 1;
        for &intent in intents.pressed() {
            let delta = match intent {
                Intent::MoveUp => IVec2::NEG_Y,
                Intent::MoveDown => IVec2::Y,
                Intent::MoveLeft => IVec2::NEG_X,
                Intent::MoveRight => IVec2::X,
                Intent::Shoot | Intent::Jump => {
                    self.select(self.cursor);
                    continue;
                }
                _ => continue,
            };
            self.cursor = (self.cursor + delta).clamp(IVec2::ZERO, IVec2::splat(last));
        }
        for &tap in intents.taps() {
            self.select((tap / self.cell).floor().as_ivec2());
        }
    }

    fn integrate(&mut self, _events: &mut Vec<GameEvent>) {
        let phase = self.phase;
        self.phase = match phase {
            BoardPhase::Reverting { a, b, ticks } if ticks <= 1 => {
                self.swap(a, b);
                BoardPhase::Ready
            }
            BoardPhase::Reverting { a, b, ticks } => BoardPhase::Reverting { a, b, ticks: ticks - 1 },
            BoardPhase::Settling { ticks } if ticks <= 1 => {
                self.cascade_due = true;
                BoardPhase::Ready
            }
            BoardPhase::Settling { ticks } => BoardPhase::Settling { ticks: ticks - 1 },
            BoardPhase::Ready => BoardPhase::Ready,
        };
    }

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        if let Some((a, b)) = self.swapped.take() {
            let cleared = self.clear_matches();
            if cleared > 0 {
                self.moves_left = self.moves_left.saturating_sub(1);
                self.score(cleared, events);
                self.phase = BoardPhase::Settling {
                    ticks: self.cascade_ticks(),
                };
            } else {
                self.phase = BoardPhase::Reverting {
                    a,
                    b,
                    ticks: self.cascade_ticks(),
                };
            }
        }
        if self.cascade_due {
            self.collapse();
        }
    }

    fn spawn(&mut self, events: &mut Vec<GameEvent>) {
        if std::mem::take(&mut self.cascade_due) {
            self.refill();
            let cleared = self.clear_matches();
            if cleared > 0 {
                debug!("Candy Crush: cascade cleared {cleared}");
                self.score(cleared, events);
                self.phase = BoardPhase::Settling {
                    ticks: self.cascade_ticks(),
                };
            }
        }

        if !self.out_of_moves && self.moves_left == 0 && self.phase == BoardPhase::Ready {
            info!("Candy Crush: out of moves");
            self.out_of_moves = true;
            events.push(GameEvent::Defeated);
        }
    }
}
