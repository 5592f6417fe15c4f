//! Snake
//!
//! A grid stepper: the snake advances one cell every move interval, measured
//! in simulation ticks. Eating shortens the interval down to a floor.

use std::collections::VecDeque;

use glam::IVec2;
use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Game, GameConfig, GameEvent, Setup};
use crate::catalog::GameKind;
use crate::consts::SIM_DT_MS;
use crate::error::ConfigError;
use crate::input::{Intent, Intents};
use crate::sim::place_free_cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn from_intent(intent: Intent) -> Option<Direction> {
        match intent {
            Intent::MoveUp => Some(Direction::Up),
            Intent::MoveDown => Some(Direction::Down),
            Intent::MoveLeft => Some(Direction::Left),
            Intent::MoveRight => Some(Direction::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Cells per side
    pub grid_size: i32,
    pub start: IVec2,
    pub move_interval_ms: u32,
    /// Interval shaved off per food
    pub speedup_ms: u32,
    pub min_interval_ms: u32,
    pub points_per_food: u32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            start: IVec2::new(10, 10),
            move_interval_ms: 150,
            speedup_ms: 2,
            min_interval_ms: 50,
            points_per_food: 10,
        }
    }
}

impl GameConfig for SnakeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::invalid("snake grid must be at least 2x2"));
        }
        let inside = |v: i32| (0..self.grid_size).contains(&v);
        if !inside(self.start.x) || !inside(self.start.y) {
            return Err(ConfigError::invalid("snake start cell is outside the grid"));
        }
        if self.min_interval_ms == 0 || self.move_interval_ms < self.min_interval_ms {
            return Err(ConfigError::invalid("move interval must be at least min_interval_ms"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Snake {
    config: SnakeConfig,
    rng: Pcg32,
    cell: f32,
    /// Head first
    pub segments: VecDeque<IVec2>,
    pub food: Option<IVec2>,
    pub direction: Direction,
    /// Accepted turn waiting for the next move
    pending: Option<Direction>,
    interval_ms: u32,
    elapsed_ms: f64,
    step_due: bool,
    over: bool,
}

impl Snake {
    pub fn grid_size(&self) -> i32 {
        self.config.grid_size
    }

    /// Side of one cell in surface pixels
    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn head(&self) -> IVec2 {
        self.segments.front().copied().unwrap_or(self.config.start)
    }

    fn inside(&self, cell: IVec2) -> bool {
        let n = self.config.grid_size;
        (0..n).contains(&cell.x) && (0..n).contains(&cell.y)
    }

    fn place_food(&mut self) {
        let n = self.config.grid_size;
        let body = &self.segments;
        self.food = place_free_cell(&mut self.rng, n, n, |c| body.contains(&c));
        debug!("Snake: food at {:?}", self.food);
    }

    /// Move the head one cell; returns false on a wall or self hit
    fn step(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if let Some(dir) = self.pending.take() {
            self.direction = dir;
        }
        let head = self.head() + self.direction.delta();

        if !self.inside(head) || self.segments.contains(&head) {
            return false;
        }

        self.segments.push_front(head);
        if self.food == Some(head) {
            events.push(GameEvent::scored(self.config.points_per_food));
            self.interval_ms = self
                .interval_ms
                .saturating_sub(self.config.speedup_ms)
                .max(self.config.min_interval_ms);
            self.food = None;
        } else {
            self.segments.pop_back();
        }
        true
    }
}

impl Game for Snake {
    type Config = SnakeConfig;

    const KIND: GameKind = GameKind::Snake;

    fn new(config: SnakeConfig, setup: &Setup) -> Self {
        let mut game = Self {
            rng: Pcg32::seed_from_u64(setup.seed),
            cell: setup.width.min(setup.height) / config.grid_size.max(1) as f32,
            segments: VecDeque::new(),
            food: None,
            direction: Direction::Right,
            pending: None,
            interval_ms: config.move_interval_ms,
            elapsed_ms: 0.0,
            step_due: false,
            over: false,
            config,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        self.segments.clear();
        self.segments.push_back(self.config.start);
        self.direction = Direction::Right;
        self.pending = None;
        self.interval_ms = self.config.move_interval_ms;
        self.elapsed_ms = 0.0;
        self.step_due = false;
        self.over = false;
        self.place_food();
    }

    fn apply_intents(&mut self, intents: &Intents) {
        // One turn per move, never straight back
        for dir in intents.pressed().iter().filter_map(|&i| Direction::from_intent(i)) {
            if self.pending.is_none() && dir != self.direction && dir != self.direction.opposite() {
                self.pending = Some(dir);
            }
        }
    }

    fn integrate(&mut self, _events: &mut Vec<GameEvent>) {
        if self.over {
            return;
        }
        self.elapsed_ms += SIM_DT_MS;
        let interval = self.interval_ms as f64;
        if self.elapsed_ms + 1e-6 >= interval {
            self.elapsed_ms = (self.elapsed_ms - interval).max(0.0);
            self.step_due = true;
        }
    }

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        if !std::mem::take(&mut self.step_due) || self.over {
            return;
        }
        if !self.step(events) {
            info!("Snake: crashed at length {}", self.segments.len());
            self.over = true;
            events.push(GameEvent::Defeated);
        }
    }

    fn spawn(&mut self, events: &mut Vec<GameEvent>) {
        if self.over || self.food.is_some() {
            return;
        }
        self.place_food();
        if self.food.is_none() {
            info!("Snake: board filled");
            self.over = true;
            events.push(GameEvent::Won);
        }
    }
}
