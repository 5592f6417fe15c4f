//! Maze
//!
//! A fixed grid of walls and corridors. Every accepted press moves the
//! player one cell; reaching the exit wins.

use glam::IVec2;
use log::info;
use serde::{Deserialize, Serialize};

use super::{Game, GameConfig, GameEvent, Setup};
use crate::catalog::GameKind;
use crate::error::ConfigError;
use crate::input::{Intent, Intents};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Path,
    Start,
    Exit,
}

impl Cell {
    fn parse(c: char) -> Option<Cell> {
        match c {
            '#' => Some(Cell::Wall),
            '.' => Some(Cell::Path),
            'S' => Some(Cell::Start),
            'E' => Some(Cell::Exit),
            _ => None,
        }
    }
}

/// Rows of `#` (wall), `.` (path), `S` (start) and `E` (exit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub layout: Vec<String>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        let layout = [
            "##########",
            "S...#....#",
            "###.#.##.#",
            "#...#.#..#",
            "#.###.#.##",
            "#.....#..#",
            "#####.##.#",
            "#...#....#",
            "#.#...##.E",
            "##########",
        ];
        Self {
            layout: layout.iter().map(|row| row.to_string()).collect(),
        }
    }
}

impl MazeConfig {
    fn parse(&self) -> Result<Vec<Vec<Cell>>, ConfigError> {
        self.layout
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| Cell::parse(c).ok_or_else(|| ConfigError::invalid(format!("unknown maze cell {c:?}"))))
                    .collect()
            })
            .collect()
    }
}

impl GameConfig for MazeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let grid = self.parse()?;
        let width = grid.first().map_or(0, Vec::len);
        if width == 0 || grid.iter().any(|row| row.len() != width) {
            return Err(ConfigError::invalid("maze layout must be a non-empty rectangle"));
        }
        let count = |kind: Cell| grid.iter().flatten().filter(|&&c| c == kind).count();
        if count(Cell::Start) != 1 || count(Cell::Exit) != 1 {
            return Err(ConfigError::invalid("maze needs exactly one start and one exit"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Maze {
    grid: Vec<Vec<Cell>>,
    start: IVec2,
    cell: f32,
    /// Column, row
    pub player: IVec2,
    moves: u32,
    escaped: bool,
}

impl Maze {
    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Out-of-range cells read as walls
    pub fn cell(&self, at: IVec2) -> Cell {
        if at.x < 0 || at.y < 0 {
            return Cell::Wall;
        }
        self.grid
            .get(at.y as usize)
            .and_then(|row| row.get(at.x as usize))
            .copied()
            .unwrap_or(Cell::Wall)
    }

    fn find(grid: &[Vec<Cell>], kind: Cell) -> Option<IVec2> {
        grid.iter().enumerate().find_map(|(y, row)| {
            row.iter()
                .position(|&c| c == kind)
                .map(|x| IVec2::new(x as i32, y as i32))
        })
    }

    fn try_move(&mut self, delta: IVec2) {
        let next = self.player + delta;
        if self.cell(next) == Cell::Wall {
            return;
        }
        self.player = next;
        self.moves += 1;
    }
}

impl Game for Maze {
    type Config = MazeConfig;

    const KIND: GameKind = GameKind::Maze;

    fn new(config: MazeConfig, setup: &Setup) -> Self {
        // validate() has run by the time a game is built; a bad layout degrades to an empty maze
        let grid = config.parse().unwrap_or_default();
        let start = Self::find(&grid, Cell::Start).unwrap_or(IVec2::ZERO);
        let rows = grid.len().max(1) as f32;
        let cols = grid.first().map_or(1, Vec::len).max(1) as f32;
        Self {
            cell: (setup.width / cols).min(setup.height / rows),
            player: start,
            moves: 0,
            escaped: false,
            start,
            grid,
        }
    }

    fn reset(&mut self) {
        self.player = self.start;
        self.moves = 0;
        self.escaped = false;
    }

    fn apply_intents(&mut self, intents: &Intents) {
        if self.escaped {
            return;
        }
        for intent in intents.pressed() {
            let delta = match intent {
                Intent::MoveUp => IVec2::NEG_Y,
                Intent::MoveDown => IVec2::Y,
                Intent::MoveLeft => IVec2::NEG_X,
                Intent::MoveRight => IVec2::X,
                _ => continue,
            };
            self.try_move(delta);
        }
    }

    fn integrate(&mut self, _events: &mut Vec<GameEvent>) {}

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        if !self.escaped && self.cell(self.player) == Cell::Exit {
            info!("Maze: escaped in {} moves", self.moves);
            self.escaped = true;
            events.push(GameEvent::Won);
        }
    }
}
