//! Procedural placement: grid layouts, pipe spawning and free-cell search

use glam::{IVec2, Vec2};
use rand::Rng;
use rand::seq::SliceRandom;

use super::body::Rect;
use crate::consts::PLACEMENT_ATTEMPTS;

/// Evenly spaced grid of equal cells (brick walls, alien waves)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub cell: Vec2,
    pub padding: f32,
    pub origin: Vec2,
}

impl GridLayout {
    /// Layout whose columns stretch to fill `width` with `margin` on either side
    pub fn fill_width(rows: usize, cols: usize, width: f32, margin: f32, cell_h: f32, padding: f32, top: f32) -> Self {
        let cols_f = cols.max(1) as f32;
        let cell_w = (width - 2.0 * margin - (cols_f - 1.0) * padding) / cols_f;
        Self {
            rows,
            cols,
            cell: Vec2::new(cell_w, cell_h),
            padding,
            origin: Vec2::new(margin, top),
        }
    }

    /// Top-left corner of the cell at `(row, col)`
    pub fn cell_origin(&self, row: usize, col: usize) -> Vec2 {
        self.origin + Vec2::new(col as f32, row as f32) * (self.cell + Vec2::splat(self.padding))
    }

    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        let min = self.cell_origin(row, col);
        Rect::new(min.x, min.y, self.cell.x, self.cell.y)
    }

    /// Bottom edge of the last row
    pub fn bottom(&self) -> f32 {
        self.cell_origin(self.rows.saturating_sub(1), 0).y + self.cell.y
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Rect)> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| (row, col, self.cell_rect(row, col))))
    }
}

/// Height of the top stack for a new pipe pair
///
/// Both stacks are at least `min_height` tall, so the gap is always fully
/// inside the playfield and passable.
pub fn pipe_gap_top<R: Rng>(rng: &mut R, field_height: f32, gap: f32, min_height: f32) -> f32 {
    let max_height = field_height - gap - min_height;
    if max_height <= min_height {
        return min_height;
    }
    rng.random_range(min_height..max_height).floor()
}

/// Fires every `interval` ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSpawner {
    pub interval: u32,
    elapsed: u32,
}

impl IntervalSpawner {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            elapsed: 0,
        }
    }

    /// Advance one tick; true when a spawn is due
    pub fn tick(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }
}

/// Pick a random cell of a `cols` x `rows` board for which `occupied` is false
///
/// Rejection sampling with a hard attempt cap, then a row-major scan so a
/// nearly full board still terminates. `None` when every cell is taken.
pub fn place_free_cell<R, F>(rng: &mut R, cols: i32, rows: i32, occupied: F) -> Option<IVec2>
where
    R: Rng,
    F: Fn(IVec2) -> bool,
{
    if cols <= 0 || rows <= 0 {
        return None;
    }

    for _ in 0..PLACEMENT_ATTEMPTS {
        let cell = IVec2::new(rng.random_range(0..cols), rng.random_range(0..rows));
        if !occupied(cell) {
            return Some(cell);
        }
    }

    (0..rows)
        .flat_map(|y| (0..cols).map(move |x| IVec2::new(x, y)))
        .find(|&cell| !occupied(cell))
}

/// Fisher-Yates shuffle driven by the game's RNG
pub fn shuffle<T, R: Rng>(rng: &mut R, items: &mut [T]) {
    items.shuffle(rng);
}
