//! Per-game scenes
//!
//! Each game knows how to paint itself and which HUD lines it shows. Scenes
//! only read game state.

use glam::{IVec2, Vec2};

use super::{Canvas, Color, RenderStyle, colors};
use crate::engine::Scoreboard;
use crate::games::candy_crush::BoardPhase;
use crate::games::maze::Cell;
use crate::games::slot_machine::{Payout, Symbol};
use crate::games::{
    AlienInvaders, BrickBreaker, CandyCrush, FlappyBird, Maze, MemoryMatch, Pong, SlotMachine, Snake,
};
use crate::sim::{Body, ParticleField, Rect};

pub trait Scene {
    fn draw(&self, canvas: &mut Canvas, style: RenderStyle);

    fn hud_lines(&self, board: &Scoreboard) -> Vec<String> {
        let mut lines = vec![format!("SCORE: {}", board.score)];
        if let Some(lives) = board.lives {
            lines.push(format!("LIVES: {lives}"));
        }
        lines
    }
}

fn draw_particles(canvas: &mut Canvas, particles: &ParticleField, style: RenderStyle) {
    if !style.particles {
        return;
    }
    for p in particles.iter() {
        canvas.fill_circle(p.pos, p.radius, Color::hex(p.tint).with_alpha(p.alpha()));
    }
}

fn fill_body(canvas: &mut Canvas, body: &Body, color: Color) {
    canvas.fill_rect(body.bounds(), color);
}

/// Square cell `at` on a grid of `cell`-sized squares, inset by `gap`
fn grid_cell(at: IVec2, cell: Vec2, gap: f32) -> Rect {
    let min = at.as_vec2() * cell + Vec2::splat(gap);
    Rect {
        min,
        size: (cell - Vec2::splat(gap * 2.0)).max(Vec2::ZERO),
    }
}

impl Scene for BrickBreaker {
    fn draw(&self, canvas: &mut Canvas, style: RenderStyle) {
        canvas.vertical_gradient(Color::hex(0x1a1a2e), Color::hex(0x16213e));
        if style.starfield {
            canvas.starfield(80, 0xb51c);
        }

        for brick in self.bricks.iter().filter(|b| b.body.alive) {
            let bounds = brick.body.bounds();
            canvas.fill_rect(bounds, Color::hex(brick.tint));
            let shine = Rect::new(bounds.left(), bounds.top(), bounds.width(), bounds.height() * 0.3);
            canvas.fill_rect(shine, colors::WHITE.with_alpha(0.2));
        }

        fill_body(canvas, &self.paddle, Color::hex(0x4ecdc4));
        canvas.fill_circle(self.ball.pos, self.ball.radius(), colors::WHITE);
        draw_particles(canvas, &self.particles, style);

        if let Some(level) = self.level_banner() {
            let y = canvas.size().y / 2.0 - 60.0;
            canvas.text_centered(y, 6.0, Color::hex(0xffdd00), &format!("LEVEL {level}"));
        }
    }

    fn hud_lines(&self, board: &Scoreboard) -> Vec<String> {
        vec![
            format!("SCORE: {}", board.score),
            format!("LIVES: {}", board.lives.unwrap_or(0)),
            format!("LEVEL: {}", self.level()),
        ]
    }
}

impl Scene for AlienInvaders {
    fn draw(&self, canvas: &mut Canvas, style: RenderStyle) {
        canvas.clear(colors::BACKGROUND);
        if style.starfield {
            canvas.starfield(120, 0xa11e);
        }

        let ship = self.player.bounds();
        canvas.fill_rect(ship, Color::hex(0x50c878));
        canvas.fill_triangle(
            Vec2::new(ship.center().x - 6.0, ship.top()),
            Vec2::new(ship.center().x + 6.0, ship.top()),
            Vec2::new(ship.center().x, ship.top() - 10.0),
            Color::hex(0x50c878),
        );

        for alien in self.aliens.iter().filter(|a| a.alive) {
            let b = alien.bounds();
            canvas.fill_rect(b, colors::GOLD);
            let eye = b.size.x * 0.15;
            let eye_y = b.top() + b.size.y * 0.35;
            canvas.fill_circle(Vec2::new(b.left() + b.size.x * 0.3, eye_y), eye, colors::BLACK);
            canvas.fill_circle(Vec2::new(b.left() + b.size.x * 0.7, eye_y), eye, colors::BLACK);
        }

        for shot in self.shots.iter().filter(|s| s.alive) {
            fill_body(canvas, shot, colors::GOLD);
        }
        for bomb in self.bombs.iter().filter(|s| s.alive) {
            fill_body(canvas, bomb, colors::RED);
        }
        draw_particles(canvas, &self.particles, style);
    }

    fn hud_lines(&self, board: &Scoreboard) -> Vec<String> {
        vec![
            format!("SCORE: {}", board.score),
            format!("LIVES: {}", board.lives.unwrap_or(0)),
            format!("WAVE: {}", self.wave()),
        ]
    }
}

impl Scene for FlappyBird {
    fn draw(&self, canvas: &mut Canvas, style: RenderStyle) {
        canvas.clear(Color::hex(0x87ceeb));

        let pipe = Color::hex(0x32cd32);
        let cap = Color::hex(0x228b22);
        for pair in &self.pipes {
            let top = pair.top.bounds();
            let bottom = pair.bottom.bounds();
            canvas.fill_rect(top, pipe);
            canvas.fill_rect(bottom, pipe);
            canvas.fill_rect(Rect::new(top.left() - 5.0, top.bottom() - 20.0, top.width() + 10.0, 20.0), cap);
            canvas.fill_rect(Rect::new(bottom.left() - 5.0, bottom.top(), bottom.width() + 10.0, 20.0), cap);
        }

        let b = self.bird.bounds();
        let c = b.center();
        canvas.fill_circle(c, b.size.y / 2.0, colors::GOLD);
        canvas.fill_circle(c + Vec2::new(b.size.x * 0.2, -b.size.y * 0.15), 4.0, colors::WHITE);
        canvas.fill_circle(c + Vec2::new(b.size.x * 0.25, -b.size.y * 0.15), 2.0, colors::BLACK);
        canvas.fill_triangle(
            Vec2::new(b.right() - 6.0, c.y - 3.0),
            Vec2::new(b.right() - 6.0, c.y + 5.0),
            Vec2::new(b.right() + 6.0, c.y + 1.0),
            Color::hex(0xffa500),
        );
        draw_particles(canvas, &self.particles, style);
    }

    fn hud_lines(&self, board: &Scoreboard) -> Vec<String> {
        vec![format!("SCORE: {}", board.score), format!("BEST: {}", self.best().max(board.score))]
    }
}

impl Scene for Pong {
    fn draw(&self, canvas: &mut Canvas, style: RenderStyle) {
        canvas.clear(colors::BLACK);
        let field = self.field();
        let mut y = 0.0;
        while y < field.bottom() {
            canvas.fill_rect(Rect::new(field.center().x - 1.0, y, 2.0, 10.0), colors::DIM);
            y += 20.0;
        }
        fill_body(canvas, &self.left, colors::WHITE);
        fill_body(canvas, &self.right, colors::WHITE);
        canvas.fill_circle(self.ball.pos, self.ball.radius(), colors::WHITE);
        draw_particles(canvas, &self.particles, style);
    }

    fn hud_lines(&self, board: &Scoreboard) -> Vec<String> {
        vec![format!("P1: {}   P2: {}", board.score, board.rival_score)]
    }
}

impl Scene for Snake {
    fn draw(&self, canvas: &mut Canvas, _style: RenderStyle) {
        canvas.clear(colors::BACKGROUND);
        let cell = Vec2::splat(self.cell_size());

        if let Some(food) = self.food {
            let r = grid_cell(food, cell, 0.0);
            canvas.fill_circle(r.center(), cell.x * 0.4, colors::RED);
        }
        for (i, &seg) in self.segments.iter().enumerate() {
            let color = if i == 0 { Color::hex(0x66bb6a) } else { Color::hex(0x43a047) };
            canvas.fill_rect(grid_cell(seg, cell, 1.0), color);
        }
    }

    fn hud_lines(&self, board: &Scoreboard) -> Vec<String> {
        vec![
            format!("SCORE: {}", board.score),
            format!("LENGTH: {}", self.segments.len()),
        ]
    }
}

impl Scene for Maze {
    fn draw(&self, canvas: &mut Canvas, _style: RenderStyle) {
        canvas.clear(colors::BACKGROUND);
        let cell = Vec2::splat(self.cell_size());
        for y in 0..self.rows() as i32 {
            for x in 0..self.cols() as i32 {
                let at = IVec2::new(x, y);
                let color = match self.cell(at) {
                    Cell::Wall => Color::hex(0x3f51b5),
                    Cell::Exit => Color::hex(0x4caf50),
                    Cell::Start => Color::hex(0x263238),
                    Cell::Path => continue,
                };
                canvas.fill_rect(grid_cell(at, cell, 0.0), color);
            }
        }
        let player = grid_cell(self.player, cell, 0.0);
        canvas.fill_circle(player.center(), cell.x * 0.35, colors::GOLD);
    }

    fn hud_lines(&self, _board: &Scoreboard) -> Vec<String> {
        vec![format!("MOVES: {}", self.moves())]
    }
}

impl Scene for MemoryMatch {
    fn draw(&self, canvas: &mut Canvas, _style: RenderStyle) {
        canvas.clear(colors::BACKGROUND);
        let n = self.grid_size().max(1);
        let cell = self.cell_size();
        for (i, card) in self.cards.iter().enumerate() {
            let at = IVec2::new((i % n) as i32, (i / n) as i32);
            let rect = grid_cell(at, cell, 6.0);
            let color = match (card.face_up, card.matched) {
                (_, true) => Color::hex(card.tint).with_alpha(0.5),
                (true, false) => Color::hex(card.tint),
                (false, false) => Color::hex(0x3949ab),
            };
            canvas.fill_rect(rect, color);
            if !card.face_up {
                canvas.fill_circle(rect.center(), rect.size.x * 0.15, colors::WHITE.with_alpha(0.3));
            }
        }
        canvas.stroke_rect(grid_cell(self.cursor, cell, 3.0), 2.0, colors::WHITE);
    }

    fn hud_lines(&self, _board: &Scoreboard) -> Vec<String> {
        vec![
            format!("MOVES: {}", self.moves()),
            format!("TIME: {}S", self.elapsed_secs()),
        ]
    }
}

impl Scene for CandyCrush {
    fn draw(&self, canvas: &mut Canvas, _style: RenderStyle) {
        canvas.clear(Color::hex(0x1b1035));
        let n = self.grid_size() as i32;
        let cell = self.cell_size();
        for y in 0..n {
            for x in 0..n {
                let at = IVec2::new(x, y);
                let slot = grid_cell(at, cell, 2.0);
                canvas.fill_rect(slot, colors::WHITE.with_alpha(0.06));
                if let Some(tint) = self.candy(at) {
                    canvas.fill_circle(slot.center(), slot.size.min_element() * 0.4, Color::hex(tint));
                }
            }
        }
        canvas.stroke_rect(grid_cell(self.cursor, cell, 1.0), 1.0, colors::DIM);
        if let Some(sel) = self.selected {
            canvas.stroke_rect(grid_cell(sel, cell, 1.0), 3.0, colors::WHITE);
        }
    }

    fn hud_lines(&self, board: &Scoreboard) -> Vec<String> {
        let mut lines = vec![
            format!("SCORE: {}", board.score),
            format!("MOVES: {}", self.moves_left()),
        ];
        if matches!(self.phase(), BoardPhase::Reverting { .. }) {
            lines.push("NO MATCH".to_string());
        }
        lines
    }
}

fn draw_symbol(canvas: &mut Canvas, symbol: Symbol, center: Vec2, size: f32) {
    let h = size / 2.0;
    match symbol {
        Symbol::Cherry => {
            let red = Color::hex(0xef5350);
            canvas.fill_circle(center + Vec2::new(-h * 0.4, h * 0.3), h * 0.35, red);
            canvas.fill_circle(center + Vec2::new(h * 0.4, h * 0.3), h * 0.35, red);
            canvas.fill_rect(Rect::new(center.x - 1.0, center.y - h * 0.7, 2.0, h * 0.7), Color::hex(0x66bb6a));
        }
        Symbol::Diamond => {
            let blue = Color::hex(0x42a5f5);
            let (l, r) = (center - Vec2::new(h * 0.7, 0.0), center + Vec2::new(h * 0.7, 0.0));
            canvas.fill_triangle(l, r, center - Vec2::new(0.0, h * 0.8), blue);
            canvas.fill_triangle(l, r, center + Vec2::new(0.0, h * 0.8), blue);
        }
        Symbol::Dollar => {
            canvas.fill_circle(center, h * 0.8, Color::hex(0x66bb6a));
            let scale = (size / 14.0).max(1.0);
            let glyph = Vec2::new(3.0, 5.0) * scale / 2.0;
            canvas.text(center - glyph, scale, colors::WHITE, "$");
        }
        Symbol::Star => {
            let gold = Color::hex(0xffc107);
            let r = h * 0.8;
            let p = |deg: f32| center + Vec2::from_angle((deg - 90.0).to_radians()) * r;
            canvas.fill_triangle(p(0.0), p(144.0), p(288.0), gold);
            canvas.fill_triangle(p(72.0), p(216.0), p(0.0), gold);
            canvas.fill_triangle(p(144.0), p(288.0), p(72.0), gold);
        }
    }
}

impl Scene for SlotMachine {
    fn draw(&self, canvas: &mut Canvas, _style: RenderStyle) {
        canvas.clear(colors::BACKGROUND);
        let size = canvas.size();
        let n = self.reels.len().max(1) as f32;
        let reel_w = (size.x - 40.0) / n;
        let reel_h = size.y * 0.45;
        let top = (size.y - reel_h) / 2.0;

        canvas.fill_rect(Rect::new(10.0, top - 10.0, size.x - 20.0, reel_h + 20.0), Color::hex(0x37474f));
        for (i, &symbol) in self.reels.iter().enumerate() {
            let rect = Rect::new(20.0 + i as f32 * reel_w + 4.0, top, reel_w - 8.0, reel_h);
            canvas.fill_rect(rect, colors::WHITE);
            draw_symbol(canvas, symbol, rect.center(), rect.size.min_element() * 0.8);
            if self.is_spinning() {
                canvas.fill_rect(rect, colors::BLACK.with_alpha(0.25));
            }
        }

        let message = match (self.is_spinning(), self.last_payout()) {
            (true, _) => "SPINNING...".to_string(),
            (false, Some(Payout::Jackpot { coins, .. })) => format!("JACKPOT! +{coins}"),
            (false, Some(Payout::Pair { coins })) => format!("TWO OF A KIND! +{coins}"),
            (false, Some(Payout::Nothing)) => "NO MATCH".to_string(),
            (false, None) => "PRESS SPACE TO SPIN".to_string(),
        };
        canvas.text_centered(top + reel_h + 24.0, 2.0, colors::GOLD, &message);
    }

    fn hud_lines(&self, _board: &Scoreboard) -> Vec<String> {
        vec![format!("COINS: {}", self.coins())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Game, GameConfig, Setup};
    use crate::renderer::{Framebuffer, render_frame};
    use crate::engine::RunState;

    fn draws<G: Game + Scene>(config: G::Config, w: u32, h: u32) {
        assert!(config.validate().is_ok());
        let game = G::new(config, &Setup::new(w, h, 5));
        let mut fb = Framebuffer::new(w, h);
        let board = Scoreboard::new(game.starting_lives());
        render_frame(&mut fb, Some(&game), RunState::Running, &board, RenderStyle::default());
        render_frame(&mut fb, Some(&game), RunState::Idle, &board, RenderStyle::default());
        assert!(fb.pixels().iter().any(|&p| p != colors::BACKGROUND));
    }

    #[test]
    fn test_every_scene_draws() {
        draws::<BrickBreaker>(Default::default(), 800, 600);
        draws::<AlienInvaders>(Default::default(), 800, 600);
        draws::<FlappyBird>(Default::default(), 800, 600);
        draws::<Pong>(Default::default(), 800, 400);
        draws::<Snake>(Default::default(), 400, 400);
        draws::<Maze>(Default::default(), 320, 320);
        draws::<MemoryMatch>(Default::default(), 400, 400);
        draws::<CandyCrush>(Default::default(), 400, 400);
        draws::<SlotMachine>(Default::default(), 480, 320);
    }

    #[test]
    fn test_no_game_draws_background_only() {
        let mut fb = Framebuffer::new(8, 8);
        render_frame::<Snake>(&mut fb, None, RunState::Idle, &Scoreboard::default(), RenderStyle::default());
        assert!(fb.pixels().iter().all(|&p| p == colors::BACKGROUND));
    }

    #[test]
    fn test_pong_hud_shows_both_players() {
        let game = Pong::new(Default::default(), &Setup::new(800, 400, 1));
        let board = Scoreboard {
            score: 3,
            rival_score: 2,
            ..Scoreboard::new(None)
        };
        assert_eq!(game.hud_lines(&board), vec!["P1: 3   P2: 2".to_string()]);
    }
}
