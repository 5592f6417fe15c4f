//! Software raster renderer
//!
//! Games are drawn into a plain RGBA `Framebuffer` that the host blits to its
//! canvas. Drawing is a pure function of game state: nothing here mutates a
//! game, and every primitive clips to the surface.

pub mod font;
pub mod scenes;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::engine::{Outcome, RunState, Scoreboard};
use crate::sim::Rect;

pub use scenes::Scene;

/// One RGBA8 pixel, laid out the way `ImageData` expects
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// From 0xRRGGBB
    pub const fn hex(tint: u32) -> Self {
        Self::rgb((tint >> 16) as u8, (tint >> 8) as u8, tint as u8)
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Source-over blend onto an opaque destination
    fn over(self, dst: Color) -> Color {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let t = a as f32 / 255.0;
                let Color { r, g, b, .. } = dst.lerp(self, t);
                Color::rgb(r, g, b)
            }
        }
    }
}

/// Colors shared by every scene
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = Color::hex(0x121212);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GOLD: Color = Color::hex(0xffd700);
    pub const RED: Color = Color::hex(0xff0000);
    pub const DIM: Color = Color::hex(0x888888);
    pub const SCRIM: Color = Color::rgba(0, 0, 0, 178);
}

/// Pixel storage for one surface
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![colors::BLACK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    fn blend(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = (y as u32 * self.width + x as u32) as usize;
        if let Some(px) = self.pixels.get_mut(i) {
            *px = color.over(*px);
        }
    }
}

/// Drawing primitives over a framebuffer
pub struct Canvas<'a> {
    fb: &'a mut Framebuffer,
}

impl<'a> Canvas<'a> {
    pub fn new(fb: &'a mut Framebuffer) -> Self {
        Self { fb }
    }

    pub fn size(&self) -> Vec2 {
        self.fb.size()
    }

    pub fn clear(&mut self, color: Color) {
        self.fb.pixels.fill(Color { a: 255, ..color });
    }

    pub fn vertical_gradient(&mut self, top: Color, bottom: Color) {
        let (w, h) = (self.fb.width as usize, self.fb.height as usize);
        for (y, row) in self.fb.pixels.chunks_mut(w.max(1)).enumerate() {
            let t = if h > 1 { y as f32 / (h - 1) as f32 } else { 0.0 };
            row.fill(Color { a: 255, ..top.lerp(bottom, t) });
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let x0 = rect.left().round().max(0.0) as i32;
        let y0 = rect.top().round().max(0.0) as i32;
        let x1 = rect.right().round().min(self.fb.width as f32) as i32;
        let y1 = rect.bottom().round().min(self.fb.height as f32) as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.fb.blend(x, y, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, thickness: f32, color: Color) {
        let t = thickness.max(1.0);
        let (min, size) = (rect.min, rect.size);
        self.fill_rect(Rect::new(min.x, min.y, size.x, t), color);
        self.fill_rect(Rect::new(min.x, min.y + size.y - t, size.x, t), color);
        self.fill_rect(Rect::new(min.x, min.y + t, t, size.y - 2.0 * t), color);
        self.fill_rect(Rect::new(min.x + size.x - t, min.y + t, t, size.y - 2.0 * t), color);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let y0 = (center.y - radius).floor() as i32;
        let y1 = (center.y + radius).ceil() as i32;
        let x0 = (center.x - radius).floor() as i32;
        let x1 = (center.x + radius).ceil() as i32;
        for y in y0.max(0)..y1.min(self.fb.height as i32) {
            for x in x0.max(0)..x1.min(self.fb.width as i32) {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                if d.length_squared() <= r2 {
                    self.fb.blend(x, y, color);
                }
            }
        }
    }

    /// Filled triangle by edge functions; winding does not matter
    pub fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        let edge = |p: Vec2, q: Vec2, r: Vec2| (q - p).perp_dot(r - p);
        let area = edge(a, b, c);
        if area.abs() < f32::EPSILON {
            return;
        }
        let min = a.min(b).min(c).floor().max(Vec2::ZERO);
        let max = a.max(b).max(c).ceil().min(self.fb.size());
        for y in min.y as i32..max.y as i32 {
            for x in min.x as i32..max.x as i32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let (w0, w1, w2) = (edge(b, c, p), edge(c, a, p), edge(a, b, p));
                let inside = if area > 0.0 {
                    w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
                } else {
                    w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
                };
                if inside {
                    self.fb.blend(x, y, color);
                }
            }
        }
    }

    /// Static scatter of stars from a hash, identical every frame
    pub fn starfield(&mut self, count: u32, seed: u32) {
        let (w, h) = (self.fb.width.max(1), self.fb.height.max(1));
        for i in 0..count {
            let hx = hash(seed ^ i.wrapping_mul(2));
            let hy = hash(seed ^ i.wrapping_mul(2).wrapping_add(1));
            let x = (hx % w) as i32;
            let y = (hy % h) as i32;
            let brightness = 0.3 + (hx >> 24) as f32 / 255.0 * 0.6;
            self.fb.blend(x, y, colors::WHITE.with_alpha(brightness));
        }
    }

    /// Draw text with the built-in 3x5 font; `scale` is pixels per font cell
    pub fn text(&mut self, pos: Vec2, scale: f32, color: Color, text: &str) {
        let scale = scale.max(1.0);
        let mut x = pos.x;
        for ch in text.chars() {
            if let Some(rows) = font::glyph(ch) {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..font::GLYPH_WIDTH {
                        if bits & (1 << (font::GLYPH_WIDTH - 1 - col)) != 0 {
                            let cell = Rect::new(x + col as f32 * scale, pos.y + row as f32 * scale, scale, scale);
                            self.fill_rect(cell, color);
                        }
                    }
                }
            }
            x += font::ADVANCE as f32 * scale;
        }
    }

    /// Text horizontally centered on the surface
    pub fn text_centered(&mut self, y: f32, scale: f32, color: Color, text: &str) {
        let x = (self.size().x - font::text_width(text, scale)) / 2.0;
        self.text(Vec2::new(x, y), scale, color, text);
    }
}

/// Integer hash for procedural scatter
fn hash(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

/// Render switches derived from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub starfield: bool,
    pub particles: bool,
    pub hud: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            starfield: true,
            particles: true,
            hud: true,
        }
    }
}

const HUD_SCALE: f32 = 3.0;
const TITLE_SCALE: f32 = 6.0;

/// Draw one complete frame: scene, HUD, then the run-state overlay
pub fn render_frame<G: Scene>(fb: &mut Framebuffer, game: Option<&G>, state: RunState, board: &Scoreboard, style: RenderStyle) {
    let mut canvas = Canvas::new(fb);
    canvas.clear(colors::BACKGROUND);

    let Some(game) = game else {
        return;
    };
    game.draw(&mut canvas, style);

    if style.hud {
        for (i, line) in game.hud_lines(board).iter().enumerate() {
            let pos = Vec2::new(8.0, 8.0 + i as f32 * 6.0 * HUD_SCALE);
            canvas.text(pos, HUD_SCALE, colors::WHITE, line);
        }
    }

    draw_overlay(&mut canvas, state, board);
}

fn draw_overlay(canvas: &mut Canvas, state: RunState, board: &Scoreboard) {
    let (title, title_color, hint) = match state {
        RunState::Running => return,
        RunState::Idle => ("READY", colors::WHITE, "PRESS SPACE TO START"),
        RunState::Paused => ("PAUSED", colors::WHITE, "PRESS P TO RESUME"),
        RunState::Ended(Outcome::GameOver) => ("GAME OVER", colors::GOLD, "PRESS ENTER TO PLAY AGAIN"),
        RunState::Ended(Outcome::Victory) => ("YOU WIN!", colors::GOLD, "PRESS ENTER TO PLAY AGAIN"),
    };
    let size = canvas.size();
    canvas.fill_rect(Rect::new(0.0, 0.0, size.x, size.y), colors::SCRIM);

    let mid = size.y / 2.0;
    canvas.text_centered(mid - 40.0, TITLE_SCALE, title_color, title);
    if matches!(state, RunState::Ended(_)) {
        canvas.text_centered(mid + 4.0, HUD_SCALE, colors::WHITE, &format!("FINAL SCORE: {}", board.score));
    }
    canvas.text_centered(mid + 30.0, 2.0, colors::DIM, hint);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_layout_matches_image_data() {
        let mut fb = Framebuffer::new(2, 1);
        Canvas::new(&mut fb).clear(Color::rgb(1, 2, 3));
        assert_eq!(fb.as_bytes(), &[1, 2, 3, 255, 1, 2, 3, 255]);
    }

    #[test]
    fn test_rect_clips_to_surface() {
        let mut fb = Framebuffer::new(4, 4);
        let mut canvas = Canvas::new(&mut fb);
        canvas.clear(colors::BLACK);
        canvas.fill_rect(Rect::new(-10.0, 2.0, 100.0, 100.0), colors::WHITE);
        assert_eq!(fb.pixel(0, 1), Some(colors::BLACK));
        assert_eq!(fb.pixel(3, 3), Some(colors::WHITE));
    }

    #[test]
    fn test_alpha_blend() {
        let mut fb = Framebuffer::new(1, 1);
        let mut canvas = Canvas::new(&mut fb);
        canvas.clear(colors::BLACK);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), colors::WHITE.with_alpha(0.5));
        let px = fb.pixel(0, 0).expect("pixel");
        assert!((127..=128).contains(&px.r));
        assert_eq!(px.a, 255);
    }

    #[test]
    fn test_circle_and_triangle_cover_their_centers() {
        let mut fb = Framebuffer::new(20, 20);
        let mut canvas = Canvas::new(&mut fb);
        canvas.clear(colors::BLACK);
        canvas.fill_circle(Vec2::new(5.0, 5.0), 3.0, colors::RED);
        canvas.fill_triangle(Vec2::new(10.0, 19.0), Vec2::new(19.0, 19.0), Vec2::new(15.0, 10.0), colors::GOLD);
        assert_eq!(fb.pixel(5, 5), Some(colors::RED));
        assert_eq!(fb.pixel(15, 17), Some(colors::GOLD));
        assert_eq!(fb.pixel(0, 19), Some(colors::BLACK));
    }

    #[test]
    fn test_empty_surface_is_harmless() {
        let mut fb = Framebuffer::new(0, 0);
        let mut canvas = Canvas::new(&mut fb);
        canvas.vertical_gradient(colors::WHITE, colors::BLACK);
        canvas.starfield(50, 1);
        canvas.text(Vec2::ZERO, 2.0, colors::WHITE, "HELLO");
        assert!(fb.as_bytes().is_empty());
    }
}
