//! Pong
//!
//! Two local players. The left paddle (player one) is driven with W/S, the
//! right paddle (player two) with the arrow keys. A ball leaving through a
//! side scores for the opposite player and is re-served from the center.

use glam::Vec2;
use log::info;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Game, GameConfig, GameEvent, Setup, Side};
use crate::catalog::GameKind;
use crate::error::ConfigError;
use crate::input::{Intent, Intents, Key, default_key_map};
use crate::sim::{Body, ParticleField, Rect, Sides, bounce_off_walls, circle_rect_overlap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PongConfig {
    pub ball_radius: f32,
    /// Per-axis serve speed; the serve is always a 45 degree diagonal
    pub ball_speed: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Gap between each paddle and its side wall
    pub paddle_margin: f32,
    pub paddle_speed: f32,
    /// Horizontal speed multiplier per paddle hit
    pub speedup: f32,
    /// Cap on the horizontal speed
    pub max_speed: f32,
    /// First to this many points wins; endless when unset
    pub points_to_win: Option<u32>,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            ball_radius: 10.0,
            ball_speed: 5.0,
            paddle_width: 10.0,
            paddle_height: 75.0,
            paddle_margin: 10.0,
            paddle_speed: 7.0,
            speedup: 1.05,
            max_speed: 14.0,
            points_to_win: None,
        }
    }
}

impl GameConfig for PongConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ball_speed <= 0.0 || self.max_speed < self.ball_speed {
            return Err(ConfigError::invalid("ball speed must be positive and below max_speed"));
        }
        if self.speedup < 1.0 {
            return Err(ConfigError::invalid("speedup must not slow the ball"));
        }
        if self.points_to_win == Some(0) {
            return Err(ConfigError::invalid("points_to_win must be positive"));
        }
        Ok(())
    }

    fn validate_for(&self, setup: &Setup) -> Result<(), ConfigError> {
        self.validate()?;
        if self.paddle_height > setup.height || self.ball_radius * 2.0 > setup.height {
            return Err(ConfigError::invalid(format!(
                "paddles and ball must fit a {} px tall playfield",
                setup.height
            )));
        }
        if 2.0 * (self.paddle_margin + self.paddle_width) + self.ball_radius * 2.0 >= setup.width {
            return Err(ConfigError::invalid("paddles leave no room for the ball"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Pong {
    config: PongConfig,
    field: Rect,
    rng: Pcg32,
    pub ball: Body,
    /// Player one
    pub left: Body,
    /// Player two
    pub right: Body,
    pub particles: ParticleField,
    points: [u32; 2],
    finished: bool,
}

impl Pong {
    pub fn field(&self) -> Rect {
        self.field
    }

    /// (player one, player two)
    pub fn points(&self) -> (u32, u32) {
        (self.points[0], self.points[1])
    }

    fn paddles(config: &PongConfig, field: &Rect) -> (Body, Body) {
        let y = field.center().y - config.paddle_height / 2.0;
        let left = Body::rect(config.paddle_margin, y, config.paddle_width, config.paddle_height);
        let right = Body::rect(
            field.right() - config.paddle_margin - config.paddle_width,
            y,
            config.paddle_width,
            config.paddle_height,
        );
        (left, right)
    }

    /// Center the ball with a fresh random diagonal
    fn serve(&mut self) {
        let s = self.config.ball_speed;
        let dx = if self.rng.random_bool(0.5) { s } else { -s };
        let dy = if self.rng.random_bool(0.5) { s } else { -s };
        self.ball = Body::circle(self.field.center(), self.config.ball_radius).with_velocity(Vec2::new(dx, dy));
    }

    fn award(&mut self, side: Side, events: &mut Vec<GameEvent>) {
        let slot = match side {
            Side::Home => 0,
            Side::Away => 1,
        };
        self.points[slot] += 1;
        events.push(GameEvent::Scored { points: 1, side });

        let target = self.config.points_to_win.unwrap_or(u32::MAX);
        if self.points[slot] >= target {
            info!("Pong: {:?} wins {}-{}", side, self.points[0], self.points[1]);
            self.finished = true;
            events.push(GameEvent::Won);
            return;
        }
        self.serve();
    }

    fn return_ball(&mut self, toward: f32) {
        let dx = (self.ball.vel.x.abs() * self.config.speedup).min(self.config.max_speed.max(self.ball.vel.x.abs()));
        self.ball.vel.x = dx * toward;
        self.particles.burst(self.ball.pos, 8, 0xffffff);
    }
}

impl Game for Pong {
    type Config = PongConfig;

    const KIND: GameKind = GameKind::Pong;

    fn new(config: PongConfig, setup: &Setup) -> Self {
        let field = Rect::new(0.0, 0.0, setup.width, setup.height);
        let (left, right) = Self::paddles(&config, &field);
        let mut game = Self {
            ball: Body::circle(field.center(), config.ball_radius),
            left,
            right,
            particles: ParticleField::new(setup.max_particles, setup.seed),
            rng: Pcg32::seed_from_u64(setup.seed),
            points: [0, 0],
            finished: false,
            field,
            config,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        let (left, right) = Self::paddles(&self.config, &self.field);
        self.left = left;
        self.right = right;
        self.points = [0, 0];
        self.finished = false;
        self.particles.clear();
        self.serve();
    }

    fn key_map(&self, key: Key) -> Option<Intent> {
        match key {
            Key::W => Some(Intent::AltUp),
            Key::S => Some(Intent::AltDown),
            Key::Left | Key::Right | Key::A | Key::D => None,
            other => default_key_map(other),
        }
    }

    fn apply_intents(&mut self, intents: &Intents) {
        let speed = self.config.paddle_speed;
        let left_axis = intents.is_held(Intent::AltDown) as i32 - intents.is_held(Intent::AltUp) as i32;
        self.left.pos.y += left_axis as f32 * speed;
        self.right.pos.y += intents.axis_y() * speed;
        self.left.clamp_y(self.field.top(), self.field.bottom());
        self.right.clamp_y(self.field.top(), self.field.bottom());
    }

    fn integrate(&mut self, _events: &mut Vec<GameEvent>) {
        if !self.finished {
            self.ball.integrate();
        }
    }

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        if self.finished {
            return;
        }

        bounce_off_walls(&mut self.ball, &self.field, Sides::HORIZONTAL_ONLY);

        // Only a ball travelling toward a paddle can be returned by it
        let (center, radius) = (self.ball.pos, self.ball.radius());
        if self.ball.vel.x < 0.0 && circle_rect_overlap(center, radius, &self.left.bounds()) {
            self.return_ball(1.0);
        } else if self.ball.vel.x > 0.0 && circle_rect_overlap(center, radius, &self.right.bounds()) {
            self.return_ball(-1.0);
        }

        if self.ball.pos.x < self.field.left() {
            self.award(Side::Away, events);
        } else if self.ball.pos.x > self.field.right() {
            self.award(Side::Home, events);
        }
    }

    fn update_effects(&mut self) {
        self.particles.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::{idle, run};

    fn game() -> Pong {
        Pong::new(PongConfig::default(), &Setup::new(800, 400, 21))
    }

    #[test]
    fn test_layout() {
        let g = game();
        assert_eq!(g.left.pos, Vec2::new(10.0, 162.5));
        assert_eq!(g.right.pos, Vec2::new(780.0, 162.5));
        assert_eq!(g.ball.pos, Vec2::new(400.0, 200.0));
        assert_eq!(g.ball.vel.abs(), Vec2::splat(5.0));
    }

    #[test]
    fn test_left_exit_scores_for_player_two() {
        let mut g = game();
        let paddles = (g.left.pos, g.right.pos);
        g.ball.pos = Vec2::new(3.0, 40.0);
        g.ball.vel = Vec2::new(-5.0, 5.0);

        let events = idle(&mut g, 1);

        assert_eq!(events, vec![GameEvent::Scored { points: 1, side: Side::Away }]);
        assert_eq!(g.points(), (0, 1));
        assert_eq!(g.ball.pos, Vec2::new(400.0, 200.0));
        assert_eq!(g.ball.vel.abs(), Vec2::splat(5.0));
        assert_eq!((g.left.pos, g.right.pos), paddles);
    }

    #[test]
    fn test_paddle_return_speeds_up() {
        let mut g = game();
        g.ball.pos = Vec2::new(32.0, 200.0);
        g.ball.vel = Vec2::new(-5.0, 1.0);

        idle(&mut g, 1);

        assert!((g.ball.vel.x - 5.25).abs() < 1e-5);
        assert_eq!(g.ball.vel.y, 1.0);
    }

    #[test]
    fn test_paddle_ignores_ball_moving_away() {
        let mut g = game();
        g.ball.pos = Vec2::new(22.0, 200.0);
        g.ball.vel = Vec2::new(3.0, 0.0);
        idle(&mut g, 1);
        assert_eq!(g.ball.vel.x, 3.0);
    }

    #[test]
    fn test_paddles_clamped() {
        let mut g = game();
        run(&mut g, &Intents::default().hold(Intent::AltUp).hold(Intent::MoveDown), 100);
        assert_eq!(g.left.pos.y, 0.0);
        assert_eq!(g.right.pos.y, 325.0);
    }

    #[test]
    fn test_points_to_win() {
        let config = PongConfig {
            points_to_win: Some(1),
            ..Default::default()
        };
        let mut g = Pong::new(config, &Setup::new(800, 400, 1));
        g.ball.pos = Vec2::new(797.0, 40.0);
        g.ball.vel = Vec2::new(5.0, 0.0);
        let events = idle(&mut g, 1);
        assert_eq!(events.last(), Some(&GameEvent::Won));
        assert!(idle(&mut g, 5).is_empty());
    }

    #[test]
    fn test_paddles_must_fit_playfield() {
        let config = PongConfig::default();
        assert!(config.validate_for(&Setup::new(800, 400, 1)).is_ok());
        assert!(config.validate_for(&Setup::new(800, 60, 1)).is_err());
        assert!(config.validate_for(&Setup::new(60, 400, 1)).is_err());
    }
}
