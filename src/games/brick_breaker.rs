//! Brick Breaker
//!
//! A paddle at the bottom, a ball and a grid of coloured bricks. Clearing the
//! grid advances to the next level with one more row and a faster serve;
//! clearing the final level wins.

use std::f32::consts::PI;

use glam::Vec2;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Game, GameConfig, GameEvent, Setup, Tint};
use crate::catalog::GameKind;
use crate::error::ConfigError;
use crate::input::Intents;
use crate::sim::{
    Body, GridLayout, ParticleField, Rect, Sides, boost, bounce_off_walls, circle_rect_collision,
    circle_rect_overlap, paddle_rebound, reflect_axis,
};

/// Ticks the "level N" banner stays up while the ball waits
pub const LEVEL_BANNER_TICKS: u32 = 120;

const SPARK: Tint = 0xffffff;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrickBreakerConfig {
    pub rows: usize,
    /// Row count stops growing here
    pub max_rows: usize,
    pub cols: usize,
    pub brick_height: f32,
    pub brick_padding: f32,
    pub brick_top: f32,
    pub brick_left: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Pixels per tick while a move key is held
    pub paddle_speed: f32,
    pub ball_radius: f32,
    /// Serve speed on level one, pixels per tick
    pub ball_speed: f32,
    /// Serve speed added per level
    pub level_speed_step: f32,
    pub max_speed: f32,
    /// Multiplicative speed-up per brick
    pub brick_speedup: f32,
    /// Half-width of the paddle rebound cone
    pub max_bounce_degrees: f32,
    pub points_per_brick: u32,
    pub lives: u32,
    pub levels: u32,
    /// One tint per row, cycled
    pub palette: Vec<Tint>,
}

impl Default for BrickBreakerConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            max_rows: 8,
            cols: 8,
            brick_height: 25.0,
            brick_padding: 10.0,
            brick_top: 60.0,
            brick_left: 30.0,
            paddle_width: 120.0,
            paddle_height: 15.0,
            paddle_speed: 8.0,
            ball_radius: 8.0,
            ball_speed: 5.0 * std::f32::consts::SQRT_2,
            level_speed_step: 0.5,
            max_speed: 14.0,
            brick_speedup: 1.01,
            max_bounce_degrees: 60.0,
            points_per_brick: 10,
            lives: 3,
            levels: 5,
            palette: vec![0xfa8282, 0xffb478, 0xfae682, 0xb4ff8c, 0x82c8ff],
        }
    }
}

impl GameConfig for BrickBreakerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::invalid("brick grid needs at least one row and column"));
        }
        if self.max_rows < self.rows {
            return Err(ConfigError::invalid("max_rows is smaller than rows"));
        }
        if self.levels == 0 || self.lives == 0 {
            return Err(ConfigError::invalid("levels and lives must be positive"));
        }
        if self.ball_speed <= 0.0 || self.max_speed < self.ball_speed {
            return Err(ConfigError::invalid("ball speed must be positive and below max_speed"));
        }
        if self.brick_speedup < 1.0 {
            return Err(ConfigError::invalid("brick_speedup must not slow the ball"));
        }
        if self.paddle_width <= 0.0 || self.ball_radius <= 0.0 {
            return Err(ConfigError::invalid("paddle and ball need a positive size"));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::invalid("brick palette is empty"));
        }
        Ok(())
    }

    fn validate_for(&self, setup: &Setup) -> Result<(), ConfigError> {
        self.validate()?;
        let cols = self.cols as f32;
        let brick_width = (setup.width - 2.0 * self.brick_left - (cols - 1.0) * self.brick_padding) / cols;
        if brick_width <= 0.0 {
            return Err(ConfigError::invalid(format!(
                "{} brick columns do not fit a {} px playfield",
                self.cols, setup.width
            )));
        }
        if self.paddle_width > setup.width {
            return Err(ConfigError::invalid("paddle is wider than the playfield"));
        }
        // The first row must sit above the serve lane
        let serve_y = setup.height - self.paddle_height - self.ball_radius - 20.0;
        if self.brick_top + self.brick_height >= serve_y - self.ball_radius * 2.0 {
            return Err(ConfigError::invalid(format!(
                "no brick row fits above the serve lane of a {} px playfield",
                setup.height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brick {
    pub body: Body,
    pub tint: Tint,
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone)]
pub struct BrickBreaker {
    config: BrickBreakerConfig,
    field: Rect,
    rng: Pcg32,
    pub paddle: Body,
    pub ball: Body,
    pub bricks: Vec<Brick>,
    pub particles: ParticleField,
    level: u32,
    rows: usize,
    banner_ticks: u32,
    finished: bool,
}

impl BrickBreaker {
    pub fn config(&self) -> &BrickBreakerConfig {
        &self.config
    }

    pub fn field(&self) -> Rect {
        self.field
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Level number while the between-levels banner is showing
    pub fn level_banner(&self) -> Option<u32> {
        (self.banner_ticks > 0).then_some(self.level)
    }

    pub fn bricks_left(&self) -> usize {
        self.bricks.iter().filter(|b| b.body.alive).count()
    }

    fn serve_y(&self) -> f32 {
        self.field.bottom() - self.config.paddle_height - self.config.ball_radius - 20.0
    }

    fn level_speed(&self) -> f32 {
        let step = self.config.level_speed_step * self.level.saturating_sub(1) as f32;
        (self.config.ball_speed + step).min(self.config.max_speed)
    }

    /// Put the ball back above the paddle heading upward at `speed`
    fn serve(&mut self, speed: f32) {
        let angle = self.rng.random_range(-PI / 8.0..PI / 8.0);
        let center = Vec2::new(self.field.center().x, self.serve_y());
        self.ball = Body::circle(center, self.config.ball_radius).with_velocity(crate::heading(angle) * speed);
    }

    fn build_bricks(&mut self) {
        let cfg = &self.config;
        let grid = GridLayout::fill_width(
            self.rows,
            cfg.cols,
            self.field.width(),
            cfg.brick_left,
            cfg.brick_height,
            cfg.brick_padding,
            cfg.brick_top,
        );
        // Nothing may spawn inside the serve lane above the paddle
        let safe_line = self.serve_y() - cfg.ball_radius * 2.0;

        self.bricks = grid
            .cells()
            .filter(|(_, _, rect)| rect.bottom() < safe_line)
            .map(|(row, col, rect)| Brick {
                body: Body::rect(rect.left(), rect.top(), rect.width(), rect.height()),
                tint: cfg.palette[row % cfg.palette.len()],
                row,
                col,
            })
            .collect();
        debug!("Built {} bricks for level {}", self.bricks.len(), self.level);
    }

    fn paddle_start(config: &BrickBreakerConfig, field: &Rect) -> Body {
        Body::rect(
            (field.width() - config.paddle_width) / 2.0,
            field.bottom() - config.paddle_height - 10.0,
            config.paddle_width,
            config.paddle_height,
        )
    }

    fn max_bounce(&self) -> f32 {
        self.config.max_bounce_degrees.to_radians()
    }
}

impl Game for BrickBreaker {
    type Config = BrickBreakerConfig;

    const KIND: GameKind = GameKind::BrickBreaker;

    fn new(config: BrickBreakerConfig, setup: &Setup) -> Self {
        let field = Rect::new(0.0, 0.0, setup.width, setup.height);
        let mut game = Self {
            paddle: Self::paddle_start(&config, &field),
            ball: Body::circle(Vec2::ZERO, config.ball_radius),
            bricks: Vec::new(),
            particles: ParticleField::new(setup.max_particles, setup.seed),
            rng: Pcg32::seed_from_u64(setup.seed),
            rows: config.rows,
            level: 1,
            banner_ticks: 0,
            finished: false,
            field,
            config,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        self.level = 1;
        self.rows = self.config.rows;
        self.banner_ticks = 0;
        self.finished = false;
        self.paddle = Self::paddle_start(&self.config, &self.field);
        self.particles.clear();
        self.build_bricks();
        self.serve(self.config.ball_speed);
    }

    fn starting_lives(&self) -> Option<u32> {
        Some(self.config.lives)
    }

    fn apply_intents(&mut self, intents: &Intents) {
        if let Some(pointer) = intents.pointer() {
            self.paddle.pos.x = pointer.x - self.config.paddle_width / 2.0;
        }
        self.paddle.pos.x += intents.axis_x() * self.config.paddle_speed;
        self.paddle.clamp_x(self.field.left(), self.field.right());
    }

    fn integrate(&mut self, _events: &mut Vec<GameEvent>) {
        if self.banner_ticks == 0 && !self.finished {
            self.ball.integrate();
        }
    }

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        if self.banner_ticks > 0 || self.finished {
            return;
        }

        if bounce_off_walls(&mut self.ball, &self.field, Sides::OPEN_BOTTOM).any() {
            self.particles.burst(self.ball.pos, 10, SPARK);
        }

        let paddle = self.paddle.bounds();
        if self.ball.vel.y > 0.0 && circle_rect_overlap(self.ball.pos, self.ball.radius(), &paddle) {
            let offset = (self.ball.pos.x - paddle.center().x) / (paddle.width() / 2.0);
            self.ball.vel = paddle_rebound(self.ball.vel, offset, self.max_bounce());
            self.ball.pos.y = paddle.top() - self.ball.radius();
            self.particles.burst(self.ball.pos, 15, SPARK);
        }

        if self.ball.pos.y + self.ball.radius() > self.field.bottom() {
            events.push(GameEvent::LifeLost);
            let speed = self.ball.speed();
            self.serve(speed);
            return;
        }

        let (center, radius) = (self.ball.pos, self.ball.radius());
        let hit = self.bricks.iter().enumerate().find_map(|(i, brick)| {
            if !brick.body.alive {
                return None;
            }
            let contact = circle_rect_collision(center, radius, &brick.body.bounds());
            contact.hit.then_some((i, contact.axis))
        });

        // First brick only; the ball is already moving away from any other
        if let Some((i, axis)) = hit {
            let brick = &mut self.bricks[i];
            brick.body.alive = false;
            let (at, tint) = (brick.body.center(), brick.tint);
            events.push(GameEvent::scored(self.config.points_per_brick));
            self.ball.vel = boost(
                reflect_axis(self.ball.vel, axis),
                self.config.brick_speedup,
                self.config.max_speed,
            );
            self.particles.burst(at, 20, tint);
        }
    }

    fn spawn(&mut self, events: &mut Vec<GameEvent>) {
        if self.finished || self.bricks.is_empty() || self.bricks_left() > 0 {
            return;
        }

        if self.level >= self.config.levels {
            info!("Brick Breaker: final level {} cleared", self.level);
            self.finished = true;
            events.push(GameEvent::Won);
            return;
        }

        let speed = self.ball.speed();
        self.level += 1;
        self.rows = (self.rows + 1).min(self.config.max_rows);
        info!("Brick Breaker: level {} ({} rows)", self.level, self.rows);
        self.build_bricks();
        self.serve(speed.max(self.level_speed()));
        self.banner_ticks = LEVEL_BANNER_TICKS;
        events.push(GameEvent::LevelCleared { level: self.level });
    }

    fn update_effects(&mut self) {
        self.particles.update();
        self.banner_ticks = self.banner_ticks.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::advance;
    use crate::games::testing::{idle, run, score_of};
    use crate::input::Intent;

    fn game() -> BrickBreaker {
        BrickBreaker::new(BrickBreakerConfig::default(), &Setup::new(800, 600, 11))
    }

    #[test]
    fn test_initial_layout() {
        let g = game();
        assert_eq!(g.bricks.len(), 40);
        assert_eq!(g.bricks[0].row, 0);
        assert_eq!(g.bricks[0].col, 0);
        assert_eq!(g.bricks[0].tint, 0xfa8282);
        assert_eq!(g.paddle.pos, Vec2::new(340.0, 575.0));
        assert!(g.ball.vel.y < 0.0);
        assert!((g.ball.speed() - g.config().ball_speed).abs() < 1e-4);
    }

    #[test]
    fn test_hit_first_brick_from_below() {
        let mut g = game();
        let target = g.bricks[0].body.bounds();
        g.ball.pos = Vec2::new(target.center().x, target.bottom() + 11.0);
        g.ball.vel = Vec2::new(0.0, -5.0);

        let events = idle(&mut g, 1);

        assert!(!g.bricks[0].body.alive);
        assert_eq!(g.bricks_left(), 39);
        assert_eq!(score_of(&events), 10);
        assert!(g.ball.vel.y > 0.0, "vertical velocity must flip");
        assert!((g.ball.speed() - 5.05).abs() < 1e-4);
    }

    #[test]
    fn test_paddle_rebound_keeps_speed() {
        let mut g = game();
        let paddle = g.paddle.bounds();
        g.ball.pos = Vec2::new(paddle.center().x + 30.0, paddle.top() - 6.0);
        g.ball.vel = Vec2::new(1.0, 5.0);
        let before = g.ball.speed();

        idle(&mut g, 1);

        assert!(g.ball.vel.y < 0.0);
        assert!(g.ball.vel.x > 0.0, "right of center rebounds right");
        assert!((g.ball.speed() - before).abs() < 1e-4);
    }

    #[test]
    fn test_ball_lost_emits_life_lost_and_reserves() {
        let mut g = game();
        g.ball.pos = Vec2::new(400.0, 595.0);
        g.ball.vel = Vec2::new(0.0, 6.0);
        // Move the paddle out of the way
        g.paddle.pos.x = 0.0;

        let events = idle(&mut g, 1);

        assert_eq!(events, vec![GameEvent::LifeLost]);
        assert!(g.ball.vel.y < 0.0);
        assert!((g.ball.speed() - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_particle_cap_does_not_change_serves() {
        let play = |max_particles: usize| {
            let setup = Setup::new(800, 600, 7).with_particles(max_particles);
            let mut g = BrickBreaker::new(BrickBreakerConfig::default(), &setup);
            // Wall bounce fires a spark burst
            g.ball.pos = Vec2::new(10.0, 300.0);
            g.ball.vel = Vec2::new(-5.0, 2.0);
            idle(&mut g, 1);
            // Then lose the ball so the next serve draws a random angle
            g.paddle.pos.x = 0.0;
            g.ball.pos = Vec2::new(400.0, 595.0);
            g.ball.vel = Vec2::new(0.0, 6.0);
            let events = idle(&mut g, 1);
            assert_eq!(events, vec![GameEvent::LifeLost]);
            (g.ball.pos, g.ball.vel, g.particles.len())
        };
        let (pos_off, vel_off, sparks_off) = play(0);
        let (pos_on, vel_on, sparks_on) = play(256);
        assert_eq!(sparks_off, 0);
        assert!(sparks_on > 0);
        assert_eq!((pos_off, vel_off), (pos_on, vel_on));
    }

    #[test]
    fn test_paddle_clamped_to_field() {
        let mut g = game();
        run(&mut g, &Intents::default().hold(Intent::MoveLeft), 200);
        assert_eq!(g.paddle.pos.x, 0.0);
        run(&mut g, &Intents::default().hold(Intent::MoveRight), 200);
        assert_eq!(g.paddle.pos.x, 680.0);

        let mut events = Vec::new();
        advance(&mut g, &Intents::default().with_pointer(Vec2::new(5.0, 0.0)), &mut events);
        assert_eq!(g.paddle.pos.x, 0.0);
    }

    #[test]
    fn test_clearing_level_adds_row_and_banner() {
        let mut g = game();
        for brick in &mut g.bricks {
            brick.body.alive = false;
        }
        let events = idle(&mut g, 1);

        assert!(events.contains(&GameEvent::LevelCleared { level: 2 }));
        assert_eq!(g.level(), 2);
        assert_eq!(g.bricks.len(), 48);
        assert_eq!(g.level_banner(), Some(2));
        assert!(g.ball.speed() >= g.config().ball_speed + 0.5 - 1e-4);

        // Ball waits for the banner
        let held = g.ball.pos;
        idle(&mut g, 10);
        assert_eq!(g.ball.pos, held);
    }

    #[test]
    fn test_final_level_wins() {
        let config = BrickBreakerConfig {
            levels: 1,
            ..Default::default()
        };
        let mut g = BrickBreaker::new(config, &Setup::new(800, 600, 2));
        for brick in &mut g.bricks {
            brick.body.alive = false;
        }
        assert_eq!(idle(&mut g, 1), vec![GameEvent::Won]);
        assert!(idle(&mut g, 5).is_empty());
    }

    #[test]
    fn test_layout_must_fit_playfield() {
        let config = BrickBreakerConfig::default();
        assert!(config.validate_for(&Setup::new(800, 600, 1)).is_ok());
        // Eight columns with 10 px gaps need more than 130 px
        assert!(config.validate_for(&Setup::new(130, 600, 1)).is_err());
        let single = BrickBreakerConfig {
            cols: 1,
            ..Default::default()
        };
        // One column fits but the 120 px paddle does not
        assert!(single.validate_for(&Setup::new(110, 600, 1)).is_err());
        // First row would sit in the serve lane
        assert!(config.validate_for(&Setup::new(800, 140, 1)).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_grid() {
        let config = BrickBreakerConfig {
            cols: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(BrickBreakerConfig::default().validate().is_ok());
    }
}
