//! Flappy Bird
//!
//! Gravity pulls the bird down every tick, a jump sets an upward velocity, and
//! pipe pairs scroll in from the right edge. One point per pipe passed.

use glam::Vec2;
use log::info;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Game, GameConfig, GameEvent, Setup};
use crate::catalog::GameKind;
use crate::error::ConfigError;
use crate::input::{Cooldown, Intent, Intents, Key, default_key_map};
use crate::sim::{Body, IntervalSpawner, ParticleField, Rect, pipe_gap_top};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlappyBirdConfig {
    pub bird_width: f32,
    pub bird_height: f32,
    /// Added to the vertical velocity every tick
    pub gravity: f32,
    /// Vertical velocity set by a jump (negative is up)
    pub jump_velocity: f32,
    pub jump_cooldown_ms: u32,
    pub pipe_width: f32,
    pub pipe_gap: f32,
    /// Ticks between pipe spawns
    pub pipe_interval: u32,
    pub pipe_speed: f32,
    /// Shortest allowed top or bottom stack
    pub pipe_min_height: f32,
}

impl Default for FlappyBirdConfig {
    fn default() -> Self {
        Self {
            bird_width: 40.0,
            bird_height: 30.0,
            gravity: 0.5,
            jump_velocity: -8.0,
            jump_cooldown_ms: 100,
            pipe_width: 60.0,
            pipe_gap: 160.0,
            pipe_interval: 90,
            pipe_speed: 3.0,
            pipe_min_height: 50.0,
        }
    }
}

impl GameConfig for FlappyBirdConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.pipe_gap <= self.bird_height {
            return Err(ConfigError::invalid("pipe gap must be taller than the bird"));
        }
        if self.pipe_interval == 0 || self.pipe_speed <= 0.0 {
            return Err(ConfigError::invalid("pipes must spawn and move"));
        }
        if self.gravity <= 0.0 || self.jump_velocity >= 0.0 {
            return Err(ConfigError::invalid("gravity must pull down and jumps must go up"));
        }
        Ok(())
    }

    fn validate_for(&self, setup: &Setup) -> Result<(), ConfigError> {
        self.validate()?;
        // Both stacks need room for their minimum height around the gap
        if self.pipe_gap + 2.0 * self.pipe_min_height >= setup.height {
            return Err(ConfigError::invalid(format!(
                "pipe gap {} with {} px stacks does not fit a {} px playfield",
                self.pipe_gap, self.pipe_min_height, setup.height
            )));
        }
        if self.pipe_width >= setup.width || self.bird_height >= setup.height {
            return Err(ConfigError::invalid("bird and pipes must fit the playfield"));
        }
        Ok(())
    }
}

/// Top and bottom stacks around a fixed gap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipePair {
    pub top: Body,
    pub bottom: Body,
    /// Set once the bird has passed; each pipe scores at most once
    pub counted: bool,
}

impl PipePair {
    pub fn new(x: f32, top_height: f32, gap: f32, width: f32, field_height: f32, speed: f32) -> Self {
        let vel = Vec2::new(-speed, 0.0);
        let bottom_y = top_height + gap;
        Self {
            top: Body::rect(x, 0.0, width, top_height).with_velocity(vel),
            bottom: Body::rect(x, bottom_y, width, field_height - bottom_y).with_velocity(vel),
            counted: false,
        }
    }

    pub fn right(&self) -> f32 {
        self.top.bounds().right()
    }

    pub fn gap(&self) -> (f32, f32) {
        (self.top.bounds().bottom(), self.bottom.pos.y)
    }
}

#[derive(Debug, Clone)]
pub struct FlappyBird {
    config: FlappyBirdConfig,
    field: Rect,
    rng: Pcg32,
    pub bird: Body,
    pub pipes: Vec<PipePair>,
    pub particles: ParticleField,
    spawner: IntervalSpawner,
    jump: Cooldown,
    score: u32,
    best: u32,
    crashed: bool,
}

impl FlappyBird {
    pub fn field(&self) -> Rect {
        self.field
    }

    /// Best score this session, kept across resets
    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn crashed(&self) -> bool {
        self.crashed
    }

    fn bird_start(config: &FlappyBirdConfig, field: &Rect) -> Body {
        Body::rect(field.width() / 3.0, field.height() / 2.0, config.bird_width, config.bird_height)
    }

    fn crash(&mut self, events: &mut Vec<GameEvent>) {
        info!("Flappy Bird: crashed with {} points", self.score);
        self.crashed = true;
        self.particles.burst(self.bird.center(), 24, 0xffd700);
        events.push(GameEvent::Defeated);
    }
}

impl Game for FlappyBird {
    type Config = FlappyBirdConfig;

    const KIND: GameKind = GameKind::FlappyBird;

    fn new(config: FlappyBirdConfig, setup: &Setup) -> Self {
        let field = Rect::new(0.0, 0.0, setup.width, setup.height);
        let mut game = Self {
            bird: Self::bird_start(&config, &field),
            pipes: Vec::new(),
            particles: ParticleField::new(setup.max_particles, setup.seed),
            rng: Pcg32::seed_from_u64(setup.seed),
            spawner: IntervalSpawner::new(config.pipe_interval),
            jump: Cooldown::new(crate::ms_to_ticks(config.jump_cooldown_ms)),
            score: 0,
            best: 0,
            crashed: false,
            field,
            config,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        self.bird = Self::bird_start(&self.config, &self.field);
        self.pipes.clear();
        self.particles.clear();
        self.spawner.reset();
        self.jump.reset();
        self.score = 0;
        self.crashed = false;
    }

    fn key_map(&self, key: Key) -> Option<Intent> {
        match key {
            Key::Space | Key::Up | Key::W => Some(Intent::Jump),
            other => default_key_map(other),
        }
    }

    fn apply_intents(&mut self, intents: &Intents) {
        self.jump.tick();
        if self.crashed {
            return;
        }
        let wants_jump = intents.was_pressed(Intent::Jump) || !intents.taps().is_empty();
        if wants_jump && self.jump.trigger() {
            self.bird.vel.y = self.config.jump_velocity;
        }
    }

    fn integrate(&mut self, _events: &mut Vec<GameEvent>) {
        if self.crashed {
            return;
        }
        self.bird.vel.y += self.config.gravity;
        self.bird.integrate();
        for pipe in &mut self.pipes {
            pipe.top.integrate();
            pipe.bottom.integrate();
        }
    }

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        if self.crashed {
            return;
        }

        let bird = self.bird.bounds();
        if bird.bottom() >= self.field.bottom() || bird.top() <= self.field.top() {
            self.crash(events);
            return;
        }

        if self.pipes.iter().any(|p| self.bird.overlaps(&p.top) || self.bird.overlaps(&p.bottom)) {
            self.crash(events);
            return;
        }

        for pipe in self.pipes.iter_mut().filter(|p| !p.counted) {
            if bird.left() > pipe.right() {
                pipe.counted = true;
                self.score += 1;
                self.best = self.best.max(self.score);
                events.push(GameEvent::scored(1));
            }
        }
    }

    fn spawn(&mut self, _events: &mut Vec<GameEvent>) {
        if self.crashed {
            return;
        }
        self.pipes.retain(|p| p.right() >= 0.0);

        if self.spawner.tick() {
            let cfg = &self.config;
            let top = pipe_gap_top(&mut self.rng, self.field.height(), cfg.pipe_gap, cfg.pipe_min_height);
            // Always enters from beyond the right edge
            self.pipes.push(PipePair::new(
                self.field.right(),
                top,
                cfg.pipe_gap,
                cfg.pipe_width,
                self.field.height(),
                cfg.pipe_speed,
            ));
        }
    }

    fn update_effects(&mut self) {
        self.particles.update();
    }
}
