//! Alien Invaders
//!
//! A sweeping grid of aliens that steps down each time it touches a side
//! wall. Waves are endless: clearing one spawns the next, a little faster.

use glam::Vec2;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Game, GameConfig, GameEvent, Setup, Tint};
use crate::catalog::GameKind;
use crate::error::ConfigError;
use crate::input::{Cooldown, Intent, Intents};
use crate::sim::{Body, GridLayout, ParticleField, Rect, first_hit};

const ALIEN_TINT: Tint = 0x7cfc00;
const PLAYER_TINT: Tint = 0x3498db;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlienInvadersConfig {
    pub rows: usize,
    pub cols: usize,
    pub alien_size: f32,
    pub alien_padding: f32,
    /// Top-left corner of the first alien
    pub grid_offset: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub player_y: f32,
    pub player_speed: f32,
    pub shot_cooldown_ms: u32,
    pub shot_width: f32,
    pub shot_height: f32,
    pub shot_speed: f32,
    /// Chance per tick that some alien drops a bomb
    pub enemy_fire_chance: f64,
    pub enemy_shot_speed: f32,
    pub alien_speed: f32,
    /// Sweep speed added per wave
    pub wave_speed_step: f32,
    pub drop_distance: f32,
    pub points_per_alien: u32,
    pub lives: u32,
}

impl Default for AlienInvadersConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 10,
            alien_size: 35.0,
            alien_padding: 20.0,
            grid_offset: 50.0,
            player_width: 50.0,
            player_height: 20.0,
            player_y: 550.0,
            player_speed: 8.0,
            shot_cooldown_ms: 300,
            shot_width: 4.0,
            shot_height: 15.0,
            shot_speed: 7.0,
            enemy_fire_chance: 0.01,
            enemy_shot_speed: 5.0,
            alien_speed: 1.0,
            wave_speed_step: 0.5,
            drop_distance: 30.0,
            points_per_alien: 10,
            lives: 3,
        }
    }
}

impl GameConfig for AlienInvadersConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::invalid("alien wave needs at least one row and column"));
        }
        if self.lives == 0 {
            return Err(ConfigError::invalid("lives must be positive"));
        }
        if self.shot_speed <= 0.0 || self.alien_speed <= 0.0 {
            return Err(ConfigError::invalid("shot and alien speeds must be positive"));
        }
        if !(0.0..=1.0).contains(&self.enemy_fire_chance) {
            return Err(ConfigError::invalid("enemy_fire_chance must be a probability"));
        }
        Ok(())
    }

    fn validate_for(&self, setup: &Setup) -> Result<(), ConfigError> {
        self.validate()?;
        let span = |n: usize| n as f32 * self.alien_size + (n as f32 - 1.0) * self.alien_padding;
        if self.grid_offset + span(self.cols) > setup.width {
            return Err(ConfigError::invalid(format!(
                "{} alien columns do not fit a {} px playfield",
                self.cols, setup.width
            )));
        }
        if self.player_y + self.player_height > setup.height || self.player_width > setup.width {
            return Err(ConfigError::invalid("player cannon is outside the playfield"));
        }
        if self.grid_offset + span(self.rows) >= self.player_y {
            return Err(ConfigError::invalid("alien wave starts on the player line"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AlienInvaders {
    config: AlienInvadersConfig,
    field: Rect,
    rng: Pcg32,
    pub player: Body,
    pub aliens: Vec<Body>,
    /// Player projectiles, moving up
    pub shots: Vec<Body>,
    /// Alien projectiles, moving down
    pub bombs: Vec<Body>,
    pub particles: ParticleField,
    cooldown: Cooldown,
    direction: f32,
    speed: f32,
    wave: u32,
    overrun: bool,
}

impl AlienInvaders {
    pub fn field(&self) -> Rect {
        self.field
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Current sweep speed in pixels per tick
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn aliens_alive(&self) -> usize {
        self.aliens.iter().filter(|a| a.alive).count()
    }

    fn build_wave(&mut self) {
        let cfg = &self.config;
        let grid = GridLayout {
            rows: cfg.rows,
            cols: cfg.cols,
            cell: Vec2::splat(cfg.alien_size),
            padding: cfg.alien_padding,
            origin: Vec2::splat(cfg.grid_offset),
        };
        self.aliens = grid
            .cells()
            .map(|(_, _, r)| Body::rect(r.left(), r.top(), r.width(), r.height()))
            .collect();
        self.direction = 1.0;
        debug!("Wave {}: {} aliens at speed {}", self.wave, self.aliens.len(), self.speed);
    }

    fn fire(&mut self) {
        let cfg = &self.config;
        let x = self.player.pos.x + cfg.player_width / 2.0 - cfg.shot_width / 2.0;
        let shot = Body::rect(x, self.player.pos.y, cfg.shot_width, cfg.shot_height)
            .with_velocity(Vec2::new(0.0, -cfg.shot_speed));
        self.shots.push(shot);
    }

    fn drop_bomb(&mut self) {
        let living: Vec<usize> = (0..self.aliens.len()).filter(|&i| self.aliens[i].alive).collect();
        if living.is_empty() {
            return;
        }
        let alien = self.aliens[living[self.rng.random_range(0..living.len())]].bounds();
        let cfg = &self.config;
        let bomb = Body::rect(
            alien.center().x - cfg.shot_width / 2.0,
            alien.bottom(),
            cfg.shot_width,
            cfg.shot_height,
        )
        .with_velocity(Vec2::new(0.0, cfg.enemy_shot_speed));
        self.bombs.push(bomb);
    }
}

impl Game for AlienInvaders {
    type Config = AlienInvadersConfig;

    const KIND: GameKind = GameKind::AlienInvaders;

    fn new(config: AlienInvadersConfig, setup: &Setup) -> Self {
        let mut game = Self {
            field: Rect::new(0.0, 0.0, setup.width, setup.height),
            rng: Pcg32::seed_from_u64(setup.seed),
            player: Body::rect(0.0, 0.0, config.player_width, config.player_height),
            aliens: Vec::new(),
            shots: Vec::new(),
            bombs: Vec::new(),
            particles: ParticleField::new(setup.max_particles, setup.seed),
            cooldown: Cooldown::new(crate::ms_to_ticks(config.shot_cooldown_ms)),
            direction: 1.0,
            speed: config.alien_speed,
            wave: 1,
            overrun: false,
            config,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        let cfg = &self.config;
        self.player = Body::rect(
            self.field.center().x - cfg.player_width / 2.0,
            cfg.player_y,
            cfg.player_width,
            cfg.player_height,
        );
        self.speed = cfg.alien_speed;
        self.wave = 1;
        self.overrun = false;
        self.shots.clear();
        self.bombs.clear();
        self.particles.clear();
        self.cooldown.reset();
        self.build_wave();
    }

    fn starting_lives(&self) -> Option<u32> {
        Some(self.config.lives)
    }

    fn apply_intents(&mut self, intents: &Intents) {
        if self.overrun {
            return;
        }
        if let Some(pointer) = intents.pointer() {
            self.player.pos.x = pointer.x - self.config.player_width / 2.0;
        }
        self.player.pos.x += intents.axis_x() * self.config.player_speed;
        self.player.clamp_x(self.field.left(), self.field.right());

        self.cooldown.tick();
        let wants_fire = intents.is_held(Intent::Shoot) || intents.was_pressed(Intent::Shoot) || !intents.taps().is_empty();
        if wants_fire && self.cooldown.trigger() {
            self.fire();
        }
    }

    fn integrate(&mut self, _events: &mut Vec<GameEvent>) {
        if self.overrun {
            return;
        }
        self.shots.iter_mut().for_each(Body::integrate);
        self.bombs.iter_mut().for_each(Body::integrate);
        let dx = self.speed * self.direction;
        for alien in self.aliens.iter_mut().filter(|a| a.alive) {
            alien.pos.x += dx;
        }
    }

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        if self.overrun {
            return;
        }

        // Each shot kills at most one alien; a dead alien cannot be hit twice
        for shot in &mut self.shots {
            if shot.pos.y < self.field.top() {
                shot.alive = false;
                continue;
            }
            if let Some(i) = first_hit(shot, &self.aliens) {
                self.aliens[i].alive = false;
                shot.alive = false;
                events.push(GameEvent::scored(self.config.points_per_alien));
                self.particles.burst(self.aliens[i].center(), 12, ALIEN_TINT);
            }
        }
        self.shots.retain(|s| s.alive);

        for bomb in &mut self.bombs {
            if bomb.pos.y > self.field.bottom() {
                bomb.alive = false;
            } else if bomb.overlaps(&self.player) {
                bomb.alive = false;
                events.push(GameEvent::LifeLost);
                self.particles.burst(self.player.center(), 20, PLAYER_TINT);
            }
        }
        self.bombs.retain(|b| b.alive);

        let living = || self.aliens.iter().filter(|a| a.alive);
        let at_edge = living().any(|a| {
            let b = a.bounds();
            b.left() < self.field.left() || b.right() > self.field.right()
        });
        let landed = living().any(|a| a.bounds().bottom() > self.player.pos.y);

        if at_edge {
            let drop = self.config.drop_distance;
            for alien in self.aliens.iter_mut().filter(|a| a.alive) {
                alien.pos.y += drop;
            }
            self.direction = -self.direction;
        }

        if landed {
            info!("Alien Invaders: wave {} reached the player", self.wave);
            self.overrun = true;
            events.push(GameEvent::Defeated);
        }
    }

    fn spawn(&mut self, events: &mut Vec<GameEvent>) {
        if self.overrun {
            return;
        }
        if self.rng.random_bool(self.config.enemy_fire_chance) {
            self.drop_bomb();
        }
        if self.aliens_alive() == 0 {
            self.wave += 1;
            self.speed += self.config.wave_speed_step;
            info!("Alien Invaders: wave {} at speed {}", self.wave, self.speed);
            self.build_wave();
            events.push(GameEvent::LevelCleared { level: self.wave });
        }
    }

    fn update_effects(&mut self) {
        self.particles.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::testing::{idle, run, score_of};

    fn game() -> AlienInvaders {
        let config = AlienInvadersConfig {
            enemy_fire_chance: 0.0,
            ..Default::default()
        };
        AlienInvaders::new(config, &Setup::new(800, 600, 5))
    }

    #[test]
    fn test_initial_wave() {
        let g = game();
        assert_eq!(g.aliens.len(), 50);
        assert_eq!(g.aliens[0].pos, Vec2::new(50.0, 50.0));
        assert_eq!(g.aliens[11].pos, Vec2::new(105.0, 105.0));
        assert_eq!(g.player.pos, Vec2::new(375.0, 550.0));
    }

    #[test]
    fn test_cleared_wave_respawns_faster() {
        let mut g = game();
        for alien in &mut g.aliens {
            alien.alive = false;
        }
        let events = idle(&mut g, 1);

        assert_eq!(events, vec![GameEvent::LevelCleared { level: 2 }]);
        assert_eq!(g.aliens_alive(), 50);
        assert!((g.speed() - 1.5).abs() < 1e-6);
        assert_eq!(g.wave(), 2);
    }

    #[test]
    fn test_shot_kills_exactly_one_alien() {
        let mut g = game();
        // Two aliens stacked under one shot
        let target = g.aliens[0];
        g.aliens[1].pos = target.pos;
        g.shots.push(Body::rect(target.pos.x + 10.0, target.pos.y + 20.0, 4.0, 15.0));

        let events = idle(&mut g, 1);

        assert_eq!(score_of(&events), 10);
        assert_eq!(g.aliens_alive(), 49);
        assert!(g.shots.is_empty());
    }

    #[test]
    fn test_shot_cooldown() {
        let mut g = game();
        run(&mut g, &Intents::default().hold(Intent::Shoot), 18);
        assert_eq!(g.shots.len(), 1);
        run(&mut g, &Intents::default().hold(Intent::Shoot), 1);
        assert_eq!(g.shots.len(), 2);
    }

    #[test]
    fn test_edge_reverses_and_drops() {
        let mut g = game();
        let y0 = g.aliens[0].pos.y;
        // Rightmost column starts at 545 + 35 = 580; 221 ticks to pass 800
        idle(&mut g, 221);
        assert!(g.aliens[0].pos.y > y0);
        let x = g.aliens[0].pos.x;
        idle(&mut g, 1);
        assert!(g.aliens[0].pos.x < x);
    }

    #[test]
    fn test_bomb_costs_a_life() {
        let mut g = game();
        let p = g.player.pos;
        g.bombs.push(Body::rect(p.x + 10.0, p.y - 10.0, 4.0, 15.0).with_velocity(Vec2::new(0.0, 5.0)));
        assert_eq!(idle(&mut g, 1), vec![GameEvent::LifeLost]);
        assert!(g.bombs.is_empty());
    }

    #[test]
    fn test_aliens_reaching_player_defeat() {
        let mut g = game();
        for alien in &mut g.aliens {
            alien.pos.y += 480.0;
        }
        let events = idle(&mut g, 1);
        assert_eq!(events, vec![GameEvent::Defeated]);
        assert!(idle(&mut g, 3).is_empty());
    }

    #[test]
    fn test_wave_must_fit_playfield() {
        let config = AlienInvadersConfig::default();
        assert!(config.validate_for(&Setup::new(800, 600, 1)).is_ok());
        // Ten 35 px aliens with 20 px gaps from x = 50 reach 580
        assert!(config.validate_for(&Setup::new(560, 600, 1)).is_err());
        // Cannon row at 550 falls off a 500 px field
        assert!(config.validate_for(&Setup::new(800, 500, 1)).is_err());
    }
}
