//! Arcade settings and per-game tuning
//!
//! Everything is plain serde data with `#[serde(default)]`, so a partial JSON
//! document only overrides what it names. Persisted in LocalStorage on the
//! web and read from a file by the native runner.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::games::{
    AlienInvadersConfig, BrickBreakerConfig, CandyCrushConfig, FlappyBirdConfig, GameConfig, MazeConfig,
    MemoryMatchConfig, PongConfig, SlotMachineConfig, SnakeConfig,
};
use crate::renderer::RenderStyle;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles per game
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 1024,
        }
    }

    /// Whether to draw the background starfield
    pub fn starfield_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Tuning for every game in the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub brick_breaker: BrickBreakerConfig,
    pub alien_invaders: AlienInvadersConfig,
    pub flappy_bird: FlappyBirdConfig,
    pub pong: PongConfig,
    pub snake: SnakeConfig,
    pub maze: MazeConfig,
    pub memory_match: MemoryMatchConfig,
    pub candy_crush: CandyCrushConfig,
    pub slot_machine: SlotMachineConfig,
}

impl ArcadeConfig {
    /// Check every game's tuning, naming the first bad one
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = |name: &str, r: Result<(), ConfigError>| {
            r.map_err(|e| ConfigError::invalid(format!("{name}: {e}")))
        };
        named("brick_breaker", self.brick_breaker.validate())?;
        named("alien_invaders", self.alien_invaders.validate())?;
        named("flappy_bird", self.flappy_bird.validate())?;
        named("pong", self.pong.validate())?;
        named("snake", self.snake.validate())?;
        named("maze", self.maze.validate())?;
        named("memory_match", self.memory_match.validate())?;
        named("candy_crush", self.candy_crush.validate())?;
        named("slot_machine", self.slot_machine.validate())?;
        Ok(())
    }
}

/// Arcade preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (sparks, explosions)
    pub particles: bool,

    // === HUD ===
    /// Draw score/lives text over the playfield
    pub show_hud: bool,

    // === Accessibility ===
    /// Reduced motion (no particles, no starfield)
    pub reduced_motion: bool,

    /// Fixed RNG seed for reproducible runs; random when unset
    pub seed: Option<u64>,

    pub games: ArcadeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            show_hud: true,
            reduced_motion: false,
            seed: None,
            games: ArcadeConfig::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.particles = false;
        }
    }

    /// Effective particles (respects reduced_motion)
    pub fn effective_particles(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.effective_particles() {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            starfield: self.quality.starfield_enabled() && !self.reduced_motion,
            particles: self.effective_particles(),
            hud: self.show_hud,
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.games.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "arcade_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|storage| storage.get_item(Self::STORAGE_KEY).ok().flatten());

        if let Some(json) = stored {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {e}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let (Some(storage), Ok(json)) = (storage, serde_json::to_string(self)) {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{ "quality": "High", "games": { "snake": { "grid_size": 12 } } }"#)
            .expect("valid");
        assert_eq!(s.quality, QualityPreset::High);
        assert!(s.particles);
        assert_eq!(s.games.snake.grid_size, 12);
        assert_eq!(s.games.snake.move_interval_ms, 150);
        assert_eq!(s.games.pong, PongConfig::default());
    }

    #[test]
    fn test_invalid_game_config_is_rejected() {
        let err = Settings::from_json(r#"{ "games": { "memory_match": { "grid_size": 3 } } }"#)
            .expect_err("odd board");
        assert!(err.to_string().contains("memory_match"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Settings::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_reduced_motion_disables_effects() {
        let s = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(s.max_particles(), 0);
        let style = s.render_style();
        assert!(!style.starfield && !style.particles && style.hud);
    }

    #[test]
    fn test_low_preset() {
        let s = Settings::from_preset(QualityPreset::Low);
        assert_eq!(s.max_particles(), 0);
        assert!(!s.render_style().starfield);
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Settings::load_from("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_json_round_trip_of_defaults() {
        let json = Settings::default().to_json().expect("serialize");
        assert_eq!(Settings::from_json(&json).expect("parse"), Settings::default());
    }
}
