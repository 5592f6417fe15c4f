//! Arcade Engine - real-time 2D arcade games on a shared frame loop
//!
//! Core modules:
//! - `sim`: Simulation primitives (bodies, collision, particles, spawners)
//! - `games`: The nine game simulations built on those primitives
//! - `engine`: Frame loop controller, scheduling and the host bridge
//! - `input`: Raw key/pointer events to intents
//! - `renderer`: Software raster surface and per-game scenes
//! - `settings`: Data-driven configuration
//! - `catalog`: The closed set of games and their constructors

pub mod catalog;
pub mod engine;
pub mod error;
pub mod games;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use catalog::{Catalog, CatalogEntry, GameKind};
pub use engine::{Cabinet, Engine, HostBridge, RunState, Scoreboard};
pub use error::{ConfigError, InitError};
pub use settings::{ArcadeConfig, QualityPreset, Settings};

use glam::Vec2;

/// Simulation constants shared by every game
pub mod consts {
    /// Simulation tick rate. Per-tick constants were tuned at this rate.
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / SIM_HZ as f64;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame gap fed to the accumulator (ms)
    pub const MAX_FRAME_MS: f64 = 100.0;
    /// Attempts at random placement before falling back to a scan
    pub const PLACEMENT_ATTEMPTS: u32 = 64;
}

/// Convert a duration in milliseconds to whole simulation ticks (at least one)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u32 {
    ((ms as f64 / consts::SIM_DT_MS).round() as u32).max(1)
}

/// Unit vector for an angle measured from straight up (positive = clockwise on screen)
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(1000), 60);
        assert_eq!(ms_to_ticks(300), 18);
        assert_eq!(ms_to_ticks(150), 9);
        assert_eq!(ms_to_ticks(1), 1);
        assert_eq!(ms_to_ticks(0), 1);
    }

    #[test]
    fn test_heading_points_up_at_zero() {
        let h = heading(0.0);
        assert!(h.x.abs() < 1e-6);
        assert!((h.y + 1.0).abs() < 1e-6);
        assert!((heading(1.1).length() - 1.0).abs() < 1e-6);
    }
}
