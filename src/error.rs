//! Error types
//!
//! Only engine initialization and settings loading can fail. Every other
//! lifecycle call degrades to a logged no-op.

use thiserror::Error;

/// Reasons `init` refuses to bind a surface
#[derive(Debug, Error)]
pub enum InitError {
    #[error("no rendering surface supplied")]
    MissingSurface,

    #[error("rendering surface has invalid dimensions {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    #[error("invalid game configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Settings and per-game configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
