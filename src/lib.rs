//! Catch Arcade - falling-item catch mini-game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, scoring)
//! - `engine`: Session owner wiring the simulation to its collaborators
//! - `config`: Data-driven session configuration and presets
//! - `rewards`: Reward tiers, reward sink and attempt gate
//! - `history`: Finished-session leaderboard
//! - `persistence`: Storage abstraction (LocalStorage on web)
//! - `platform`: Frame clock for display-refresh driven ticks

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod persistence;
pub mod platform;
pub mod rewards;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ArcadeConfig, Preset};
pub use engine::{ArcadeEngine, RenderSink, Snapshot};
pub use error::{ConfigError, StartError};
pub use history::SessionHistory;
pub use rewards::{
    AttemptGate, DailyAttempts, RewardSink, RewardTier, SessionResult, StoredAttempts, Unlimited,
};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta accepted from the display clock (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Play-field defaults (800x600 canvas)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Catcher (basket) defaults
    pub const CATCHER_WIDTH: f32 = 60.0;
    pub const CATCHER_HEIGHT: f32 = 40.0;
    /// Gap between the catcher bottom and the field bottom
    pub const CATCHER_BOTTOM_MARGIN: f32 = 10.0;
    /// Keyboard steering speed (units per second)
    pub const CATCHER_SPEED: f32 = 480.0;

    /// Session length (seconds)
    pub const SESSION_DURATION: f32 = 60.0;

    /// Fall speed range (units per second, 2-4 px per frame at 60 fps)
    pub const FALL_SPEED_MIN: f32 = 120.0;
    pub const FALL_SPEED_MAX: f32 = 240.0;

    /// Default spawn interval (seconds)
    pub const SPAWN_INTERVAL: f32 = 1.0;
    /// Shortest spawn interval a configuration may ask for (seconds)
    pub const MIN_SPAWN_INTERVAL: f32 = 0.01;

    /// Allowed deviation of a probability table sum from 1.0
    pub const PROBABILITY_TOLERANCE: f32 = 1e-3;
}

/// Clamp a horizontal coordinate so a span of `width` stays inside `[0, field_width]`
#[inline]
pub fn clamp_to_field(x: f32, width: f32, field_width: f32) -> f32 {
    x.clamp(0.0, (field_width - width).max(0.0))
}
