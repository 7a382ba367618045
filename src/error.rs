//! Error types surfaced by session start
//!
//! Nothing here is fatal to the host: a rejected start leaves the engine
//! exactly as it was.

use thiserror::Error;

/// A configuration value that cannot drive a session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("item table is empty")]
    EmptyItemTable,
    #[error("item table probabilities sum to {sum}, expected 1.0")]
    ProbabilitySum { sum: f32 },
    #[error("{what} probability {value} is outside [0, 1]")]
    Probability { what: &'static str, value: f32 },
    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f32 },
    #[error("item {kind} has non-positive base value {value}")]
    ItemValue { kind: &'static str, value: i64 },
    #[error("hazard penalty must not be positive, got {0}")]
    HazardPenalty(i64),
    #[error("spawn interval {0}s is shorter than the {min}s minimum", min = crate::consts::MIN_SPAWN_INTERVAL)]
    SpawnInterval(f32),
    #[error("fall speed range {min}..{max} is empty")]
    FallSpeedRange { min: f32, max: f32 },
    #[error("slow-time factor must be in (0, 1), got {0}")]
    SlowFactor(f32),
    #[error("score multiplier factor must be at least 1, got {0}")]
    MultiplierFactor(f32),
    #[error("combo max multiplier must be at least 1, got {0}")]
    ComboCap(f32),
    #[error("reward thresholds must be strictly ascending by score")]
    RewardThresholds,
    #[error("catcher ({width} wide) does not fit in a {field} wide field")]
    CatcherTooWide { width: f32, field: f32 },
}

/// Why a start request was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StartError {
    #[error("a session is already running")]
    AlreadyRunning,
    #[error("no attempts remaining")]
    AttemptsExhausted,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
