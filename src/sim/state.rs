//! Session state and core simulation types
//!
//! Everything a running session mutates lives in [`Session`]; the engine owns
//! at most one of them at a time.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::combo::ComboState;
use super::spawn::Spawner;
use crate::clamp_to_field;
use crate::config::{ArcadeConfig, CatcherConfig};

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session has been started yet
    #[default]
    Idle,
    /// Items are falling and the clock is running
    Running,
    /// Clock and motion frozen until resumed
    Paused,
    /// Finished (timeout or stop); a new start is allowed
    Ended,
}

/// Temporary effects a power-up item can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Magnet,
    SlowTime,
    ScoreMultiplier,
}

impl PowerUpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Magnet => "magnet",
            PowerUpKind::SlowTime => "slow_time",
            PowerUpKind::ScoreMultiplier => "score_multiplier",
        }
    }
}

/// Item classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Common,
    Rare,
    Epic,
    Hazard,
    PowerUp(PowerUpKind),
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Common => "common",
            ItemKind::Rare => "rare",
            ItemKind::Epic => "epic",
            ItemKind::Hazard => "hazard",
            ItemKind::PowerUp(kind) => kind.as_str(),
        }
    }

    /// Returns true for the kinds that score on catch
    pub fn is_valuable(&self) -> bool {
        matches!(self, ItemKind::Common | ItemKind::Rare | ItemKind::Epic)
    }
}

/// Power-up effect with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PowerUpEffect {
    /// Pull nearby items horizontally toward the catcher
    Magnet { radius: f32, pull_speed: f32 },
    /// Scale every item's fall speed
    SlowTime { factor: f32 },
    /// Multiply catch scores (stacks with the combo multiplier)
    ScoreMultiplier { factor: f32 },
}

impl PowerUpEffect {
    pub fn kind(&self) -> PowerUpKind {
        match self {
            PowerUpEffect::Magnet { .. } => PowerUpKind::Magnet,
            PowerUpEffect::SlowTime { .. } => PowerUpKind::SlowTime,
            PowerUpEffect::ScoreMultiplier { .. } => PowerUpKind::ScoreMultiplier,
        }
    }
}

/// A falling item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    pub kind: ItemKind,
    /// Top-left corner
    pub pos: Vec2,
    /// Units per second before slow-time
    pub fall_speed: f32,
    pub size: Vec2,
    /// Score delta on catch (negative for hazards, zero for power-ups)
    pub value: i64,
    /// Effect granted on catch (power-ups only)
    #[serde(default)]
    pub effect: Option<PowerUpEffect>,
    /// Effect duration in seconds (power-ups only)
    #[serde(default)]
    pub effect_duration: f32,
}

impl FallingItem {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// The player's basket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catcher {
    /// Top-left corner; `y` stays fixed
    pub pos: Vec2,
    pub size: Vec2,
}

impl Catcher {
    /// Catcher centred horizontally, resting above the field bottom
    pub fn new(config: &CatcherConfig, field_width: f32, field_height: f32) -> Self {
        let size = Vec2::new(config.width, config.height);
        Self {
            pos: Vec2::new(
                (field_width - size.x) / 2.0,
                field_height - size.y - config.bottom_margin,
            ),
            size,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Move toward a target centre x, optionally limited to `max_speed` units/sec
    pub fn follow(&mut self, target_center_x: f32, max_speed: Option<f32>, dt: f32, field_width: f32) {
        let target = target_center_x - self.size.x / 2.0;
        let next = match max_speed {
            Some(speed) => {
                let max_delta = speed * dt;
                self.pos.x + (target - self.pos.x).clamp(-max_delta, max_delta)
            }
            None => target,
        };
        self.pos.x = clamp_to_field(next, self.size.x, field_width);
    }

    /// Keyboard steering, `axis` in [-1, 1]
    pub fn steer(&mut self, axis: f32, speed: f32, dt: f32, field_width: f32) {
        let axis = axis.clamp(-1.0, 1.0);
        self.pos.x = clamp_to_field(self.pos.x + axis * speed * dt, self.size.x, field_width);
    }
}

/// A power-up currently in effect
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub effect: PowerUpEffect,
    /// Seconds left
    pub remaining: f32,
}

/// Active power-up effects, at most one per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub active: Vec<ActivePowerUp>,
}

impl ActiveEffects {
    /// Activate an effect; an already active kind is refreshed to the new duration
    pub fn activate(&mut self, effect: PowerUpEffect, duration: f32) {
        let kind = effect.kind();
        if let Some(slot) = self.active.iter_mut().find(|p| p.effect.kind() == kind) {
            slot.effect = effect;
            slot.remaining = duration;
        } else {
            self.active.push(ActivePowerUp {
                effect,
                remaining: duration,
            });
        }
    }

    /// Count down every effect
    pub fn advance(&mut self, dt: f32) {
        for power_up in &mut self.active {
            power_up.remaining = (power_up.remaining - dt).max(0.0);
        }
    }

    /// Drop lapsed effects, returning their kinds
    pub fn expire(&mut self) -> Vec<PowerUpKind> {
        let expired = self
            .active
            .iter()
            .filter(|p| p.remaining <= 0.0)
            .map(|p| p.effect.kind())
            .collect();
        self.active.retain(|p| p.remaining > 0.0);
        expired
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.iter().any(|p| p.effect.kind() == kind)
    }

    /// Global fall-speed factor (1.0 when no slow-time is active)
    pub fn speed_factor(&self) -> f32 {
        self.active
            .iter()
            .filter_map(|p| match p.effect {
                PowerUpEffect::SlowTime { factor } => Some(factor),
                _ => None,
            })
            .product()
    }

    /// Temporary score multiplier (1.0 when none is active)
    pub fn score_multiplier(&self) -> f32 {
        self.active
            .iter()
            .filter_map(|p| match p.effect {
                PowerUpEffect::ScoreMultiplier { factor } => Some(factor),
                _ => None,
            })
            .product()
    }

    /// Magnet parameters `(radius, pull_speed)` if a magnet is active
    pub fn magnet(&self) -> Option<(f32, f32)> {
        self.active.iter().find_map(|p| match p.effect {
            PowerUpEffect::Magnet { radius, pull_speed } => Some((radius, pull_speed)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

/// Something the presentation layer may want to show (floating score text etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Caught { item_id: u32, kind: ItemKind, delta: u64, pos: Vec2 },
    HazardHit { item_id: u32, delta: u64, pos: Vec2 },
    Missed { item_id: u32, kind: ItemKind, penalty: u64 },
    PowerUpActivated { kind: PowerUpKind, duration: f32 },
    PowerUpExpired { kind: PowerUpKind },
    ComboReset { count: u32 },
}

/// Per-session tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub caught: u32,
    pub missed: u32,
    pub hazards_hit: u32,
    pub power_ups: u32,
    pub best_combo: u32,
    pub spawned: u32,
}

/// Complete state of one arcade run
#[derive(Debug, Clone)]
pub struct Session {
    pub seed: u64,
    pub phase: SessionPhase,
    pub score: u64,
    /// Seconds left on the clock
    pub time_remaining: f32,
    pub combo: ComboState,
    pub effects: ActiveEffects,
    /// Active items (ascending id)
    pub items: Vec<FallingItem>,
    pub catcher: Catcher,
    pub stats: SessionStats,
    /// Events produced by the most recent tick
    pub events: Vec<GameEvent>,
    /// Simulation tick counter
    pub ticks: u64,
    pub spawner: Spawner,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl Session {
    /// Fresh running session built from an already validated configuration
    pub fn new(config: &ArcadeConfig, seed: u64) -> Self {
        Self {
            seed,
            phase: SessionPhase::Running,
            score: 0,
            time_remaining: config.duration,
            combo: ComboState::default(),
            effects: ActiveEffects::default(),
            items: Vec::new(),
            catcher: Catcher::new(&config.catcher, config.field.width, config.field.height),
            stats: SessionStats::default(),
            events: Vec::new(),
            ticks: 0,
            spawner: Spawner::from_config(config),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a score delta, saturating at zero
    pub fn apply_delta(&mut self, delta: i64) -> u64 {
        let before = self.score;
        self.score = if delta >= 0 {
            self.score.saturating_add(delta as u64)
        } else {
            self.score.saturating_sub(delta.unsigned_abs())
        };
        before.abs_diff(self.score)
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn is_live(&self) -> bool {
        matches!(self.phase, SessionPhase::Running | SessionPhase::Paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catcher() -> Catcher {
        Catcher {
            pos: Vec2::new(100.0, 550.0),
            size: Vec2::new(60.0, 40.0),
        }
    }

    #[test]
    fn test_catcher_follow_snaps_and_clamps() {
        let mut c = catcher();
        c.follow(400.0, None, 0.016, 800.0);
        assert_eq!(c.center().x, 400.0);

        c.follow(-50.0, None, 0.016, 800.0);
        assert_eq!(c.pos.x, 0.0);

        c.follow(10_000.0, None, 0.016, 800.0);
        assert_eq!(c.pos.x, 740.0);
    }

    #[test]
    fn test_catcher_follow_speed_limited() {
        let mut c = catcher();
        c.follow(700.0, Some(100.0), 0.5, 800.0);
        assert_eq!(c.pos.x, 150.0);
    }

    #[test]
    fn test_catcher_steer() {
        let mut c = catcher();
        c.steer(-1.0, 200.0, 0.25, 800.0);
        assert_eq!(c.pos.x, 50.0);
        c.steer(-5.0, 200.0, 1.0, 800.0);
        assert_eq!(c.pos.x, 0.0);
    }

    #[test]
    fn test_effects_refresh_instead_of_stacking() {
        let mut effects = ActiveEffects::default();
        effects.activate(PowerUpEffect::ScoreMultiplier { factor: 2.0 }, 4.0);
        effects.advance(3.0);
        effects.activate(PowerUpEffect::ScoreMultiplier { factor: 2.0 }, 4.0);

        assert_eq!(effects.active.len(), 1);
        assert_eq!(effects.active[0].remaining, 4.0);
        assert_eq!(effects.score_multiplier(), 2.0);
    }

    #[test]
    fn test_effects_expire() {
        let mut effects = ActiveEffects::default();
        effects.activate(PowerUpEffect::SlowTime { factor: 0.5 }, 1.0);
        effects.activate(PowerUpEffect::Magnet { radius: 100.0, pull_speed: 300.0 }, 3.0);
        assert_eq!(effects.speed_factor(), 0.5);

        effects.advance(1.0);
        let expired = effects.expire();
        assert_eq!(expired, vec![PowerUpKind::SlowTime]);
        assert_eq!(effects.speed_factor(), 1.0);
        assert_eq!(effects.magnet(), Some((100.0, 300.0)));
    }

    #[test]
    fn test_apply_delta_saturates() {
        let mut session = Session::new(&ArcadeConfig::default(), 1);
        assert_eq!(session.apply_delta(15), 15);
        assert_eq!(session.apply_delta(-20), 15);
        assert_eq!(session.score, 0);
    }
}
