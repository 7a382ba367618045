//! Session configuration and presets
//!
//! Persisted separately from the session history through the storage layer.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::persistence::{self, Storage};
use crate::rewards::{RewardConfig, RewardThreshold, RewardTier};
use crate::sim::spawn::{SpawnCadence, WeightedTable};
use crate::sim::{ItemKind, PowerUpEffect};

/// Named mini-game variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Coins, rocks and stars on a one-second cadence
    #[default]
    Classic,
    /// Four item tiers, a breakable hazard and three power-ups
    Deluxe,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "Classic",
            Preset::Deluxe => "Deluxe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Preset::Classic),
            "deluxe" => Some(Preset::Deluxe),
            _ => None,
        }
    }
}

/// Play-field dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
}

/// Catcher dimensions and movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatcherConfig {
    pub width: f32,
    pub height: f32,
    pub bottom_margin: f32,
    /// Keyboard steering speed (units per second)
    pub speed: f32,
    /// Pointer follow speed limit; `None` snaps to the pointer
    #[serde(default)]
    pub max_follow_speed: Option<f32>,
}

/// Spawn cadence and fall speed range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub cadence: SpawnCadence,
    pub fall_speed_min: f32,
    pub fall_speed_max: f32,
}

/// Combo multiplier parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboConfig {
    /// Multiplier gained per consecutive catch
    pub base_increment: f32,
    pub max_multiplier: f32,
    /// Seconds without a catch before the streak breaks
    pub timeout: f32,
}

/// One row of the valuable item table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub name: String,
    pub kind: ItemKind,
    pub probability: f32,
    pub base_value: i64,
    pub size: f32,
}

/// Item that costs score on catch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardSpec {
    pub name: String,
    /// Independent roll per spawn attempt
    pub probability: f32,
    /// Score delta on catch (zero or negative)
    pub penalty: i64,
    pub size: f32,
}

/// Power-up item and the effect it grants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpec {
    pub effect: PowerUpEffect,
    /// Independent roll per spawn attempt
    pub probability: f32,
    /// Seconds the effect lasts
    pub duration: f32,
    pub size: f32,
}

/// Which uncaught items cost score when they leave the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MissPolicy {
    Off,
    /// Only common items
    #[default]
    Common,
    /// Common, rare and epic items
    AnyValuable,
}

impl MissPolicy {
    pub fn penalizes(&self, kind: ItemKind) -> bool {
        match self {
            MissPolicy::Off => false,
            MissPolicy::Common => kind == ItemKind::Common,
            MissPolicy::AnyValuable => kind.is_valuable(),
        }
    }
}

/// Everything that shapes one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcadeConfig {
    pub field: FieldConfig,
    pub catcher: CatcherConfig,
    /// Session length in seconds
    pub duration: f32,
    pub spawn: SpawnConfig,
    pub items: Vec<ItemSpec>,
    #[serde(default)]
    pub hazard: Option<HazardSpec>,
    #[serde(default)]
    pub power_ups: Vec<PowerUpSpec>,
    pub combo: ComboConfig,
    #[serde(default)]
    pub miss_policy: MissPolicy,
    /// Score lost per penalised miss
    #[serde(default)]
    pub miss_penalty: u64,
    pub rewards: RewardConfig,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Classic)
    }
}

impl ArcadeConfig {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "catch_arcade_config";

    /// Build the configuration of a named variant
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Classic => Self::classic(),
            Preset::Deluxe => Self::deluxe(),
        }
    }

    fn base() -> Self {
        Self {
            field: FieldConfig {
                width: FIELD_WIDTH,
                height: FIELD_HEIGHT,
            },
            catcher: CatcherConfig {
                width: CATCHER_WIDTH,
                height: CATCHER_HEIGHT,
                bottom_margin: CATCHER_BOTTOM_MARGIN,
                speed: CATCHER_SPEED,
                max_follow_speed: None,
            },
            duration: SESSION_DURATION,
            spawn: SpawnConfig {
                cadence: SpawnCadence::default(),
                fall_speed_min: FALL_SPEED_MIN,
                fall_speed_max: FALL_SPEED_MAX,
            },
            items: Vec::new(),
            hazard: None,
            power_ups: Vec::new(),
            combo: ComboConfig {
                base_increment: 0.1,
                max_multiplier: 5.0,
                timeout: 1.0,
            },
            miss_policy: MissPolicy::Common,
            miss_penalty: 5,
            rewards: RewardConfig::default(),
        }
    }

    fn classic() -> Self {
        // Overall mix 70% coin, 24% rock, 6% star
        Self {
            items: vec![
                ItemSpec {
                    name: "coin".into(),
                    kind: ItemKind::Common,
                    probability: 0.921_05,
                    base_value: 10,
                    size: 25.0,
                },
                ItemSpec {
                    name: "star".into(),
                    kind: ItemKind::Epic,
                    probability: 0.078_95,
                    base_value: 50,
                    size: 30.0,
                },
            ],
            hazard: Some(HazardSpec {
                name: "rock".into(),
                probability: 0.24,
                penalty: -20,
                size: 25.0,
            }),
            // Flat scoring: every catch is worth its face value
            combo: ComboConfig {
                base_increment: 0.0,
                max_multiplier: 1.0,
                timeout: 1.0,
            },
            rewards: RewardConfig {
                coins_per_point: 1,
                ..RewardConfig::default()
            },
            ..Self::base()
        }
    }

    fn deluxe() -> Self {
        Self {
            items: vec![
                ItemSpec {
                    name: "bronze".into(),
                    kind: ItemKind::Common,
                    probability: 0.5,
                    base_value: 10,
                    size: 25.0,
                },
                ItemSpec {
                    name: "silver".into(),
                    kind: ItemKind::Rare,
                    probability: 0.3,
                    base_value: 25,
                    size: 25.0,
                },
                ItemSpec {
                    name: "gold".into(),
                    kind: ItemKind::Epic,
                    probability: 0.15,
                    base_value: 50,
                    size: 28.0,
                },
                ItemSpec {
                    name: "rare".into(),
                    kind: ItemKind::Epic,
                    probability: 0.05,
                    base_value: 100,
                    size: 30.0,
                },
            ],
            hazard: Some(HazardSpec {
                name: "broken_item".into(),
                probability: 0.1,
                penalty: -20,
                size: 25.0,
            }),
            power_ups: vec![
                PowerUpSpec {
                    effect: PowerUpEffect::Magnet {
                        radius: 100.0,
                        pull_speed: 300.0,
                    },
                    probability: 0.1,
                    duration: 5.0,
                    size: 28.0,
                },
                PowerUpSpec {
                    effect: PowerUpEffect::SlowTime { factor: 0.5 },
                    probability: 0.08,
                    duration: 3.0,
                    size: 28.0,
                },
                PowerUpSpec {
                    effect: PowerUpEffect::ScoreMultiplier { factor: 2.0 },
                    probability: 0.06,
                    duration: 4.0,
                    size: 28.0,
                },
            ],
            rewards: RewardConfig {
                thresholds: vec![
                    RewardThreshold::new(100, RewardTier::Low, 50, 10),
                    RewardThreshold::new(200, RewardTier::Mid, 100, 25),
                    RewardThreshold::new(300, RewardTier::High, 200, 50),
                ],
                ..RewardConfig::default()
            },
            ..Self::base()
        }
    }

    /// Reject any value that cannot drive a session
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("field width", self.field.width)?;
        positive("field height", self.field.height)?;
        positive("catcher width", self.catcher.width)?;
        positive("catcher height", self.catcher.height)?;
        positive("catcher speed", self.catcher.speed)?;
        if let Some(speed) = self.catcher.max_follow_speed {
            positive("catcher follow speed", speed)?;
        }
        if self.catcher.width > self.field.width {
            return Err(ConfigError::CatcherTooWide {
                width: self.catcher.width,
                field: self.field.width,
            });
        }
        positive("session duration", self.duration)?;

        match self.spawn.cadence {
            SpawnCadence::Interval { seconds } => {
                positive("spawn interval", seconds)?;
                if seconds < MIN_SPAWN_INTERVAL {
                    return Err(ConfigError::SpawnInterval(seconds));
                }
            }
            SpawnCadence::PerTick { chance } => probability("per-tick spawn", chance)?,
        }
        positive("minimum fall speed", self.spawn.fall_speed_min)?;
        if !(self.spawn.fall_speed_max >= self.spawn.fall_speed_min) {
            return Err(ConfigError::FallSpeedRange {
                min: self.spawn.fall_speed_min,
                max: self.spawn.fall_speed_max,
            });
        }

        if self.items.is_empty() {
            return Err(ConfigError::EmptyItemTable);
        }
        for item in &self.items {
            probability("item", item.probability)?;
            positive("item size", item.size)?;
            if !item.kind.is_valuable() || item.base_value <= 0 {
                return Err(ConfigError::ItemValue {
                    kind: item.kind.as_str(),
                    value: item.base_value,
                });
            }
        }
        let table = WeightedTable::new(self.items.iter().map(|i| ((), i.probability)).collect());
        if !table.is_well_formed() {
            return Err(ConfigError::ProbabilitySum { sum: table.total() });
        }

        if let Some(hazard) = &self.hazard {
            probability("hazard", hazard.probability)?;
            positive("hazard size", hazard.size)?;
            if hazard.penalty > 0 {
                return Err(ConfigError::HazardPenalty(hazard.penalty));
            }
        }

        for power_up in &self.power_ups {
            probability("power-up", power_up.probability)?;
            positive("power-up duration", power_up.duration)?;
            positive("power-up size", power_up.size)?;
            match power_up.effect {
                PowerUpEffect::Magnet { radius, pull_speed } => {
                    positive("magnet radius", radius)?;
                    positive("magnet pull speed", pull_speed)?;
                }
                PowerUpEffect::SlowTime { factor } => {
                    if !(factor > 0.0 && factor < 1.0) {
                        return Err(ConfigError::SlowFactor(factor));
                    }
                }
                PowerUpEffect::ScoreMultiplier { factor } => {
                    if !(factor >= 1.0 && factor.is_finite()) {
                        return Err(ConfigError::MultiplierFactor(factor));
                    }
                }
            }
        }

        if !(self.combo.base_increment >= 0.0 && self.combo.base_increment.is_finite()) {
            return Err(ConfigError::NonPositive {
                what: "combo increment",
                value: self.combo.base_increment,
            });
        }
        if !(self.combo.max_multiplier >= 1.0 && self.combo.max_multiplier.is_finite()) {
            return Err(ConfigError::ComboCap(self.combo.max_multiplier));
        }
        positive("combo timeout", self.combo.timeout)?;

        self.rewards.validate()
    }

    /// Load the configuration from storage, falling back to the default preset
    pub fn load(storage: &dyn Storage) -> Self {
        match persistence::load_json::<Self>(storage, Self::STORAGE_KEY) {
            Some(config) => {
                log::info!("Loaded arcade configuration from storage");
                config
            }
            None => {
                log::info!("Using default arcade configuration");
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        if persistence::save_json(storage, Self::STORAGE_KEY, self) {
            log::info!("Arcade configuration saved");
        }
    }
}

fn positive(what: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { what, value })
    }
}

fn probability(what: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { what, value })
    }
}
