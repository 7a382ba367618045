//! Reward tiers, session results and the collaborators that consume them

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::persistence::{self, Storage};
use crate::sim::SessionStats;

/// Reward bracket a final score falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RewardTier {
    Low,
    Mid,
    High,
}

/// Minimum score for a tier and what the tier pays out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardThreshold {
    pub min_score: u64,
    pub tier: RewardTier,
    pub currency: u64,
    pub experience: u64,
}

impl RewardThreshold {
    pub fn new(min_score: u64, tier: RewardTier, currency: u64, experience: u64) -> Self {
        Self {
            min_score,
            tier,
            currency,
            experience,
        }
    }
}

/// Currency and experience granted for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPayout {
    pub currency: u64,
    pub experience: u64,
}

/// How final scores turn into rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Ascending by `min_score`
    pub thresholds: Vec<RewardThreshold>,
    /// Currency per point of final score, on top of the tier payout
    #[serde(default)]
    pub coins_per_point: u64,
    /// Score cancelled sessions as if they had timed out
    #[serde(default)]
    pub reward_on_cancel: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![
                RewardThreshold::new(100, RewardTier::Low, 0, 10),
                RewardThreshold::new(200, RewardTier::Mid, 0, 25),
                RewardThreshold::new(300, RewardTier::High, 0, 50),
            ],
            coins_per_point: 0,
            reward_on_cancel: false,
        }
    }
}

impl RewardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ascending = self
            .thresholds
            .windows(2)
            .all(|w| w[0].min_score < w[1].min_score);
        if ascending {
            Ok(())
        } else {
            Err(ConfigError::RewardThresholds)
        }
    }

    /// Highest threshold the score reaches
    pub fn threshold_for(&self, score: u64) -> Option<&RewardThreshold> {
        self.thresholds.iter().rev().find(|t| score >= t.min_score)
    }

    pub fn tier_for(&self, score: u64) -> Option<RewardTier> {
        self.threshold_for(score).map(|t| t.tier)
    }

    pub fn payout_for(&self, score: u64) -> RewardPayout {
        let (currency, experience) = self
            .threshold_for(score)
            .map(|t| (t.currency, t.experience))
            .unwrap_or((0, 0));
        RewardPayout {
            currency: currency.saturating_add(score.saturating_mul(self.coins_per_point)),
            experience,
        }
    }
}

/// Terminal report of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub final_score: u64,
    pub tier: Option<RewardTier>,
    pub payout: RewardPayout,
    /// Stopped before the clock ran out
    pub cancelled: bool,
    /// Seconds of play before the session ended
    pub time_played: f32,
    pub stats: SessionStats,
}

/// Receives finished sessions (persists currency/experience)
pub trait RewardSink {
    fn session_finished(&mut self, result: &SessionResult);
}

impl<F: FnMut(&SessionResult)> RewardSink for F {
    fn session_finished(&mut self, result: &SessionResult) {
        self(result)
    }
}

/// Limits how many sessions may be started
pub trait AttemptGate {
    /// Consume one attempt; false when none remain
    fn try_consume(&mut self) -> bool;

    /// Attempts left, `None` when unlimited
    fn remaining(&self) -> Option<u32>;

    /// Called with the wall-clock time (ms since the Unix epoch) before each start
    fn refresh(&mut self, _now_ms: f64) {}
}

/// No limit on sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl AttemptGate for Unlimited {
    fn try_consume(&mut self) -> bool {
        true
    }

    fn remaining(&self) -> Option<u32> {
        None
    }
}

/// A per-day attempt allowance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttempts {
    pub per_day: u32,
    pub remaining: u32,
    /// Day index the allowance belongs to (days since the Unix epoch)
    pub day: u64,
}

impl DailyAttempts {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "catch_arcade_attempts";

    pub fn new(per_day: u32, day: u64) -> Self {
        Self {
            per_day,
            remaining: per_day,
            day,
        }
    }

    /// Day index of a millisecond timestamp
    pub fn day_of(timestamp_ms: f64) -> u64 {
        (timestamp_ms.max(0.0) / 86_400_000.0).floor() as u64
    }

    /// Refill the allowance when a new day has started
    pub fn roll_over(&mut self, day: u64) {
        if day > self.day {
            log::info!("New day {}: {} attempts restored", day, self.per_day);
            self.day = day;
            self.remaining = self.per_day;
        }
    }

    /// Restore today's allowance from storage
    ///
    /// A changed `per_day` takes effect at once but never hands back attempts
    /// already spent today.
    pub fn load(storage: &dyn Storage, per_day: u32, now_ms: f64) -> Self {
        let today = Self::day_of(now_ms);
        let mut attempts = match persistence::load_json::<Self>(storage, Self::STORAGE_KEY) {
            Some(stored) => {
                log::info!("Loaded attempts: {}/{} left on day {}", stored.remaining, stored.per_day, stored.day);
                stored
            }
            None => Self::new(per_day, today),
        };
        if attempts.per_day != per_day {
            attempts.remaining = attempts.remaining.min(per_day);
            attempts.per_day = per_day;
        }
        attempts.roll_over(today);
        attempts
    }

    pub fn save(&self, storage: &mut dyn Storage) -> bool {
        persistence::save_json(storage, Self::STORAGE_KEY, self)
    }
}

impl AttemptGate for DailyAttempts {
    fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    fn remaining(&self) -> Option<u32> {
        Some(self.remaining)
    }

    fn refresh(&mut self, now_ms: f64) {
        self.roll_over(Self::day_of(now_ms));
    }
}

/// A daily allowance written back to storage whenever it changes
pub struct StoredAttempts<S: Storage> {
    attempts: DailyAttempts,
    storage: S,
}

impl<S: Storage> StoredAttempts<S> {
    pub fn load(storage: S, per_day: u32, now_ms: f64) -> Self {
        let attempts = DailyAttempts::load(&storage, per_day, now_ms);
        let mut stored = Self { attempts, storage };
        stored.persist();
        stored
    }

    pub fn attempts(&self) -> &DailyAttempts {
        &self.attempts
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        if !self.attempts.save(&mut self.storage) {
            log::warn!("Attempt allowance not saved; it resets on reload");
        }
    }
}

impl<S: Storage> AttemptGate for StoredAttempts<S> {
    fn try_consume(&mut self) -> bool {
        let consumed = self.attempts.try_consume();
        if consumed {
            self.persist();
        }
        consumed
    }

    fn remaining(&self) -> Option<u32> {
        self.attempts.remaining()
    }

    fn refresh(&mut self, now_ms: f64) {
        let before = self.attempts.clone();
        self.attempts.refresh(now_ms);
        if self.attempts != before {
            self.persist();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_tier_selection() {
        let rewards = RewardConfig::default();
        assert_eq!(rewards.tier_for(250), Some(RewardTier::Mid));
        assert_eq!(rewards.tier_for(300), Some(RewardTier::High));
        assert_eq!(rewards.tier_for(1_000), Some(RewardTier::High));
        assert_eq!(rewards.tier_for(100), Some(RewardTier::Low));
        assert_eq!(rewards.tier_for(99), None);
        assert_eq!(rewards.tier_for(0), None);
    }

    #[test]
    fn test_payout_adds_per_point_currency() {
        let rewards = RewardConfig {
            thresholds: vec![RewardThreshold::new(100, RewardTier::Low, 50, 10)],
            coins_per_point: 2,
            reward_on_cancel: false,
        };
        assert_eq!(
            rewards.payout_for(120),
            RewardPayout {
                currency: 290,
                experience: 10
            }
        );
        assert_eq!(
            rewards.payout_for(10),
            RewardPayout {
                currency: 20,
                experience: 0
            }
        );
    }

    #[test]
    fn test_thresholds_must_ascend() {
        let mut rewards = RewardConfig::default();
        assert!(rewards.validate().is_ok());
        rewards.thresholds.swap(0, 2);
        assert_eq!(rewards.validate(), Err(ConfigError::RewardThresholds));
    }

    #[test]
    fn test_daily_attempts() {
        let mut gate = DailyAttempts::new(2, 10);
        assert!(gate.try_consume());
        assert!(gate.try_consume());
        assert!(!gate.try_consume());
        assert_eq!(gate.remaining(), Some(0));

        gate.roll_over(10);
        assert_eq!(gate.remaining(), Some(0));
        gate.roll_over(11);
        assert_eq!(gate.remaining(), Some(2));
    }

    #[test]
    fn test_daily_attempts_refresh_from_clock() {
        let mut gate = DailyAttempts::new(1, 0);
        assert!(gate.try_consume());
        gate.refresh(86_399_999.0);
        assert_eq!(gate.remaining(), Some(0));
        gate.refresh(86_400_000.0);
        assert_eq!(gate.remaining(), Some(1));
        assert_eq!(gate.day, 1);
    }

    #[test]
    fn test_stored_attempts_survive_reload() {
        let mut gate = StoredAttempts::load(MemoryStorage::default(), 3, 1_000.0);
        assert!(gate.try_consume());
        assert!(gate.try_consume());

        // Same day: spent attempts stay spent
        let reloaded = DailyAttempts::load(gate.storage(), 3, 5_000.0);
        assert_eq!(reloaded.remaining, 1);

        // Lower allowance clamps, never refills
        let reloaded = DailyAttempts::load(gate.storage(), 2, 5_000.0);
        assert_eq!(reloaded.remaining, 1);
        let reloaded = DailyAttempts::load(gate.storage(), 0, 5_000.0);
        assert_eq!(reloaded.remaining, 0);

        // Next day refills
        let reloaded = DailyAttempts::load(gate.storage(), 3, 86_400_000.0 + 1_000.0);
        assert_eq!(reloaded, DailyAttempts::new(3, 1));

        gate.refresh(86_400_000.0 * 2.0);
        assert_eq!(gate.attempts().remaining, 3);
        assert_eq!(DailyAttempts::load(gate.storage(), 3, 86_400_000.0 * 2.0).remaining, 3);
    }

    #[test]
    fn test_day_of() {
        assert_eq!(DailyAttempts::day_of(0.0), 0);
        assert_eq!(DailyAttempts::day_of(86_400_000.0 * 3.5), 3);
    }

    #[test]
    fn test_closure_reward_sink() {
        let mut scores = Vec::new();
        {
            let mut sink = |r: &SessionResult| scores.push(r.final_score);
            sink.session_finished(&SessionResult {
                final_score: 42,
                tier: None,
                payout: RewardPayout::default(),
                cancelled: false,
                time_played: 60.0,
                stats: SessionStats::default(),
            });
        }
        assert_eq!(scores, vec![42]);
    }
}
