//! Finished-session leaderboard
//!
//! Persisted through the storage layer, tracks the top 10 scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};
use crate::rewards::{RewardTier, SessionResult};

/// Maximum number of sessions to keep
pub const MAX_HISTORY: usize = 10;

/// A single finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub score: u64,
    pub tier: Option<RewardTier>,
    /// Unix timestamp (ms) when the session ended
    pub timestamp: f64,
}

/// Best finished sessions, highest score first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    pub entries: Vec<HistoryEntry>,
    /// Sessions recorded overall, including ones that fell off the board
    #[serde(default)]
    pub sessions_played: u64,
}

impl SessionHistory {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "catch_arcade_history";

    pub fn new() -> Self {
        Self::default()
    }

    /// Board index a score would land at; ties go below existing entries
    fn slot(&self, score: u64) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// Rank a score would achieve (1-indexed, None if it would not make the board)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        let slot = self.slot(score);
        (score > 0 && slot < MAX_HISTORY).then_some(slot + 1)
    }

    /// Record a finished session; returns the rank achieved, if any
    ///
    /// Cancelled sessions count as played but only rank when they were rewarded.
    pub fn record(&mut self, result: &SessionResult, timestamp: f64) -> Option<usize> {
        self.sessions_played += 1;
        if result.cancelled && result.tier.is_none() {
            return None;
        }
        self.add_score(result.final_score, result.tier, timestamp)
    }

    pub fn add_score(&mut self, score: u64, tier: Option<RewardTier>, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HistoryEntry {
                score,
                tier,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HISTORY);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load(storage: &dyn Storage) -> Self {
        match persistence::load_json::<Self>(storage, Self::STORAGE_KEY) {
            Some(history) => {
                log::info!("Loaded {} history entries", history.entries.len());
                history
            }
            None => {
                log::info!("No session history found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        if persistence::save_json(storage, Self::STORAGE_KEY, self) {
            log::info!("Session history saved ({} entries)", self.entries.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::rewards::RewardPayout;
    use crate::sim::SessionStats;

    fn result(score: u64, tier: Option<RewardTier>, cancelled: bool) -> SessionResult {
        SessionResult {
            final_score: score,
            tier,
            payout: RewardPayout::default(),
            cancelled,
            time_played: 60.0,
            stats: SessionStats::default(),
        }
    }

    #[test]
    fn test_sorted_insert_and_rank() {
        let mut history = SessionHistory::new();
        assert_eq!(history.add_score(100, Some(RewardTier::Low), 1.0), Some(1));
        assert_eq!(history.add_score(300, Some(RewardTier::High), 2.0), Some(1));
        assert_eq!(history.add_score(200, Some(RewardTier::Mid), 3.0), Some(2));

        let scores: Vec<u64> = history.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
        assert_eq!(history.top_score(), Some(300));
        assert_eq!(history.potential_rank(150), Some(3));
        assert_eq!(history.potential_rank(200), Some(3));
        assert_eq!(history.potential_rank(0), None);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut history = SessionHistory::new();
        assert_eq!(history.add_score(0, None, 1.0), None);
        assert!(history.entries.is_empty());
        assert_eq!(history.top_score(), None);
    }

    #[test]
    fn test_board_is_capped() {
        let mut history = SessionHistory::new();
        for score in 1..=15 {
            history.add_score(score * 10, None, score as f64);
        }
        assert_eq!(history.entries.len(), MAX_HISTORY);
        assert_eq!(history.potential_rank(10), None);
        assert_eq!(history.potential_rank(60), None);
        assert_eq!(history.potential_rank(200), Some(1));
    }

    #[test]
    fn test_unrewarded_cancellations_are_counted_not_ranked() {
        let mut history = SessionHistory::new();
        assert_eq!(history.record(&result(120, None, true), 1.0), None);
        assert_eq!(history.record(&result(80, None, false), 2.0), Some(1));
        assert_eq!(history.sessions_played, 2);
        assert_eq!(history.entries.len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = MemoryStorage::default();
        let mut history = SessionHistory::new();
        history.record(&result(250, Some(RewardTier::Mid), false), 5.0);
        history.save(&mut storage);

        assert_eq!(SessionHistory::load(&storage), history);
    }
}
