//! Consecutive-catch combo tracking

use serde::{Deserialize, Serialize};

use crate::config::ComboConfig;

/// Catch streak and its score multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub count: u32,
    pub multiplier: f32,
    /// Seconds since the last catch that fed the streak
    pub since_last_catch: f32,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            multiplier: 1.0,
            since_last_catch: 0.0,
        }
    }
}

impl ComboState {
    /// Multiplier for a streak of `count` catches
    pub fn multiplier_for(count: u32, rules: &ComboConfig) -> f32 {
        (1.0 + count as f32 * rules.base_increment).min(rules.max_multiplier)
    }

    pub fn advance(&mut self, dt: f32) {
        self.since_last_catch += dt;
    }

    /// Whether the streak has gone stale
    pub fn lapsed(&self, rules: &ComboConfig) -> bool {
        self.count > 0 && self.since_last_catch >= rules.timeout
    }

    /// Multiplier to score a catch happening now (a stale streak counts as broken)
    pub fn current_multiplier(&self, rules: &ComboConfig) -> f32 {
        if self.lapsed(rules) { 1.0 } else { self.multiplier }
    }

    /// Extend the streak after a scoring catch
    pub fn register_catch(&mut self, rules: &ComboConfig) {
        if self.lapsed(rules) {
            self.reset();
        }
        self.count += 1;
        self.multiplier = Self::multiplier_for(self.count, rules);
        self.since_last_catch = 0.0;
    }

    /// Break the streak, returning the count it had
    pub fn reset(&mut self) -> u32 {
        let count = self.count;
        *self = Self::default();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ComboConfig {
        ComboConfig {
            base_increment: 0.1,
            max_multiplier: 1.25,
            timeout: 1.0,
        }
    }

    #[test]
    fn test_multiplier_sequence_and_cap() {
        let rules = rules();
        let mut combo = ComboState::default();
        let mut seen = vec![combo.current_multiplier(&rules)];
        for _ in 0..3 {
            combo.register_catch(&rules);
            seen.push(combo.current_multiplier(&rules));
        }
        assert!((seen[1] - 1.1).abs() < 1e-6);
        assert!((seen[2] - 1.2).abs() < 1e-6);
        assert_eq!(seen[3], 1.25);
        assert!(seen.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_gap_breaks_streak() {
        let rules = rules();
        let mut combo = ComboState::default();
        combo.register_catch(&rules);
        combo.register_catch(&rules);

        combo.advance(0.99);
        assert!(!combo.lapsed(&rules));
        combo.advance(0.01);
        assert!(combo.lapsed(&rules));
        assert_eq!(combo.current_multiplier(&rules), 1.0);

        combo.register_catch(&rules);
        assert_eq!(combo.count, 1);
    }

    #[test]
    fn test_reset_returns_count() {
        let rules = rules();
        let mut combo = ComboState::default();
        combo.register_catch(&rules);
        combo.register_catch(&rules);
        assert_eq!(combo.reset(), 2);
        assert_eq!(combo, ComboState::default());
    }
}
