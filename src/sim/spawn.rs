//! Weighted item spawning
//!
//! Every spawn attempt first rolls the hazard, then each power-up
//! independently; only when none of those hit is the valuable item table
//! drawn by cumulative probability.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{FallingItem, ItemKind, PowerUpEffect};
use crate::config::{ArcadeConfig, HazardSpec, ItemSpec, PowerUpSpec};
use crate::consts::PROBABILITY_TOLERANCE;

/// When spawn attempts happen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SpawnCadence {
    /// One attempt per elapsed interval (seconds)
    Interval { seconds: f32 },
    /// Independent chance of one attempt on every tick
    PerTick { chance: f32 },
}

impl Default for SpawnCadence {
    fn default() -> Self {
        SpawnCadence::Interval {
            seconds: crate::consts::SPAWN_INTERVAL,
        }
    }
}

/// A table of outcomes with probabilities summing to 1.0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedTable<T> {
    entries: Vec<(T, f32)>,
}

impl<T> WeightedTable<T> {
    pub fn new(entries: Vec<(T, f32)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f32 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    /// Non-empty, no negative or non-finite weight, sum within tolerance of 1.0
    pub fn is_well_formed(&self) -> bool {
        !self.entries.is_empty()
            && self.entries.iter().all(|(_, p)| p.is_finite() && *p >= 0.0)
            && (self.total() - 1.0).abs() <= PROBABILITY_TOLERANCE
    }

    /// Select the first entry whose cumulative probability reaches `r`
    ///
    /// `r` is expected in `[0, 1)`. Returns `None` for a malformed table.
    pub fn pick(&self, r: f32) -> Option<&T> {
        if !self.is_well_formed() {
            return None;
        }
        let mut cumulative = 0.0;
        for (value, probability) in &self.entries {
            cumulative += probability;
            if cumulative >= r {
                return Some(value);
            }
        }
        // Sum fell just short of r through rounding
        self.entries.last().map(|(value, _)| value)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<&T> {
        self.pick(rng.random::<f32>())
    }
}

/// Spawn cadence bookkeeping plus the tables an item is drawn from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub cadence: SpawnCadence,
    items: WeightedTable<ItemSpec>,
    hazard: Option<HazardSpec>,
    power_ups: Vec<PowerUpSpec>,
    field_width: f32,
    fall_speed: (f32, f32),
    /// Seconds accumulated toward the next interval spawn
    elapsed: f32,
}

impl Spawner {
    pub fn from_config(config: &ArcadeConfig) -> Self {
        Self {
            cadence: config.spawn.cadence,
            items: WeightedTable::new(
                config
                    .items
                    .iter()
                    .map(|spec| (spec.clone(), spec.probability))
                    .collect(),
            ),
            hazard: config.hazard.clone(),
            power_ups: config.power_ups.clone(),
            field_width: config.field.width,
            fall_speed: (config.spawn.fall_speed_min, config.spawn.fall_speed_max),
            elapsed: 0.0,
        }
    }

    /// Number of spawn attempts due after `dt` seconds
    pub fn attempts_due<R: Rng>(&mut self, dt: f32, rng: &mut R) -> u32 {
        match self.cadence {
            SpawnCadence::Interval { seconds } => {
                if seconds <= 0.0 {
                    return 0;
                }
                self.elapsed += dt;
                if self.elapsed < seconds {
                    return 0;
                }
                let due = (self.elapsed / seconds).floor();
                self.elapsed %= seconds;
                due.min(u32::MAX as f32) as u32
            }
            SpawnCadence::PerTick { chance } => u32::from(rng.random::<f32>() < chance),
        }
    }

    /// Draw one item, or `None` when the valuable table is malformed
    pub fn spawn<R: Rng>(&self, id: u32, rng: &mut R) -> Option<FallingItem> {
        let (kind, value, size, effect, duration) = self.draw_kind(rng)?;
        let x = rng.random::<f32>() * (self.field_width - size).max(0.0);
        let (min, max) = self.fall_speed;
        let fall_speed = if max > min { rng.random_range(min..max) } else { min };

        Some(FallingItem {
            id,
            kind,
            pos: Vec2::new(x, -size),
            fall_speed,
            size: Vec2::splat(size),
            value,
            effect,
            effect_duration: duration,
        })
    }

    #[allow(clippy::type_complexity)]
    fn draw_kind<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Option<(ItemKind, i64, f32, Option<PowerUpEffect>, f32)> {
        if let Some(hazard) = &self.hazard {
            if rng.random::<f32>() < hazard.probability {
                return Some((ItemKind::Hazard, hazard.penalty, hazard.size, None, 0.0));
            }
        }
        for power_up in &self.power_ups {
            if rng.random::<f32>() < power_up.probability {
                let effect = power_up.effect;
                return Some((
                    ItemKind::PowerUp(effect.kind()),
                    0,
                    power_up.size,
                    Some(effect),
                    power_up.duration,
                ));
            }
        }
        let spec = self.items.sample(rng)?;
        Some((spec.kind, spec.base_value, spec.size, None, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::sim::PowerUpKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pick_walks_cumulative_mass() {
        let table = WeightedTable::new(vec![("a", 0.5), ("b", 0.3), ("c", 0.2)]);
        assert_eq!(table.pick(0.0), Some(&"a"));
        assert_eq!(table.pick(0.5), Some(&"a"));
        assert_eq!(table.pick(0.51), Some(&"b"));
        assert_eq!(table.pick(0.81), Some(&"c"));
        assert_eq!(table.pick(0.9999), Some(&"c"));
    }

    #[test]
    fn test_malformed_tables_pick_nothing() {
        let empty: WeightedTable<&str> = WeightedTable::new(vec![]);
        assert_eq!(empty.pick(0.2), None);

        let short = WeightedTable::new(vec![("a", 0.5), ("b", 0.3)]);
        assert_eq!(short.pick(0.2), None);

        let negative = WeightedTable::new(vec![("a", 1.5), ("b", -0.5)]);
        assert_eq!(negative.pick(0.2), None);

        let nan = WeightedTable::new(vec![("a", f32::NAN)]);
        assert_eq!(nan.pick(0.2), None);
    }

    #[test]
    fn test_weighted_frequencies() {
        let table = WeightedTable::new(vec![
            (ItemKind::Common, 0.7),
            (ItemKind::Rare, 0.2),
            (ItemKind::Epic, 0.1),
        ]);
        let mut rng = Pcg32::seed_from_u64(7);
        let draws = 20_000;
        let mut counts = [0u32; 3];
        for _ in 0..draws {
            match table.sample(&mut rng) {
                Some(ItemKind::Common) => counts[0] += 1,
                Some(ItemKind::Rare) => counts[1] += 1,
                Some(ItemKind::Epic) => counts[2] += 1,
                other => panic!("unexpected draw {:?}", other),
            }
        }
        for (count, expected) in counts.iter().zip([0.7, 0.2, 0.1]) {
            let observed = *count as f32 / draws as f32;
            assert!(
                (observed - expected).abs() < 0.02,
                "observed {} expected {}",
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_interval_cadence() {
        let mut spawner = Spawner::from_config(&ArcadeConfig::default());
        spawner.cadence = SpawnCadence::Interval { seconds: 1.0 };
        let mut rng = Pcg32::seed_from_u64(1);

        assert_eq!(spawner.attempts_due(0.6, &mut rng), 0);
        assert_eq!(spawner.attempts_due(0.6, &mut rng), 1);
        assert_eq!(spawner.attempts_due(2.0, &mut rng), 2);
    }

    #[test]
    fn test_interval_cadence_survives_huge_steps() {
        let mut spawner = Spawner::from_config(&ArcadeConfig::default());
        spawner.cadence = SpawnCadence::Interval { seconds: 1.0 };
        let mut rng = Pcg32::seed_from_u64(1);

        assert_eq!(spawner.attempts_due(1.0e8, &mut rng), 100_000_000);
        assert_eq!(spawner.attempts_due(0.5, &mut rng), 0);
    }

    #[test]
    fn test_tiny_interval_terminates() {
        let mut spawner = Spawner::from_config(&ArcadeConfig::default());
        spawner.cadence = SpawnCadence::Interval { seconds: 1.0e-9 };
        let mut rng = Pcg32::seed_from_u64(1);

        let due = spawner.attempts_due(0.1, &mut rng);
        assert!(due > 1_000_000, "due {}", due);
        assert!(spawner.elapsed < 1.0e-9);
    }

    #[test]
    fn test_per_tick_cadence_extremes() {
        let mut spawner = Spawner::from_config(&ArcadeConfig::default());
        let mut rng = Pcg32::seed_from_u64(1);

        spawner.cadence = SpawnCadence::PerTick { chance: 0.0 };
        assert!((0..100).all(|_| spawner.attempts_due(0.016, &mut rng) == 0));

        spawner.cadence = SpawnCadence::PerTick { chance: 1.0 };
        assert!((0..100).all(|_| spawner.attempts_due(0.016, &mut rng) == 1));
    }

    #[test]
    fn test_spawned_items_start_above_field_within_bounds() {
        let config = ArcadeConfig::from_preset(Preset::Deluxe);
        let spawner = Spawner::from_config(&config);
        let mut rng = Pcg32::seed_from_u64(42);

        for id in 0..500 {
            let item = spawner.spawn(id, &mut rng).expect("deluxe tables are well formed");
            assert_eq!(item.pos.y, -item.size.y);
            assert!(item.pos.x >= 0.0);
            assert!(item.pos.x + item.size.x <= config.field.width);
            assert!(item.fall_speed >= config.spawn.fall_speed_min);
            assert!(item.fall_speed <= config.spawn.fall_speed_max);
            match item.kind {
                ItemKind::Hazard => assert!(item.value < 0),
                ItemKind::PowerUp(kind) => {
                    assert_eq!(item.value, 0);
                    assert_eq!(item.effect.map(|e| e.kind()), Some(kind));
                }
                _ => assert!(item.value > 0),
            }
        }
    }

    #[test]
    fn test_power_up_roll_is_independent() {
        let mut config = ArcadeConfig::from_preset(Preset::Deluxe);
        config.hazard = None;
        for power_up in &mut config.power_ups {
            power_up.probability = 0.0;
        }
        config.power_ups[0].probability = 1.0;
        let spawner = Spawner::from_config(&config);
        let mut rng = Pcg32::seed_from_u64(3);

        let item = spawner.spawn(1, &mut rng).unwrap();
        assert_eq!(item.kind, ItemKind::PowerUp(PowerUpKind::Magnet));
    }

    #[test]
    fn test_malformed_item_table_spawns_nothing() {
        let mut config = ArcadeConfig::default();
        config.hazard = None;
        config.power_ups.clear();
        config.items[0].probability = 0.1;
        let spawner = Spawner::from_config(&config);
        let mut rng = Pcg32::seed_from_u64(3);

        assert!(spawner.spawn(1, &mut rng).is_none());
    }
}
