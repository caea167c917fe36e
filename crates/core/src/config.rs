//! Generation settings with the stock tower's defaults.

use serde::{Deserialize, Serialize};

use crate::economy::{
    Enemy, EnemyPreset, Gem, Hero, Potion, Values, default_enemy_presets, default_gems,
    default_potions,
};
use crate::error::ConfigError;
use crate::types::Pos;

pub const DEFAULT_FLOOR_COUNT: usize = 10;
pub const DEFAULT_START: Pos = Pos::new(6, 12);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    pub floor_count: usize,
    /// Down-stair location of the first floor.
    pub start: Pos,
    /// Relative size of each play stage.
    pub stages: Vec<f64>,
    pub room_size_factor: f64,
    /// Cap on room-layout regenerations per floor and plot redrafts per room.
    pub max_attempts: u32,
    pub values: Values,
    pub hero: Hero,
    pub potions: Vec<Potion>,
    pub gems: Vec<Gem>,
    pub enemy_presets: Vec<EnemyPreset>,
    /// Ready-made enemy catalog. When empty the presets are calibrated instead.
    pub enemies: Vec<Enemy>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            floor_count: DEFAULT_FLOOR_COUNT,
            start: DEFAULT_START,
            stages: vec![1.0, 1.0, 1.0],
            room_size_factor: 1.0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            values: Values::default(),
            hero: Hero { atk: 10, def: 10, mdef: 0 },
            potions: default_potions(),
            gems: default_gems(),
            enemy_presets: default_enemy_presets(),
            enemies: Vec::new(),
        }
    }
}

impl GenConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.floor_count == 0 {
            return Err(ConfigError::invalid("floor_count", "must be at least 1"));
        }
        if !self.start.is_valid() || self.start.is_corner() {
            return Err(ConfigError::invalid(
                "start",
                format!("{:?} must lie on the map and off its corners", self.start),
            ));
        }
        if self.stages.is_empty() {
            return Err(ConfigError::invalid("stages", "needs at least one stage"));
        }
        if self.stages.iter().any(|weight| !weight.is_finite() || *weight <= 0.0) {
            return Err(ConfigError::invalid("stages", "weights must be positive"));
        }
        if !self.room_size_factor.is_finite() || self.room_size_factor <= 0.0 {
            return Err(ConfigError::invalid("room_size_factor", "must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("max_attempts", "must be at least 1"));
        }
        if self.values.inflation.step == 0 {
            return Err(ConfigError::invalid("values.inflation.step", "must be at least 1"));
        }
        if self.hero.atk + self.hero.def <= 0 {
            return Err(ConfigError::invalid("hero", "atk + def must be positive"));
        }
        if self.enemies.is_empty() && self.enemy_presets.is_empty() {
            return Err(ConfigError::invalid("enemy_presets", "needs presets or explicit enemies"));
        }
        Ok(())
    }

    /// Room count each stage aims for. Every stage but the last takes its
    /// weighted share; the last one absorbs whatever is left.
    pub fn stage_targets(&self, total_rooms: usize) -> Vec<f64> {
        let weight_sum: f64 = self.stages.iter().sum();
        let last = self.stages.len().saturating_sub(1);
        self.stages
            .iter()
            .enumerate()
            .map(|(index, weight)| {
                if index == last {
                    total_rooms as f64
                } else {
                    total_rooms as f64 * weight / weight_sum
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = GenConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.floor_count, 10);
        assert_eq!(config.start, Pos::new(6, 12));
        assert_eq!(config.enemy_presets.len(), 9);
    }

    #[test]
    fn validation_names_the_offending_field() {
        let cases: Vec<(GenConfig, &str)> = vec![
            (GenConfig { floor_count: 0, ..GenConfig::default() }, "floor_count"),
            (GenConfig { start: Pos::new(0, 0), ..GenConfig::default() }, "start"),
            (GenConfig { start: Pos::new(13, 4), ..GenConfig::default() }, "start"),
            (GenConfig { stages: Vec::new(), ..GenConfig::default() }, "stages"),
            (GenConfig { stages: vec![1.0, 0.0], ..GenConfig::default() }, "stages"),
            (GenConfig { room_size_factor: 0.0, ..GenConfig::default() }, "room_size_factor"),
            (GenConfig { max_attempts: 0, ..GenConfig::default() }, "max_attempts"),
        ];
        for (config, expected) in cases {
            match config.validate() {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
                Ok(()) => panic!("{expected} should have been rejected"),
            }
        }
    }

    #[test]
    fn stage_targets_split_by_weight_and_leave_the_rest_to_the_last_stage() {
        let config = GenConfig { stages: vec![1.0, 1.0, 1.0], ..GenConfig::default() };
        assert_eq!(config.stage_targets(30), vec![10.0, 10.0, 30.0]);

        let skewed = GenConfig { stages: vec![3.0, 1.0], ..GenConfig::default() };
        assert_eq!(skewed.stage_targets(20), vec![15.0, 20.0]);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: GenConfig =
            serde_json::from_str(r#"{ "floor_count": 3, "values": { "base": 10.0 } }"#)
                .expect("partial config should parse");
        assert_eq!(config.floor_count, 3);
        assert_eq!(config.values.base, 10.0);
        assert_eq!(config.values.keys.blue, 75.0);
        assert_eq!(config.stages.len(), 3);
    }
}
