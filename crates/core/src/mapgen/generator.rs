//! High-level generation orchestration that chains base topology, room
//! layout, enemy calibration, and plot layout.

use tracing::info;

use crate::config::GenConfig;
use crate::economy::{self, CatalogValuer, CombatEvaluator, Enemy, StandardCombat, ValueOracle};
use crate::error::GenerationError;
use crate::plot::layout_plot;

use super::base::generate_base;
use super::model::{MapContext, Tower};
use super::rooms::generate_rooms;
use super::seed::{GenRng, Pass};

pub struct TowerGenerator {
    config: GenConfig,
    run_seed: u64,
}

impl TowerGenerator {
    pub fn new(config: GenConfig, run_seed: u64) -> Self {
        Self { config, run_seed }
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Stairs and room layout of every floor, before any content.
    pub fn layout_rooms(&self) -> Result<Vec<MapContext>, GenerationError> {
        self.config.validate()?;
        let base = generate_base(&self.config, self.run_seed)?;
        let floors = generate_rooms(&self.config, self.run_seed, &base)?;
        info!(target: "towergen::mapgen", floors = floors.len(), seed = self.run_seed, "mapgen.rooms.done");
        Ok(floors)
    }

    /// The configured enemy catalog, or one calibrated from the presets.
    pub fn calibrate_enemies(&self, combat: &impl CombatEvaluator) -> Vec<Enemy> {
        if !self.config.enemies.is_empty() {
            return self.config.enemies.clone();
        }
        let mut rng = GenRng::for_pass(self.run_seed, Pass::Enemies, 0);
        economy::calibrate_enemies(
            &self.config.enemy_presets,
            &self.config.hero,
            &self.config.values,
            self.config.stages.len(),
            &mut rng,
            combat,
        )
    }

    pub fn generate(&self) -> Result<Tower, GenerationError> {
        self.config.validate()?;
        let combat = StandardCombat;
        let enemies = self.calibrate_enemies(&combat);
        let valuer = CatalogValuer {
            values: &self.config.values,
            potions: &self.config.potions,
            gems: &self.config.gems,
            enemies: &enemies,
            combat: &combat,
        };
        self.generate_with(enemies.clone(), &combat, &valuer)
    }

    /// Full run against a caller-supplied enemy catalog, combat model, and
    /// value oracle.
    pub fn generate_with<C: CombatEvaluator, O: ValueOracle>(
        &self,
        enemies: Vec<Enemy>,
        combat: &C,
        oracle: &O,
    ) -> Result<Tower, GenerationError> {
        let floors = self.layout_rooms()?;
        let (floors, rooms) = layout_plot(&self.config, self.run_seed, &floors, &enemies, combat, oracle)?;
        let room_count: usize = rooms.iter().map(Vec::len).sum();
        info!(target: "towergen::mapgen", floors = floors.len(), rooms = room_count, enemies = enemies.len(), "mapgen.tower.done");
        Ok(Tower { floors, rooms, enemies })
    }
}
