pub mod algo;
pub mod config;
pub mod economy;
pub mod error;
pub mod graph;
pub mod mapgen;
pub mod plot;
pub mod types;

pub use config::GenConfig;
pub use economy::{CatalogValuer, CombatEvaluator, Enemy, Hero, StandardCombat, ValueOracle};
pub use error::{ConfigError, GenerationError};
pub use mapgen::{MapContext, Room, Tower, TowerGenerator, generate_tower};
pub use types::*;
