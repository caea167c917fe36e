//! Procedural tower generation split into base topology, room growth, and
//! room classification.

pub mod grid;
pub mod model;
pub mod scan;

mod base;
mod generator;
mod rooms;
mod seed;
#[cfg(test)]
pub(crate) mod test_support;

pub(crate) use seed::Pass;

pub use generator::TowerGenerator;
pub use grid::Layer;
pub use model::{
    BlockCounts, CutBlock, FloorStats, MapContext, Room, RoomCutKind, RoomCutMark, RoomEntry,
    RoomStair, StageMark, Tower,
};
pub use scan::{RoomScan, scan_rooms};
pub use seed::GenRng;

use crate::config::GenConfig;
use crate::error::GenerationError;

pub fn generate_tower(config: GenConfig, run_seed: u64) -> Result<Tower, GenerationError> {
    TowerGenerator::new(config, run_seed).generate()
}
