//! Base topology: border walls and the stair chain linking consecutive floors.

use tracing::debug;

use crate::config::GenConfig;
use crate::error::GenerationError;
use crate::types::{Block, Pos, RoomMark, StairDir, WallKind};

use super::model::MapContext;
use super::seed::{GenRng, Pass};

/// Chance of rejecting an up stair drawn next to the down stair.
const NEAR_STAIR_REJECT: f64 = 0.5;

pub(crate) fn generate_base(
    config: &GenConfig,
    run_seed: u64,
) -> Result<Vec<MapContext>, GenerationError> {
    let mut floors = Vec::with_capacity(config.floor_count);
    let mut down = config.start;
    for floor in 0..config.floor_count {
        let mut rng = GenRng::for_pass(run_seed, Pass::Base, floor);
        let mut ctx = MapContext::default();
        for pos in Pos::all().filter(|pos| pos.is_border()) {
            ctx.blocks[pos] = Block::Wall(WallKind::Normal);
        }
        let up = place_up_stair(&ctx, down, config.max_attempts, &mut rng)
            .ok_or(GenerationError::StairPlacementFailed { floor })?;

        ctx.blocks[down] = Block::Stair(StairDir::Down);
        ctx.blocks[up] = Block::Stair(StairDir::Up);
        ctx.down_stair = down;
        ctx.up_stair = up;
        debug!(target: "towergen::mapgen", floor, ?down, ?up, "mapgen.base.stairs");

        floors.push(ctx);
        down = up;
    }
    Ok(floors)
}

fn place_up_stair(ctx: &MapContext, down: Pos, max_attempts: u32, rng: &mut GenRng) -> Option<Pos> {
    let candidates: Vec<Pos> = Pos::all()
        .filter(|&pos| {
            pos != down
                && !pos.is_corner()
                && ctx.blocks[pos] == Block::Empty
                && ctx.marks[pos] != RoomMark::Entry
        })
        .collect();

    for _ in 0..max_attempts {
        let pos = *rng.pick(&candidates)?;
        if pos.is_near(down) && rng.chance(NEAR_STAIR_REJECT) {
            continue;
        }
        return Some(pos);
    }
    None
}
