//! Room layout: grows rooms around the stairs and into leftover space, opens
//! entries between them, then regenerates until the floor validates.

mod connect;
mod growth;
mod validate;

use tracing::{debug, info};

use crate::config::GenConfig;
use crate::error::GenerationError;
use crate::types::{Block, RoomMark, WallKind};

use super::grid::Layer;
use super::model::MapContext;
use super::seed::{GenRng, Pass};

use growth::{RoomSize, grow_room};

/// Refused growths tolerated while seeding one layout before it is abandoned.
const GROWTH_RETRY_LIMIT: u32 = 1_000;

pub(crate) fn generate_rooms(
    config: &GenConfig,
    run_seed: u64,
    base: &[MapContext],
) -> Result<Vec<MapContext>, GenerationError> {
    base.iter()
        .enumerate()
        .map(|(floor, ctx)| generate_floor_rooms(config, run_seed, floor, ctx))
        .collect()
}

fn generate_floor_rooms(
    config: &GenConfig,
    run_seed: u64,
    floor: usize,
    base: &MapContext,
) -> Result<MapContext, GenerationError> {
    let mut rng = GenRng::for_pass(run_seed, Pass::Rooms, floor);
    let size = RoomSize::new(config.room_size_factor);

    for attempt in 1..=config.max_attempts {
        let Some(candidate) = build_layout(base, size, &mut rng) else {
            debug!(target: "towergen::mapgen", floor, attempt, "mapgen.rooms.seeding_aborted");
            continue;
        };
        match validate::check_floor(&candidate) {
            Ok(()) => {
                info!(target: "towergen::mapgen", floor, attempt, "mapgen.rooms.accepted");
                return Ok(candidate);
            }
            Err(defect) => {
                debug!(target: "towergen::mapgen", floor, attempt, ?defect, "mapgen.rooms.rejected");
            }
        }
    }
    Err(GenerationError::RoomGrowthExhausted { floor, attempts: config.max_attempts })
}

fn build_layout(base: &MapContext, size: RoomSize, rng: &mut GenRng) -> Option<MapContext> {
    let mut ctx = base.clone();
    let marks = ctx.blocks.map(|pos, block| if block.is_wall() { RoomMark::Border } else { ctx.marks[pos] });
    ctx.marks = marks;
    let predefined = ctx.marks.map(|_, mark| mark.is_claimed());

    seed_rooms(&mut ctx, size, rng)?;
    connect::absorb_thin_borders(&mut ctx, &predefined);
    connect::connect_rooms(&mut ctx, &predefined, rng);
    connect::split_sub_rooms(&mut ctx, &predefined, rng);

    let ring: Vec<_> = ctx
        .marks
        .iter()
        .filter(|&(pos, mark)| *mark == RoomMark::Border && !ctx.is_stair(pos))
        .map(|(pos, _)| pos)
        .collect();
    ctx.blocks.set_many(ring, Block::Wall(WallKind::Normal));
    Some(ctx)
}

/// Claims every free cell: first rooms around both stairs, then one room per
/// leftover region until nothing is left. `None` once growth keeps failing.
fn seed_rooms(ctx: &mut MapContext, size: RoomSize, rng: &mut GenRng) -> Option<()> {
    let mut refused = 0;
    let mut grow = |ctx: &mut MapContext, seed, rng: &mut GenRng| {
        if !grow_room(ctx, seed, size, rng) {
            refused += 1;
        }
        (refused <= GROWTH_RETRY_LIMIT).then_some(())
    };

    for stair in [ctx.down_stair, ctx.up_stair] {
        while !ctx.marks[stair].is_claimed() {
            grow(ctx, stair, rng)?;
        }
    }

    loop {
        let claimed: Layer<bool> = ctx.marks.map(|_, mark| mark.is_claimed());
        let regions = claimed.build_graph_dir4(|(from, _), (to, _)| from == to).multi_source_reach(None);
        let Some(region) = regions.into_iter().find(|cells| !claimed[cells[0]]) else {
            return Some(());
        };
        let seed = *rng.pick_weighted(&region, |&pos| {
            pos.dir4().filter(|&next| claimed[next]).count() as u64 + 1
        })?;
        grow(ctx, seed, rng)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::base::generate_base;
    use crate::mapgen::scan::scan_rooms;
    use crate::types::Pos;

    fn base_floors(floor_count: usize, seed: u64) -> (GenConfig, Vec<MapContext>) {
        let config = GenConfig { floor_count, ..GenConfig::default() };
        let base = generate_base(&config, seed).expect("base generation should succeed");
        (config, base)
    }

    #[test]
    fn every_cell_is_claimed_after_layout() {
        let (config, base) = base_floors(2, 8);
        let floors = generate_rooms(&config, 8, &base).expect("rooms should generate");
        for floor in &floors {
            assert!(floor.marks.iter().all(|(_, mark)| mark.is_claimed()));
        }
    }

    #[test]
    fn layouts_keep_the_stairs_and_pass_validation() {
        let (config, base) = base_floors(3, 21);
        let floors = generate_rooms(&config, 21, &base).expect("rooms should generate");
        for (floor, before) in floors.iter().zip(&base) {
            assert_eq!(floor.up_stair, before.up_stair);
            assert_eq!(floor.down_stair, before.down_stair);
            assert_eq!(validate::check_floor(floor), Ok(()));
            assert!(scan_rooms(floor).rooms.len() >= 2, "a 13x13 floor splits into several rooms");
        }
    }

    #[test]
    fn room_layout_is_reproducible() {
        let (config, base) = base_floors(2, 99);
        let a = generate_rooms(&config, 99, &base).expect("rooms should generate");
        let b = generate_rooms(&config, 99, &base).expect("rooms should generate");
        assert_eq!(a, b);
    }

    #[test]
    fn exhausted_attempts_surface_as_an_error() {
        let (mut config, mut base) = base_floors(1, 4);
        config.max_attempts = 3;
        // With every interior cell walled there is nowhere to put an entry.
        for pos in Pos::all() {
            if !base[0].is_stair(pos) {
                base[0].blocks[pos] = Block::Wall(WallKind::Normal);
            }
        }
        let error = generate_rooms(&config, 4, &base).expect_err("layout cannot validate");
        assert_eq!(error, GenerationError::RoomGrowthExhausted { floor: 0, attempts: 3 });
    }
}
