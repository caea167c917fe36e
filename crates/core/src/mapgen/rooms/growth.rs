//! Randomized region growth from a seed cell.

use tracing::trace;

use crate::algo::clamp_to;
use crate::types::{Pos, RoomMark};

use super::super::grid::Layer;
use super::super::model::MapContext;
use super::super::seed::GenRng;

/// Room size parameters scaled by the configured size factor.
#[derive(Clone, Copy, Debug)]
pub(super) struct RoomSize {
    /// Free regions smaller than this are absorbed whole.
    threshold: usize,
    minimum: i64,
    mean: f64,
    std: f64,
}

impl RoomSize {
    pub(super) fn new(factor: f64) -> Self {
        Self {
            threshold: (5.0 * factor).trunc() as usize,
            minimum: ((2.0 * factor).trunc() as i64).max(1),
            mean: 3.0 * factor,
            std: factor,
        }
    }
}

fn is_claimed(ctx: &MapContext, pos: Pos) -> bool {
    ctx.marks[pos].is_claimed()
}

/// Grows one room from `seed` and marks its interior and ring. Returns `false`
/// without touching the floor when the ring would swallow a stair.
pub(super) fn grow_room(ctx: &mut MapContext, seed: Pos, size: RoomSize, rng: &mut GenRng) -> bool {
    let possible = ctx
        .marks
        .build_graph_dir4(|_, (to, _)| !to.is_claimed())
        .single_source_reach(seed);

    let mut taken = Layer::filled(false);
    let mut inner: Vec<Pos> = Vec::new();
    let mut take = |pos: Pos, inner: &mut Vec<Pos>| {
        taken[pos] = true;
        inner.push(pos);
    };

    if possible.len() < size.threshold {
        for &pos in &possible {
            take(pos, &mut inner);
        }
    } else {
        let area = clamp_to(rng.normal(size.mean, size.std), size.minimum, possible.len() as i64);
        let mut frontier = vec![seed];
        while (inner.len() as i64) < area {
            let picked = rng.pick_weighted_remove(&mut frontier, |&pos| {
                let outer = pos.dir4().filter(|&next| is_claimed(ctx, next)).count() as u64;
                let within = pos.dir4().filter(|next| inner.contains(next)).count() as u64;
                outer * outer + within * within + 1
            });
            let Some(pos) = picked else {
                break;
            };
            take(pos, &mut inner);
            for next in pos.dir4() {
                if is_claimed(ctx, next) || inner.contains(&next) || frontier.contains(&next) {
                    continue;
                }
                frontier.push(next);
            }
        }

        for pos in frontier {
            let near_entry = pos.dir4().any(|next| ctx.marks[next] == RoomMark::Entry);
            if ctx.is_stair(pos) || near_entry {
                take(pos, &mut inner);
            }
        }
    }

    let mut ring: Vec<Pos> = Vec::new();
    for &pos in &inner {
        for next in pos.dir8() {
            if is_claimed(ctx, next) || taken[next] || ring.contains(&next) {
                continue;
            }
            ring.push(next);
        }
    }

    if ring.iter().any(|&pos| ctx.is_stair(pos)) {
        trace!(target: "towergen::mapgen", ?seed, size = inner.len(), "mapgen.rooms.grow_rejected");
        return false;
    }

    ctx.marks.set_many(inner.iter().copied(), RoomMark::Inner);
    ctx.marks.set_many(ring, RoomMark::Border);
    trace!(
        target: "towergen::mapgen",
        ?seed,
        available = possible.len(),
        size = inner.len(),
        "mapgen.rooms.grown"
    );
    true
}
