//! Entry ownership: which of the two rooms sharing an entry pays for it.

use std::collections::BTreeSet;

use crate::types::Pos;

use super::world::{RoomRef, World};

/// Gives every physical entry exactly one owner: rooms are visited from the
/// latest stage and farthest from the source backwards, and the first room to
/// see an entry keeps it.
pub(crate) fn orient_entries(world: &mut World) {
    let mut order: Vec<(RoomRef, u32)> = world.source_order.clone();
    order.sort_by(|(a, a_dist), (b, b_dist)| {
        let a_stage = world.room(*a).stage.index;
        let b_stage = world.room(*b).stage.index;
        b_stage.cmp(&a_stage).then(b_dist.cmp(a_dist))
    });

    let mut seen: BTreeSet<(usize, Pos)> = BTreeSet::new();
    for (at, _) in order {
        for entry in &mut world.room_mut(at).entries {
            if seen.insert((at.floor, entry.pos)) {
                entry.owned = true;
            }
        }
    }
}
