//! Splits the tower's rooms into play stages by weighted frontier expansion.

use std::collections::BTreeMap;
use std::mem;

use tracing::debug;

use crate::mapgen::{GenRng, StageMark};

use super::world::{RoomRef, World};

enum Visit {
    Enter(RoomRef, u32),
    Exit(RoomRef),
}

struct StageBuilder<'a> {
    world: &'a World,
    members: Vec<RoomRef>,
    fixes: BTreeMap<RoomRef, u32>,
    frontier: Vec<RoomRef>,
    max_floor: usize,
    min_dist: u32,
}

impl StageBuilder<'_> {
    fn is_staged(&self, at: RoomRef) -> bool {
        self.world.room(at).stage.index != 0
    }

    fn note_progress(&mut self, at: RoomRef) {
        self.max_floor = self.max_floor.max(at.floor);
        self.min_dist = self.min_dist.min(self.world.terminal_distance(at));
    }

    fn weight(&self, at: RoomRef, frontier_len: usize) -> u64 {
        let floor_count = self.world.floors.len() as u64;
        let delta = floor_count - at.floor as u64 - 1;
        if at.floor == self.max_floor && self.world.terminal_distance(at) < self.min_dist {
            delta * (frontier_len as u64 - 1) + floor_count
        } else {
            delta + floor_count
        }
    }

    /// Adds `start` and, across every stair it leads up, the room waiting on
    /// the next floor, before its neighbours join the frontier.
    fn add_room(&mut self, start: RoomRef) {
        let mut stack = vec![Visit::Enter(start, 0)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(at, fix) => {
                    if self.members.contains(&at) || self.is_staged(at) {
                        continue;
                    }
                    self.members.push(at);
                    self.fixes.insert(at, fix);
                    self.frontier.retain(|&queued| queued != at);
                    self.note_progress(at);
                    stack.push(Visit::Exit(at));
                    let upward: Vec<RoomRef> = self.world.neighbors(at).filter(|to| to.floor > at.floor).collect();
                    stack.extend(upward.into_iter().rev().map(|to| Visit::Enter(to, fix + 1)));
                }
                Visit::Exit(at) => {
                    let next: Vec<RoomRef> = self.world.neighbors(at).collect();
                    for to in next {
                        if self.members.contains(&to) || self.frontier.contains(&to) || self.is_staged(to) {
                            continue;
                        }
                        self.frontier.push(to);
                    }
                }
            }
        }
    }
}

/// Assigns `StageMark`s (1-based) to rooms and returns the rooms of each
/// stage in the order they were added.
pub(crate) fn assign_stages(world: &mut World, targets: &[f64], rng: &mut GenRng) -> Vec<Vec<RoomRef>> {
    let mut stages = Vec::with_capacity(targets.len());
    for (offset, &target) in targets.iter().enumerate() {
        let index = offset + 1;
        let (members, fixes) = {
            let mut builder = StageBuilder {
                world,
                members: Vec::new(),
                fixes: BTreeMap::new(),
                frontier: Vec::new(),
                max_floor: 0,
                min_dist: world.terminal_distance(world.source).saturating_add(1),
            };
            if index == 1 {
                builder.frontier.push(world.source);
            } else {
                let staged: Vec<RoomRef> = world.room_refs().filter(|&at| builder.is_staged(at)).collect();
                for at in staged {
                    builder.note_progress(at);
                    for to in world.neighbors(at) {
                        if !builder.is_staged(to) && !builder.frontier.contains(&to) {
                            builder.frontier.push(to);
                        }
                    }
                }
            }

            while (builder.members.len() as f64) < target && !builder.frontier.is_empty() {
                let frontier_len = builder.frontier.len();
                let mut frontier = mem::take(&mut builder.frontier);
                let picked = rng.pick_weighted_remove(&mut frontier, |&at| builder.weight(at, frontier_len));
                builder.frontier = frontier;
                let Some(at) = picked else {
                    break;
                };
                builder.add_room(at);
            }
            (builder.members, builder.fixes)
        };

        for &at in &members {
            let fix = fixes.get(&at).copied().unwrap_or_default();
            world.room_mut(at).stage = StageMark { index, fix };
        }
        debug!(target: "towergen::plot", stage = index, rooms = members.len(), target, "plot.stage.filled");
        stages.push(members);
    }
    stages
}
