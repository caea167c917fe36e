//! Ring repair, entry carving between neighbouring rooms, and side-room splits.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::algo::DisjointSet;
use crate::types::{Pos, RoomMark};

use super::super::grid::Layer;
use super::super::model::{MapContext, Room};
use super::super::scan::{distinct_room_ids, scan_rooms};
use super::super::seed::GenRng;

const SKIP_EXISTING_LINK: f64 = 0.9;
const SKIP_BUSY_ROOM: f64 = 0.8;
const SKIP_EXTRA_LINK: f64 = 0.5;
const SUB_ROOM_MIN_AREA: usize = 6;

/// Turns ring cells that only ever touch one room back into interior cells.
pub(super) fn absorb_thin_borders(ctx: &mut MapContext, predefined: &Layer<bool>) {
    let mut room_ids = scan_rooms(ctx).room_ids;
    for pos in Pos::all() {
        if predefined[pos] || ctx.marks[pos] != RoomMark::Border {
            continue;
        }
        let straight = distinct_room_ids(&room_ids, pos.dir4());
        let around = distinct_room_ids(&room_ids, pos.dir8());
        if let ([room], [_]) = (straight.as_slice(), around.as_slice()) {
            ctx.marks[pos] = RoomMark::Inner;
            room_ids[pos] = Some(*room);
        }
    }
}

#[derive(Default)]
struct Links {
    degrees: Vec<usize>,
    pairs: BTreeSet<(usize, usize)>,
}

impl Links {
    fn link(&mut self, x: usize, y: usize) {
        self.degrees[x] += 1;
        self.degrees[y] += 1;
        self.pairs.insert((x, y));
    }
}

/// Opens ring cells between rooms: a spanning tree first, then extra links
/// with decreasing odds for pairs that are already linked or busy.
pub(super) fn connect_rooms(ctx: &mut MapContext, predefined: &Layer<bool>, rng: &mut GenRng) {
    let scan = scan_rooms(ctx);
    let room_count = scan.rooms.len();
    let mut links = Links { degrees: vec![0; room_count], ..Links::default() };
    let mut openings: BTreeMap<(usize, usize), Vec<Pos>> = BTreeMap::new();

    for (pos, mark) in ctx.marks.iter() {
        let is_entry = *mark == RoomMark::Entry;
        let is_opening = !predefined[pos] && *mark == RoomMark::Border;
        if !is_entry && !is_opening {
            continue;
        }
        let ids = distinct_room_ids(&scan.room_ids, pos.dir4());
        let [a, b] = ids[..] else {
            continue;
        };
        let pair = (a.min(b), a.max(b));
        if is_entry {
            links.link(pair.0, pair.1);
        } else {
            openings.entry(pair).or_default().push(pos);
        }
    }

    let mut pairs: Vec<(usize, usize)> =
        (0..room_count).flat_map(|x| (x + 1..room_count).map(move |y| (x, y))).collect();
    rng.shuffle(&mut pairs);

    let mut joined = DisjointSet::new(room_count);
    for (x, y) in pairs {
        let Some(cells) = openings.get_mut(&(x, y)).filter(|cells| !cells.is_empty()) else {
            continue;
        };
        if joined.is_joint(x, y) {
            let skip = if links.pairs.contains(&(x, y)) {
                SKIP_EXISTING_LINK
            } else if links.degrees[x] > 2 || links.degrees[y] > 2 {
                SKIP_BUSY_ROOM
            } else {
                SKIP_EXTRA_LINK
            };
            if rng.chance(skip) {
                continue;
            }
        } else {
            joined.join(x, y);
        }
        if let Some(pos) = rng.pick_remove(cells) {
            ctx.marks[pos] = RoomMark::Entry;
            links.link(x, y);
            trace!(target: "towergen::mapgen", from = x, to = y, ?pos, "mapgen.rooms.entry_opened");
        }
    }
}

fn is_sole_after(room: &Room, pos: Pos) -> bool {
    room.entries.iter().any(|entry| entry.after.len() == 1 && entry.after[0] == pos)
}

/// Carves a dead-end pocket off large rooms by turning the cell that joins it
/// to the rest of the room into an entry.
pub(super) fn split_sub_rooms(ctx: &mut MapContext, predefined: &Layer<bool>, rng: &mut GenRng) {
    let scan = scan_rooms(ctx);
    for room in &scan.rooms {
        if predefined[room.inner[0]] || room.inner.len() < SUB_ROOM_MIN_AREA || room.entries.is_empty() {
            continue;
        }
        if room.inner.len() == SUB_ROOM_MIN_AREA && rng.chance(0.5) {
            continue;
        }

        let mut candidates = Vec::new();
        for &stub in &room.inner {
            if ctx.is_stair(stub) || is_sole_after(room, stub) {
                continue;
            }
            let joints: Vec<Pos> = stub.dir4().filter(|next| room.inner.contains(next)).collect();
            let [joint] = joints[..] else {
                continue;
            };
            if ctx.is_stair(joint) || is_sole_after(room, joint) {
                continue;
            }
            // The joint may only cut off the stub itself.
            if scan.room_graph.scan_cut(joint).len() > 2 {
                continue;
            }
            candidates.push(joint);
        }

        if let Some(&joint) = rng.pick(&candidates) {
            ctx.marks[joint] = RoomMark::Entry;
            ctx.annotate(joint, "SubRoom");
            trace!(target: "towergen::mapgen", room = room.id, ?joint, "mapgen.rooms.sub_room");
        }
    }
}
