//! Recomputes rooms, entries, stair membership, and cut classification from
//! a floor's room-mark layer.

use crate::graph::Graph;
use crate::types::{Pos, RoomMark};

use super::grid::Layer;
use super::model::{
    CutBlock, MapContext, Room, RoomCutKind, RoomCutMark, RoomEntry, RoomStair, StageMark,
};

pub struct RoomScan {
    pub rooms: Vec<Room>,
    /// Room id of every `Inner` cell.
    pub room_ids: Layer<Option<usize>>,
    /// Cells linked to orthogonal neighbours carrying the same mark.
    pub room_graph: Graph<Pos, u32>,
}

/// Distinct room ids found on `cells`, in first-seen order.
pub(crate) fn distinct_room_ids(
    room_ids: &Layer<Option<usize>>,
    cells: impl IntoIterator<Item = Pos>,
) -> Vec<usize> {
    let mut ids = Vec::new();
    for cell in cells {
        if let Some(id) = room_ids[cell]
            && !ids.contains(&id)
        {
            ids.push(id);
        }
    }
    ids
}

pub fn scan_rooms(ctx: &MapContext) -> RoomScan {
    let room_graph = ctx.marks.build_graph_dir4(|(from, _), (to, _)| from == to);
    let mut room_ids = Layer::filled(None);
    let mut rooms: Vec<Room> = Vec::new();

    for cells in room_graph.multi_source_reach(None) {
        if ctx.marks[cells[0]] != RoomMark::Inner {
            continue;
        }
        let id = rooms.len();
        room_ids.set_many(cells.iter().copied(), Some(id));
        let stair = RoomStair::from_flags(cells.contains(&ctx.down_stair), cells.contains(&ctx.up_stair));
        rooms.push(Room {
            id,
            stair,
            entries: Vec::new(),
            inner: cells,
            stage: StageMark::default(),
            cut: RoomCutMark { kind: RoomCutKind::Normal, blocks: Vec::new() },
        });
    }

    for (pos, mark) in ctx.marks.iter() {
        if *mark != RoomMark::Entry {
            continue;
        }
        let pair = distinct_room_ids(&room_ids, pos.dir4());
        let [a, b] = pair[..] else {
            continue;
        };
        for (room, to_room) in [(a, b), (b, a)] {
            let after: Vec<Pos> = pos.dir4().filter(|&cell| room_ids[cell] == Some(room)).collect();
            let entries = &mut rooms[room].entries;
            entries.push(RoomEntry { id: entries.len(), to_room, pos, after, owned: false });
        }
    }

    let mut links: Graph<usize> = Graph::new();
    for room in &rooms {
        links.add_edges(room.id, room.entries.iter().map(|entry| (entry.to_room, ())));
    }
    for room in &mut rooms {
        room.cut = classify_cut(&links, room);
    }

    RoomScan { rooms, room_ids, room_graph }
}

fn classify_cut(links: &Graph<usize>, room: &Room) -> RoomCutMark {
    let pieces = links.scan_cut(room.id);
    match pieces.len() {
        0 => RoomCutMark { kind: RoomCutKind::Isolate, blocks: Vec::new() },
        1 => {
            let entries: Vec<usize> = room.entries.iter().map(|entry| entry.id).collect();
            let kind = if entries.len() == 1 { RoomCutKind::Leaf } else { RoomCutKind::Normal };
            let blocks = pieces.into_iter().map(|rooms| CutBlock { entries: entries.clone(), rooms });
            RoomCutMark { kind, blocks: blocks.collect() }
        }
        _ => {
            let blocks = pieces
                .into_iter()
                .map(|rooms| CutBlock {
                    entries: room
                        .entries
                        .iter()
                        .filter(|entry| rooms.contains(&entry.to_room))
                        .map(|entry| entry.id)
                        .collect(),
                    rooms,
                })
                .collect();
            RoomCutMark { kind: RoomCutKind::Cut, blocks }
        }
    }
}
