//! Cross-floor room graph shared by staging, orientation, and drafting.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::GenerationError;
use crate::graph::Graph;
use crate::mapgen::{Layer, MapContext, Room, scan_rooms};
use crate::types::{Pos, StairDir};

/// A room addressed across the whole tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RoomRef {
    pub floor: usize,
    pub room: usize,
}

impl RoomRef {
    pub fn new(floor: usize, room: usize) -> Self {
        Self { floor, room }
    }
}

pub(crate) struct World {
    pub floors: Vec<MapContext>,
    pub rooms: Vec<Vec<Room>>,
    pub room_ids: Vec<Layer<Option<usize>>>,
    /// Rooms linked through entries, plus both directions across each stair.
    pub links: Graph<RoomRef>,
    /// Every cell linked to its orthogonal neighbours.
    pub cells: Graph<Pos, u32>,
    pub source: RoomRef,
    pub terminal: RoomRef,
    /// Rooms in the order a shortest-path search from the source settles them.
    pub source_order: Vec<(RoomRef, u32)>,
    pub terminal_dist: BTreeMap<RoomRef, u32>,
}

impl World {
    pub fn build(floors: Vec<MapContext>) -> Result<Self, GenerationError> {
        let mut rooms = Vec::with_capacity(floors.len());
        let mut room_ids = Vec::with_capacity(floors.len());
        let mut links: Graph<RoomRef> = Graph::new();
        let mut source = None;
        let mut below_up: Option<RoomRef> = None;

        for (floor, ctx) in floors.iter().enumerate() {
            let scan = scan_rooms(ctx);
            let mut up_room = None;
            let mut down_room = None;
            for room in &scan.rooms {
                let here = RoomRef::new(floor, room.id);
                if room.inner.contains(&ctx.down_stair) {
                    down_room = Some(here);
                    match below_up {
                        Some(below) => {
                            links.add_edge(here, below, ());
                            links.add_edge(below, here, ());
                        }
                        None => source = Some(here),
                    }
                }
                if room.inner.contains(&ctx.up_stair) {
                    up_room = Some(here);
                }
                links.add_edges(
                    here,
                    room.entries.iter().map(|entry| (RoomRef::new(floor, entry.to_room), ())),
                );
            }
            if down_room.is_none() {
                return Err(GenerationError::StairRoomMissing { floor, dir: StairDir::Down });
            }
            below_up = Some(up_room.ok_or(GenerationError::StairRoomMissing { floor, dir: StairDir::Up })?);
            rooms.push(scan.rooms);
            room_ids.push(scan.room_ids);
        }

        let floor_index = floors.len().saturating_sub(1);
        let source = source.ok_or(GenerationError::StairRoomMissing { floor: 0, dir: StairDir::Down })?;
        let terminal = below_up.ok_or(GenerationError::StairRoomMissing { floor: floor_index, dir: StairDir::Up })?;
        let source_order = links.dijkstra(source, |_| 1, |_| false);
        let terminal_dist = links.dijkstra(terminal, |_| 1, |_| false).into_iter().collect();
        let cells = Layer::filled(()).build_graph_dir4(|_, _| true);

        Ok(Self { floors, rooms, room_ids, links, cells, source, terminal, source_order, terminal_dist })
    }

    pub fn room(&self, at: RoomRef) -> &Room {
        &self.rooms[at.floor][at.room]
    }

    pub fn room_mut(&mut self, at: RoomRef) -> &mut Room {
        &mut self.rooms[at.floor][at.room]
    }

    pub fn room_refs(&self) -> impl Iterator<Item = RoomRef> + '_ {
        self.rooms
            .iter()
            .enumerate()
            .flat_map(|(floor, rooms)| rooms.iter().map(move |room| RoomRef::new(floor, room.id)))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.iter().map(Vec::len).sum()
    }

    pub fn terminal_distance(&self, at: RoomRef) -> u32 {
        self.terminal_dist.get(&at).copied().unwrap_or(u32::MAX)
    }

    pub fn neighbors(&self, at: RoomRef) -> impl Iterator<Item = RoomRef> + '_ {
        self.links.neighbors(at).map(|(to, _)| *to)
    }

    /// Room holding the down stair of `floor`.
    pub fn down_stair_room(&self, floor: usize) -> Option<RoomRef> {
        self.rooms
            .get(floor)?
            .iter()
            .find(|room| room.stair.has_down())
            .map(|room| RoomRef::new(floor, room.id))
    }
}
