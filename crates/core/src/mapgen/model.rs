//! Public data models for generated floors, rooms, and the finished tower.

use std::fmt;

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::economy::Enemy;
use crate::types::{Block, Event, KeyType, Pos, RoomMark, StairDir, WallKind};

use super::grid::Layer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RoomStair {
    None,
    Down,
    Up,
    Both,
}

impl RoomStair {
    pub fn from_flags(has_down: bool, has_up: bool) -> Self {
        match (has_down, has_up) {
            (false, false) => RoomStair::None,
            (true, false) => RoomStair::Down,
            (false, true) => RoomStair::Up,
            (true, true) => RoomStair::Both,
        }
    }

    pub fn has_down(self) -> bool {
        matches!(self, RoomStair::Down | RoomStair::Both)
    }

    pub fn has_up(self) -> bool {
        matches!(self, RoomStair::Up | RoomStair::Both)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RoomCutKind {
    Leaf,
    Cut,
    Normal,
    Isolate,
}

/// One piece of the room graph left over after removing a room, with the
/// ids of that room's entries leading into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CutBlock {
    pub entries: Vec<usize>,
    pub rooms: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoomCutMark {
    pub kind: RoomCutKind,
    pub blocks: Vec<CutBlock>,
}

/// Stage assignment of a room. `fix` counts the stair crossings that pulled
/// the room into its stage together with the room below it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StageMark {
    pub index: usize,
    pub fix: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoomEntry {
    pub id: usize,
    pub to_room: usize,
    pub pos: Pos,
    /// Cells of this room 4-adjacent to the entry.
    pub after: Vec<Pos>,
    /// Whether this room owns the entry in the play flow.
    pub owned: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: usize,
    pub stair: RoomStair,
    pub entries: Vec<RoomEntry>,
    pub inner: Vec<Pos>,
    pub stage: StageMark,
    pub cut: RoomCutMark,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MapContext {
    pub up_stair: Pos,
    pub down_stair: Pos,
    pub blocks: Layer<Block>,
    pub marks: Layer<RoomMark>,
    pub debug: Layer<Vec<String>>,
}

impl Default for MapContext {
    fn default() -> Self {
        Self {
            up_stair: Pos::new(0, 0),
            down_stair: Pos::new(0, 0),
            blocks: Layer::filled(Block::Empty),
            marks: Layer::filled(RoomMark::Empty),
            debug: Layer::filled(Vec::new()),
        }
    }
}

impl MapContext {
    pub fn is_stair(&self, pos: Pos) -> bool {
        pos == self.up_stair || pos == self.down_stair
    }

    pub fn annotate(&mut self, pos: Pos, note: impl Into<String>) {
        self.debug[pos].push(note.into());
    }

    /// Stable byte encoding of the stairs, blocks, and room marks. Debug notes
    /// are left out.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.up_stair.y.to_le_bytes());
        bytes.extend(self.up_stair.x.to_le_bytes());
        bytes.extend(self.down_stair.y.to_le_bytes());
        bytes.extend(self.down_stair.x.to_le_bytes());
        for (_, block) in self.blocks.iter() {
            match *block {
                Block::Empty => bytes.push(0),
                Block::Wall(kind) => bytes.extend([
                    1,
                    match kind {
                        WallKind::Normal => 0,
                        WallKind::Unbreakable => 1,
                    },
                ]),
                Block::Stair(dir) => bytes.extend([
                    2,
                    match dir {
                        StairDir::Up => 0,
                        StairDir::Down => 1,
                    },
                ]),
                Block::Event(event) => {
                    bytes.push(3);
                    encode_event(&mut bytes, event);
                }
            }
        }
        for (_, mark) in self.marks.iter() {
            bytes.push(match mark {
                RoomMark::Empty => 0,
                RoomMark::Inner => 1,
                RoomMark::Border => 2,
                RoomMark::Entry => 3,
            });
        }
        bytes
    }

    pub fn block_counts(&self) -> BlockCounts {
        let mut counts = BlockCounts::default();
        for (_, mark) in self.marks.iter() {
            if *mark == RoomMark::Entry {
                counts.entries += 1;
            }
        }
        for (_, block) in self.blocks.iter() {
            match block {
                Block::Event(Event::Door { .. }) => counts.doors += 1,
                Block::Event(Event::Enemy { .. }) => counts.enemies += 1,
                Block::Event(Event::Key { .. } | Event::Potion { .. } | Event::Gem { .. }) => {
                    counts.items += 1;
                }
                Block::Empty | Block::Wall(_) | Block::Stair(_) => {}
            }
        }
        counts
    }
}

fn encode_event(bytes: &mut Vec<u8>, event: Event) {
    let key_code = |key: KeyType| key.tier() as u8;
    match event {
        Event::Door { key } => bytes.extend([0, key_code(key)]),
        Event::Key { key } => bytes.extend([1, key_code(key)]),
        Event::Enemy { index } => {
            bytes.push(2);
            bytes.extend((index as u32).to_le_bytes());
        }
        Event::Potion { index } => {
            bytes.push(3);
            bytes.extend((index as u32).to_le_bytes());
        }
        Event::Gem { index } => {
            bytes.push(4);
            bytes.extend((index as u32).to_le_bytes());
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BlockCounts {
    pub entries: usize,
    pub doors: usize,
    pub enemies: usize,
    pub items: usize,
}

/// Per-floor summary of a finished floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FloorStats {
    pub rooms: usize,
    pub entries: usize,
    pub doors: usize,
    pub enemies: usize,
    pub items: usize,
}

impl fmt::Display for FloorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "room: {} entry: {} door: {} enemy: {} item: {}",
            self.rooms, self.entries, self.doors, self.enemies, self.items
        )
    }
}

/// Result of a full generation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tower {
    pub floors: Vec<MapContext>,
    /// Classified rooms per floor with their stage and entry ownership.
    pub rooms: Vec<Vec<Room>>,
    /// Enemy catalog that `Event::Enemy { index }` refers to.
    pub enemies: Vec<Enemy>,
}

impl Tower {
    pub fn floor_stats(&self) -> Vec<FloorStats> {
        self.floors
            .iter()
            .zip(&self.rooms)
            .map(|(floor, rooms)| {
                let counts = floor.block_counts();
                FloorStats {
                    rooms: rooms.len(),
                    entries: counts.entries,
                    doors: counts.doors,
                    enemies: counts.enemies,
                    items: counts.items,
                }
            })
            .collect()
    }

    pub fn fingerprint_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.floors.len() as u32).to_le_bytes());
        for floor in &self.floors {
            bytes.extend(floor.canonical_bytes());
        }
        bytes.extend((self.enemies.len() as u32).to_le_bytes());
        for enemy in &self.enemies {
            bytes.extend(enemy.hp.to_le_bytes());
            bytes.extend(enemy.atk.to_le_bytes());
            bytes.extend(enemy.def.to_le_bytes());
        }
        bytes
    }

    /// 64-bit digest of `fingerprint_bytes`, used to compare runs.
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.fingerprint_bytes())
    }
}
