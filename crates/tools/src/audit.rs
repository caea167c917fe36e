//! Structural checks over a finished tower, shared by the fuzz harness and
//! the generator CLI.

use serde::Serialize;
use thiserror::Error;
use towergen::graph::Graph;
use towergen::mapgen::scan_rooms;
use towergen::{Block, MapContext, Pos, RoomMark, StairDir, Tower};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Error)]
pub enum Violation {
    #[error("first floor starts at {found:?} instead of {expected:?}")]
    StartMoved { expected: Pos, found: Pos },
    #[error("floor {floor} does not begin where floor {} ends", .floor - 1)]
    StairsNotChained { floor: usize },
    #[error("floor {floor} lost its {dir:?} stair")]
    StairLost { floor: usize, dir: StairDir },
    #[error("floor {floor} splits into {components} room groups")]
    Disconnected { floor: usize, components: usize },
    #[error("floor {floor} entry {pos:?} touches {rooms} rooms")]
    BrokenEntry { floor: usize, pos: Pos, rooms: usize },
    #[error("floor {floor} has a 2x2 wall clump at {pos:?}")]
    WallClump { floor: usize, pos: Pos },
    #[error("room {room} on floor {floor} has no stage")]
    UnstagedRoom { floor: usize, room: usize },
    #[error("floor {floor} entry {pos:?} is owned {owners} times")]
    EntryOwnership { floor: usize, pos: Pos, owners: usize },
}

/// Every violation found in `tower`, floor by floor. Empty means the tower is sound.
pub fn audit_tower(tower: &Tower, start: Pos, stage_count: usize) -> Vec<Violation> {
    let mut violations = Vec::new();
    if let Some(first) = tower.floors.first()
        && first.down_stair != start
    {
        violations.push(Violation::StartMoved { expected: start, found: first.down_stair });
    }
    for (offset, pair) in tower.floors.windows(2).enumerate() {
        if pair[0].up_stair != pair[1].down_stair {
            violations.push(Violation::StairsNotChained { floor: offset + 1 });
        }
    }
    for (floor, ctx) in tower.floors.iter().enumerate() {
        audit_floor(floor, ctx, &mut violations);
    }
    for (floor, rooms) in tower.rooms.iter().enumerate() {
        for room in rooms {
            if !(1..=stage_count).contains(&room.stage.index) {
                violations.push(Violation::UnstagedRoom { floor, room: room.id });
            }
            for entry in &room.entries {
                let owners = rooms
                    .iter()
                    .flat_map(|other| &other.entries)
                    .filter(|other| other.owned && other.pos == entry.pos)
                    .count();
                // Both sides list the entry, so report it from the lower id only.
                if owners != 1 && room.id < entry.to_room {
                    violations.push(Violation::EntryOwnership { floor, pos: entry.pos, owners });
                }
            }
        }
    }
    violations
}

fn audit_floor(floor: usize, ctx: &MapContext, violations: &mut Vec<Violation>) {
    for (pos, dir) in [(ctx.up_stair, StairDir::Up), (ctx.down_stair, StairDir::Down)] {
        if ctx.blocks[pos] != Block::Stair(dir) {
            violations.push(Violation::StairLost { floor, dir });
        }
    }

    let scan = scan_rooms(ctx);
    let mut links: Graph<usize> = Graph::new();
    for room in &scan.rooms {
        links.add_edges(room.id, room.entries.iter().map(|entry| (entry.to_room, ())));
    }
    let components = links.multi_source_reach(None);
    if scan.rooms.len() > 1 && (components.len() != 1 || components[0].len() != scan.rooms.len()) {
        violations.push(Violation::Disconnected { floor, components: components.len() });
    }

    for (pos, mark) in ctx.marks.iter() {
        if *mark != RoomMark::Entry {
            continue;
        }
        let mut ids: Vec<usize> = pos.dir4().filter_map(|next| scan.room_ids[next]).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != 2 {
            violations.push(Violation::BrokenEntry { floor, pos, rooms: ids.len() });
        }
    }

    for pos in Pos::all() {
        let quad = [pos, Pos::new(pos.x + 1, pos.y), Pos::new(pos.x, pos.y + 1), Pos::new(pos.x + 1, pos.y + 1)];
        if quad.iter().any(|cell| !cell.is_valid() || cell.is_corner()) {
            continue;
        }
        if quad.iter().all(|&cell| ctx.blocks[cell].is_wall()) {
            violations.push(Violation::WallClump { floor, pos });
        }
    }
}
