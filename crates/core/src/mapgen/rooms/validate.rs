//! Structural checks a finished room layout must pass before it is kept.

use crate::graph::Graph;
use crate::types::{Block, Pos, RoomMark, StairDir};

use super::super::model::{MapContext, Room};
use super::super::scan::{RoomScan, distinct_room_ids, scan_rooms};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum RoomDefect {
    /// A 2x2 block of walls with its top-left cell at `0`.
    WallClump(Pos),
    StairOverwritten(StairDir),
    StairOutsideRoom(StairDir),
    /// The stair separates entries of its room while other cells do not.
    StairCutsEntries(StairDir),
    BrokenEntry(Pos),
    Disconnected { components: usize },
}

pub(super) fn check_floor(ctx: &MapContext) -> Result<(), RoomDefect> {
    check_wall_clumps(ctx)?;
    let scan = scan_rooms(ctx);
    check_stair(ctx, &scan, ctx.up_stair, StairDir::Up)?;
    check_stair(ctx, &scan, ctx.down_stair, StairDir::Down)?;
    check_entries(ctx, &scan)?;
    check_connectivity(&scan)
}

fn check_wall_clumps(ctx: &MapContext) -> Result<(), RoomDefect> {
    for pos in Pos::all() {
        let quad = [pos, Pos::new(pos.x + 1, pos.y), Pos::new(pos.x, pos.y + 1), Pos::new(pos.x + 1, pos.y + 1)];
        if quad.iter().any(|cell| !cell.is_valid() || cell.is_corner()) {
            continue;
        }
        if quad.iter().all(|&cell| ctx.blocks[cell].is_wall()) {
            return Err(RoomDefect::WallClump(pos));
        }
    }
    Ok(())
}

fn is_sole_after(room: &Room, pos: Pos) -> bool {
    room.entries.iter().any(|entry| entry.after.len() == 1 && entry.after[0] == pos)
}

/// Whether removing `pos` would leave entries of `room` in different pieces.
fn cuts_entries(scan: &RoomScan, room: &Room, pos: Pos) -> bool {
    if is_sole_after(room, pos) {
        return true;
    }
    let pieces_with_entries = scan
        .room_graph
        .scan_cut(pos)
        .iter()
        .filter(|piece| piece.iter().any(|&cell| is_sole_after(room, cell)))
        .count();
    pieces_with_entries > 1
}

fn check_stair(ctx: &MapContext, scan: &RoomScan, stair: Pos, dir: StairDir) -> Result<(), RoomDefect> {
    if ctx.blocks[stair] != Block::Stair(dir) {
        return Err(RoomDefect::StairOverwritten(dir));
    }
    let room = scan.room_ids[stair]
        .and_then(|id| scan.rooms.get(id))
        .ok_or(RoomDefect::StairOutsideRoom(dir))?;
    if room.inner.len() > 1
        && cuts_entries(scan, room, stair)
        && room.inner.iter().any(|&cell| !cuts_entries(scan, room, cell))
    {
        return Err(RoomDefect::StairCutsEntries(dir));
    }
    Ok(())
}

fn check_entries(ctx: &MapContext, scan: &RoomScan) -> Result<(), RoomDefect> {
    for (pos, mark) in ctx.marks.iter() {
        if *mark == RoomMark::Entry && distinct_room_ids(&scan.room_ids, pos.dir4()).len() != 2 {
            return Err(RoomDefect::BrokenEntry(pos));
        }
    }
    Ok(())
}

fn check_connectivity(scan: &RoomScan) -> Result<(), RoomDefect> {
    let mut links: Graph<usize> = Graph::new();
    for room in &scan.rooms {
        links.add_edges(room.id, room.entries.iter().map(|entry| (entry.to_room, ())));
    }
    let components = links.multi_source_reach(None).len();
    if components > 1 {
        return Err(RoomDefect::Disconnected { components });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::test_support::floor_from_rows;

    fn open_grid() -> Vec<String> {
        let mut rows = vec!["#############".to_string()];
        for y in 1..12 {
            let divider = if y == 6 { "#.#.#.#.#.#.#" } else { "#...........#" };
            rows.push(divider.to_string());
        }
        rows.push("#############".to_string());
        rows
    }

    #[test]
    fn solid_wall_regions_are_rejected() {
        let ctx = floor_from_rows(
            &["#############", "#...+...#####", "#...#...#####", "#############"],
            Pos::new(1, 1),
            Pos::new(7, 1),
        );
        assert!(matches!(check_floor(&ctx), Err(RoomDefect::WallClump(_))));
    }

    #[test]
    fn wall_clumps_touching_a_map_corner_are_tolerated() {
        let rows = open_grid();
        let mut rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        rows[1] = "##..........#";
        let ctx = floor_from_rows(&rows, Pos::new(2, 2), Pos::new(11, 11));
        assert_eq!(check_wall_clumps(&ctx), Ok(()));
    }

    #[test]
    fn entries_must_touch_exactly_two_rooms() {
        let rows = open_grid();
        let mut rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        rows[3] = "#.....+.....#";
        let ctx = floor_from_rows(&rows, Pos::new(1, 1), Pos::new(11, 11));
        assert_eq!(check_entries(&ctx, &scan_rooms(&ctx)), Err(RoomDefect::BrokenEntry(Pos::new(6, 3))));
    }

    #[test]
    fn overwritten_stairs_are_reported() {
        let rows = open_grid();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let mut ctx = floor_from_rows(&rows, Pos::new(1, 1), Pos::new(11, 11));
        ctx.blocks[Pos::new(11, 11)] = Block::Empty;
        let scan = scan_rooms(&ctx);
        assert_eq!(
            check_stair(&ctx, &scan, ctx.up_stair, StairDir::Up),
            Err(RoomDefect::StairOverwritten(StairDir::Up))
        );
    }

    fn up_stair_verdict(rows: &[&str], up: Pos) -> Result<(), RoomDefect> {
        let ctx = floor_from_rows(rows, Pos::new(1, 1), up);
        let scan = scan_rooms(&ctx);
        check_stair(&ctx, &scan, ctx.up_stair, StairDir::Up)
    }

    #[test]
    fn stair_right_behind_an_entry_is_rejected() {
        let rows = ["#############", "#...#.....#.#", "#...+.....+.#", "#...#.....#.#", "#############"];
        assert_eq!(up_stair_verdict(&rows, Pos::new(11, 2)), Err(RoomDefect::StairCutsEntries(StairDir::Up)));
        assert_eq!(up_stair_verdict(&rows, Pos::new(7, 2)), Ok(()), "stair in an open room cuts nothing");
    }

    #[test]
    fn stair_in_a_corridor_is_accepted_when_every_cell_cuts() {
        let rows = ["#############", "#...#######.#", "#...+.....+.#", "#...#######.#", "#############"];
        assert_eq!(up_stair_verdict(&rows, Pos::new(7, 2)), Ok(()));
    }

    #[test]
    fn stair_cutting_a_room_with_a_side_pocket_is_rejected() {
        let rows = ["#############", "#...#.#####.#", "#...+.....+.#", "#...#######.#", "#############"];
        assert_eq!(up_stair_verdict(&rows, Pos::new(7, 2)), Err(RoomDefect::StairCutsEntries(StairDir::Up)));
    }

    #[test]
    fn rooms_without_a_path_between_them_are_disconnected() {
        let ctx = floor_from_rows(
            &["#############", "#...#...#...#", "#...+...#...#", "#############"],
            Pos::new(1, 1),
            Pos::new(10, 1),
        );
        assert_eq!(check_connectivity(&scan_rooms(&ctx)), Err(RoomDefect::Disconnected { components: 2 }));
    }
}
