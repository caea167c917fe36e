//! Shared floor fixtures for the map and plot test suites.
//! It does not own production generation logic.

use crate::types::{Block, Pos, RoomMark, StairDir, WallKind};

use super::grid::Layer;
use super::model::MapContext;

/// Builds a floor from rows of `#` (border), `.` (inner), and `+` (entry).
/// Everything outside the drawing stays a border wall.
pub(crate) fn floor_from_rows(rows: &[&str], down: Pos, up: Pos) -> MapContext {
    let mut ctx = MapContext {
        down_stair: down,
        up_stair: up,
        marks: Layer::filled(RoomMark::Border),
        blocks: Layer::filled(Block::Wall(WallKind::Normal)),
        ..MapContext::default()
    };
    for (y, row) in rows.iter().enumerate() {
        for (x, symbol) in row.chars().enumerate() {
            let pos = Pos::new(x as i32, y as i32);
            let (mark, block) = match symbol {
                '.' => (RoomMark::Inner, Block::Empty),
                '+' => (RoomMark::Entry, Block::Empty),
                _ => (RoomMark::Border, Block::Wall(WallKind::Normal)),
            };
            ctx.marks[pos] = mark;
            ctx.blocks[pos] = block;
        }
    }
    ctx.blocks[down] = Block::Stair(StairDir::Down);
    ctx.blocks[up] = Block::Stair(StairDir::Up);
    ctx
}
