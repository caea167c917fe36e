//! Plain-text rendering of finished floors.

use std::fmt::Write;

use towergen::{Block, Event, KeyType, MAP_SIZE, MapContext, Pos, StairDir, Tower, WallKind};

fn key_glyph(key: KeyType) -> char {
    match key {
        KeyType::Yellow => 'y',
        KeyType::Blue => 'b',
        KeyType::Red => 'r',
        KeyType::Green => 'g',
    }
}

/// Doors are the upper-case letter of their key.
pub fn glyph(block: Block) -> char {
    match block {
        Block::Empty => '.',
        Block::Wall(WallKind::Normal) => '#',
        Block::Wall(WallKind::Unbreakable) => 'X',
        Block::Stair(StairDir::Up) => '<',
        Block::Stair(StairDir::Down) => '>',
        Block::Event(Event::Door { key }) => key_glyph(key).to_ascii_uppercase(),
        Block::Event(Event::Key { key }) => key_glyph(key),
        Block::Event(Event::Enemy { .. }) => 'e',
        Block::Event(Event::Potion { .. }) => '!',
        Block::Event(Event::Gem { .. }) => '*',
    }
}

pub fn render_floor(ctx: &MapContext) -> String {
    let side = MAP_SIZE as i32;
    let mut out = String::with_capacity((MAP_SIZE + 1) * MAP_SIZE);
    for y in 0..side {
        out.extend((0..side).map(|x| glyph(ctx.blocks[Pos::new(x, y)])));
        out.push('\n');
    }
    out
}

/// Every floor from the bottom up, each headed by its stats line.
pub fn render_tower(tower: &Tower) -> String {
    let mut out = String::new();
    for (floor, (ctx, stats)) in tower.floors.iter().zip(tower.floor_stats()).enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "floor {floor} ({stats})");
        out.push_str(&render_floor(ctx));
        out.push('\n');
    }
    out
}

pub fn render_stats(tower: &Tower) -> String {
    let mut out = String::new();
    for (floor, stats) in tower.floor_stats().iter().enumerate() {
        let _ = writeln!(out, "floor {floor}: {stats}");
    }
    out
}
