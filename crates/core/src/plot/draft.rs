//! Per-room drafts: which cells carry a toll and which carry a reward, before
//! any concrete event is chosen.

use serde::Serialize;

use crate::algo::{clamp_to, partial_order_layers};
use crate::mapgen::{GenRng, MapContext, Room, RoomCutKind, RoomEntry};
use crate::types::{Block, Direction, Pos};

use super::dag::ExpenseDag;
use super::world::{RoomRef, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ExpenseKind {
    Door,
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum IncomeKind {
    Gem,
    Key,
    Potion,
}

pub const ALL_INCOME: &[IncomeKind] = &[IncomeKind::Gem, IncomeKind::Key, IncomeKind::Potion];

/// A cell addressed across the whole tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GlobalCell {
    pub floor: usize,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IncomeSlot {
    pub cell: GlobalCell,
    pub kinds: &'static [IncomeKind],
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoomDraft {
    /// Expense slots, all on the drafted room's floor.
    pub expense: ExpenseDag<ExpenseKind>,
    pub income: Vec<IncomeSlot>,
    /// Weight of the expense side when a plan is balanced.
    pub ratio: f64,
}

impl RoomDraft {
    fn empty() -> Self {
        Self { expense: ExpenseDag::new(), income: Vec::new(), ratio: 1.0 }
    }
}

fn expense_kind(rng: &mut GenRng, door_chance: f64) -> ExpenseKind {
    if rng.chance(door_chance) { ExpenseKind::Door } else { ExpenseKind::Enemy }
}

/// Walled on both sides along one axis. Cells off the map count as walls.
fn is_regular(ctx: &MapContext, pos: Pos) -> bool {
    let walled = |dir| ctx.blocks.get(pos.step(dir)).is_none_or(|block| block.is_wall());
    (walled(Direction::Up) && walled(Direction::Down))
        || (walled(Direction::Left) && walled(Direction::Right))
}

/// Entries worth guarding. A cut room only guards the entries that lead back
/// toward a down stair.
fn real_entries<'a>(floor_rooms: &[Room], room: &'a Room) -> Vec<&'a RoomEntry> {
    room.entries
        .iter()
        .filter(|entry| {
            if room.cut.kind != RoomCutKind::Cut {
                return true;
            }
            room.cut.blocks.iter().find(|block| block.entries.contains(&entry.id)).is_some_and(|block| {
                block.rooms.iter().any(|&id| floor_rooms.get(id).is_some_and(|other| other.stair.has_down()))
            })
        })
        .collect()
}

/// Dead-end pockets: inner cells with a single inner neighbour, not a stair
/// and not right behind one of `entries`.
fn degree_one_cells(ctx: &MapContext, room: &Room, entries: &[&RoomEntry]) -> Vec<Pos> {
    room.inner
        .iter()
        .copied()
        .filter(|&pos| {
            !ctx.is_stair(pos)
                && !entries.iter().any(|entry| entry.after.contains(&pos))
                && pos.dir4().filter(|next| room.inner.contains(next)).count() == 1
        })
        .collect()
}

/// Walking distance from `origin` to every inner cell of `room`, nearest
/// first, ties broken by straight-line distance.
fn distances_from(world: &World, room: &Room, origin: Pos) -> Vec<(Pos, u32, f64)> {
    let mut distances: Vec<(Pos, u32, f64)> = world
        .cells
        .dijkstra(origin, |weight| *weight, |pos| pos != origin && !room.inner.contains(&pos))
        .into_iter()
        .filter(|(pos, _)| *pos != origin)
        .map(|(pos, steps)| (pos, steps, pos.distance(origin)))
        .collect();
    distances.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.total_cmp(&b.2)));
    distances
}

struct Drafter<'a> {
    world: &'a World,
    at: RoomRef,
    room: &'a Room,
    ctx: &'a MapContext,
    entries: Vec<&'a RoomEntry>,
    degree_one: Vec<Pos>,
}

pub(crate) fn draft_room(world: &World, at: RoomRef, rng: &mut GenRng) -> RoomDraft {
    let room = world.room(at);
    // Down-stair rooms are drafted together with the up-stair room below.
    if room.stair.has_down() {
        return RoomDraft::empty();
    }
    let ctx = &world.floors[at.floor];
    let entries = real_entries(&world.rooms[at.floor], room);
    let degree_one = degree_one_cells(ctx, room, &entries);
    let drafter = Drafter { world, at, room, ctx, entries, degree_one };

    if room.stair.has_up() {
        return drafter.up_stair_room(rng);
    }
    let dead_end = match room.cut.kind {
        RoomCutKind::Leaf => true,
        RoomCutKind::Cut => drafter.entries.len() == 1 && room.inner.len() > 3,
        RoomCutKind::Normal | RoomCutKind::Isolate => false,
    };
    match drafter.entries.first() {
        Some(&entry) if dead_end => drafter.dead_end_room(entry, rng),
        _ => drafter.branching_room(rng),
    }
}

impl Drafter<'_> {
    fn here(&self, pos: Pos) -> GlobalCell {
        GlobalCell { floor: self.at.floor, pos }
    }

    /// Whether `cell` may carry income next to `expense`: off every stair and
    /// every expense slot.
    fn is_free(&self, expense: &ExpenseDag<ExpenseKind>, cell: GlobalCell) -> bool {
        let on_expense = cell.floor == self.at.floor && expense.contains(cell.pos);
        let on_stair = self.world.floors.get(cell.floor).is_none_or(|ctx| ctx.is_stair(cell.pos));
        !on_expense && !on_stair
    }

    /// Drops income that collides with an expense slot or a stair.
    fn finish(&self, expense: ExpenseDag<ExpenseKind>, income: Vec<GlobalCell>, ratio: f64) -> RoomDraft {
        let income = income
            .into_iter()
            .filter(|&cell| self.is_free(&expense, cell))
            .map(|cell| IncomeSlot { cell, kinds: ALL_INCOME })
            .collect();
        RoomDraft { expense, income, ratio }
    }

    /// The vault behind the up stair: tolls on every entry, rewards spread
    /// over this room and every down-stair room stacked above it.
    fn up_stair_room(&self, rng: &mut GenRng) -> RoomDraft {
        let afters: Vec<Pos> = self.entries.iter().filter_map(|entry| entry.after.first().copied()).collect();
        // A second toll may not eat the last cell left for rewards.
        let spare = self.world.down_stair_room(self.at.floor + 1).is_some()
            || self.room.inner.iter().any(|pos| *pos != self.ctx.up_stair && !afters.contains(pos));
        let double = spare
            && self
                .entries
                .iter()
                .all(|entry| entry.after.first().is_some_and(|&after| self.ctx.blocks[after] == Block::Empty));

        let mut expense = ExpenseDag::new();
        for entry in &self.entries {
            match (double, entry.after.first()) {
                (true, Some(&after)) => {
                    expense.add_node(entry.pos, expense_kind(rng, 1.0));
                    expense.add_node(after, expense_kind(rng, 0.0));
                    expense.add_edge(entry.pos, after);
                }
                _ => expense.add_node(entry.pos, expense_kind(rng, 0.5)),
            }
        }

        let mut pool: Vec<(GlobalCell, u32, f64)> = self
            .room
            .inner
            .iter()
            .filter(|&&pos| pos != self.ctx.up_stair && !expense.contains(pos))
            .map(|&pos| (self.here(pos), 1, 0.0))
            .collect();
        let mut candidates: Vec<GlobalCell> = self.degree_one.iter().map(|&pos| self.here(pos)).collect();

        let mut floor = self.at.floor + 1;
        while let Some(attached) = self.world.down_stair_room(floor) {
            let room = self.world.room(attached);
            let ctx = &self.world.floors[floor];
            candidates.extend(degree_one_cells(ctx, room, &[]).into_iter().map(|pos| GlobalCell { floor, pos }));
            pool.extend(
                distances_from(self.world, room, ctx.down_stair)
                    .into_iter()
                    .filter(|(pos, ..)| !ctx.is_stair(*pos))
                    .map(|(pos, steps, straight)| (GlobalCell { floor, pos }, steps, straight)),
            );
            if !room.stair.has_up() {
                break;
            }
            floor += 1;
        }
        pool.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.total_cmp(&b.2)));

        let total = pool.len() as i64;
        let (low, high) = if double { (3, 5) } else { (2, 3) };
        let (min, max) = (low.min(total), high.min(total));
        let spread = (min + max) as f64;
        let count = clamp_to(rng.normal(spread / 2.0, spread / 6.0), min, max) as usize;

        for (cell, ..) in pool {
            if !candidates.contains(&cell) {
                candidates.push(cell);
            }
        }
        candidates.retain(|&cell| self.is_free(&expense, cell));
        candidates.truncate(count);

        let ratio = rng.normal_f64(1.4, 0.1);
        self.finish(expense, candidates, ratio)
    }

    /// A room with a single way in: one toll at the entry, possibly a second
    /// right behind it, rewards at the far end.
    fn dead_end_room(&self, entry: &RoomEntry, rng: &mut GenRng) -> RoomDraft {
        let area = self.room.inner.len() as i64;
        let mut distances = distances_from(self.world, self.room, entry.pos);
        let at_least = (self.degree_one.len() as i64).max((area + 5) / 6);
        let count = clamp_to(rng.normal(area as f64 / 2.0, area as f64 / 6.0), at_least, area);

        let mut income: Vec<Pos> = self.degree_one.clone();
        while (income.len() as i64) < count {
            let Some((pos, ..)) = distances.pop() else {
                break;
            };
            if !income.contains(&pos) {
                income.push(pos);
            }
        }

        let left = area - count;
        let double = if left == 0 {
            false
        } else if left > count {
            true
        } else if entry.after.len() > 1 {
            false
        } else {
            match count {
                1 => rng.chance(0.2),
                2 => rng.chance(0.5),
                3 => rng.chance(0.8),
                _ => true,
            }
        };

        let mut expense = ExpenseDag::new();
        match (double, entry.after.first()) {
            (true, Some(&after)) => {
                expense.add_node(entry.pos, expense_kind(rng, 0.8));
                let kind = if is_regular(self.ctx, after) { expense_kind(rng, 0.3) } else { ExpenseKind::Enemy };
                expense.add_node(after, kind);
                expense.add_edge(entry.pos, after);
            }
            _ => {
                let kind = if is_regular(self.ctx, entry.pos) { expense_kind(rng, 0.8) } else { ExpenseKind::Enemy };
                expense.add_node(entry.pos, kind);
            }
        }

        let ratio = rng.normal_f64(1.2, 0.1);
        self.finish(expense, income.into_iter().map(|pos| self.here(pos)).collect(), ratio)
    }

    /// A room with several ways in: a toll on every owned entry, rewards on
    /// the cells farthest from all entries at once.
    fn branching_room(&self, rng: &mut GenRng) -> RoomDraft {
        let area = self.room.inner.len();
        let strong: Vec<&RoomEntry> = self.entries.iter().copied().filter(|entry| entry.owned).collect();

        let mut guarded: Vec<Pos> = strong.iter().flat_map(|entry| entry.after.iter().copied()).collect();
        guarded.sort();
        guarded.dedup();
        let double = if area.saturating_sub(guarded.len()) < 2 {
            false
        } else if area >= 6 {
            true
        } else if area >= 4 {
            rng.chance(0.5)
        } else {
            false
        };

        let mut expense = ExpenseDag::new();
        for entry in &strong {
            match (double, entry.after.first()) {
                (true, Some(&after)) => {
                    expense.add_node(entry.pos, expense_kind(rng, 0.8));
                    expense.add_node(after, expense_kind(rng, 0.0));
                    expense.add_edge(entry.pos, after);
                }
                _ => expense.add_node(entry.pos, expense_kind(rng, 0.4)),
            }
        }
        let left = (area + strong.len()).saturating_sub(expense.nodes().len()) as i64;

        let per_entry: Vec<Vec<(Pos, u32, f64)>> =
            self.entries.iter().map(|entry| distances_from(self.world, self.room, entry.pos)).collect();
        let tuples: Vec<(Pos, Vec<u32>)> = self
            .room
            .inner
            .iter()
            .map(|&pos| {
                let steps = per_entry
                    .iter()
                    .filter_map(|distances| distances.iter().find(|(cell, ..)| *cell == pos).map(|(_, steps, _)| *steps))
                    .collect();
                (pos, steps)
            })
            .collect();
        let ordered: Vec<Pos> = partial_order_layers(&tuples, |(_, a), (_, b)| {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x >= y) && a.iter().zip(b).any(|(x, y)| x > y)
        })
        .into_iter()
        .flatten()
        .map(|(pos, _)| pos)
        .collect();

        let at_least = (self.degree_one.len() as i64).max(1);
        let count = clamp_to(rng.normal(left as f64 / 1.8, left as f64 / 6.0), at_least, left);
        let mut income: Vec<Pos> = self.degree_one.clone();
        for pos in ordered {
            if income.len() as i64 >= count {
                break;
            }
            if self.degree_one.contains(&pos) || expense.contains(pos) {
                continue;
            }
            income.push(pos);
        }

        let ratio = rng.normal_f64(1.2, 0.1);
        self.finish(expense, income.into_iter().map(|pos| self.here(pos)).collect(), ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenConfig;
    use crate::mapgen::TowerGenerator;
    use crate::mapgen::test_support::floor_from_rows;
    use crate::plot::orient::orient_entries;
    use crate::plot::stage::assign_stages;

    fn staged_world(seed: u64, floor_count: usize) -> World {
        let config = GenConfig { floor_count, ..GenConfig::default() };
        let floors = TowerGenerator::new(config.clone(), seed).layout_rooms().expect("rooms should generate");
        let mut world = World::build(floors).expect("world should build");
        let targets = config.stage_targets(world.room_count());
        assign_stages(&mut world, &targets, &mut GenRng::new(seed));
        orient_entries(&mut world);
        world
    }

    #[test]
    fn regular_cells_are_walled_along_one_axis() {
        let ctx = floor_from_rows(
            &["#############", "#.....+.....#", "#.....#.....#", "#############"],
            Pos::new(1, 1),
            Pos::new(11, 1),
        );
        assert!(is_regular(&ctx, Pos::new(6, 1)), "entry between wall above and below");
        assert!(!is_regular(&ctx, Pos::new(3, 2)), "open room cell");
        assert!(is_regular(&ctx, Pos::new(0, 6)), "cells off the map count as walls");
    }

    #[test]
    fn leaf_room_gets_a_toll_at_its_entry_and_rewards_inside() {
        let ctx = floor_from_rows(
            &["#############", "#.....#.....#", "#.....+.....#", "#.....#.....#", "#############"],
            Pos::new(1, 1),
            Pos::new(1, 3),
        );
        let world = World::build(vec![ctx]).expect("world should build");
        let leaf = RoomRef::new(0, 1);
        assert_eq!(world.room(leaf).cut.kind, RoomCutKind::Leaf);

        for seed in 0..20 {
            let draft = draft_room(&world, leaf, &mut GenRng::new(seed));
            let expense: Vec<Pos> = draft.expense.positions().collect();
            assert_eq!(expense[0], Pos::new(6, 2), "the entry itself is the first toll");
            assert!(expense.iter().all(|pos| [Pos::new(6, 2), Pos::new(7, 2)].contains(pos)));
            assert!(draft.income.len() >= 3, "at least a sixth of the room rounded up");
            for slot in &draft.income {
                assert!(world.room(leaf).inner.contains(&slot.cell.pos));
                assert!(!draft.expense.contains(slot.cell.pos));
            }
            assert!(draft.ratio > 0.0);
        }
    }

    #[test]
    fn up_stair_vault_fills_its_reward_count_past_the_stair_above() {
        let below = floor_from_rows(
            &["#############", "#.....+.#####", "#.....#.#####", "#############"],
            Pos::new(1, 1),
            Pos::new(7, 1),
        );
        // The up stair above is the cell nearest to where the hero arrives.
        let above = floor_from_rows(
            &["#############", "#######.....#", "########....#", "#############"],
            Pos::new(7, 1),
            Pos::new(8, 1),
        );
        let world = World::build(vec![below, above]).expect("world should build");
        let vault = RoomRef::new(0, 1);
        assert!(world.room(vault).stair.has_up());

        for seed in 0..30 {
            let draft = draft_room(&world, vault, &mut GenRng::new(seed));
            assert!(draft.income.len() >= 2, "seed {seed} kept {} rewards", draft.income.len());
            assert!(draft.income.iter().all(|slot| !world.floors[slot.cell.floor].is_stair(slot.cell.pos)));
        }
    }

    #[test]
    fn stair_rooms_holding_the_down_stair_draft_nothing() {
        let ctx = floor_from_rows(
            &["#############", "#.....#.....#", "#.....+.....#", "#.....#.....#", "#############"],
            Pos::new(1, 1),
            Pos::new(1, 3),
        );
        let world = World::build(vec![ctx]).expect("world should build");
        let draft = draft_room(&world, RoomRef::new(0, 0), &mut GenRng::new(1));
        assert!(draft.expense.is_empty());
        assert!(draft.income.is_empty());
        assert_eq!(draft.ratio, 1.0);
    }

    #[test]
    fn drafts_never_touch_stairs_and_keep_expense_near_the_room() {
        for seed in [3_u64, 11, 42] {
            let world = staged_world(seed, 3);
            for at in world.room_refs() {
                let draft = draft_room(&world, at, &mut GenRng::new(seed ^ at.room as u64));
                let room = world.room(at);
                for pos in draft.expense.positions() {
                    let own_entry = room.entries.iter().any(|entry| entry.pos == pos);
                    assert!(own_entry || room.inner.contains(&pos), "seed {seed} room {at:?} expense at {pos:?}");
                    assert!(!world.floors[at.floor].is_stair(pos));
                }
                for slot in &draft.income {
                    assert!(!world.floors[slot.cell.floor].is_stair(slot.cell.pos));
                    assert!(slot.cell.floor >= at.floor);
                    assert_eq!(slot.kinds, ALL_INCOME);
                }
                let mut cells: Vec<GlobalCell> = draft.income.iter().map(|slot| slot.cell).collect();
                let total = cells.len();
                cells.sort();
                cells.dedup();
                assert_eq!(cells.len(), total, "income cells are distinct");
            }
        }
    }
}
