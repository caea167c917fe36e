//! Content layout: stages the tower's rooms, orients their entries, then
//! drafts and prices every room's tolls and rewards in stage order.

mod dag;
mod draft;
mod orient;
mod refine;
mod stage;
mod world;

pub use dag::ExpenseDag;
pub use draft::{ALL_INCOME, ExpenseKind, GlobalCell, IncomeKind, IncomeSlot, RoomDraft};
pub use refine::RoomPlan;
pub use world::RoomRef;

use tracing::{debug, info, trace};

use crate::config::GenConfig;
use crate::economy::{CombatEvaluator, Enemy, Hero, ValueOracle};
use crate::error::GenerationError;
use crate::mapgen::{GenRng, MapContext, Pass, Room};
use crate::types::Block;

use draft::draft_room;
use orient::orient_entries;
use refine::{Pricing, is_acceptable};
use stage::assign_stages;
use world::World;

/// Finished floors together with their staged, oriented rooms.
pub(crate) type PlotOutput = (Vec<MapContext>, Vec<Vec<Room>>);

pub(crate) fn layout_plot<C: CombatEvaluator, O: ValueOracle>(
    config: &GenConfig,
    run_seed: u64,
    floors: &[MapContext],
    enemies: &[Enemy],
    combat: &C,
    oracle: &O,
) -> Result<PlotOutput, GenerationError> {
    let mut rng = GenRng::for_pass(run_seed, Pass::Plot, 0);
    let mut world = World::build(floors.to_vec())?;
    let targets = config.stage_targets(world.room_count());
    let stages = assign_stages(&mut world, &targets, &mut rng);
    orient_entries(&mut world);

    let pricing = Pricing {
        base: config.values.base,
        enemies,
        potion_count: config.potions.len(),
        gem_count: config.gems.len(),
        combat,
        oracle,
    };
    let inflation = config.values.inflation;
    let mut hero = config.hero;
    // Fractions of the tower laid out at which the hero grows, smallest last.
    let mut checkpoints: Vec<f64> =
        (1..=inflation.step).rev().map(|step| f64::from(step) / f64::from(inflation.step)).collect();
    let total = world.room_count().max(1) as f64;
    let mut laid_out = 0_usize;

    for (offset, members) in stages.iter().enumerate() {
        for &at in members {
            let plan = plan_room(&world, at, &pricing, &hero, config.max_attempts, &mut rng)?;
            apply_plan(&mut world, at, &plan, oracle, &hero);

            if checkpoints.last().is_some_and(|&point| laid_out as f64 / total > point) {
                checkpoints.pop();
                hero.inflate(&inflation);
                trace!(target: "towergen::plot", laid_out, atk = hero.atk, def = hero.def, mdef = hero.mdef, "plot.hero.inflated");
            }
            laid_out += 1;
        }
        info!(target: "towergen::plot", stage = offset + 1, rooms = members.len(), laid_out, "plot.stage.laid_out");
    }

    Ok((world.floors, world.rooms))
}

fn plan_room<C: CombatEvaluator, O: ValueOracle>(
    world: &World,
    at: RoomRef,
    pricing: &Pricing<'_, C, O>,
    hero: &Hero,
    max_attempts: u32,
    rng: &mut GenRng,
) -> Result<RoomPlan, GenerationError> {
    for attempt in 1..=max_attempts {
        let draft = draft_room(world, at, rng);
        let plan = pricing.refine(&draft, at, hero, rng)?;
        if is_acceptable(&plan) {
            return Ok(plan);
        }
        debug!(target: "towergen::plot", floor = at.floor, room = at.room, attempt, "plot.plan.rejected");
    }
    Err(GenerationError::PlotValidationExhausted { floor: at.floor, room: at.room, attempts: max_attempts })
}

/// Writes the plan's events onto the floors. Stairs are never overwritten.
fn apply_plan<O: ValueOracle>(world: &mut World, at: RoomRef, plan: &RoomPlan, oracle: &O, hero: &Hero) {
    let placements = plan
        .income
        .iter()
        .copied()
        .chain(plan.expense.nodes().iter().map(|&(pos, event)| (GlobalCell { floor: at.floor, pos }, event)));
    for (cell, event) in placements {
        let Some(ctx) = world.floors.get_mut(cell.floor) else {
            continue;
        };
        if ctx.is_stair(cell.pos) {
            continue;
        }
        ctx.blocks[cell.pos] = Block::Event(event);
        ctx.annotate(cell.pos, format!("{:.0}", oracle.value_of(event, hero)));
    }

    let Some(&anchor) = world.room(at).inner.first() else {
        return;
    };
    let summary = format!("{}-{}", plan.income.len(), plan.expense.nodes().len());
    world.floors[at.floor].annotate(anchor, summary);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::{CatalogValuer, StandardCombat};
    use crate::mapgen::TowerGenerator;
    use crate::types::{Event, RoomMark};

    fn plotted(seed: u64, floor_count: usize) -> (GenConfig, Vec<MapContext>, PlotOutput) {
        let config = GenConfig { floor_count, ..GenConfig::default() };
        let generator = TowerGenerator::new(config.clone(), seed);
        let floors = generator.layout_rooms().expect("rooms should generate");
        let enemies = generator.calibrate_enemies(&StandardCombat);
        let valuer = CatalogValuer {
            values: &config.values,
            potions: &config.potions,
            gems: &config.gems,
            enemies: &enemies,
            combat: &StandardCombat,
        };
        let output = layout_plot(&config, seed, &floors, &enemies, &StandardCombat, &valuer)
            .expect("plot should lay out");
        (config, floors, output)
    }

    #[test]
    fn plot_only_writes_events_on_open_cells() {
        let (_, before, (after, rooms)) = plotted(13, 3);
        assert_eq!(rooms.len(), 3);
        for (floor, (old, new)) in before.iter().zip(&after).enumerate() {
            assert_eq!(old.up_stair, new.up_stair);
            assert_eq!(old.down_stair, new.down_stair);
            assert_eq!(old.marks, new.marks, "plot never changes room marks");
            for (pos, block) in new.blocks.iter() {
                match (old.blocks[pos], *block) {
                    (same, now) if same == now => {}
                    (Block::Empty, Block::Event(_)) => {}
                    (was, now) => panic!("floor {floor} cell {pos:?} went from {was:?} to {now:?}"),
                }
            }
        }
    }

    #[test]
    fn expense_sits_on_entries_or_inside_rooms() {
        let (_, _, (floors, _)) = plotted(29, 3);
        let mut placed = 0;
        for floor in &floors {
            for (pos, block) in floor.blocks.iter() {
                if let Block::Event(event) = block {
                    placed += 1;
                    assert!(matches!(floor.marks[pos], RoomMark::Inner | RoomMark::Entry));
                    if floor.marks[pos] == RoomMark::Entry {
                        assert!(event.is_expense(), "entries only ever hold tolls");
                    }
                }
            }
        }
        assert!(placed > 0, "a three-floor tower holds some content");
    }

    #[test]
    fn every_reachable_room_is_staged() {
        let (config, _, (_, rooms)) = plotted(5, 2);
        for room in rooms.iter().flatten() {
            assert!((1..=config.stages.len()).contains(&room.stage.index));
        }
        let owned = rooms.iter().flatten().flat_map(|room| &room.entries).filter(|entry| entry.owned).count();
        let all = rooms.iter().flatten().flat_map(|room| &room.entries).count();
        assert_eq!(owned * 2, all, "each physical entry is listed twice and owned once");
    }

    #[test]
    fn enemy_events_index_into_the_catalog() {
        let generator = TowerGenerator::new(GenConfig { floor_count: 2, ..GenConfig::default() }, 77);
        let enemies = generator.calibrate_enemies(&StandardCombat);
        let tower = generator.generate().expect("tower should generate");
        assert_eq!(tower.enemies, enemies);
        for floor in &tower.floors {
            for (_, block) in floor.blocks.iter() {
                if let Block::Event(Event::Enemy { index }) = block {
                    assert!(*index < tower.enemies.len());
                }
            }
        }
    }
}
