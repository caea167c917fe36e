//! Turns a draft into concrete events, scores candidate plans against the
//! value oracle, and rejects plans that only trade keys at a loss.

use crate::economy::{CombatEvaluator, Enemy, Hero, ValueOracle};
use crate::error::GenerationError;
use crate::mapgen::GenRng;
use crate::types::{Event, KeyType};

use super::dag::ExpenseDag;
use super::draft::{ExpenseKind, GlobalCell, IncomeKind, RoomDraft};
use super::world::RoomRef;

const PLAN_CANDIDATES: usize = 9;
const PLAN_SHORTLIST: usize = 6;
/// Enemies dealing this many multiples of the base value are never placed.
const ENEMY_DAMAGE_CAP: f64 = 10.0;

/// Door and key colours drawn 1:3 blue to yellow.
const KEY_DRAWS: [KeyType; 4] = [KeyType::Blue, KeyType::Yellow, KeyType::Yellow, KeyType::Yellow];

/// Concrete events for one room.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomPlan {
    pub expense: ExpenseDag<Event>,
    pub income: Vec<(GlobalCell, Event)>,
}

/// Everything event sampling and scoring needs besides the hero.
pub(crate) struct Pricing<'a, C, O> {
    pub base: f64,
    pub enemies: &'a [Enemy],
    pub potion_count: usize,
    pub gem_count: usize,
    pub combat: &'a C,
    pub oracle: &'a O,
}

impl<C: CombatEvaluator, O: ValueOracle> Pricing<'_, C, O> {
    /// Enemies the hero beats while still taking some damage, but not too much.
    fn enemy_pool(&self, hero: &Hero) -> Vec<usize> {
        let cap = self.base * ENEMY_DAMAGE_CAP;
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| {
                self.combat.evaluate(hero, enemy).is_some_and(|damage| damage > 0 && (damage as f64) < cap)
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn income_pool(&self, kinds: &[IncomeKind]) -> Vec<Event> {
        let mut pool = Vec::new();
        if kinds.contains(&IncomeKind::Key) {
            pool.extend(KEY_DRAWS.iter().map(|&key| Event::Key { key }));
        }
        if kinds.contains(&IncomeKind::Potion) {
            pool.extend((0..self.potion_count).map(|index| Event::Potion { index }));
        }
        if kinds.contains(&IncomeKind::Gem) {
            pool.extend((0..self.gem_count).map(|index| Event::Gem { index }));
        }
        pool
    }

    fn value(&self, event: Event, hero: &Hero) -> f64 {
        self.oracle.value_of(event, hero)
    }

    /// Lower is better: a single path wants its weighted cost to match the
    /// income, several paths want every branch to cost about the same.
    fn score(&self, plan: &RoomPlan, ratio: f64, hero: &Hero) -> f64 {
        let income: f64 = plan.income.iter().map(|(_, event)| self.value(*event, hero)).sum();
        let paths: Vec<f64> = plan
            .expense
            .paths()
            .iter()
            .map(|path| path.iter().map(|(_, event)| self.value(**event, hero)).sum())
            .collect();

        if let [single] = paths[..] {
            let sum = single * ratio + income;
            if sum == 0.0 {
                return 0.0;
            }
            return (single * ratio - income).abs() / sum;
        }
        let samples: Vec<f64> = paths.iter().map(|value| value * ratio).chain([income]).collect();
        population_variance(&samples)
    }

    /// Samples candidate plans for `draft` and draws one of the best scored.
    pub fn refine(
        &self,
        draft: &RoomDraft,
        at: RoomRef,
        hero: &Hero,
        rng: &mut GenRng,
    ) -> Result<RoomPlan, GenerationError> {
        let enemies = self.enemy_pool(hero);
        let mut scored = Vec::with_capacity(PLAN_CANDIDATES);
        for _ in 0..PLAN_CANDIDATES {
            let expense = draft.expense.try_map(|_, kind| match kind {
                ExpenseKind::Door => {
                    let key = rng.pick(&KEY_DRAWS).copied().unwrap_or(KeyType::Yellow);
                    Ok(Event::Door { key })
                }
                ExpenseKind::Enemy => rng
                    .pick(&enemies)
                    .map(|&index| Event::Enemy { index })
                    .ok_or(GenerationError::NoFeasibleEnemies { floor: at.floor, room: at.room }),
            })?;
            let income = draft
                .income
                .iter()
                .filter_map(|slot| {
                    let pool = self.income_pool(slot.kinds);
                    rng.pick(&pool).map(|&event| (slot.cell, event))
                })
                .collect();
            let plan = RoomPlan { expense, income };
            let score = self.score(&plan, draft.ratio, hero);
            scored.push((score, plan));
        }

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(PLAN_SHORTLIST);
        let index = rng.below(scored.len());
        Ok(scored.swap_remove(index).1)
    }
}

fn population_variance(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let count = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / count;
    samples.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count
}

/// Rejects single-path plans paid for with keys alone, or with nothing at
/// all, when the keys never leave the hero ahead, or only by swapping a
/// better key for a worse one. Plans without any toll always pass.
pub(crate) fn is_acceptable(plan: &RoomPlan) -> bool {
    let paths = plan.expense.paths();
    let [path] = &paths[..] else {
        return true;
    };

    let mut delta = [0_i64; KeyType::ALL.len()];
    for (_, event) in path {
        if let Event::Door { key } = event {
            delta[key.tier()] -= 1;
        }
    }
    for (_, event) in &plan.income {
        match event {
            Event::Key { key } => delta[key.tier()] += 1,
            _ => return true,
        }
    }

    if delta.iter().all(|&change| change <= 0) {
        return false;
    }
    let highest = delta.iter().rposition(|&change| change != 0);
    let downgrade = delta.iter().sum::<i64>() == 0 && highest.is_some_and(|tier| delta[tier] < 0);
    !downgrade
}
