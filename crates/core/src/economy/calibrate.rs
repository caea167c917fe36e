//! Scales enemy presets so each one hurts a checkpoint hero by a target amount.

use tracing::debug;

use crate::mapgen::GenRng;

use super::{CombatEvaluator, Enemy, EnemyPreset, Hero, Values};

const GROWTH_EPSILON: f64 = 1e-3;
const CHECKPOINTS_PER_STAGE: usize = 4;
const STAGE_STEP_SPAN: i64 = 9;
const FINAL_CHECKPOINT: i64 = 25;

/// Inflation steps the calibrated enemies are tuned against, in template order.
pub fn checkpoint_steps(stage_count: usize) -> Vec<i64> {
    let mut steps = Vec::with_capacity(stage_count * CHECKPOINTS_PER_STAGE + 1);
    for stage in 0..stage_count as i64 {
        for pick in 0..CHECKPOINTS_PER_STAGE {
            steps.push((pick as f64 * 1.7) as i64 + stage * STAGE_STEP_SPAN);
        }
    }
    steps.push(FINAL_CHECKPOINT);
    steps
}

fn jitter(rng: &mut GenRng, value: i64) -> i64 {
    let value = value as f64;
    rng.normal(value, value / 5.0).max(0)
}

fn scaled(template: &EnemyPreset, growth: f64) -> Enemy {
    let scale = |value: i64| (value as f64 * growth).floor() as i64;
    Enemy {
        name: template.name.clone(),
        specials: template.specials.clone(),
        hp: scale(template.hp),
        atk: scale(template.atk),
        def: scale(template.def),
    }
}

/// Binary-searches the smallest growth multiplier at which `template` deals
/// at least `target` damage to `hero`.
fn fit_growth(
    template: &EnemyPreset,
    hero: &Hero,
    target: f64,
    combat: &impl CombatEvaluator,
) -> Enemy {
    let mut low = GROWTH_EPSILON;
    let mut high = GROWTH_EPSILON * 1e10;
    while high - low > GROWTH_EPSILON * 2.0 {
        let mid = (low + high) / 2.0;
        match combat.evaluate(hero, &scaled(template, mid)) {
            Some(damage) if (damage as f64) < target => low = mid + GROWTH_EPSILON,
            _ => high = mid,
        }
    }
    scaled(template, low)
}

pub fn calibrate_enemies(
    presets: &[EnemyPreset],
    initial_hero: &Hero,
    values: &Values,
    stage_count: usize,
    rng: &mut GenRng,
    combat: &impl CombatEvaluator,
) -> Vec<Enemy> {
    let steps = checkpoint_steps(stage_count);
    presets
        .iter()
        .enumerate()
        .map(|(index, preset)| {
            let template = EnemyPreset {
                name: preset.name.clone(),
                specials: preset.specials.clone(),
                hp: jitter(rng, preset.hp),
                atk: jitter(rng, preset.atk),
                def: jitter(rng, preset.def),
            };
            let step = steps.get(index).or(steps.last()).copied().unwrap_or_default();
            let hero = initial_hero.inflated(&values.inflation, step);
            let target = values.base * hero.cpi();
            let enemy = fit_growth(&template, &hero, target, combat);
            debug!(
                target: "towergen::economy",
                name = %enemy.name,
                step,
                target_damage = target,
                hp = enemy.hp,
                atk = enemy.atk,
                def = enemy.def,
                "economy.calibrate.enemy"
            );
            enemy
        })
        .collect()
}
