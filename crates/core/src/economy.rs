//! Hero stats, the enemy/item catalogs, and the combat and value models the
//! plot designer balances against.

mod calibrate;

pub use calibrate::{calibrate_enemies, checkpoint_steps};

use serde::{Deserialize, Serialize};

use crate::types::{Event, KeyType};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub atk: i64,
    pub def: i64,
    pub mdef: i64,
}

impl Hero {
    /// Cost-per-increment normalisation used to price hp-denominated events.
    pub fn cpi(&self) -> f64 {
        ((self.atk + self.def) as f64).sqrt()
    }

    pub fn inflated(&self, inflation: &Inflation, steps: i64) -> Hero {
        Hero {
            atk: self.atk + steps * inflation.atk,
            def: self.def + steps * inflation.def,
            mdef: self.mdef + steps * inflation.mdef,
        }
    }

    pub fn inflate(&mut self, inflation: &Inflation) {
        *self = self.inflated(inflation, 1);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemySpecial {
    AttackFirst,
    MagicAttack,
    Solid,
    DoubleHit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    #[serde(default)]
    pub specials: Vec<EnemySpecial>,
    pub hp: i64,
    pub atk: i64,
    pub def: i64,
}

impl Enemy {
    pub fn has_special(&self, special: EnemySpecial) -> bool {
        self.specials.contains(&special)
    }
}

/// Baseline enemy shape that calibration jitters and scales.
pub type EnemyPreset = Enemy;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Potion {
    pub name: String,
    pub hp: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gem {
    pub name: String,
    #[serde(default)]
    pub atk: i64,
    #[serde(default)]
    pub def: i64,
    #[serde(default)]
    pub mdef: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValues {
    pub yellow: f64,
    pub blue: f64,
    pub red: f64,
    pub green: f64,
}

impl Default for KeyValues {
    fn default() -> Self {
        Self { yellow: 30.0, blue: 75.0, red: -1.0, green: -1.0 }
    }
}

impl KeyValues {
    pub fn value(&self, key: KeyType) -> f64 {
        match key {
            KeyType::Yellow => self.yellow,
            KeyType::Blue => self.blue,
            KeyType::Red => self.red,
            KeyType::Green => self.green,
        }
    }
}

/// Worth of one point of each stat.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ability {
    pub atk: f64,
    pub def: f64,
    pub mdef: f64,
}

impl Default for Ability {
    fn default() -> Self {
        Self { atk: 50.0, def: 50.0, mdef: 20.0 }
    }
}

/// Stat growth of the reference hero, applied at `step` evenly spaced
/// checkpoints over the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inflation {
    pub atk: i64,
    pub def: i64,
    pub mdef: i64,
    pub step: u32,
}

impl Default for Inflation {
    fn default() -> Self {
        Self { atk: 1, def: 1, mdef: 3, step: 30 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Values {
    pub base: f64,
    pub keys: KeyValues,
    pub ability: Ability,
    pub inflation: Inflation,
}

impl Default for Values {
    fn default() -> Self {
        Self {
            base: 20.0,
            keys: KeyValues::default(),
            ability: Ability::default(),
            inflation: Inflation::default(),
        }
    }
}

pub trait CombatEvaluator {
    /// Damage the hero takes beating `enemy`, or `None` when the hero cannot
    /// pierce its defense.
    fn evaluate(&self, hero: &Hero, enemy: &Enemy) -> Option<i64>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StandardCombat;

impl CombatEvaluator for StandardCombat {
    fn evaluate(&self, hero: &Hero, enemy: &Enemy) -> Option<i64> {
        let enemy_def = if enemy.has_special(EnemySpecial::Solid) {
            enemy.def.max(hero.atk - 1)
        } else {
            enemy.def
        };

        let mut per_round = if enemy.has_special(EnemySpecial::MagicAttack) {
            enemy.atk
        } else {
            enemy.atk - hero.def
        };
        per_round = per_round.max(0);
        if enemy.has_special(EnemySpecial::DoubleHit) {
            per_round *= 2;
        }
        let initial = if enemy.has_special(EnemySpecial::AttackFirst) { per_round } else { 0 };

        let hero_per_round = (hero.atk - enemy_def).max(0);
        if hero_per_round <= 0 {
            return None;
        }
        let turns = (enemy.hp.max(0) + hero_per_round - 1) / hero_per_round;
        Some((initial + (turns - 1) * per_round - hero.mdef).max(0))
    }
}

pub trait ValueOracle {
    /// Worth of `event` to a hero with the given stats.
    fn value_of(&self, event: Event, hero: &Hero) -> f64;
}

/// Value placed on an enemy the hero cannot beat.
pub const INFEASIBLE_VALUE: f64 = 1e20;

/// Prices events from the configured catalogs and value tables.
pub struct CatalogValuer<'a, C> {
    pub values: &'a Values,
    pub potions: &'a [Potion],
    pub gems: &'a [Gem],
    pub enemies: &'a [Enemy],
    pub combat: &'a C,
}

impl<C: CombatEvaluator> ValueOracle for CatalogValuer<'_, C> {
    fn value_of(&self, event: Event, hero: &Hero) -> f64 {
        let cpi = hero.cpi();
        match event {
            Event::Door { key } | Event::Key { key } => self.values.keys.value(key),
            Event::Gem { index } => self.gems.get(index).map_or(0.0, |gem| {
                let ability = &self.values.ability;
                ability.atk * gem.atk as f64
                    + ability.def * gem.def as f64
                    + ability.mdef * gem.mdef as f64 / cpi
            }),
            Event::Potion { index } => {
                self.potions.get(index).map_or(0.0, |potion| potion.hp as f64 / cpi)
            }
            Event::Enemy { index } => self.enemies.get(index).map_or(INFEASIBLE_VALUE, |enemy| {
                match self.combat.evaluate(hero, enemy) {
                    Some(damage) => damage as f64 / cpi,
                    None => INFEASIBLE_VALUE,
                }
            }),
        }
    }
}

pub fn default_potions() -> Vec<Potion> {
    [("red potion", 100), ("blue potion", 300), ("yellow potion", 600)]
        .into_iter()
        .map(|(name, hp)| Potion { name: name.to_owned(), hp })
        .collect()
}

pub fn default_gems() -> Vec<Gem> {
    [("red gem", 1, 0, 0), ("blue gem", 0, 1, 0), ("green gem", 0, 0, 3)]
        .into_iter()
        .map(|(name, atk, def, mdef)| Gem { name: name.to_owned(), atk, def, mdef })
        .collect()
}

pub fn default_enemy_presets() -> Vec<EnemyPreset> {
    use EnemySpecial::{DoubleHit, MagicAttack, Solid};

    let preset = |name: &str, hp, atk, def, specials: &[EnemySpecial]| EnemyPreset {
        name: name.to_owned(),
        specials: specials.to_vec(),
        hp,
        atk,
        def,
    };
    vec![
        preset("slime", 50, 20, 4, &[]),
        preset("bat", 55, 32, 2, &[]),
        preset("big bat", 65, 55, 12, &[DoubleHit]),
        preset("priest", 65, 10, 5, &[MagicAttack]),
        preset("skeleton", 190, 100, 5, &[]),
        preset("undead", 190, 90, 33, &[]),
        preset("swordsman", 100, 680, 50, &[]),
        preset("rock golem", 30, 45, 70, &[Solid]),
        preset("guard", 30, 45, 20, &[Solid]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(hp: i64, atk: i64, def: i64, specials: &[EnemySpecial]) -> Enemy {
        Enemy { name: "test".to_owned(), specials: specials.to_vec(), hp, atk, def }
    }

    const HERO: Hero = Hero { atk: 10, def: 10, mdef: 0 };

    #[test]
    fn plain_enemy_deals_damage_for_every_round_but_the_last() {
        // hero hits for 6 per round, needs 9 rounds, takes 10 on each of 8 rounds
        assert_eq!(StandardCombat.evaluate(&HERO, &enemy(50, 20, 4, &[])), Some(80));
    }

    #[test]
    fn unpierceable_defense_is_infeasible() {
        assert_eq!(StandardCombat.evaluate(&HERO, &enemy(50, 20, 10, &[])), None);
    }

    #[test]
    fn specials_change_the_damage_model() {
        let magic = enemy(50, 5, 4, &[EnemySpecial::MagicAttack]);
        assert_eq!(StandardCombat.evaluate(&HERO, &magic), Some(40));

        let double = enemy(12, 15, 4, &[EnemySpecial::DoubleHit]);
        assert_eq!(StandardCombat.evaluate(&HERO, &double), Some(10));

        let first = enemy(6, 15, 4, &[EnemySpecial::AttackFirst]);
        assert_eq!(StandardCombat.evaluate(&HERO, &first), Some(5));

        let solid = enemy(3, 15, 0, &[EnemySpecial::Solid]);
        assert_eq!(StandardCombat.evaluate(&HERO, &solid), Some(10));
    }

    #[test]
    fn magic_defense_absorbs_damage_down_to_zero() {
        let hero = Hero { mdef: 100, ..HERO };
        assert_eq!(StandardCombat.evaluate(&hero, &enemy(50, 20, 4, &[])), Some(0));
    }

    #[test]
    fn catalog_valuer_prices_every_event_kind() {
        let values = Values::default();
        let potions = default_potions();
        let gems = default_gems();
        let enemies = vec![enemy(50, 20, 4, &[]), enemy(50, 20, 10, &[])];
        let valuer = CatalogValuer {
            values: &values,
            potions: &potions,
            gems: &gems,
            enemies: &enemies,
            combat: &StandardCombat,
        };
        let hero = Hero { atk: 8, def: 8, mdef: 0 };

        assert_eq!(valuer.value_of(Event::Door { key: KeyType::Blue }, &hero), 75.0);
        assert_eq!(valuer.value_of(Event::Key { key: KeyType::Yellow }, &hero), 30.0);
        assert_eq!(valuer.value_of(Event::Potion { index: 0 }, &hero), 25.0);
        assert_eq!(valuer.value_of(Event::Gem { index: 0 }, &hero), 50.0);
        assert_eq!(valuer.value_of(Event::Gem { index: 2 }, &hero), 15.0);
        assert_eq!(valuer.value_of(Event::Enemy { index: 1 }, &hero), INFEASIBLE_VALUE);
        assert!(valuer.value_of(Event::Enemy { index: 0 }, &hero) > 0.0);
    }

    #[test]
    fn inflation_grows_every_stat_by_its_increment() {
        let inflation = Inflation::default();
        let mut hero = HERO;
        hero.inflate(&inflation);
        assert_eq!(hero, Hero { atk: 11, def: 11, mdef: 3 });
        assert_eq!(HERO.inflated(&inflation, 25), Hero { atk: 35, def: 35, mdef: 75 });
    }
}
