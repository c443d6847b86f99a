//! Encounter and raid boss selection.

use super::error::CombatError;
use super::monster::MonsterInstance;
use crate::catalog::{Catalog, Rarity};
use crate::random::RandomSource;

/// Rarities that can appear in ordinary encounters, weakest first.
const ENCOUNTER_TIERS: [Rarity; 5] = [
    Rarity::Common,
    Rarity::Uncommon,
    Rarity::Rare,
    Rarity::Epic,
    Rarity::Legendary,
];

/// Normalised spawn odds for each encounter tier at `level`.
///
/// Higher tiers unlock at levels 6, 12, 20 and 30 and steal weight from the
/// tiers below them as the level climbs.
pub fn rarity_odds(level: u32) -> [(Rarity, f64); 5] {
    let lvl = f64::from(level);
    let (mut common, mut uncommon, mut rare, mut epic, mut legendary) = (0.7, 0.0, 0.0, 0.0, 0.0);

    if level >= 6 {
        let d = lvl - 6.0;
        uncommon += 0.15 + 0.02 * d;
        common -= 0.10 + 0.02 * d;
    }
    if level >= 12 {
        let d = lvl - 12.0;
        rare += 0.08 + 0.01 * d;
        common -= 0.05 + 0.005 * d;
        uncommon -= 0.03 + 0.005 * d;
    }
    if level >= 20 {
        let d = lvl - 20.0;
        epic += 0.05 + 0.01 * d;
        common -= 0.03 + 0.003 * d;
        uncommon -= 0.02 + 0.003 * d;
        rare -= 0.01 + 0.002 * d;
    }
    if level >= 30 {
        let d = lvl - 30.0;
        legendary += 0.02 + 0.002 * d;
        common -= 0.06 + 0.001 * d;
        uncommon -= 0.05 + 0.001 * d;
        rare -= 0.04 + 0.001 * d;
        epic -= 0.03 + 0.001 * d;
    }

    let mut weights = [common, uncommon, rare, epic, legendary].map(|w: f64| w.max(0.0));
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        weights.iter_mut().for_each(|w| *w /= total);
    } else {
        weights = [1.0, 0.0, 0.0, 0.0, 0.0];
    }

    let mut odds = [(Rarity::Common, 0.0); 5];
    for (slot, (tier, weight)) in odds
        .iter_mut()
        .zip(ENCOUNTER_TIERS.into_iter().zip(weights))
    {
        *slot = (tier, weight);
    }
    odds
}

/// Rolls a tier from [`rarity_odds`].
pub fn choose_rarity(level: u32, rng: &dyn RandomSource) -> Rarity {
    let roll = rng.gen_unit();
    let mut cumulative = 0.0;
    for (rarity, weight) in rarity_odds(level) {
        cumulative += weight;
        if roll <= cumulative {
            return rarity;
        }
    }
    Rarity::Common
}

/// Picks and scales an encounter monster for a party averaging `avg_level`.
///
/// Empty tiers fall back to the common pool; raid bosses never appear here.
pub fn spawn_encounter(
    catalog: &Catalog,
    avg_level: u32,
    party_size: usize,
    rng: &dyn RandomSource,
) -> Result<MonsterInstance, CombatError> {
    let rarity = choose_rarity(avg_level, rng);
    let mut pool = catalog.monsters_of(rarity);
    if pool.is_empty() {
        pool = catalog.monsters_of(Rarity::Common);
    }
    if pool.is_empty() {
        return Err(CombatError::NoMonsters);
    }
    let template = pool[rng.pick_index(pool.len())];
    Ok(MonsterInstance::scaled_for_party(template, party_size.max(1)))
}

/// Picks a raid boss at random and scales it for the raiding party.
pub fn spawn_raid_boss(
    catalog: &Catalog,
    party_size: usize,
    rng: &dyn RandomSource,
) -> Result<MonsterInstance, CombatError> {
    let bosses = catalog.monsters_of(Rarity::Raid);
    if bosses.is_empty() {
        return Err(CombatError::NoRaidBoss);
    }
    let template = bosses[rng.pick_index(bosses.len())];
    Ok(MonsterInstance::raid_boss(template, party_size.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use crate::random::testing::ScriptedRandom;

    fn weight(odds: &[(Rarity, f64); 5], rarity: Rarity) -> f64 {
        odds.iter()
            .find(|(r, _)| *r == rarity)
            .map(|(_, w)| *w)
            .unwrap_or_default()
    }

    #[test]
    fn low_levels_only_meet_common_monsters() {
        let odds = rarity_odds(1);
        assert_eq!(weight(&odds, Rarity::Common), 1.0);
        assert_eq!(weight(&odds, Rarity::Uncommon), 0.0);
    }

    #[test]
    fn odds_are_normalised_at_every_level() {
        for level in [1, 6, 12, 20, 30, 60, 200] {
            let total: f64 = rarity_odds(level).iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-9, "level {level}");
            assert!(rarity_odds(level).iter().all(|(_, w)| *w >= 0.0));
        }
    }

    #[test]
    fn legendary_unlocks_at_thirty() {
        assert_eq!(weight(&rarity_odds(29), Rarity::Legendary), 0.0);
        assert!(weight(&rarity_odds(30), Rarity::Legendary) > 0.0);
    }

    #[test]
    fn empty_tier_falls_back_to_common_and_skips_raid() {
        let catalog = fixtures::catalog();
        // level 40 with a high roll lands on legendary, which the fixture lacks
        let rng = ScriptedRandom::new().with_units([0.999]);
        let monster = spawn_encounter(&catalog, 40, 1, &rng).expect("common pool");
        assert_eq!(monster.rarity(), Rarity::Common);
    }

    #[test]
    fn raid_boss_scales_with_party() {
        let catalog = fixtures::catalog();
        let rng = ScriptedRandom::new();
        let boss = spawn_raid_boss(&catalog, 3, &rng).expect("fixture has a boss");
        assert_eq!(boss.name(), "Ancient Titan");
        assert_eq!(boss.max_hp(), 2600.0);
    }

    #[test]
    fn no_bosses_is_an_error() {
        let catalog = Catalog::default();
        let rng = ScriptedRandom::new();
        assert_eq!(
            spawn_raid_boss(&catalog, 1, &rng).map(|_| ()),
            Err(CombatError::NoRaidBoss)
        );
        assert_eq!(
            spawn_encounter(&catalog, 1, 1, &rng).map(|_| ()),
            Err(CombatError::NoMonsters)
        );
    }
}
