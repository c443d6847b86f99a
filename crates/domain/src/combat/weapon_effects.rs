//! Weapon special effects.
//!
//! A weapon carries at most one [`WeaponEffect`]. Strength of every effect is
//! multiplied by the weapon's [`Rarity::effect_scale`].

use serde::{Deserialize, Serialize};

use super::monster::MonsterInstance;
use super::status::Status;
use crate::catalog::Rarity;
use crate::random::RandomSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeaponEffect {
    BonusVsDragon { amount: f64 },
    Stun,
    HealOnCrit,
    Burn,
    Lifesteal,
    IgnoreDefense,
    MultiHit { per_hit: f64 },
    Curse,
    Bleed,
    Reap,
    Smite { amount: f64 },
    NeverMiss,
    Leadership,
    InstantKill,
    MemoryWipe,
    Blind,
    InfinitePower { amount: f64 },
    BonusSpell,
    Pierce { amount: f64 },
    ReviveOnDeath,
    Sleep,
    DoubleDamageNight,
}

impl WeaponEffect {
    /// Attacks with this weapon skip the monster's evasion roll.
    pub fn ignores_evasion(&self) -> bool {
        matches!(self, WeaponEffect::NeverMiss)
    }

    /// Hp restored when the wielder drops, if the weapon revives at all.
    pub fn revive_hp(&self, max_hp: f64, rarity: Rarity) -> Option<f64> {
        match self {
            WeaponEffect::ReviveOnDeath => Some((max_hp * 0.5 * rarity.effect_scale()).floor()),
            _ => None,
        }
    }
}

/// What the wielder's hit looked like before the effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectInput {
    pub damage: f64,
    pub critical: bool,
    pub actor_hp: f64,
    pub actor_max_hp: f64,
    pub bonus_spell_damage: f64,
    pub in_party: bool,
    pub hour_utc: u32,
}

/// Observable result of an effect that fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeaponEffectOutcome {
    BonusDamage { amount: f64 },
    Stunned,
    Healed { amount: f64 },
    Afflicted { status: Status, turns: u32 },
    ExtraHits { hits: u32, damage: f64 },
    InstantKill,
    Leadership { turns: u32 },
    NightFury { multiplier: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectResult {
    pub damage: f64,
    pub actor_hp: f64,
    pub outcome: Option<WeaponEffectOutcome>,
    /// Turns of leadership granted to the other party members.
    pub party_leadership: Option<u32>,
}

fn scaled_turns(base: f64, scale: f64) -> u32 {
    (base * scale).floor().max(0.0) as u32
}

/// Applies `effect` to a hit against `monster`.
///
/// A missing effect, or one whose gate does not open, leaves damage and hp
/// untouched.
pub fn apply_weapon_effect(
    effect: Option<&WeaponEffect>,
    rarity: Rarity,
    monster: &mut MonsterInstance,
    input: EffectInput,
    rng: &dyn RandomSource,
) -> EffectResult {
    let s = rarity.effect_scale();
    let mut result = EffectResult {
        damage: input.damage,
        actor_hp: input.actor_hp,
        outcome: None,
        party_leadership: None,
    };
    let Some(effect) = effect else {
        return result;
    };

    let bonus = |result: &mut EffectResult, amount: f64| {
        let amount = amount.floor();
        result.damage += amount;
        result.outcome = Some(WeaponEffectOutcome::BonusDamage { amount });
    };
    let afflict = |monster: &mut MonsterInstance, status: Status, turns: u32| {
        monster.debuffs.apply(status, turns);
        Some(WeaponEffectOutcome::Afflicted { status, turns })
    };
    let heal = |result: &mut EffectResult, amount: f64| {
        let before = result.actor_hp;
        result.actor_hp = (result.actor_hp + amount).min(input.actor_max_hp);
        result.outcome = Some(WeaponEffectOutcome::Healed {
            amount: (result.actor_hp - before).max(0.0),
        });
    };

    let name = monster.name.to_lowercase();
    match effect {
        WeaponEffect::BonusVsDragon { amount } => {
            if name.contains("dragon") {
                bonus(&mut result, amount * s);
            }
        }
        WeaponEffect::Stun => {
            if rng.chance(0.25 * s) {
                monster.stunned = true;
                result.outcome = Some(WeaponEffectOutcome::Stunned);
            }
        }
        WeaponEffect::HealOnCrit => {
            if input.critical {
                heal(&mut result, (input.actor_max_hp * 0.2 * s).floor());
            }
        }
        WeaponEffect::Burn => {
            if rng.chance(0.3 * s) {
                result.outcome = afflict(monster, Status::Burn, scaled_turns(3.0, s));
            }
        }
        WeaponEffect::Lifesteal => {
            heal(&mut result, (input.damage * 0.5 * s).floor());
        }
        WeaponEffect::IgnoreDefense => bonus(&mut result, monster.defense * s),
        WeaponEffect::MultiHit { per_hit } => {
            let max_hits = (2.0 * s).floor().max(1.0) as i32;
            let hits = rng.gen_range(1, max_hits).max(1) as u32;
            let extra = f64::from(hits) * per_hit.floor();
            result.damage += extra;
            result.outcome = Some(WeaponEffectOutcome::ExtraHits {
                hits,
                damage: extra,
            });
        }
        WeaponEffect::Curse => {
            if rng.chance(0.2 * s) {
                result.outcome = afflict(monster, Status::Curse, scaled_turns(2.0, s));
            }
        }
        WeaponEffect::Bleed => {
            if rng.chance(0.3 * s) {
                result.outcome = afflict(monster, Status::Bleed, scaled_turns(3.0, s));
            }
        }
        WeaponEffect::Reap => {
            if monster.hp < monster.max_hp * 0.25 {
                bonus(&mut result, monster.max_hp * 0.2 * s);
            }
        }
        WeaponEffect::Smite { amount } => {
            if name.contains("undead") {
                bonus(&mut result, amount * s);
            }
        }
        // Evasion was already skipped by the caller.
        WeaponEffect::NeverMiss => {}
        WeaponEffect::Leadership => {
            if input.in_party {
                let turns = scaled_turns(2.0, s);
                result.party_leadership = Some(turns);
                result.outcome = Some(WeaponEffectOutcome::Leadership { turns });
            }
        }
        WeaponEffect::InstantKill => {
            if rng.chance(0.05 * s) {
                monster.hp = 0.0;
                result.outcome = Some(WeaponEffectOutcome::InstantKill);
            }
        }
        WeaponEffect::MemoryWipe => {
            if rng.chance(0.15 * s) {
                result.outcome = afflict(monster, Status::MemoryWipe, scaled_turns(2.0, s));
            }
        }
        WeaponEffect::Blind => {
            if rng.chance(0.2 * s) {
                result.outcome = afflict(monster, Status::Blind, scaled_turns(2.0, s));
            }
        }
        WeaponEffect::InfinitePower { amount } | WeaponEffect::Pierce { amount } => {
            bonus(&mut result, amount * s);
        }
        WeaponEffect::BonusSpell => bonus(&mut result, input.bonus_spell_damage * 1.5 * s),
        // Checked when the wielder drops, not on hit.
        WeaponEffect::ReviveOnDeath => {}
        WeaponEffect::Sleep => {
            if rng.chance(0.2 * s) {
                result.outcome = afflict(monster, Status::Sleep, scaled_turns(2.0, s));
            }
        }
        WeaponEffect::DoubleDamageNight => {
            if input.hour_utc < 6 {
                let multiplier = 2.0 * s;
                result.damage *= multiplier;
                result.outcome = Some(WeaponEffectOutcome::NightFury { multiplier });
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use crate::random::testing::ScriptedRandom;

    fn input(damage: f64) -> EffectInput {
        EffectInput {
            damage,
            critical: false,
            actor_hp: 10.0,
            actor_max_hp: 20.0,
            bonus_spell_damage: 4.0,
            in_party: false,
            hour_utc: 12,
        }
    }

    fn monster(name: &str) -> MonsterInstance {
        MonsterInstance::spawn(&fixtures::monster(name, 100.0, 10.0, 6.0))
    }

    #[test]
    fn no_effect_is_a_no_op() {
        let rng = ScriptedRandom::new();
        let mut m = monster("Slime");
        let r = apply_weapon_effect(None, Rarity::Legendary, &mut m, input(7.0), &rng);
        assert_eq!((r.damage, r.actor_hp, r.outcome), (7.0, 10.0, None));
    }

    #[test]
    fn dragon_bonus_scales_with_rarity() {
        let rng = ScriptedRandom::new();
        let effect = WeaponEffect::BonusVsDragon { amount: 5.0 };
        let mut dragon = monster("Red Dragon");
        let r = apply_weapon_effect(Some(&effect), Rarity::Rare, &mut dragon, input(10.0), &rng);
        assert_eq!(r.damage, 17.0);

        let mut slime = monster("Slime");
        let r = apply_weapon_effect(Some(&effect), Rarity::Rare, &mut slime, input(10.0), &rng);
        assert_eq!(r.damage, 10.0);
    }

    #[test]
    fn lifesteal_heals_capped_at_max() {
        let rng = ScriptedRandom::new();
        let mut m = monster("Slime");
        let r = apply_weapon_effect(
            Some(&WeaponEffect::Lifesteal),
            Rarity::Legendary,
            &mut m,
            input(20.0),
            &rng,
        );
        assert_eq!(r.actor_hp, 20.0);
        assert_eq!(r.outcome, Some(WeaponEffectOutcome::Healed { amount: 10.0 }));
    }

    #[test]
    fn chance_gated_debuff_applies_scaled_turns() {
        let rng = ScriptedRandom::new().with_units([0.1]);
        let mut m = monster("Slime");
        let r = apply_weapon_effect(Some(&WeaponEffect::Burn), Rarity::Epic, &mut m, input(5.0), &rng);
        assert_eq!(m.debuffs().remaining(Status::Burn), 6);
        assert_eq!(
            r.outcome,
            Some(WeaponEffectOutcome::Afflicted {
                status: Status::Burn,
                turns: 6
            })
        );
    }

    #[test]
    fn instant_kill_zeroes_monster() {
        let rng = ScriptedRandom::new().with_units([0.01]);
        let mut m = monster("Slime");
        apply_weapon_effect(Some(&WeaponEffect::InstantKill), Rarity::Common, &mut m, input(1.0), &rng);
        assert!(m.is_defeated());
    }

    #[test]
    fn night_doubles_damage_only_before_six() {
        let rng = ScriptedRandom::new();
        let mut m = monster("Slime");
        let mut night = input(5.0);
        night.hour_utc = 3;
        let r = apply_weapon_effect(Some(&WeaponEffect::DoubleDamageNight), Rarity::Common, &mut m, night, &rng);
        assert_eq!(r.damage, 10.0);
        let r = apply_weapon_effect(Some(&WeaponEffect::DoubleDamageNight), Rarity::Common, &mut m, input(5.0), &rng);
        assert_eq!(r.damage, 5.0);
    }

    #[test]
    fn leadership_needs_a_party() {
        let rng = ScriptedRandom::new();
        let mut m = monster("Slime");
        let solo = apply_weapon_effect(Some(&WeaponEffect::Leadership), Rarity::Epic, &mut m, input(5.0), &rng);
        assert_eq!(solo.party_leadership, None);
        let mut party = input(5.0);
        party.in_party = true;
        let r = apply_weapon_effect(Some(&WeaponEffect::Leadership), Rarity::Epic, &mut m, party, &rng);
        assert_eq!(r.party_leadership, Some(4));
    }

    #[test]
    fn revive_hp_uses_half_max_scaled() {
        assert_eq!(WeaponEffect::ReviveOnDeath.revive_hp(30.0, Rarity::Common), Some(15.0));
        assert_eq!(WeaponEffect::Stun.revive_hp(30.0, Rarity::Common), None);
        assert!(WeaponEffect::NeverMiss.ignores_evasion());
    }
}
