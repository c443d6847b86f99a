use std::fmt;

use serde::{Deserialize, Serialize};

use super::monster::MonsterInstance;
use super::status::Status;
use crate::random::RandomSource;

/// Bespoke attack a rare-or-better monster may unleash after its normal hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAttack {
    #[serde(rename = "Regenerating Smash")]
    RegeneratingSmash,
    #[serde(rename = "Labyrinth Charge")]
    LabyrinthCharge,
    #[serde(rename = "Commanding Strike")]
    CommandingStrike,
    #[serde(rename = "Arcane Blast")]
    ArcaneBlast,
    #[serde(rename = "Frost Nova")]
    FrostNova,
    #[serde(rename = "Flame Burst")]
    FlameBurst,
    #[serde(rename = "Surprise Chomp")]
    SurpriseChomp,
    #[serde(rename = "Venom Breath")]
    VenomBreath,
    #[serde(rename = "Earthquake")]
    Earthquake,
    #[serde(rename = "Death Ray")]
    DeathRay,
    #[serde(rename = "Multi-Strike")]
    MultiStrike,
    #[serde(rename = "Hellfire")]
    Hellfire,
    #[serde(rename = "Aerial Assault")]
    AerialAssault,
    #[serde(rename = "Blood Drain")]
    BloodDrain,
    #[serde(rename = "Inferno Breath")]
    InfernoBreath,
    #[serde(rename = "Titanic Slam")]
    TitanicSlam,
    #[serde(rename = "Rebirth Flame")]
    RebirthFlame,
    #[serde(rename = "Shadow Slash")]
    ShadowSlash,
    #[serde(rename = "Cataclysm")]
    Cataclysm,
    #[serde(rename = "Tsunami")]
    Tsunami,
    #[serde(rename = "Judgment Ray")]
    JudgmentRay,
    #[serde(rename = "Volcanic Eruption")]
    VolcanicEruption,
    #[serde(rename = "Thunderstorm")]
    Thunderstorm,
    #[serde(rename = "Armor Break")]
    ArmorBreak,
}

impl fmt::Display for SignatureAttack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignatureAttack::RegeneratingSmash => "Regenerating Smash",
            SignatureAttack::LabyrinthCharge => "Labyrinth Charge",
            SignatureAttack::CommandingStrike => "Commanding Strike",
            SignatureAttack::ArcaneBlast => "Arcane Blast",
            SignatureAttack::FrostNova => "Frost Nova",
            SignatureAttack::FlameBurst => "Flame Burst",
            SignatureAttack::SurpriseChomp => "Surprise Chomp",
            SignatureAttack::VenomBreath => "Venom Breath",
            SignatureAttack::Earthquake => "Earthquake",
            SignatureAttack::DeathRay => "Death Ray",
            SignatureAttack::MultiStrike => "Multi-Strike",
            SignatureAttack::Hellfire => "Hellfire",
            SignatureAttack::AerialAssault => "Aerial Assault",
            SignatureAttack::BloodDrain => "Blood Drain",
            SignatureAttack::InfernoBreath => "Inferno Breath",
            SignatureAttack::TitanicSlam => "Titanic Slam",
            SignatureAttack::RebirthFlame => "Rebirth Flame",
            SignatureAttack::ShadowSlash => "Shadow Slash",
            SignatureAttack::Cataclysm => "Cataclysm",
            SignatureAttack::Tsunami => "Tsunami",
            SignatureAttack::JudgmentRay => "Judgment Ray",
            SignatureAttack::VolcanicEruption => "Volcanic Eruption",
            SignatureAttack::Thunderstorm => "Thunderstorm",
            SignatureAttack::ArmorBreak => "Armor Break",
        };
        f.write_str(name)
    }
}

/// Effect of one signature attack on the defender and the monster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureEffect {
    pub attack: SignatureAttack,
    /// Extra damage to the defender (already truncated).
    pub damage: f64,
    pub hits: u32,
    pub defender_status: Option<(Status, u32)>,
    pub monster_healed: f64,
}

impl SignatureAttack {
    /// Resolves the attack. Monster-side effects (heals, evasion) are applied
    /// here; defender-side effects are returned for the caller.
    pub fn unleash(self, monster: &mut MonsterInstance, rng: &dyn RandomSource) -> SignatureEffect {
        let atk = monster.effective_attack();
        let hit = |factor: f64| (atk * factor).trunc();
        let mut effect = SignatureEffect {
            attack: self,
            damage: 0.0,
            hits: 0,
            defender_status: None,
            monster_healed: 0.0,
        };
        let strike = |effect: &mut SignatureEffect, damage: f64| {
            effect.damage = damage;
            effect.hits = 1;
        };
        match self {
            SignatureAttack::RegeneratingSmash => {
                effect.monster_healed = monster.heal((monster.max_hp * 0.15).trunc());
            }
            SignatureAttack::LabyrinthCharge => {
                strike(&mut effect, hit(0.7));
                effect.defender_status = Some((Status::DefenseDown, 2));
            }
            SignatureAttack::CommandingStrike => strike(&mut effect, hit(0.5)),
            SignatureAttack::ArcaneBlast => strike(&mut effect, (atk * 0.7 + 10.0).trunc()),
            SignatureAttack::FrostNova => {
                effect.defender_status = Some((Status::DefenseDown, 1));
            }
            SignatureAttack::FlameBurst => effect.defender_status = Some((Status::Burn, 3)),
            SignatureAttack::SurpriseChomp => strike(&mut effect, hit(0.8)),
            SignatureAttack::VenomBreath => effect.defender_status = Some((Status::Poison, 3)),
            SignatureAttack::Earthquake => {
                strike(&mut effect, hit(0.6));
                effect.defender_status = Some((Status::DefenseDown, 2));
            }
            SignatureAttack::DeathRay => strike(&mut effect, hit(1.2)),
            SignatureAttack::MultiStrike => {
                let hits = rng.gen_range(2, 4).clamp(2, 4) as u32;
                let per_hit = hit(0.5).max(1.0);
                effect.damage = per_hit * f64::from(hits);
                effect.hits = hits;
            }
            SignatureAttack::Hellfire => strike(&mut effect, hit(0.7)),
            SignatureAttack::AerialAssault => {
                monster.evasion_chance = (monster.evasion_chance + 0.1).min(1.0);
            }
            SignatureAttack::BloodDrain => {
                let drained = hit(0.5);
                strike(&mut effect, drained);
                effect.monster_healed = monster.heal(drained);
            }
            SignatureAttack::InfernoBreath => strike(&mut effect, hit(1.0)),
            SignatureAttack::TitanicSlam => strike(&mut effect, hit(0.9)),
            SignatureAttack::RebirthFlame => {
                if monster.hp <= monster.max_hp * 0.5 {
                    effect.monster_healed = monster.heal((monster.max_hp * 0.5).trunc());
                }
            }
            SignatureAttack::ShadowSlash => strike(&mut effect, hit(0.8)),
            SignatureAttack::Cataclysm => strike(&mut effect, hit(1.5)),
            SignatureAttack::Tsunami => strike(&mut effect, hit(1.2)),
            SignatureAttack::JudgmentRay => {
                strike(&mut effect, hit(1.3));
                effect.defender_status = Some((Status::DefenseDown, 2));
            }
            SignatureAttack::VolcanicEruption => {
                strike(&mut effect, hit(1.1));
                effect.defender_status = Some((Status::Burn, 3));
            }
            SignatureAttack::Thunderstorm => {
                strike(&mut effect, hit(1.0));
                effect.defender_status = Some((Status::Stun, 1));
            }
            SignatureAttack::ArmorBreak => {
                strike(&mut effect, hit(0.5));
                effect.defender_status = Some((Status::DefenseDown, 2));
            }
        }
        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use crate::random::testing::ScriptedRandom;

    fn boss(hp: f64, atk: f64) -> MonsterInstance {
        let mut m = MonsterInstance::spawn(&fixtures::monster("Boss", 100.0, atk, 0.0));
        m.hp = hp;
        m
    }

    #[test]
    fn deserializes_display_names() {
        let attack: SignatureAttack =
            serde_json::from_str("\"Multi-Strike\"").expect("known attack");
        assert_eq!(attack, SignatureAttack::MultiStrike);
        assert_eq!(attack.to_string(), "Multi-Strike");
    }

    #[test]
    fn damage_is_truncated() {
        let rng = ScriptedRandom::new();
        let mut m = boss(100.0, 13.0);
        let effect = SignatureAttack::DeathRay.unleash(&mut m, &rng);
        assert_eq!(effect.damage, 15.0);
        let effect = SignatureAttack::ArcaneBlast.unleash(&mut m, &rng);
        assert_eq!(effect.damage, 19.0);
    }

    #[test]
    fn multi_strike_hits_at_least_one_each() {
        let rng = ScriptedRandom::new().with_ints([3]);
        let mut m = boss(100.0, 1.0);
        let effect = SignatureAttack::MultiStrike.unleash(&mut m, &rng);
        assert_eq!(effect.hits, 3);
        assert_eq!(effect.damage, 3.0);
    }

    #[test]
    fn blood_drain_heals_monster() {
        let rng = ScriptedRandom::new();
        let mut m = boss(50.0, 20.0);
        let effect = SignatureAttack::BloodDrain.unleash(&mut m, &rng);
        assert_eq!(effect.damage, 10.0);
        assert_eq!(m.hp(), 60.0);
    }

    #[test]
    fn rebirth_flame_only_below_half() {
        let rng = ScriptedRandom::new();
        let mut healthy = boss(80.0, 10.0);
        assert_eq!(SignatureAttack::RebirthFlame.unleash(&mut healthy, &rng).monster_healed, 0.0);
        let mut hurt = boss(40.0, 10.0);
        assert_eq!(SignatureAttack::RebirthFlame.unleash(&mut hurt, &rng).monster_healed, 50.0);
        assert_eq!(hurt.hp(), 90.0);
    }

    #[test]
    fn frost_nova_lowers_defender_defense() {
        let rng = ScriptedRandom::new();
        let mut m = boss(100.0, 10.0);
        let effect = SignatureAttack::FrostNova.unleash(&mut m, &rng);
        assert_eq!(effect.defender_status, Some((Status::DefenseDown, 1)));
        assert_eq!(effect.damage, 0.0);
    }
}
