use serde::{Deserialize, Serialize};

use super::class::CharacterClass;
use crate::combat::status::Status;

/// A castable spell, owned by exactly one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDef {
    pub name: String,
    pub class: CharacterClass,
    pub mana: f64,
    #[serde(default)]
    pub description: String,
    pub effect: SpellEffect,
}

impl SpellDef {
    pub fn is_damaging(&self) -> bool {
        matches!(self.effect, SpellEffect::Damage { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpellEffect {
    Damage {
        amount: f64,
        #[serde(default)]
        crit_chance: f64,
        #[serde(default)]
        crit_damage: f64,
        #[serde(default)]
        rider: Option<SpellRider>,
    },
    /// Sets (or refreshes) a caster status.
    Buff { status: Status, turns: u32 },
    /// Heals a fraction of max hp plus strength.
    SecondWind { fraction: f64 },
    /// Heals every party member.
    Rally { amount: f64 },
    /// Heals the caster or a targeted party member.
    Heal { amount: f64 },
    Vanish { amount: f64 },
    AdrenalineRush { turns: u32 },
    ArcaneSurge { turns: u32 },
    /// Forces the monster to attack the caster.
    Taunt { turns: u32 },
    /// Sets a monster debuff.
    Debuff { status: Status, turns: u32 },
}

/// Extra effect attached to a damaging spell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpellRider {
    Stun { chance: f64 },
    Afflict { status: Status, turns: u32 },
}
