use serde::{Deserialize, Serialize};

use super::rarity::Rarity;
use crate::combat::status::Status;
use crate::combat::weapon_effects::WeaponEffect;

/// Catalog entry for anything that can sit in an inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub description: String,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Weapon {
        damage: i32,
        #[serde(default)]
        effect: Option<WeaponEffect>,
    },
    Consumable(ConsumableEffect),
    /// Consumed automatically when its owner drops to 0 hp.
    Revival { restore_fraction: f64 },
    Loot,
}

impl ItemDef {
    pub fn is_weapon(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon { .. })
    }

    pub fn weapon_damage(&self) -> i32 {
        match self.kind {
            ItemKind::Weapon { damage, .. } => damage,
            _ => 0,
        }
    }

    pub fn weapon_effect(&self) -> Option<&WeaponEffect> {
        match &self.kind {
            ItemKind::Weapon { effect, .. } => effect.as_ref(),
            _ => None,
        }
    }

    pub fn consumable(&self) -> Option<&ConsumableEffect> {
        match &self.kind {
            ItemKind::Consumable(effect) => Some(effect),
            _ => None,
        }
    }

    pub fn revival_fraction(&self) -> Option<f64> {
        match self.kind {
            ItemKind::Revival { restore_fraction } => Some(restore_fraction),
            _ => None,
        }
    }
}

/// Inclusive integer roll range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRange {
    pub min: i32,
    pub max: i32,
}

impl RollRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// How much of the consumer's strength is added to an hp roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthBonus {
    #[default]
    None,
    Full,
    Half,
}

/// Status inflicted with some probability when the item is eaten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumableRisk {
    pub chance: f64,
    pub status: Status,
    pub turns: u32,
}

/// Data-driven description of what a consumable restores.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsumableEffect {
    #[serde(default)]
    pub hp: Option<RollRange>,
    #[serde(default)]
    pub mana: Option<RollRange>,
    /// Fraction of max hp restored instead of a roll.
    #[serde(default)]
    pub hp_fraction: Option<f64>,
    #[serde(default)]
    pub strength_bonus: StrengthBonus,
    /// Adds the consumer's whole hp regen to the heal.
    #[serde(default)]
    pub regen_bonus: bool,
    /// Adds the consumer's intelligence to the mana roll.
    #[serde(default)]
    pub intelligence_bonus: bool,
    #[serde(default)]
    pub cures: Option<Status>,
    #[serde(default)]
    pub risk: Option<ConsumableRisk>,
}
