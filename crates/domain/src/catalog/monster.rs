use serde::{Deserialize, Serialize};

use super::rarity::Rarity;
use crate::combat::signature::SignatureAttack;

fn default_crit_damage() -> f64 {
    1.0
}

/// Base stats of a creature as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub hp: f64,
    pub max_hp: f64,
    pub atk: f64,
    #[serde(default)]
    pub defense: f64,
    #[serde(default)]
    pub crit_chance: f64,
    #[serde(default = "default_crit_damage")]
    pub crit_damage: f64,
    #[serde(default)]
    pub evasion_chance: f64,
    #[serde(default)]
    pub hp_regen: f64,
    pub exp: u32,
    #[serde(default)]
    pub loot: Option<String>,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub signature: Option<SignatureAttack>,
}
