use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Rarity tier shared by monsters and items.
///
/// Ordering follows power: `Common < ... < Legendary < Raid`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Raid,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Raid,
    ];

    /// Multiplier applied to weapon special effects.
    pub fn effect_scale(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.2,
            Rarity::Rare => 1.5,
            Rarity::Epic => 2.0,
            Rarity::Legendary => 3.0,
            Rarity::Raid => 4.0,
        }
    }

    /// Probability that a defeated monster of this rarity drops its loot.
    pub fn loot_drop_chance(self) -> f64 {
        match self {
            Rarity::Common => 0.5,
            Rarity::Uncommon => 0.4,
            Rarity::Rare => 0.35,
            Rarity::Epic => 0.3,
            Rarity::Legendary => 1.0,
            Rarity::Raid => 0.4,
        }
    }

    /// Probability that a monster of this rarity unleashes its signature attack.
    pub fn signature_chance(self) -> f64 {
        match self {
            Rarity::Common | Rarity::Uncommon => 0.0,
            Rarity::Rare => 0.25,
            Rarity::Epic => 0.33,
            Rarity::Legendary => 0.5,
            Rarity::Raid => 0.10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Raid => "raid",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::parse(format!("unknown rarity '{s}'")))
    }
}
