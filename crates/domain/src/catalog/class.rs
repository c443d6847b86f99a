use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Character class, chosen once at level 3 or later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Assassin,
    Mage,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 3] = [
        CharacterClass::Warrior,
        CharacterClass::Assassin,
        CharacterClass::Mage,
    ];

    /// Weapon granted when the class is chosen.
    pub fn starter_weapon(self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Iron Sword",
            CharacterClass::Assassin => "Rusty Dagger",
            CharacterClass::Mage => "Wooden Staff",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Assassin => "Assassin",
            CharacterClass::Mage => "Mage",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharacterClass::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DomainError::parse(format!(
                    "unknown class '{s}', choose Warrior, Assassin or Mage"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_case() {
        assert_eq!("mage".parse::<CharacterClass>(), Ok(CharacterClass::Mage));
        assert_eq!(
            " WARRIOR ".parse::<CharacterClass>(),
            Ok(CharacterClass::Warrior)
        );
        assert!("bard".parse::<CharacterClass>().is_err());
    }
}
