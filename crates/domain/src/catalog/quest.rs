use std::fmt;

use serde::{Deserialize, Serialize};

/// A quest on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target: QuestTarget,
    pub amount: u32,
    /// Item granted on completion.
    pub reward: String,
}

/// What a victory has to look like to count toward a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestTarget {
    /// Any of the common field monsters.
    Mixed,
    /// Kill with a staff or wand equipped.
    Magic,
    Dagger,
    Sword,
    /// Reserved; never matches.
    Weapon,
    /// Substring of the monster name.
    Monster(String),
}

const MIXED_MONSTERS: [&str; 5] = ["slime", "goblin", "wolf", "orc", "bandit"];

impl QuestTarget {
    /// Whether defeating `monster_name` with `weapon` equipped counts.
    pub fn matches(&self, monster_name: &str, weapon: Option<&str>) -> bool {
        let monster = monster_name.to_lowercase();
        let weapon = weapon.map(str::to_lowercase).unwrap_or_default();
        match self {
            QuestTarget::Mixed => MIXED_MONSTERS.iter().any(|m| monster.contains(m)),
            QuestTarget::Magic => weapon.contains("staff") || weapon.contains("wand"),
            QuestTarget::Dagger => weapon.contains("dagger") || weapon.contains("knife"),
            QuestTarget::Sword => weapon.contains("sword") || weapon.contains("axe"),
            QuestTarget::Weapon => false,
            QuestTarget::Monster(name) => monster.contains(&name.to_lowercase()),
        }
    }
}

impl From<String> for QuestTarget {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "mixed" => QuestTarget::Mixed,
            "magic" => QuestTarget::Magic,
            "dagger" => QuestTarget::Dagger,
            "sword" => QuestTarget::Sword,
            "weapon" => QuestTarget::Weapon,
            _ => QuestTarget::Monster(raw),
        }
    }
}

impl From<QuestTarget> for String {
    fn from(target: QuestTarget) -> Self {
        target.to_string()
    }
}

impl fmt::Display for QuestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestTarget::Mixed => f.write_str("mixed"),
            QuestTarget::Magic => f.write_str("magic"),
            QuestTarget::Dagger => f.write_str("dagger"),
            QuestTarget::Sword => f.write_str("sword"),
            QuestTarget::Weapon => f.write_str("weapon"),
            QuestTarget::Monster(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_matches_field_monsters() {
        assert!(QuestTarget::Mixed.matches("Forest Wolf", None));
        assert!(QuestTarget::Mixed.matches("Goblin Scout", Some("Iron Sword")));
        assert!(!QuestTarget::Mixed.matches("Ancient Dragon", None));
    }

    #[test]
    fn weapon_targets_look_at_equipped_weapon() {
        assert!(QuestTarget::Sword.matches("Slime", Some("Iron Sword")));
        assert!(QuestTarget::Sword.matches("Slime", Some("Battle Axe")));
        assert!(QuestTarget::Dagger.matches("Slime", Some("Rusty Dagger")));
        assert!(QuestTarget::Magic.matches("Slime", Some("Wooden Staff")));
        assert!(!QuestTarget::Magic.matches("Slime", None));
        assert!(!QuestTarget::Weapon.matches("Slime", Some("Iron Sword")));
    }

    #[test]
    fn unknown_target_is_monster_substring() {
        let target: QuestTarget = String::from("Skeleton").into();
        assert_eq!(target, QuestTarget::Monster("Skeleton".into()));
        assert!(target.matches("Undead Skeleton Knight", None));
        assert!(!target.matches("Zombie", None));
    }
}
