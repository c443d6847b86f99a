//! Named buffs and debuffs with turn counters.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Every named effect a combatant or monster can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    // Buffs
    BattleCry,
    IronWall,
    Taunt,
    Vanish,
    SmokeBomb,
    AdrenalineRush,
    ArcaneSurge,
    IceBarrier,
    ManaShield,
    Haste,
    Leadership,
    // Debuffs
    Burn,
    Poison,
    Curse,
    FrostNova,
    MarkForDeath,
    Bleed,
    Sleep,
    Blind,
    MemoryWipe,
    DefenseDown,
    Stun,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::BattleCry => "battle_cry",
            Status::IronWall => "iron_wall",
            Status::Taunt => "taunt",
            Status::Vanish => "vanish",
            Status::SmokeBomb => "smoke_bomb",
            Status::AdrenalineRush => "adrenaline_rush",
            Status::ArcaneSurge => "arcane_surge",
            Status::IceBarrier => "ice_barrier",
            Status::ManaShield => "mana_shield",
            Status::Haste => "haste",
            Status::Leadership => "leadership",
            Status::Burn => "burn",
            Status::Poison => "poison",
            Status::Curse => "curse",
            Status::FrostNova => "frost_nova",
            Status::MarkForDeath => "mark_for_death",
            Status::Bleed => "bleed",
            Status::Sleep => "sleep",
            Status::Blind => "blind",
            Status::MemoryWipe => "memory_wipe",
            Status::DefenseDown => "defense_down",
            Status::Stun => "stun",
        }
    }

    pub fn is_incapacitating(self) -> bool {
        matches!(self, Status::Sleep | Status::Stun | Status::MemoryWipe)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status name -> remaining turns.
///
/// Re-applying a status overwrites the counter; durations never stack.
/// Entries at zero are pruned, so a present entry always has turns left.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMap(BTreeMap<Status, u32>);

impl StatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, status: Status, turns: u32) {
        if turns == 0 {
            self.0.remove(&status);
        } else {
            self.0.insert(status, turns);
        }
    }

    pub fn remaining(&self, status: Status) -> u32 {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub fn has(&self, status: Status) -> bool {
        self.remaining(status) > 0
    }

    pub fn remove(&mut self, status: Status) -> bool {
        self.0.remove(&status).is_some()
    }

    /// Decrements a single entry, pruning it at zero.
    pub fn consume(&mut self, status: Status) {
        let next = self.remaining(status).saturating_sub(1);
        self.apply(status, next);
    }

    /// Decrements every counter once and prunes expired entries.
    pub fn tick(&mut self) {
        self.0.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = (Status, u32)> + '_ {
        self.0.iter().map(|(status, turns)| (*status, *turns))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flat modifiers a combatant gets from the current entries.
    pub fn modifiers(&self, bonus_spell_damage: f64) -> Modifiers {
        let bsd = bonus_spell_damage;
        let mut m = Modifiers::default();
        for (status, _) in self.iter() {
            match status {
                Status::BattleCry => {
                    m.attack += 3.0 + (0.5 * bsd).floor();
                    m.defense += 2.0 + (0.3 * bsd).floor();
                }
                Status::IronWall => m.defense += 8.0 + (0.7 * bsd).floor(),
                Status::Taunt => m.defense += 3.0 + (0.2 * bsd).floor(),
                Status::Vanish => m.evasion += 1.0,
                Status::SmokeBomb => m.evasion += 0.25 + (0.01 * bsd).min(0.15),
                Status::AdrenalineRush => m.attack += 2.0 + (0.2 * bsd).floor(),
                Status::ArcaneSurge => m.spell_damage += 5.0 + (0.5 * bsd).floor(),
                Status::IceBarrier => m.defense += 5.0 + (0.5 * bsd).floor(),
                Status::ManaShield => m.defense += 7.0 + (0.7 * bsd).floor(),
                Status::Haste => {
                    m.evasion += 0.15 + (0.01 * bsd).min(0.1);
                    m.spell_damage += 2.0 + (0.2 * bsd).floor();
                }
                Status::Leadership => m.attack += 4.0,
                Status::Burn => m.attack -= 2.0 + (0.2 * bsd).floor(),
                Status::Poison => m.defense -= 2.0 + (0.2 * bsd).floor(),
                Status::Curse => {
                    m.attack -= 2.0 + (0.2 * bsd).floor();
                    m.defense -= 2.0 + (0.2 * bsd).floor();
                    m.evasion -= 0.05 + (0.002 * bsd).min(0.05);
                }
                Status::MarkForDeath => m.defense -= 3.0 + (0.3 * bsd).floor(),
                Status::DefenseDown => m.defense -= 5.0,
                Status::Blind => m.evasion -= 0.2,
                Status::Sleep | Status::Stun | Status::MemoryWipe => m.incapacitated = true,
                // Periodic damage, resolved at tick time
                Status::Bleed | Status::FrostNova => {}
            }
        }
        m
    }
}

/// Combat modifiers derived from a [`StatusMap`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Modifiers {
    pub attack: f64,
    pub defense: f64,
    pub evasion: f64,
    pub spell_damage: f64,
    pub incapacitated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reapplying_refreshes_without_stacking() {
        let mut map = StatusMap::new();
        map.apply(Status::BattleCry, 3);
        map.tick();
        assert_eq!(map.remaining(Status::BattleCry), 2);
        map.apply(Status::BattleCry, 3);
        assert_eq!(map.remaining(Status::BattleCry), 3);
        map.apply(Status::BattleCry, 3);
        assert_eq!(map.remaining(Status::BattleCry), 3);
    }

    #[test]
    fn tick_prunes_expired_entries() {
        let mut map = StatusMap::new();
        map.apply(Status::Vanish, 1);
        map.apply(Status::Poison, 2);
        map.tick();
        assert!(!map.has(Status::Vanish));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(Status::Poison, 1)]);
        map.tick();
        assert!(map.is_empty());
    }

    #[test]
    fn modifiers_scale_with_bonus_spell_damage() {
        let mut map = StatusMap::new();
        map.apply(Status::BattleCry, 2);
        map.apply(Status::IronWall, 2);
        let m = map.modifiers(10.0);
        assert_eq!(m.attack, 8.0);
        assert_eq!(m.defense, 5.0 + 15.0);
        assert!(!m.incapacitated);
    }

    #[test]
    fn debuffs_reduce_and_incapacitate() {
        let mut map = StatusMap::new();
        map.apply(Status::Curse, 1);
        map.apply(Status::Blind, 1);
        map.apply(Status::Sleep, 1);
        let m = map.modifiers(0.0);
        assert_eq!(m.attack, -2.0);
        assert_eq!(m.defense, -2.0);
        assert!((m.evasion + 0.25).abs() < 1e-9);
        assert!(m.incapacitated);
    }
}
