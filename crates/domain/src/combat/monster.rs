use serde::{Deserialize, Serialize};

use super::regen::RegenAccumulator;
use super::signature::SignatureAttack;
use super::status::{Status, StatusMap};
use crate::catalog::{MonsterTemplate, Rarity};
use crate::ids::UserId;

/// Live copy of a catalog monster inside an encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterInstance {
    pub(crate) name: String,
    pub(crate) hp: f64,
    pub(crate) max_hp: f64,
    pub(crate) atk: f64,
    pub(crate) defense: f64,
    pub(crate) crit_chance: f64,
    pub(crate) crit_damage: f64,
    pub(crate) evasion_chance: f64,
    pub(crate) hp_regen: f64,
    pub(crate) exp: u32,
    pub(crate) loot: Option<String>,
    pub(crate) rarity: Rarity,
    pub(crate) signature: Option<SignatureAttack>,
    #[serde(default)]
    pub(crate) debuffs: StatusMap,
    #[serde(default)]
    pub(crate) stunned: bool,
    #[serde(default)]
    pub(crate) skip_turn: bool,
    #[serde(default)]
    pub(crate) taunted_by: Option<UserId>,
    #[serde(default)]
    pub(crate) regen: RegenAccumulator,
}

/// Periodic damage and turn loss produced by one debuff evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DebuffTick {
    /// `(status, damage)` for each periodic effect that fired.
    pub damage: Vec<(Status, f64)>,
    /// Status that made the monster lose its next turn.
    pub lost_turn: Option<Status>,
}

impl DebuffTick {
    pub fn total_damage(&self) -> f64 {
        self.damage.iter().map(|(_, dmg)| dmg).sum()
    }
}

impl MonsterInstance {
    /// Fresh instance with empty transient state.
    pub fn spawn(template: &MonsterTemplate) -> Self {
        Self {
            name: template.name.clone(),
            hp: template.hp,
            max_hp: template.max_hp,
            atk: template.atk,
            defense: template.defense,
            crit_chance: template.crit_chance,
            crit_damage: template.crit_damage,
            evasion_chance: template.evasion_chance,
            hp_regen: template.hp_regen,
            exp: template.exp,
            loot: template.loot.clone(),
            rarity: template.rarity,
            signature: template.signature,
            debuffs: StatusMap::new(),
            stunned: false,
            skip_turn: false,
            taunted_by: None,
            regen: RegenAccumulator::new(),
        }
    }

    /// Scales an encounter monster for a party of `size`.
    pub fn scaled_for_party(template: &MonsterTemplate, size: usize) -> Self {
        let mut monster = Self::spawn(template);
        let extra = size.saturating_sub(1) as f64;
        if extra > 0.0 {
            monster.hp = (monster.hp * (1.0 + 0.7 * extra)).trunc();
            monster.max_hp = (monster.max_hp * (1.0 + 0.7 * extra)).trunc();
            monster.atk = (monster.atk * (1.0 + 0.4 * extra)).trunc();
            monster.defense = (monster.defense * (1.0 + 0.2 * extra)).trunc();
        }
        monster
    }

    /// Raid boss at full health, scaled for a party of `size`.
    pub fn raid_boss(template: &MonsterTemplate, size: usize) -> Self {
        let mut monster = Self::spawn(template);
        let extra = size.saturating_sub(1) as f64;
        monster.max_hp = (template.max_hp * (1.0 + 0.8 * extra)).floor();
        monster.hp = monster.max_hp;
        monster
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn hp(&self) -> f64 {
        self.hp
    }

    #[inline]
    pub fn max_hp(&self) -> f64 {
        self.max_hp
    }

    #[inline]
    pub fn atk(&self) -> f64 {
        self.atk
    }

    #[inline]
    pub fn defense(&self) -> f64 {
        self.defense
    }

    #[inline]
    pub fn exp(&self) -> u32 {
        self.exp
    }

    #[inline]
    pub fn loot(&self) -> Option<&str> {
        self.loot.as_deref()
    }

    #[inline]
    pub fn rarity(&self) -> Rarity {
        self.rarity
    }

    #[inline]
    pub fn debuffs(&self) -> &StatusMap {
        &self.debuffs
    }

    #[inline]
    pub fn is_stunned(&self) -> bool {
        self.stunned
    }

    #[inline]
    pub fn taunted_by(&self) -> Option<UserId> {
        self.taunted_by
    }

    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0.0
    }

    // =========================================================================
    // Combat helpers
    // =========================================================================

    pub(crate) fn take_damage(&mut self, amount: f64) {
        self.hp -= amount.max(0.0);
    }

    pub(crate) fn heal(&mut self, amount: f64) -> f64 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp);
        (self.hp - before).max(0.0)
    }

    /// Attack after debuffs (frost nova takes 20%).
    pub fn effective_attack(&self) -> f64 {
        if self.debuffs.has(Status::FrostNova) {
            self.atk * 0.8
        } else {
            self.atk
        }
    }

    /// Defense against basic attacks (none while marked for death).
    pub fn effective_defense(&self) -> f64 {
        if self.debuffs.has(Status::MarkForDeath) {
            0.0
        } else {
            self.defense
        }
    }

    /// Evaluates debuffs once: periodic damage, turn loss, then every
    /// counter decrements and expired entries are pruned.
    pub fn tick_debuffs(&mut self) -> DebuffTick {
        let mut tick = DebuffTick::default();
        for (status, fraction) in [
            (Status::Poison, 0.05),
            (Status::Burn, 0.05),
            (Status::Bleed, 0.07),
        ] {
            if self.debuffs.has(status) {
                let dmg = (fraction * self.max_hp).trunc();
                self.hp -= dmg;
                tick.damage.push((status, dmg));
            }
        }
        for status in [Status::Sleep, Status::MemoryWipe] {
            if self.debuffs.has(status) {
                self.skip_turn = true;
                tick.lost_turn.get_or_insert(status);
            }
        }
        self.debuffs.tick();
        tick
    }

    /// Applies the curse bonus to a hit and spends one curse turn.
    pub fn curse_multiplier(&mut self) -> Option<f64> {
        if self.debuffs.has(Status::Curse) {
            self.debuffs.consume(Status::Curse);
            Some(1.2)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    #[test]
    fn party_scaling_truncates_each_stat() {
        let template = fixtures::monster("Goblin", 15.0, 7.0, 3.0);
        let m = MonsterInstance::scaled_for_party(&template, 3);
        assert_eq!(m.hp(), 36.0);
        assert_eq!(m.max_hp(), 36.0);
        assert_eq!(m.atk(), 12.0);
        assert_eq!(m.defense(), 4.0);

        let solo = MonsterInstance::scaled_for_party(&template, 1);
        assert_eq!((solo.hp(), solo.atk()), (15.0, 7.0));
    }

    #[test]
    fn raid_boss_scales_max_hp() {
        let template = fixtures::monster("Ancient Titan", 1000.0, 30.0, 5.0);
        let boss = MonsterInstance::raid_boss(&template, 3);
        assert_eq!(boss.max_hp(), 2600.0);
        assert_eq!(boss.hp(), 2600.0);
    }

    #[test]
    fn debuff_tick_deals_periodic_damage_and_decrements() {
        let template = fixtures::monster("Troll", 100.0, 5.0, 0.0);
        let mut m = MonsterInstance::spawn(&template);
        m.debuffs.apply(Status::Poison, 2);
        m.debuffs.apply(Status::Bleed, 1);
        m.debuffs.apply(Status::Sleep, 1);
        let tick = m.tick_debuffs();
        assert_eq!(tick.total_damage(), 12.0);
        assert_eq!(m.hp(), 88.0);
        assert_eq!(tick.lost_turn, Some(Status::Sleep));
        assert!(m.skip_turn);
        assert_eq!(m.debuffs().remaining(Status::Poison), 1);
        assert!(!m.debuffs().has(Status::Bleed));
    }

    #[test]
    fn frost_nova_and_mark_for_death_weaken_monster() {
        let template = fixtures::monster("Troll", 100.0, 10.0, 6.0);
        let mut m = MonsterInstance::spawn(&template);
        m.debuffs.apply(Status::FrostNova, 2);
        m.debuffs.apply(Status::MarkForDeath, 2);
        assert_eq!(m.effective_attack(), 8.0);
        assert_eq!(m.effective_defense(), 0.0);
    }

    #[test]
    fn curse_spends_a_turn_per_hit() {
        let template = fixtures::monster("Troll", 100.0, 10.0, 6.0);
        let mut m = MonsterInstance::spawn(&template);
        assert_eq!(m.curse_multiplier(), None);
        m.debuffs.apply(Status::Curse, 1);
        assert_eq!(m.curse_multiplier(), Some(1.2));
        assert_eq!(m.curse_multiplier(), None);
    }
}
