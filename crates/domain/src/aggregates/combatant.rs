//! Combatant aggregate - a player's persisted progression record
//!
//! Holds everything the turn resolver needs about the player side of a fight:
//! level and experience, hit points and mana, derived combat stats, skill
//! allocations, loadout and quest slot. Transient combat state (statuses,
//! regen remainders) lives on the encounter session instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::{CharacterClass, ConsumableEffect, StrengthBonus};
use crate::combat::status::Status;
use crate::error::DomainError;
use crate::random::RandomSource;

/// Most spells a combatant can have equipped at once.
pub const MAX_EQUIPPED_SPELLS: usize = 5;

/// Level at which a class can be chosen.
pub const CLASS_UNLOCK_LEVEL: u32 = 3;

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Experience required to leave `level`.
///
/// `floor(20 + level^1.5 * 7)`
pub fn exp_threshold(level: u32) -> u32 {
    (20.0 + f64::from(level).powf(1.5) * 7.0).floor() as u32
}

/// Stat a skill point can be spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Strength,
    Dexterity,
    Intelligence,
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatKind::Strength => "strength",
            StatKind::Dexterity => "dexterity",
            StatKind::Intelligence => "intelligence",
        })
    }
}

impl FromStr for StatKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strength" | "str" => Ok(StatKind::Strength),
            "dexterity" | "dex" => Ok(StatKind::Dexterity),
            "intelligence" | "int" => Ok(StatKind::Intelligence),
            _ => Err(DomainError::parse(
                "Stat must be one of: strength, dexterity, intelligence",
            )),
        }
    }
}

/// Result of [`Combatant::gain_experience`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelUp {
    pub levels_gained: u32,
    pub new_level: u32,
    /// Crossed the class unlock level without a class.
    pub class_unlocked: bool,
}

/// What eating a consumable did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConsumeOutcome {
    pub hp_restored: f64,
    pub mana_restored: f64,
    pub cured: Option<Status>,
    /// Status the consumer must now carry, with its duration.
    pub afflicted: Option<(Status, u32)>,
}

/// A player's progression record.
///
/// # Invariants
///
/// - `0 <= mana <= max_mana`; `hp <= max_hp` (hp may drop below zero mid-turn)
/// - At most [`MAX_EQUIPPED_SPELLS`] equipped spells, no duplicates
/// - `class` is set at most once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub(crate) level: u32,
    pub(crate) exp: u32,
    pub(crate) exp_to_next: u32,
    pub(crate) hp: f64,
    pub(crate) max_hp: f64,
    pub(crate) atk: f64,
    pub(crate) defense: f64,
    pub(crate) class: Option<CharacterClass>,
    pub(crate) weapon: Option<String>,
    pub(crate) strength: u32,
    pub(crate) dexterity: u32,
    pub(crate) intelligence: u32,
    pub(crate) skill_points: u32,
    pub(crate) hp_regen: f64,
    pub(crate) mana: f64,
    pub(crate) max_mana: f64,
    pub(crate) mana_regen: f64,
    pub(crate) crit_chance: f64,
    pub(crate) crit_damage: f64,
    pub(crate) evasion: f64,
    pub(crate) bonus_spell_damage: f64,
    pub(crate) quest: Option<String>,
    pub(crate) quest_progress: u32,
    #[serde(default)]
    pub(crate) equipped_spells: Vec<String>,
}

impl Default for Combatant {
    fn default() -> Self {
        Self::new()
    }
}

impl Combatant {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Fresh level-1 adventurer.
    pub fn new() -> Self {
        Self {
            level: 1,
            exp: 0,
            exp_to_next: exp_threshold(1),
            hp: 20.0,
            max_hp: 20.0,
            atk: 5.0,
            defense: 2.0,
            class: None,
            weapon: None,
            strength: 0,
            dexterity: 0,
            intelligence: 0,
            skill_points: 5,
            hp_regen: 0.5,
            mana: 5.0,
            max_mana: 5.0,
            mana_regen: 0.2,
            crit_chance: 0.01,
            crit_damage: 1.0,
            evasion: 0.01,
            bonus_spell_damage: 0.0,
            quest: None,
            quest_progress: 0,
            equipped_spells: Vec::new(),
        }
    }

    // =========================================================================
    // Builder
    // =========================================================================

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self.exp_to_next = exp_threshold(self.level);
        self
    }

    pub fn with_hp(mut self, hp: f64, max_hp: f64) -> Self {
        self.max_hp = max_hp;
        self.hp = hp.min(max_hp);
        self
    }

    pub fn with_mana(mut self, mana: f64, max_mana: f64) -> Self {
        self.max_mana = max_mana;
        self.mana = mana.clamp(0.0, max_mana);
        self
    }

    pub fn with_atk(mut self, atk: f64) -> Self {
        self.atk = atk;
        self
    }

    pub fn with_defense(mut self, defense: f64) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_class(mut self, class: CharacterClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_weapon(mut self, weapon: impl Into<String>) -> Self {
        self.weapon = Some(weapon.into());
        self
    }

    pub fn with_attributes(mut self, strength: u32, dexterity: u32, intelligence: u32) -> Self {
        self.strength = strength;
        self.dexterity = dexterity;
        self.intelligence = intelligence;
        self
    }

    pub fn with_crit(mut self, chance: f64, damage: f64) -> Self {
        self.crit_chance = chance;
        self.crit_damage = damage;
        self
    }

    pub fn with_evasion(mut self, evasion: f64) -> Self {
        self.evasion = evasion;
        self
    }

    pub fn with_regen(mut self, hp_regen: f64, mana_regen: f64) -> Self {
        self.hp_regen = hp_regen;
        self.mana_regen = mana_regen;
        self
    }

    pub fn with_bonus_spell_damage(mut self, bonus: f64) -> Self {
        self.bonus_spell_damage = bonus;
        self
    }

    pub fn with_quest(mut self, quest: impl Into<String>, progress: u32) -> Self {
        self.quest = Some(quest.into());
        self.quest_progress = progress;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn exp(&self) -> u32 {
        self.exp
    }

    #[inline]
    pub fn exp_to_next(&self) -> u32 {
        self.exp_to_next
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
    pub fn class(&self) -> Option<CharacterClass> {
        self.class
    }

    #[inline]
    pub fn weapon(&self) -> Option<&str> {
        self.weapon.as_deref()
    }

    #[inline]
    pub fn strength(&self) -> u32 {
        self.strength
    }

    #[inline]
    pub fn dexterity(&self) -> u32 {
        self.dexterity
    }

    #[inline]
    pub fn intelligence(&self) -> u32 {
        self.intelligence
    }

    #[inline]
    pub fn skill_points(&self) -> u32 {
        self.skill_points
    }

    #[inline]
    pub fn hp_regen(&self) -> f64 {
        self.hp_regen
    }

    #[inline]
    pub fn mana(&self) -> f64 {
        self.mana
    }

    #[inline]
    pub fn max_mana(&self) -> f64 {
        self.max_mana
    }

    #[inline]
    pub fn mana_regen(&self) -> f64 {
        self.mana_regen
    }

    #[inline]
    pub fn crit_chance(&self) -> f64 {
        self.crit_chance
    }

    #[inline]
    pub fn crit_damage(&self) -> f64 {
        self.crit_damage
    }

    #[inline]
    pub fn evasion(&self) -> f64 {
        self.evasion
    }

    #[inline]
    pub fn bonus_spell_damage(&self) -> f64 {
        self.bonus_spell_damage
    }

    #[inline]
    pub fn quest(&self) -> Option<&str> {
        self.quest.as_deref()
    }

    #[inline]
    pub fn quest_progress(&self) -> u32 {
        self.quest_progress
    }

    #[inline]
    pub fn equipped_spells(&self) -> &[String] {
        &self.equipped_spells
    }

    #[inline]
    pub fn is_downed(&self) -> bool {
        self.hp <= 0.0
    }

    // =========================================================================
    // Vitals
    // =========================================================================

    /// Restores hp up to max and returns what was actually gained.
    pub fn heal(&mut self, amount: f64) -> f64 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp);
        (self.hp - before).max(0.0)
    }

    /// Restores mana up to max and returns what was actually gained.
    pub fn restore_mana(&mut self, amount: f64) -> f64 {
        let before = self.mana;
        self.mana = (self.mana + amount.max(0.0)).min(self.max_mana);
        (self.mana - before).max(0.0)
    }

    pub fn spend_mana(&mut self, cost: f64) {
        self.mana = (self.mana - cost).max(0.0);
    }

    pub fn take_damage(&mut self, amount: f64) {
        self.hp -= amount.max(0.0);
    }

    /// Sets hp directly, capped at max. Used by revival.
    pub fn revive_to(&mut self, hp: f64) {
        self.hp = hp.min(self.max_hp);
    }

    pub fn restore_full(&mut self) {
        self.hp = self.max_hp;
        self.mana = self.max_mana;
    }

    // =========================================================================
    // Progression
    // =========================================================================

    /// Adds experience and applies every level-up it pays for.
    pub fn gain_experience(&mut self, exp: u32) -> LevelUp {
        let start_level = self.level;
        self.exp = self.exp.saturating_add(exp);
        while self.exp >= self.exp_to_next {
            self.exp -= self.exp_to_next;
            self.level += 1;
            self.atk = round_to(self.atk + 0.3, 2);
            self.defense = round_to(self.defense + 0.2, 2);
            self.max_hp = round_to(self.max_hp + 2.5, 2);
            self.hp = self.max_hp;
            self.skill_points += 2;
            self.exp_to_next = exp_threshold(self.level);
        }
        LevelUp {
            levels_gained: self.level - start_level,
            new_level: self.level,
            class_unlocked: self.class.is_none()
                && start_level < CLASS_UNLOCK_LEVEL
                && self.level >= CLASS_UNLOCK_LEVEL,
        }
    }

    /// Spends `amount` skill points on `stat`.
    ///
    /// Gains shrink with level: each point is worth `0.8 + 0.2 / sqrt(level)`.
    pub fn spend_points(&mut self, stat: StatKind, amount: u32) -> Result<(), DomainError> {
        if amount == 0 || amount > self.skill_points {
            return Err(DomainError::validation(format!(
                "You have {} skill points. Specify a valid amount to spend.",
                self.skill_points
            )));
        }
        let scaling = 0.8 + 0.2 / f64::from(self.level.max(1)).sqrt();
        let n = f64::from(amount);
        match stat {
            StatKind::Strength => {
                self.strength += amount;
                self.max_hp = round_to(self.max_hp + 0.6 * scaling * n, 1);
                self.hp_regen = round_to(self.hp_regen + 0.3 * scaling * n, 1);
                self.atk = round_to(self.atk + 0.1 * scaling * n, 1);
            }
            StatKind::Dexterity => {
                self.dexterity += amount;
                self.crit_chance = round_to((self.crit_chance + 0.0025 * scaling * n).min(0.5), 3);
                self.crit_damage = round_to((self.crit_damage + 0.005 * scaling * n).min(5.0), 3);
                self.evasion = round_to((self.evasion + 0.0025 * scaling * n).min(0.5), 3);
                self.defense = round_to(self.defense + 0.1 * scaling * n, 1);
            }
            StatKind::Intelligence => {
                self.intelligence += amount;
                let before = self.max_mana;
                self.max_mana = round_to(self.max_mana + 0.7 * scaling * n, 1);
                self.mana_regen = round_to(self.mana_regen + 0.03 * scaling * n, 3);
                self.bonus_spell_damage =
                    round_to(self.bonus_spell_damage + 0.5 * scaling * n, 1);
                self.mana = (self.mana + (self.max_mana - before)).min(self.max_mana);
            }
        }
        self.skill_points -= amount;
        Ok(())
    }

    /// Picks a class and applies its one-time bonuses.
    ///
    /// Returns the class's starter weapon; the caller owns inventory placement.
    pub fn choose_class(&mut self, class: CharacterClass) -> Result<&'static str, DomainError> {
        if let Some(existing) = self.class {
            return Err(DomainError::constraint(format!(
                "You have already chosen the {existing} class"
            )));
        }
        if self.level < CLASS_UNLOCK_LEVEL {
            return Err(DomainError::validation(format!(
                "You must reach level {CLASS_UNLOCK_LEVEL} to choose a class"
            )));
        }
        match class {
            CharacterClass::Warrior => {
                self.max_hp += 4.0;
                self.atk += 0.3;
                self.defense += 1.0;
                self.hp_regen += 0.1;
                self.strength += 1;
            }
            CharacterClass::Assassin => {
                self.dexterity += 1;
                self.crit_chance += 0.02;
                self.crit_damage += 0.05;
                self.evasion += 0.01;
                self.atk += 0.5;
            }
            CharacterClass::Mage => {
                self.max_mana += 7.0;
                self.mana_regen += 0.7;
                self.intelligence += 1;
                self.bonus_spell_damage += 1.5;
            }
        }
        self.class = Some(class);
        let starter = class.starter_weapon();
        if self.weapon.is_none() {
            self.weapon = Some(starter.to_string());
        }
        Ok(starter)
    }

    // =========================================================================
    // Loadout
    // =========================================================================

    /// Equips a weapon and hands back the one it replaced.
    pub fn equip_weapon(&mut self, weapon: impl Into<String>) -> Option<String> {
        self.weapon.replace(weapon.into())
    }

    pub fn unequip_weapon(&mut self) -> Option<String> {
        self.weapon.take()
    }

    pub fn equip_spell(&mut self, spell: impl Into<String>) -> Result<(), DomainError> {
        let spell = spell.into();
        if self.equipped_spells.iter().any(|s| s == &spell) {
            return Err(DomainError::constraint(format!(
                "{spell} is already equipped"
            )));
        }
        if self.equipped_spells.len() >= MAX_EQUIPPED_SPELLS {
            return Err(DomainError::constraint(format!(
                "You can only equip up to {MAX_EQUIPPED_SPELLS} spells"
            )));
        }
        self.equipped_spells.push(spell);
        Ok(())
    }

    pub fn unequip_spell(&mut self, spell: &str) -> Result<(), DomainError> {
        let before = self.equipped_spells.len();
        self.equipped_spells.retain(|s| s != spell);
        if self.equipped_spells.len() == before {
            return Err(DomainError::not_found("Equipped spell", spell));
        }
        Ok(())
    }

    // =========================================================================
    // Quests
    // =========================================================================

    pub fn accept_quest(&mut self, quest: impl Into<String>) -> Result<(), DomainError> {
        if let Some(active) = &self.quest {
            return Err(DomainError::constraint(format!(
                "You already have an active quest: {active}"
            )));
        }
        self.quest = Some(quest.into());
        self.quest_progress = 0;
        Ok(())
    }

    /// Bumps progress and returns the new count.
    pub fn advance_quest(&mut self) -> u32 {
        self.quest_progress += 1;
        self.quest_progress
    }

    pub fn clear_quest(&mut self) -> Option<String> {
        self.quest_progress = 0;
        self.quest.take()
    }

    // =========================================================================
    // Consumables
    // =========================================================================

    /// Applies a consumable's restoration to this combatant.
    ///
    /// Status side effects are returned, not applied; statuses live on the
    /// encounter session.
    pub fn consume(&mut self, effect: &ConsumableEffect, rng: &dyn RandomSource) -> ConsumeOutcome {
        let mut outcome = ConsumeOutcome::default();

        let mut hp_gain = 0.0;
        if let Some(range) = effect.hp {
            hp_gain += f64::from(rng.gen_range(range.min, range.max));
            hp_gain += match effect.strength_bonus {
                StrengthBonus::None => 0.0,
                StrengthBonus::Full => f64::from(self.strength),
                StrengthBonus::Half => f64::from(self.strength / 2),
            };
            if effect.regen_bonus {
                hp_gain += self.hp_regen.floor();
            }
        }
        if let Some(fraction) = effect.hp_fraction {
            hp_gain += (self.max_hp * fraction).floor();
        }
        if hp_gain > 0.0 {
            outcome.hp_restored = self.heal(hp_gain);
        }

        if let Some(range) = effect.mana {
            let mut mana_gain = f64::from(rng.gen_range(range.min, range.max));
            if effect.intelligence_bonus {
                mana_gain += f64::from(self.intelligence);
            }
            outcome.mana_restored = self.restore_mana(mana_gain);
        }

        outcome.cured = effect.cures;
        if let Some(risk) = effect.risk {
            if rng.chance(risk.chance) {
                outcome.afflicted = Some((risk.status, risk.turns));
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RollRange;
    use crate::random::testing::ScriptedRandom;

    #[test]
    fn new_combatant_has_starting_stats() {
        let c = Combatant::new();
        assert_eq!(c.level(), 1);
        assert_eq!(c.exp_to_next(), 27);
        assert_eq!((c.hp(), c.max_hp()), (20.0, 20.0));
        assert_eq!(c.atk(), 5.0);
        assert_eq!(c.defense(), 2.0);
        assert_eq!(c.skill_points(), 5);
        assert_eq!((c.mana(), c.max_mana()), (5.0, 5.0));
        assert!(c.class().is_none());
    }

    #[test]
    fn threshold_follows_curve() {
        assert_eq!(exp_threshold(1), 27);
        assert_eq!(exp_threshold(2), 39);
        assert_eq!(exp_threshold(4), 76);
    }

    #[test]
    fn experience_levels_up_repeatedly() {
        let mut c = Combatant::new().with_hp(3.0, 20.0);
        let report = c.gain_experience(27 + 39 + 5);
        assert_eq!(report.levels_gained, 2);
        assert_eq!(report.new_level, 3);
        assert!(report.class_unlocked);
        assert_eq!(c.exp(), 5);
        assert_eq!(c.max_hp(), 25.0);
        assert_eq!(c.hp(), 25.0);
        assert_eq!(c.skill_points(), 9);
        assert!((c.atk() - 5.6).abs() < 1e-9);
    }

    #[test]
    fn class_unlock_not_reported_when_class_chosen() {
        let mut c = Combatant::new()
            .with_level(2)
            .with_class(CharacterClass::Mage);
        assert!(!c.gain_experience(39).class_unlocked);
    }

    #[test]
    fn spend_rejects_more_than_available() {
        let mut c = Combatant::new();
        assert!(c.spend_points(StatKind::Strength, 6).is_err());
        assert!(c.spend_points(StatKind::Strength, 0).is_err());
        assert_eq!(c.skill_points(), 5);
    }

    #[test]
    fn spend_strength_at_level_one() {
        let mut c = Combatant::new();
        c.spend_points(StatKind::Strength, 5).expect("enough points");
        assert_eq!(c.strength(), 5);
        assert_eq!(c.max_hp(), 23.0);
        assert_eq!(c.hp_regen(), 2.0);
        assert_eq!(c.atk(), 5.5);
        assert_eq!(c.skill_points(), 0);
    }

    #[test]
    fn spend_intelligence_raises_current_mana() {
        let mut c = Combatant::new().with_mana(2.0, 5.0);
        c.spend_points(StatKind::Intelligence, 2).expect("enough points");
        assert_eq!(c.max_mana(), 6.4);
        assert!((c.mana() - 3.4).abs() < 1e-9);
        assert_eq!(c.bonus_spell_damage(), 1.0);
    }

    #[test]
    fn class_requires_level_three_and_is_chosen_once() {
        let mut c = Combatant::new();
        assert!(c.choose_class(CharacterClass::Warrior).is_err());

        let mut c = Combatant::new().with_level(3);
        let starter = c.choose_class(CharacterClass::Warrior).expect("level 3");
        assert_eq!(starter, "Iron Sword");
        assert_eq!(c.weapon(), Some("Iron Sword"));
        assert_eq!(c.max_hp(), 24.0);
        assert_eq!(c.strength(), 1);
        assert!(c.choose_class(CharacterClass::Mage).is_err());
    }

    #[test]
    fn class_keeps_existing_weapon() {
        let mut c = Combatant::new().with_level(5).with_weapon("Vampire Fang");
        c.choose_class(CharacterClass::Assassin).expect("level 5");
        assert_eq!(c.weapon(), Some("Vampire Fang"));
    }

    #[test]
    fn spells_cap_at_five_without_duplicates() {
        let mut c = Combatant::new();
        for name in ["a", "b", "c", "d", "e"] {
            c.equip_spell(name).expect("room left");
        }
        assert!(c.equip_spell("f").is_err());
        c.unequip_spell("c").expect("equipped");
        assert!(c.equip_spell("a").is_err());
        assert!(c.unequip_spell("zzz").is_err());
    }

    #[test]
    fn heal_never_exceeds_max() {
        let mut c = Combatant::new().with_hp(15.0, 20.0);
        assert_eq!(c.heal(50.0), 5.0);
        assert_eq!(c.hp(), 20.0);
    }

    #[test]
    fn consume_rolls_heal_and_reports_risk() {
        let mut c = Combatant::new()
            .with_hp(5.0, 20.0)
            .with_attributes(4, 0, 0);
        let effect = ConsumableEffect {
            hp: Some(RollRange::new(4, 8)),
            strength_bonus: StrengthBonus::Half,
            risk: Some(crate::catalog::ConsumableRisk {
                chance: 0.4,
                status: Status::Poison,
                turns: 2,
            }),
            ..ConsumableEffect::default()
        };
        let rng = ScriptedRandom::new().with_ints([6]).with_units([0.1]);
        let outcome = c.consume(&effect, &rng);
        assert_eq!(outcome.hp_restored, 8.0);
        assert_eq!(outcome.afflicted, Some((Status::Poison, 2)));
        assert_eq!(c.hp(), 13.0);
    }

    #[test]
    fn quest_slot_is_exclusive() {
        let mut c = Combatant::new();
        c.accept_quest("Blade Practice").expect("empty slot");
        assert!(c.accept_quest("Other").is_err());
        assert_eq!(c.advance_quest(), 1);
        assert_eq!(c.clear_quest().as_deref(), Some("Blade Practice"));
        assert_eq!(c.quest_progress(), 0);
    }
}
