//! Typed combat events.
//!
//! The resolver narrates a turn as an ordered list of these; rendering them
//! into chat messages is the caller's business.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::signature::SignatureAttack;
use super::status::Status;
use super::weapon_effects::WeaponEffectOutcome;
use crate::ids::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "user_id", rename_all = "snake_case")]
pub enum StatusTarget {
    Player(UserId),
    Monster,
}

/// What a player lost when dropping to 0 hp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefeatPenalty {
    /// Progression record deleted, RPG items stripped.
    ProgressLost { items_lost: u32 },
    /// Restored to full and benched from the raid.
    RaidCooldown { until: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    Initiative {
        player_first: bool,
    },
    PlayerIncapacitated {
        user_id: UserId,
    },
    PlayerBled {
        user_id: UserId,
        damage: f64,
    },
    MonsterAfflicted {
        status: Status,
        damage: f64,
        monster_hp: f64,
    },
    MonsterLosesTurn {
        status: Status,
    },
    MonsterEvaded {
        user_id: UserId,
    },
    PlayerHit {
        user_id: UserId,
        damage: f64,
        critical: bool,
        monster_hp: f64,
    },
    WeaponEffect {
        user_id: UserId,
        weapon: String,
        outcome: WeaponEffectOutcome,
    },
    CurseBonus {
        user_id: UserId,
        damage: f64,
    },
    SpellCast {
        user_id: UserId,
        spell: String,
        mana_spent: f64,
    },
    SpellDamage {
        user_id: UserId,
        spell: String,
        damage: f64,
        critical: bool,
        monster_hp: f64,
    },
    Healed {
        user_id: UserId,
        amount: f64,
        hp: f64,
    },
    ManaRestored {
        user_id: UserId,
        amount: f64,
        mana: f64,
    },
    StatusApplied {
        target: StatusTarget,
        status: Status,
        turns: u32,
    },
    MonsterStunned {
        user_id: UserId,
    },
    MonsterTaunted {
        user_id: UserId,
    },
    MonsterStunSkipped,
    MonsterSkipsTurn,
    PlayerEvaded {
        user_id: UserId,
    },
    MonsterHit {
        user_id: UserId,
        damage: f64,
        critical: bool,
        hp: f64,
    },
    SignatureAttack {
        user_id: UserId,
        attack: SignatureAttack,
        damage: f64,
        hits: u32,
    },
    MonsterHealed {
        amount: f64,
        monster_hp: f64,
    },
    Revived {
        user_id: UserId,
        source: String,
        hp: f64,
    },
    PlayerDefeated {
        user_id: UserId,
        penalty: DefeatPenalty,
    },
    Regenerated {
        user_id: UserId,
        hp: f64,
        mana: f64,
    },
    MonsterRegenerated {
        amount: f64,
        monster_hp: f64,
    },
    MonsterDefeated {
        name: String,
        finisher: UserId,
    },
    ExperienceGained {
        user_id: UserId,
        exp: u32,
    },
    LevelUp {
        user_id: UserId,
        level: u32,
    },
    ClassUnlocked {
        user_id: UserId,
    },
    LootDropped {
        user_id: UserId,
        item: String,
    },
    NoLoot {
        user_id: UserId,
    },
    QuestProgress {
        quest: String,
        progress: u32,
        amount: u32,
    },
    QuestCompleted {
        quest: String,
        reward: String,
        recipients: Vec<UserId>,
    },
    TurnProgress {
        acted: usize,
        total: usize,
    },
    EnvironmentTurn {
        target: UserId,
    },
}
