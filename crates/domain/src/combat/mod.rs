//! Encounter combat: statuses, monsters, effects, turn resolution and rewards.

pub mod error;
pub mod events;
pub mod monster;
pub mod regen;
pub mod resolver;
pub mod rewards;
pub mod session;
pub mod signature;
pub mod spawn;
pub mod status;
pub mod target;
pub mod weapon_effects;

pub use error::CombatError;
pub use events::{CombatEvent, DefeatPenalty, StatusTarget};
pub use monster::{DebuffTick, MonsterInstance};
pub use regen::{regenerate, RegenAccumulator};
pub use resolver::{
    Action, CooldownGrant, EncounterResult, Roster, RosterChanges, TurnOutcome, TurnResolver,
};
pub use rewards::{roll_loot, QuestReport};
pub use session::{BattleMode, EncounterSession};
pub use signature::{SignatureAttack, SignatureEffect};
pub use spawn::{choose_rarity, rarity_odds, spawn_encounter, spawn_raid_boss};
pub use status::{Modifiers, Status, StatusMap};
pub use target::{resolve_target, Target};
pub use weapon_effects::{apply_weapon_effect, EffectInput, WeaponEffect, WeaponEffectOutcome};
