use thiserror::Error;

use crate::ids::UserId;

/// Reasons a combat action is rejected before anything changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    #[error("You must choose a class to use spells.")]
    NoClass,
    #[error("Spell '{0}' not found. Check your class spell list.")]
    UnknownSpell(String),
    #[error("Not enough mana! You have {have:.1}/{max:.1} mana, {cost:.1} needed.")]
    InsufficientMana { have: f64, max: f64, cost: f64 },
    #[error("You cannot target yourself with damaging spells.")]
    SelfTargetedDamage,
    #[error("You have already acted this turn. Wait for the rest of your party.")]
    AlreadyActed,
    #[error("You are not part of this fight.")]
    NotParticipant,
    #[error("No adventurer record for user {0}.")]
    MissingCombatant(UserId),
    #[error("No monsters are available to spawn.")]
    NoMonsters,
    #[error("No raid bosses are configured.")]
    NoRaidBoss,
    #[error("User {0} is not in this fight.")]
    UnknownAlly(UserId),
    #[error("The monster has already been defeated.")]
    MonsterDefeated,
}
