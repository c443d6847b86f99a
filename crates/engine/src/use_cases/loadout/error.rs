//! Loadout command errors.

use tabletop_domain::{DomainError, PartyError};

use crate::infrastructure::ports::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum LoadoutError {
    #[error("You haven't started an adventure yet.")]
    NotStarted,
    #[error("Weapon '{0}' not found.")]
    UnknownWeapon(String),
    #[error("You don't have a {0}.")]
    NotOwned(String),
    #[error("You have no weapon equipped.")]
    NoWeaponEquipped,
    #[error("You must choose a class to use spells.")]
    NoClass,
    #[error("Spell '{0}' not found. Check your class spell list.")]
    UnknownSpell(String),
    #[error("Quest '{0}' not found.")]
    UnknownQuest(String),
    #[error("Your party is already on a quest: {0}")]
    PartyQuestActive(String),
    #[error("You don't have an active quest.")]
    NoActiveQuest,
    #[error("{0}")]
    Validation(#[from] DomainError),
    #[error("{0}")]
    Party(#[from] PartyError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
