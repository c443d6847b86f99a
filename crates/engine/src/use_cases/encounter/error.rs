//! Encounter command errors.

use tabletop_domain::CombatError;

use crate::infrastructure::ports::RepoError;

/// Errors that can occur while starting or fighting an encounter.
#[derive(Debug, thiserror::Error)]
pub enum EncounterError {
    #[error("You haven't started an adventure yet.")]
    NotStarted,
    #[error("You are already in a battle.")]
    AlreadyInBattle,
    #[error("You are not in a battle.")]
    NotInBattle,
    #[error("Only the party leader can start an encounter.")]
    NotLeader,
    #[error("{0}")]
    Combat(#[from] CombatError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
