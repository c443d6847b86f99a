//! Raid command errors.

use chrono::{DateTime, Utc};
use tabletop_domain::{CombatError, RaidError};

use crate::infrastructure::ports::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum RaidCommandError {
    #[error("You haven't started an adventure yet.")]
    NotStarted,
    #[error("You must be in a party to raid.")]
    NotInParty,
    #[error("Only the party leader can start a raid.")]
    NotLeader,
    #[error("You are recovering from the last raid until {until}.")]
    OnCooldown { until: DateTime<Utc> },
    #[error("{0}")]
    Raid(#[from] RaidError),
    #[error("{0}")]
    Combat(#[from] CombatError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
