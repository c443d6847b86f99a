//! Guild raid lifecycle.
//!
//! `NoBoss -> Active -> Defeated | Expired -> NoBoss`, with every transition
//! checked. A stored raid record is classified into a state on load, so the
//! rest of the engine never reasons about raw timestamps.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::session::EncounterSession;
use crate::ids::{GuildId, UserId};

/// How long a raid boss stays up.
pub const RAID_LIFETIME: Duration = Duration::days(7);

/// How long a player sits out after a raid defeat or victory.
pub const RAID_COOLDOWN: Duration = Duration::hours(24);

/// Cooldown key for raid participation in `guild`.
pub fn raid_cooldown_key(guild: GuildId) -> String {
    format!("rpgraid_{guild}")
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RaidError {
    #[error("A raid is already active in this guild until {ends_at}.")]
    AlreadyActive { ends_at: DateTime<Utc> },
    #[error("There is no active raid boss.")]
    NoActiveRaid,
    #[error("Cannot {action} a raid that is {from}.")]
    InvalidTransition {
        from: RaidPhase,
        action: &'static str,
    },
}

/// Persisted raid: the boss encounter plus when it spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRaid {
    pub session: EncounterSession,
    pub spawned_at: DateTime<Utc>,
}

impl ActiveRaid {
    pub fn new(session: EncounterSession, spawned_at: DateTime<Utc>) -> Self {
        Self {
            session,
            spawned_at,
        }
    }

    pub fn guild(&self) -> GuildId {
        self.session.guild()
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.spawned_at + RAID_LIFETIME
    }

    pub fn is_participant(&self, user: UserId) -> bool {
        self.session.is_participant(user)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RaidPhase {
    NoBoss,
    Active,
    Defeated,
    Expired,
}

impl fmt::Display for RaidPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RaidPhase::NoBoss => "absent",
            RaidPhase::Active => "active",
            RaidPhase::Defeated => "defeated",
            RaidPhase::Expired => "expired",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RaidState {
    NoBoss,
    Active(ActiveRaid),
    Defeated(ActiveRaid),
    Expired(ActiveRaid),
}

impl RaidState {
    /// Classifies a stored record at `now`.
    pub fn from_record(record: Option<ActiveRaid>, now: DateTime<Utc>) -> Self {
        match record {
            None => RaidState::NoBoss,
            Some(raid) if raid.session.monster().is_defeated() => RaidState::Defeated(raid),
            Some(raid) if now >= raid.ends_at() => RaidState::Expired(raid),
            Some(raid) => RaidState::Active(raid),
        }
    }

    pub fn phase(&self) -> RaidPhase {
        match self {
            RaidState::NoBoss => RaidPhase::NoBoss,
            RaidState::Active(_) => RaidPhase::Active,
            RaidState::Defeated(_) => RaidPhase::Defeated,
            RaidState::Expired(_) => RaidPhase::Expired,
        }
    }

    pub fn active(&self) -> Option<&ActiveRaid> {
        match self {
            RaidState::Active(raid) => Some(raid),
            _ => None,
        }
    }

    /// Takes the live raid out, failing unless the boss is up.
    pub fn into_active(self) -> Result<ActiveRaid, RaidError> {
        match self {
            RaidState::Active(raid) => Ok(raid),
            _ => Err(RaidError::NoActiveRaid),
        }
    }

    /// Starts a new raid. Finished or expired raids are replaced.
    pub fn spawn(self, raid: ActiveRaid) -> Result<RaidState, RaidError> {
        match self {
            RaidState::Active(current) => Err(RaidError::AlreadyActive {
                ends_at: current.ends_at(),
            }),
            RaidState::NoBoss | RaidState::Defeated(_) | RaidState::Expired(_) => {
                Ok(RaidState::Active(raid))
            }
        }
    }

    pub fn defeat(self) -> Result<RaidState, RaidError> {
        match self {
            RaidState::Active(raid) if raid.session.monster().is_defeated() => {
                Ok(RaidState::Defeated(raid))
            }
            other => Err(RaidError::InvalidTransition {
                from: other.phase(),
                action: "defeat",
            }),
        }
    }

    pub fn expire(self, now: DateTime<Utc>) -> Result<RaidState, RaidError> {
        match self {
            RaidState::Active(raid) if now >= raid.ends_at() => Ok(RaidState::Expired(raid)),
            other => Err(RaidError::InvalidTransition {
                from: other.phase(),
                action: "expire",
            }),
        }
    }

    pub fn clear(self) -> Result<RaidState, RaidError> {
        match self {
            RaidState::Defeated(_) | RaidState::Expired(_) | RaidState::NoBoss => {
                Ok(RaidState::NoBoss)
            }
            RaidState::Active(_) => Err(RaidError::InvalidTransition {
                from: RaidPhase::Active,
                action: "clear",
            }),
        }
    }
}
