//! Retreat use case.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::{BattleMode, GuildId, UserId};

use crate::stores::{PartyStore, SessionStore};
use crate::use_cases::battle::find_battle;

use super::error::EncounterError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Retreated {
    pub mode: BattleMode,
    pub monster: String,
}

/// Abandons the caller's fight. In a party fight everyone leaves with them.
pub struct Retreat {
    sessions: Arc<SessionStore>,
    parties: Arc<PartyStore>,
}

impl Retreat {
    pub fn new(sessions: Arc<SessionStore>, parties: Arc<PartyStore>) -> Self {
        Self { sessions, parties }
    }

    pub async fn execute(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Retreated, EncounterError> {
        let mut battle = find_battle(&self.sessions, &self.parties, guild_id, user_id)
            .await
            .ok_or(EncounterError::NotInBattle)?;
        let session = battle.guard.take();
        battle.finish(&self.sessions);

        let session = session.ok_or(EncounterError::NotInBattle)?;
        tracing::info!(
            user_id = %user_id,
            guild_id = %guild_id,
            monster = %session.monster().name(),
            "Retreated from encounter"
        );
        Ok(Retreated {
            mode: session.mode(),
            monster: session.monster().name().to_string(),
        })
    }
}
