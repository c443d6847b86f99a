//! Start encounter use case.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::combat::spawn_encounter;
use tabletop_domain::{BattleMode, Catalog, EncounterSession, GuildId, UserId};

use crate::infrastructure::ports::{RandomPort, RecordStore};
use crate::stores::{PartyStore, SessionKey, SessionStore};
use crate::use_cases::views::MonsterView;

use super::error::EncounterError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncounterStarted {
    pub mode: BattleMode,
    pub monster: MonsterView,
    pub participants: Vec<UserId>,
}

/// Spawns a monster for the caller, or for the caller's whole party.
///
/// A party of one fights solo. Members without a progression record stay out
/// of the fight and out of the level average.
pub struct StartEncounter {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
    parties: Arc<PartyStore>,
    random: Arc<dyn RandomPort>,
}

impl StartEncounter {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
        parties: Arc<PartyStore>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            records,
            catalog,
            sessions,
            parties,
            random,
        }
    }

    pub async fn execute(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<EncounterStarted, EncounterError> {
        if self.records.get_combatant(user_id).await?.is_none() {
            return Err(EncounterError::NotStarted);
        }

        let party = self
            .parties
            .party_of(user_id)
            .await
            .filter(|party| party.size() > 1);
        let (key, members) = match &party {
            Some(party) => {
                if !party.is_leader(user_id) {
                    return Err(EncounterError::NotLeader);
                }
                let key = SessionKey::Party {
                    guild: guild_id,
                    party: party.id(),
                };
                (key, party.members().iter().copied().collect::<Vec<_>>())
            }
            None => (
                SessionKey::Solo {
                    guild: guild_id,
                    user: user_id,
                },
                vec![user_id],
            ),
        };

        let party_size = members.len();
        let mut fighters = Vec::with_capacity(party_size);
        let mut level_sum = 0u32;
        for member in members {
            if let Some(combatant) = self.records.get_combatant(member).await? {
                level_sum += combatant.level();
                fighters.push(member);
            }
        }
        let fighter_count = u32::try_from(fighters.len()).unwrap_or(u32::MAX).max(1);
        let avg_level = level_sum / fighter_count;

        let slot = self.sessions.slot(key);
        let result = {
            let mut guard = slot.lock().await;
            if guard.is_some() {
                Err(EncounterError::AlreadyInBattle)
            } else {
                match spawn_encounter(&self.catalog, avg_level, party_size, self.random.as_ref()) {
                    Ok(monster) => {
                        let session = match &party {
                            Some(party) => EncounterSession::party(
                                guild_id,
                                party.id(),
                                monster,
                                fighters.iter().copied(),
                            ),
                            None => EncounterSession::solo(guild_id, user_id, monster),
                        };
                        let started = EncounterStarted {
                            mode: session.mode(),
                            monster: MonsterView::from(session.monster()),
                            participants: session.participants().iter().copied().collect(),
                        };
                        *guard = Some(session);
                        Ok(started)
                    }
                    Err(e) => Err(EncounterError::from(e)),
                }
            }
        };
        drop(slot);
        self.sessions.release(&key);

        if let Ok(started) = &result {
            tracing::info!(
                user_id = %user_id,
                guild_id = %guild_id,
                monster = %started.monster.name,
                fighters = started.participants.len(),
                avg_level,
                "Encounter started"
            );
        }
        result
    }
}
