//! Attack / cast use case for solo and party encounters.

use std::sync::Arc;

use tabletop_domain::{Action, BattleMode, Catalog, GuildId, TurnResolver, UserId};

use crate::infrastructure::ports::{ClockPort, RandomPort, RecordStore};
use crate::stores::{PartyStore, RecordLocks, SessionStore};
use crate::use_cases::battle::{find_battle, into_batch, load_roster, BattleGuard, TurnReport};
use crate::use_cases::views::MonsterView;

use super::error::EncounterError;

/// Resolves one player action against the fight the caller is in.
///
/// The turn runs on a copy of the session. Records are committed first and
/// the live session is only replaced once the write succeeded, so a failed
/// commit leaves the fight exactly as it was. Every participant's record
/// stays locked from load to commit.
pub struct TakeTurn {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
    parties: Arc<PartyStore>,
    locks: Arc<RecordLocks>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl TakeTurn {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
        parties: Arc<PartyStore>,
        locks: Arc<RecordLocks>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            records,
            catalog,
            sessions,
            parties,
            locks,
            clock,
            random,
        }
    }

    pub async fn execute(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        action: Action,
        target: Option<&str>,
    ) -> Result<TurnReport, EncounterError> {
        let mut battle = find_battle(&self.sessions, &self.parties, guild_id, user_id)
            .await
            .ok_or(EncounterError::NotInBattle)?;
        let result = self
            .resolve(&mut battle, guild_id, user_id, &action, target)
            .await;
        battle.finish(&self.sessions);
        result
    }

    async fn resolve(
        &self,
        battle: &mut BattleGuard,
        guild_id: GuildId,
        user_id: UserId,
        action: &Action,
        target: Option<&str>,
    ) -> Result<TurnReport, EncounterError> {
        let Some(session) = battle.session() else {
            return Err(EncounterError::NotInBattle);
        };
        let party_id = session.party_id();
        let _records = self
            .locks
            .lock_all(session.participants().iter().copied())
            .await;
        let mut roster =
            load_roster(self.records.as_ref(), session.participants().iter().copied()).await?;
        let mut loaded_quest = None;
        if session.mode() == BattleMode::Party {
            if let Some(id) = party_id {
                loaded_quest = self.parties.get(id).await.and_then(|p| p.quest().cloned());
                roster = roster.with_party_quest(loaded_quest.clone());
            }
        }

        let mut working = session.clone();
        let outcome = TurnResolver::new(
            &self.catalog,
            self.random.as_ref(),
            self.clock.now(),
            &mut working,
            &mut roster,
        )
        .resolve(user_id, action, target)?;

        let (batch, party_quest) = into_batch(roster.into_changes());
        self.records.commit(batch).await?;

        if let (Some(id), Some(quest)) = (party_id, party_quest) {
            match self
                .parties
                .lock()
                .await
                .settle_quest(id, loaded_quest.as_ref(), quest)
            {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(party_id = %id, "Party quest changed mid-turn, progress dropped");
                }
                Err(e) => {
                    tracing::warn!(party_id = %id, error = %e, "Party disbanded before quest progress was saved");
                }
            }
        }

        let monster = MonsterView::from(working.monster());
        let finished = outcome.result.is_over();
        *battle.guard = if finished { None } else { Some(working) };

        tracing::debug!(
            user_id = %user_id,
            guild_id = %guild_id,
            events = outcome.events.len(),
            monster_hp = monster.hp,
            finished,
            "Turn resolved"
        );

        Ok(TurnReport {
            events: outcome.events,
            outcome: outcome.result.into(),
            monster,
        })
    }
}
