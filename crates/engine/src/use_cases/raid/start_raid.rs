//! Start raid use case.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabletop_domain::combat::spawn_raid_boss;
use tabletop_domain::{
    ActiveRaid, Catalog, EncounterSession, GuildId, PartyId, RaidState, UserId,
};

use crate::infrastructure::ports::{ClockPort, RandomPort, RecordStore, WriteBatch, WriteOp};
use crate::stores::{PartyStore, SessionKey, SessionStore};
use crate::use_cases::views::MonsterView;

use super::error::RaidCommandError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaidStarted {
    pub boss: MonsterView,
    pub participants: Vec<UserId>,
    pub ends_at: DateTime<Utc>,
}

/// Summons a guild raid boss for the caller's party.
pub struct StartRaid {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
    parties: Arc<PartyStore>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl StartRaid {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
        parties: Arc<PartyStore>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            records,
            catalog,
            sessions,
            parties,
            clock,
            random,
        }
    }

    pub async fn execute(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<RaidStarted, RaidCommandError> {
        if self.records.get_combatant(user_id).await?.is_none() {
            return Err(RaidCommandError::NotStarted);
        }
        let party = self
            .parties
            .party_of(user_id)
            .await
            .ok_or(RaidCommandError::NotInParty)?;
        if !party.is_leader(user_id) {
            return Err(RaidCommandError::NotLeader);
        }

        let mut fighters = Vec::with_capacity(party.size());
        for member in party.members().iter().copied() {
            if self.records.get_combatant(member).await?.is_some() {
                fighters.push(member);
            }
        }

        let key = SessionKey::Raid { guild: guild_id };
        let slot = self.sessions.slot(key);
        let result = {
            let _guard = slot.lock().await;
            self.spawn_locked(guild_id, party.id(), party.size(), fighters)
                .await
        };
        drop(slot);
        self.sessions.release(&key);

        if let Ok(started) = &result {
            tracing::info!(
                guild_id = %guild_id,
                party_id = %party.id(),
                boss = %started.boss.name,
                boss_hp = started.boss.max_hp,
                "Raid boss summoned"
            );
        }
        result
    }

    async fn spawn_locked(
        &self,
        guild_id: GuildId,
        party_id: PartyId,
        party_size: usize,
        fighters: Vec<UserId>,
    ) -> Result<RaidStarted, RaidCommandError> {
        let now = self.clock.now();
        let state = RaidState::from_record(self.records.load_raid(guild_id).await?, now);
        let boss = spawn_raid_boss(&self.catalog, party_size, self.random.as_ref())?;
        let session = EncounterSession::raid(guild_id, party_id, boss, fighters);
        let raid = ActiveRaid::new(session, now);
        let started = RaidStarted {
            boss: MonsterView::from(raid.session.monster()),
            participants: raid.session.participants().iter().copied().collect(),
            ends_at: raid.ends_at(),
        };
        let state = state.spawn(raid)?;
        let raid = state.into_active()?;

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::SaveRaid(raid));
        self.records.commit(batch).await?;
        Ok(started)
    }
}
