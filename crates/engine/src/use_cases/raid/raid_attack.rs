//! Raid attack use case.

use std::sync::Arc;

use tabletop_domain::aggregates::raid::{raid_cooldown_key, RaidPhase, RAID_COOLDOWN};
use tabletop_domain::{
    Action, ActiveRaid, Catalog, EncounterResult, GuildId, RaidError, RaidState, TurnResolver,
    UserId,
};

use crate::infrastructure::ports::{ClockPort, RandomPort, RecordStore, WriteBatch, WriteOp};
use crate::stores::{RecordLocks, SessionKey, SessionStore};
use crate::use_cases::battle::{into_batch, load_roster, TurnReport};
use crate::use_cases::views::MonsterView;

use super::error::RaidCommandError;

/// Resolves one raid action against the guild's durable boss.
///
/// The boss lives in the record store, so every action reloads it under the
/// guild's raid lock and writes it back in the same batch as the players.
/// Participant records are locked for the same stretch.
pub struct RaidAttack {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
    locks: Arc<RecordLocks>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl RaidAttack {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
        locks: Arc<RecordLocks>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            records,
            catalog,
            sessions,
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
    ) -> Result<TurnReport, RaidCommandError> {
        let now = self.clock.now();
        if self.records.get_combatant(user_id).await?.is_none() {
            return Err(RaidCommandError::NotStarted);
        }
        let cooldown_key = raid_cooldown_key(guild_id);
        if let Some(used_at) = self.records.get_cooldown(user_id, &cooldown_key).await? {
            let until = used_at + RAID_COOLDOWN;
            if now < until {
                return Err(RaidCommandError::OnCooldown { until });
            }
        }

        let key = SessionKey::Raid { guild: guild_id };
        let slot = self.sessions.slot(key);
        let result = {
            let _guard = slot.lock().await;
            self.resolve_locked(guild_id, user_id, &action, target).await
        };
        drop(slot);
        self.sessions.release(&key);
        result
    }

    async fn resolve_locked(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        action: &Action,
        target: Option<&str>,
    ) -> Result<TurnReport, RaidCommandError> {
        let now = self.clock.now();
        let state = RaidState::from_record(self.records.load_raid(guild_id).await?, now);
        if matches!(state.phase(), RaidPhase::Defeated | RaidPhase::Expired) {
            let mut batch = WriteBatch::new();
            batch.push(WriteOp::ClearRaid(guild_id));
            self.records.commit(batch).await?;
            state.clear()?;
            tracing::info!(guild_id = %guild_id, "Stale raid cleared");
            return Err(RaidError::NoActiveRaid.into());
        }

        let ActiveRaid {
            session: mut working,
            spawned_at,
        } = state.into_active()?;
        let _records = self
            .locks
            .lock_all(working.participants().iter().copied())
            .await;
        let mut roster =
            load_roster(self.records.as_ref(), working.participants().iter().copied()).await?;
        let outcome = TurnResolver::new(
            &self.catalog,
            self.random.as_ref(),
            now,
            &mut working,
            &mut roster,
        )
        .resolve(user_id, action, target)?;

        let (mut batch, _) = into_batch(roster.into_changes());
        let monster = MonsterView::from(working.monster());
        match outcome.result {
            EncounterResult::Victory { finisher } => {
                RaidState::Active(ActiveRaid::new(working, spawned_at))
                    .defeat()?
                    .clear()?;
                batch.push(WriteOp::ClearRaid(guild_id));
                tracing::info!(guild_id = %guild_id, finisher = %finisher, "Raid boss defeated");
            }
            EncounterResult::Continuing | EncounterResult::Wiped => {
                batch.push(WriteOp::SaveRaid(ActiveRaid::new(working, spawned_at)));
            }
        }
        self.records.commit(batch).await?;

        tracing::debug!(
            user_id = %user_id,
            guild_id = %guild_id,
            boss_hp = monster.hp,
            "Raid action resolved"
        );
        Ok(TurnReport {
            events: outcome.events,
            outcome: outcome.result.into(),
            monster,
        })
    }
}
