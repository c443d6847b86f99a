//! Quit adventure use case.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::aggregates::LeaveOutcome;
use tabletop_domain::{Catalog, GuildId, Party, UserId};

use crate::infrastructure::ports::{RecordStore, WriteBatch, WriteOp};
use crate::stores::{PartyStore, RecordLocks, SessionKey, SessionStore};
use crate::use_cases::battle::withdraw_from_party_battle;

use super::error::AdventureError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuitReport {
    pub items_lost: u32,
    pub left_party: Option<LeaveOutcome>,
}

/// Abandons the adventure: progress and RPG items are gone for good.
pub struct QuitAdventure {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    sessions: Arc<SessionStore>,
    parties: Arc<PartyStore>,
    locks: Arc<RecordLocks>,
}

impl QuitAdventure {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        sessions: Arc<SessionStore>,
        parties: Arc<PartyStore>,
        locks: Arc<RecordLocks>,
    ) -> Self {
        Self {
            records,
            catalog,
            sessions,
            parties,
            locks,
        }
    }

    pub async fn execute(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<QuitReport, AdventureError> {
        if self.records.get_combatant(user_id).await?.is_none() {
            return Err(AdventureError::NotStarted);
        }

        // Out of every fight first, so no turn writes the record back.
        let left = {
            let mut directory = self.parties.lock().await;
            let party_id = directory.party_of(user_id).map(Party::id);
            match party_id {
                Some(id) => directory.leave(user_id).ok().map(|outcome| (id, outcome)),
                None => None,
            }
        };

        let solo = SessionKey::Solo {
            guild: guild_id,
            user: user_id,
        };
        {
            let slot = self.sessions.slot(solo);
            *slot.lock().await = None;
        }
        self.sessions.release(&solo);
        if let Some((party, _)) = left {
            let key = SessionKey::Party {
                guild: guild_id,
                party,
            };
            withdraw_from_party_battle(&self.sessions, key, user_id).await;
        }

        let _record = self.locks.lock(user_id).await;
        let mut inventory = self.records.get_inventory(user_id).await?;
        let items_lost = inventory.strip(|name| !self.catalog.is_rpg_item(name));

        let mut batch = WriteBatch::new();
        batch
            .push(WriteOp::DeleteCombatant { user_id })
            .put_inventory(user_id, inventory);
        self.records.commit(batch).await?;

        tracing::info!(user_id = %user_id, items_lost, "Adventure abandoned");
        Ok(QuitReport {
            items_lost,
            left_party: left.map(|(_, outcome)| outcome),
        })
    }
}
