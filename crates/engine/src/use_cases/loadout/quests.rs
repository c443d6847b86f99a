//! Quest board operations.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::{Catalog, Combatant, PartyError, QuestDef, UserId};

use crate::infrastructure::ports::{RecordStore, WriteBatch};
use crate::stores::{PartyStore, RecordLocks};
use crate::use_cases::views::QuestProgress;

use super::error::LoadoutError;

/// The caller's own quest and their party's, side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestLog {
    pub personal: Option<QuestProgress>,
    pub party: Option<QuestProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestAbandoned {
    pub name: String,
    pub shared: bool,
}

/// Quest commands. While in a party, new quests go to the party slot.
pub struct QuestOps {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    parties: Arc<PartyStore>,
    locks: Arc<RecordLocks>,
}

impl QuestOps {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        parties: Arc<PartyStore>,
        locks: Arc<RecordLocks>,
    ) -> Self {
        Self {
            records,
            catalog,
            parties,
            locks,
        }
    }

    async fn combatant(&self, user_id: UserId) -> Result<Combatant, LoadoutError> {
        self.records
            .get_combatant(user_id)
            .await?
            .ok_or(LoadoutError::NotStarted)
    }

    pub fn list(&self) -> Vec<QuestDef> {
        self.catalog.quests().to_vec()
    }

    pub async fn accept(&self, user_id: UserId, name: &str) -> Result<QuestProgress, LoadoutError> {
        let quest = self
            .catalog
            .quest(name)
            .ok_or_else(|| LoadoutError::UnknownQuest(name.to_string()))?;
        let _record = self.locks.lock(user_id).await;
        let mut combatant = self.combatant(user_id).await?;

        {
            let mut directory = self.parties.lock().await;
            let party_slot = directory
                .party_of(user_id)
                .map(|party| party.quest().map(|active| active.name.clone()));
            if let Some(slot) = party_slot {
                if let Some(active) = slot {
                    return Err(LoadoutError::PartyQuestActive(active));
                }
                let id = directory.set_quest(user_id, quest.name.clone())?;
                let slot = directory
                    .get(id)
                    .and_then(|party| party.quest())
                    .ok_or(PartyError::PartyNotFound(id))?;
                tracing::info!(party_id = %id, quest = %quest.name, "Party quest accepted");
                return QuestProgress::shared(&self.catalog, slot)
                    .ok_or_else(|| LoadoutError::UnknownQuest(quest.name.clone()));
            }
        }

        combatant.accept_quest(quest.name.clone())?;
        let progress = QuestProgress::personal(&self.catalog, &combatant)
            .ok_or_else(|| LoadoutError::UnknownQuest(quest.name.clone()))?;
        let mut batch = WriteBatch::new();
        batch.upsert_combatant(user_id, combatant);
        self.records.commit(batch).await?;
        tracing::info!(user_id = %user_id, quest = %quest.name, "Quest accepted");
        Ok(progress)
    }

    pub async fn status(&self, user_id: UserId) -> Result<QuestLog, LoadoutError> {
        let combatant = self.combatant(user_id).await?;
        let party = self.parties.party_of(user_id).await;
        Ok(QuestLog {
            personal: QuestProgress::personal(&self.catalog, &combatant),
            party: party
                .as_ref()
                .and_then(|party| party.quest())
                .and_then(|slot| QuestProgress::shared(&self.catalog, slot)),
        })
    }

    /// Drops the personal quest, or failing that the party quest when the
    /// caller leads the party.
    pub async fn abandon(&self, user_id: UserId) -> Result<QuestAbandoned, LoadoutError> {
        let _record = self.locks.lock(user_id).await;
        let mut combatant = self.combatant(user_id).await?;
        if let Some(name) = combatant.clear_quest() {
            let mut batch = WriteBatch::new();
            batch.upsert_combatant(user_id, combatant);
            self.records.commit(batch).await?;
            return Ok(QuestAbandoned {
                name,
                shared: false,
            });
        }

        let mut directory = self.parties.lock().await;
        let Some(party) = directory.party_of(user_id) else {
            return Err(LoadoutError::NoActiveQuest);
        };
        if party.quest().is_none() {
            return Err(LoadoutError::NoActiveQuest);
        }
        if !party.is_leader(user_id) {
            return Err(PartyError::NotLeader("abandon the party quest").into());
        }
        let id = party.id();
        let slot = directory
            .clear_quest(id)
            .ok_or(LoadoutError::NoActiveQuest)?;
        Ok(QuestAbandoned {
            name: slot.name,
            shared: true,
        })
    }
}
