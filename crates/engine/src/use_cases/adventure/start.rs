//! Start adventure use case.

use std::sync::Arc;

use tabletop_domain::{Catalog, Combatant, UserId};

use crate::infrastructure::ports::{RecordStore, WriteBatch};
use crate::stores::RecordLocks;
use crate::use_cases::views::CharacterSheet;

use super::error::AdventureError;

/// Creates a fresh level-1 progression record.
pub struct StartAdventure {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    locks: Arc<RecordLocks>,
}

impl StartAdventure {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        locks: Arc<RecordLocks>,
    ) -> Self {
        Self {
            records,
            catalog,
            locks,
        }
    }

    pub async fn execute(&self, user_id: UserId) -> Result<CharacterSheet, AdventureError> {
        let _record = self.locks.lock(user_id).await;
        if self.records.get_combatant(user_id).await?.is_some() {
            return Err(AdventureError::AlreadyStarted);
        }

        let combatant = Combatant::new();
        let mut batch = WriteBatch::new();
        batch.upsert_combatant(user_id, combatant.clone());
        self.records.commit(batch).await?;

        let inventory = self.records.get_inventory(user_id).await?;
        tracing::info!(user_id = %user_id, "Adventure started");
        Ok(CharacterSheet::new(
            &self.catalog,
            user_id,
            combatant,
            &inventory,
        ))
    }
}
