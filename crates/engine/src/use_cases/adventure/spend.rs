//! Spend skill points use case.

use std::sync::Arc;

use tabletop_domain::{Catalog, StatKind, UserId};

use crate::infrastructure::ports::{RecordStore, WriteBatch};
use crate::stores::RecordLocks;
use crate::use_cases::views::CharacterSheet;

use super::error::AdventureError;

/// Converts unspent skill points into stats.
pub struct SpendPoints {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    locks: Arc<RecordLocks>,
}

impl SpendPoints {
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

    pub async fn execute(
        &self,
        user_id: UserId,
        stat: StatKind,
        amount: u32,
    ) -> Result<CharacterSheet, AdventureError> {
        let _record = self.locks.lock(user_id).await;
        let mut combatant = self
            .records
            .get_combatant(user_id)
            .await?
            .ok_or(AdventureError::NotStarted)?;

        combatant.spend_points(stat, amount)?;

        let mut batch = WriteBatch::new();
        batch.upsert_combatant(user_id, combatant.clone());
        self.records.commit(batch).await?;

        tracing::info!(user_id = %user_id, stat = %stat, amount, "Skill points spent");
        let inventory = self.records.get_inventory(user_id).await?;
        Ok(CharacterSheet::new(
            &self.catalog,
            user_id,
            combatant,
            &inventory,
        ))
    }
}
