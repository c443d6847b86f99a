//! Choose class use case.

use std::sync::Arc;

use serde::Serialize;
use tabletop_domain::{Catalog, CharacterClass, UserId};

use crate::infrastructure::ports::{RecordStore, WriteBatch};
use crate::stores::RecordLocks;
use crate::use_cases::views::CharacterSheet;

use super::error::AdventureError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassChosen {
    pub class: CharacterClass,
    pub starter_weapon: String,
    /// The starter went straight into the empty weapon slot.
    pub equipped: bool,
    pub sheet: CharacterSheet,
}

/// Locks in a class and hands out its starter weapon.
pub struct ChooseClass {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
    locks: Arc<RecordLocks>,
}

impl ChooseClass {
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
        class: CharacterClass,
    ) -> Result<ClassChosen, AdventureError> {
        let _record = self.locks.lock(user_id).await;
        let mut combatant = self
            .records
            .get_combatant(user_id)
            .await?
            .ok_or(AdventureError::NotStarted)?;
        let mut inventory = self.records.get_inventory(user_id).await?;

        let had_weapon = combatant.weapon().is_some();
        let starter = combatant.choose_class(class)?;
        let equipped = !had_weapon;
        // An equipped weapon is held in the slot, not the inventory.
        if !equipped && !inventory.contains(starter) {
            inventory.add(starter, 1);
        }

        let mut batch = WriteBatch::new();
        batch
            .upsert_combatant(user_id, combatant.clone())
            .put_inventory(user_id, inventory.clone());
        self.records.commit(batch).await?;

        tracing::info!(user_id = %user_id, class = %class, "Class chosen");
        Ok(ClassChosen {
            class,
            starter_weapon: starter.to_string(),
            equipped,
            sheet: CharacterSheet::new(&self.catalog, user_id, combatant, &inventory),
        })
    }
}
