//! Character status use case.

use std::sync::Arc;

use tabletop_domain::{Catalog, UserId};

use crate::infrastructure::ports::RecordStore;
use crate::use_cases::views::CharacterSheet;

use super::error::AdventureError;

pub struct ShowStatus {
    records: Arc<dyn RecordStore>,
    catalog: Arc<Catalog>,
}

impl ShowStatus {
    pub fn new(records: Arc<dyn RecordStore>, catalog: Arc<Catalog>) -> Self {
        Self { records, catalog }
    }

    pub async fn execute(&self, user_id: UserId) -> Result<CharacterSheet, AdventureError> {
        let combatant = self
            .records
            .get_combatant(user_id)
            .await?
            .ok_or(AdventureError::NotStarted)?;
        let inventory = self.records.get_inventory(user_id).await?;
        Ok(CharacterSheet::new(
            &self.catalog,
            user_id,
            combatant,
            &inventory,
        ))
    }
}
