//! Loadout use cases: weapons, spells and quests.

mod error;
mod quests;
mod spells;
mod weapons;

use std::sync::Arc;

use tabletop_domain::Catalog;

use crate::infrastructure::ports::RecordStore;
use crate::stores::{PartyStore, RecordLocks};

pub use error::LoadoutError;
pub use quests::{QuestAbandoned, QuestLog, QuestOps};
pub use spells::{SpellBook, SpellOps, SpellSummary};
pub use weapons::{WeaponInfo, WeaponOps, WeaponSwap};

/// Container for loadout use cases.
pub struct LoadoutUseCases {
    pub weapons: Arc<WeaponOps>,
    pub spells: Arc<SpellOps>,
    pub quests: Arc<QuestOps>,
}

impl LoadoutUseCases {
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Arc<Catalog>,
        parties: Arc<PartyStore>,
        locks: Arc<RecordLocks>,
    ) -> Self {
        Self {
            weapons: Arc::new(WeaponOps::new(records.clone(), catalog.clone(), locks.clone())),
            spells: Arc::new(SpellOps::new(records.clone(), catalog.clone(), locks.clone())),
            quests: Arc::new(QuestOps::new(records, catalog, parties, locks)),
        }
    }
}
