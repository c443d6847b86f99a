//! Encounter use cases.
//!
//! Solo and party fights against spawned monsters. Live fights sit in the
//! [`SessionStore`](crate::stores::SessionStore); only the progression they
//! produce reaches the record store.

mod attack;
mod error;
mod retreat;
mod start_encounter;

use std::sync::Arc;

use tabletop_domain::Catalog;

use crate::infrastructure::ports::{ClockPort, RandomPort, RecordStore};
use crate::stores::{PartyStore, RecordLocks, SessionStore};

pub use attack::TakeTurn;
pub use error::EncounterError;
pub use retreat::{Retreat, Retreated};
pub use start_encounter::{EncounterStarted, StartEncounter};

/// Container for encounter use cases.
pub struct EncounterUseCases {
    pub start: Arc<StartEncounter>,
    pub turn: Arc<TakeTurn>,
    pub retreat: Arc<Retreat>,
}

impl EncounterUseCases {
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
            start: Arc::new(StartEncounter::new(
                records.clone(),
                catalog.clone(),
                sessions.clone(),
                parties.clone(),
                random.clone(),
            )),
            turn: Arc::new(TakeTurn::new(
                records,
                catalog,
                sessions.clone(),
                parties.clone(),
                locks,
                clock,
                random,
            )),
            retreat: Arc::new(Retreat::new(sessions, parties)),
        }
    }
}
