//! Application state and composition.

use std::sync::Arc;

use tabletop_domain::Catalog;

use crate::infrastructure::ports::{ClockPort, RandomPort, RecordStore};
use crate::stores::{LobbyStore, PartyStore, RecordLocks, SessionStore};
use crate::use_cases;

/// Main application state.
///
/// Holds the record store, the in-memory stores and every use case.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub catalog: Arc<Catalog>,
    pub records: Arc<dyn RecordStore>,
    pub sessions: Arc<SessionStore>,
    pub parties: Arc<PartyStore>,
    pub lobbies: Arc<LobbyStore>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub adventure: use_cases::AdventureUseCases,
    pub encounter: use_cases::EncounterUseCases,
    pub party: Arc<use_cases::PartyOps>,
    pub raid: use_cases::RaidUseCases,
    pub loadout: use_cases::LoadoutUseCases,
    pub dice: Arc<use_cases::DiceRoller>,
    pub lobby: Arc<use_cases::LobbyOps>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        records: Arc<dyn RecordStore>,
        catalog: Catalog,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let sessions = Arc::new(SessionStore::new());
        let parties = Arc::new(PartyStore::new());
        let locks = Arc::new(RecordLocks::new());
        let lobbies = Arc::new(LobbyStore::new());

        let adventure = use_cases::AdventureUseCases::new(
            Arc::new(use_cases::adventure::StartAdventure::new(
                records.clone(),
                catalog.clone(),
                locks.clone(),
            )),
            Arc::new(use_cases::adventure::ShowStatus::new(
                records.clone(),
                catalog.clone(),
            )),
            Arc::new(use_cases::adventure::SpendPoints::new(
                records.clone(),
                catalog.clone(),
                locks.clone(),
            )),
            Arc::new(use_cases::adventure::ChooseClass::new(
                records.clone(),
                catalog.clone(),
                locks.clone(),
            )),
            Arc::new(use_cases::adventure::UseConsumable::new(
                records.clone(),
                catalog.clone(),
                sessions.clone(),
                parties.clone(),
                locks.clone(),
                random.clone(),
            )),
            Arc::new(use_cases::adventure::QuitAdventure::new(
                records.clone(),
                catalog.clone(),
                sessions.clone(),
                parties.clone(),
                locks.clone(),
            )),
        );

        let encounter = use_cases::EncounterUseCases::new(
            records.clone(),
            catalog.clone(),
            sessions.clone(),
            parties.clone(),
            locks.clone(),
            clock.clone(),
            random.clone(),
        );
        let raid = use_cases::RaidUseCases::new(
            records.clone(),
            catalog.clone(),
            sessions.clone(),
            parties.clone(),
            locks.clone(),
            clock,
            random.clone(),
        );
        let party = Arc::new(use_cases::PartyOps::new(
            catalog.clone(),
            sessions.clone(),
            parties.clone(),
        ));
        let loadout = use_cases::LoadoutUseCases::new(
            records.clone(),
            catalog.clone(),
            parties.clone(),
            locks,
        );
        let lobby = Arc::new(use_cases::LobbyOps::new(lobbies.clone(), random.clone()));
        let dice = Arc::new(use_cases::DiceRoller::new(random));

        Self {
            catalog,
            records,
            sessions,
            parties,
            lobbies,
            use_cases: UseCases {
                adventure,
                encounter,
                party,
                raid,
                loadout,
                dice,
                lobby,
            },
        }
    }
}
