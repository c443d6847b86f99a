//! Use cases - command orchestration.
//!
//! Each module groups the commands of one gameplay area. Use cases load
//! records through the [`RecordStore`](crate::infrastructure::ports::RecordStore)
//! port, run domain rules, and commit one write batch per command.

pub mod adventure;
pub mod battle;
pub mod dice;
pub mod encounter;
pub mod loadout;
pub mod lobby;
pub mod party;
pub mod raid;
pub mod views;

pub use adventure::AdventureUseCases;
pub use dice::DiceRoller;
pub use encounter::EncounterUseCases;
pub use loadout::LoadoutUseCases;
pub use lobby::LobbyOps;
pub use party::PartyOps;
pub use raid::RaidUseCases;
