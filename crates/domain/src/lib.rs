//! Tabletop Terminal domain: combat rules, progression, parties, raids and
//! card game tables.
//!
//! Everything here is synchronous and storage-free. The engine crate loads
//! records, hands them to these types, and persists whatever comes back.

pub mod aggregates;
pub mod catalog;
pub mod combat;
pub mod error;
pub mod ids;
pub mod random;
pub mod value_objects;

pub use aggregates::{
    ActiveRaid, CardGame, Combatant, Inventory, LobbyDirectory, LobbyError, Party, PartyDirectory,
    PartyError, PartyQuest, RaidError, RaidState, StatKind, TableFormat,
};
pub use catalog::{Catalog, CharacterClass, ItemDef, ItemKind, MonsterTemplate, QuestDef, Rarity, SpellDef};
pub use combat::{
    Action, BattleMode, CombatError, CombatEvent, EncounterResult, EncounterSession,
    MonsterInstance, Roster, RosterChanges, TurnOutcome, TurnResolver,
};
pub use error::DomainError;
pub use ids::{GuildId, PartyId, TableId, UserId};
pub use random::RandomSource;
pub use value_objects::DiceError;
