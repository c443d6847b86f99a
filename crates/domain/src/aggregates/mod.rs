//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Owns all its constituent parts (enforced by Rust ownership)
//! - Exposes behavior through methods, not public fields
//! - Reports what a mutation did through its return value

pub mod combatant;
pub mod inventory;
pub mod lobby;
pub mod party;
pub mod raid;

pub use combatant::{
    exp_threshold, Combatant, ConsumeOutcome, LevelUp, StatKind, CLASS_UNLOCK_LEVEL,
    MAX_EQUIPPED_SPELLS,
};
pub use inventory::Inventory;
pub use lobby::{
    CardGame, LifeChange, LobbyDirectory, LobbyError, LobbyLeft, Seat, Seating, Table,
    TableFormat, TablePhase, COMMANDER_DAMAGE_LIMIT,
};
pub use party::{LeaveOutcome, Party, PartyDirectory, PartyError, PartyQuest};
pub use raid::{
    raid_cooldown_key, ActiveRaid, RaidError, RaidPhase, RaidState, RAID_COOLDOWN, RAID_LIFETIME,
};
