//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `SessionStore` - live solo and party encounters, plus the raid lock
//! - `PartyStore` - the party directory
//! - `LobbyStore` - card game lobbies and running games
//! - `RecordLocks` - per-user locks around record read-modify-write

pub mod lobbies;
pub mod parties;
pub mod record_locks;
pub mod sessions;

// Re-export store types
pub use lobbies::LobbyStore;
pub use parties::PartyStore;
pub use record_locks::{RecordGuard, RecordLocks};
pub use sessions::{SessionKey, SessionSlot, SessionStore};
