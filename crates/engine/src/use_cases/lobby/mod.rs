//! Card game companion use cases.
//!
//! Lobbies and life tracking for Magic: The Gathering and Yu-Gi-Oh! tables.
//! Nothing here touches the record store.

mod error;
mod table_ops;

pub use error::LobbyCommandError;
pub use table_ops::{CommanderDamage, LifeReport, LobbyOps, PlayerView, SeatingView, TableView};
